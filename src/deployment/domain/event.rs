//! Image push notifications and the deployment target derived from them.
//!
//! The registry forwards a push through the event bus as:
//!
//! ```json
//! {
//!   "region": "us-east-1",
//!   "detail": {
//!     "responseElements": {
//!       "image": {
//!         "repositoryName": "myapp",
//!         "registryId": "123",
//!         "imageId": { "imageTag": "v2" },
//!         "imageManifest": "{...}"
//!       }
//!     }
//!   }
//! }
//! ```

use super::{ClusterName, ClusterSuffix, DeploymentDomainError, ImageRepository, ImageTag, Region};
use serde::{Deserialize, Serialize};

/// Push notification as delivered to the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePushEvent {
    /// Region of the registry and of every control plane call.
    pub region: String,
    /// Event payload.
    pub detail: PushDetail,
}

/// `detail` section of a push notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushDetail {
    /// Registry API response captured by the audit trail.
    pub response_elements: PushResponseElements,
}

/// `responseElements` section of a push notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponseElements {
    /// The pushed image.
    pub image: PushedImage,
}

/// The image a push created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushedImage {
    /// Repository name within the registry.
    pub repository_name: String,
    /// Registry (account) identifier.
    pub registry_id: String,
    /// Tag identity of the image.
    pub image_id: PushedImageId,
    /// Raw manifest document.
    pub image_manifest: String,
}

/// `imageId` section of a push notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushedImageId {
    /// Tag that was pushed.
    pub image_tag: String,
}

impl ImagePushEvent {
    /// Parses a push notification from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError::MalformedEvent`] when a required
    /// field is missing or has the wrong type.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DeploymentDomainError> {
        serde_json::from_value(value)
            .map_err(|err| DeploymentDomainError::MalformedEvent(err.to_string()))
    }

    /// Derives what to deploy and where.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError::MalformedEvent`] when a required
    /// field is blank.
    pub fn target(&self, suffix: &ClusterSuffix) -> Result<DeploymentTarget, DeploymentDomainError> {
        let image = &self.detail.response_elements.image;
        let region = Region::new(self.region.as_str()).map_err(malformed)?;
        let repository =
            ImageRepository::ecr(&image.registry_id, &region, &image.repository_name)
                .map_err(malformed)?;
        let tag = ImageTag::new(image.image_id.image_tag.as_str()).map_err(malformed)?;
        let cluster = ClusterName::for_tag(&tag, suffix);

        Ok(DeploymentTarget {
            region,
            repository,
            tag,
            cluster,
            image_manifest: image.image_manifest.clone(),
        })
    }
}

fn malformed(err: DeploymentDomainError) -> DeploymentDomainError {
    match err {
        DeploymentDomainError::EmptyValue(field) => {
            DeploymentDomainError::MalformedEvent(format!("{field} must not be empty"))
        }
        DeploymentDomainError::MalformedEvent(_) => err,
    }
}

/// Everything one deployment pass needs to know about the push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentTarget {
    /// Region for every control plane call.
    pub region: Region,
    /// Registry-qualified repository of the pushed image.
    pub repository: ImageRepository,
    /// Pushed tag.
    pub tag: ImageTag,
    /// Cluster whose services are rolled.
    pub cluster: ClusterName,
    /// Manifest of the pushed image, carried for completeness.
    pub image_manifest: String,
}
