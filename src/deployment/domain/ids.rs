//! Identifier and validated scalar types for the deployment domain.

use super::DeploymentDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declares a non-blank string identifier with the common accessors.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            ///
            /// # Errors
            ///
            /// Returns [`DeploymentDomainError::EmptyValue`] when the value is
            /// blank.
            pub fn new(value: impl Into<String>) -> Result<Self, DeploymentDomainError> {
                let raw = value.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(DeploymentDomainError::EmptyValue($label));
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Stable name grouping all revisions of a task definition.
    TaskDefinitionFamily,
    "task definition family"
);

string_id!(
    /// Revisioned task definition reference, e.g.
    /// `arn:aws:ecs:us-east-1:123:task-definition/myapp:7`.
    TaskDefinitionArn,
    "task definition ARN"
);

string_id!(
    /// Service reference as returned by the control plane.
    ServiceArn,
    "service ARN"
);

string_id!(
    /// Cluster the rollout targets.
    ClusterName,
    "cluster name"
);

string_id!(
    /// Deployment-wide suffix appended to the image tag to name the cluster.
    ClusterSuffix,
    "cluster suffix"
);

string_id!(
    /// Region every control plane call is addressed to.
    Region,
    "region"
);

impl TaskDefinitionArn {
    /// Composes the reference of a family revision.
    #[must_use]
    pub fn compose(
        region: &Region,
        account: &str,
        family: &TaskDefinitionFamily,
        revision: u32,
    ) -> Self {
        Self(format!(
            "arn:aws:ecs:{region}:{account}:task-definition/{family}:{revision}"
        ))
    }

    /// Returns the reference with its revision suffix removed.
    #[must_use]
    pub fn family_ref(&self) -> FamilyRef {
        FamilyRef(strip_revision(&self.0).to_owned())
    }
}

impl ServiceArn {
    /// Composes the reference of a service in a cluster.
    #[must_use]
    pub fn compose(region: &Region, account: &str, cluster: &ClusterName, name: &str) -> Self {
        Self(format!("arn:aws:ecs:{region}:{account}:service/{cluster}/{name}"))
    }
}

impl ClusterName {
    /// Derives the target cluster as `{tag}-{suffix}`.
    #[must_use]
    pub fn for_tag(tag: &super::ImageTag, suffix: &ClusterSuffix) -> Self {
        Self(format!("{tag}-{suffix}"))
    }
}

/// Removes a trailing `:<revision>` from a task definition reference.
///
/// Only a numeric suffix that follows the resource segment (the one holding
/// `task-definition/<family>`) is removed, so applying the function to its
/// own output is a no-op.
#[must_use]
pub fn strip_revision(reference: &str) -> &str {
    let Some((head, revision)) = reference.rsplit_once(':') else {
        return reference;
    };
    let resource = head.rsplit_once(':').map_or(head, |(_, last)| last);
    let numeric = !revision.is_empty() && revision.bytes().all(|byte| byte.is_ascii_digit());
    if numeric && resource.contains('/') {
        head
    } else {
        reference
    }
}

/// Task definition reference with the revision suffix stripped.
///
/// Two revisions of the same family share one `FamilyRef`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyRef(String);

impl FamilyRef {
    /// Strips the revision from an arbitrary reference string.
    #[must_use]
    pub fn from_reference(reference: &str) -> Self {
        Self(strip_revision(reference).to_owned())
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FamilyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for one deployment invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentId(Uuid);

impl DeploymentId {
    /// Creates a new random deployment identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for DeploymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
