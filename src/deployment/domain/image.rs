//! Container image value objects.

use super::{DeploymentDomainError, Region};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry-qualified repository, e.g.
/// `123.dkr.ecr.us-east-1.amazonaws.com/myapp`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRepository(String);

impl ImageRepository {
    /// Creates a repository reference from its full text.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError::EmptyValue`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, DeploymentDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DeploymentDomainError::EmptyValue("image repository"));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Derives the private registry URI for a repository.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError::EmptyValue`] when the registry or
    /// repository name is blank.
    pub fn ecr(
        registry_id: &str,
        region: &Region,
        repository_name: &str,
    ) -> Result<Self, DeploymentDomainError> {
        let registry_id = registry_id.trim();
        let repository_name = repository_name.trim();
        if registry_id.is_empty() {
            return Err(DeploymentDomainError::EmptyValue("registry id"));
        }
        if repository_name.is_empty() {
            return Err(DeploymentDomainError::EmptyValue("repository name"));
        }
        Ok(Self(format!(
            "{registry_id}.dkr.ecr.{region}.amazonaws.com/{repository_name}"
        )))
    }

    /// Returns the repository as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Image tag that was pushed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageTag(String);

impl ImageTag {
    /// Creates a validated image tag.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError::EmptyValue`] when the tag is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, DeploymentDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(DeploymentDomainError::EmptyValue("image tag"));
        }
        Ok(Self(raw))
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw image reference held by a container, in `repository[:tag]` form.
///
/// Matching works on the raw text: a repository is a prefix, a tag is a
/// `:tag` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    /// Wraps an image reference exactly as the control plane reported it.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds `repository:tag`.
    #[must_use]
    pub fn tagged(repository: &ImageRepository, tag: &ImageTag) -> Self {
        Self(format!("{repository}:{tag}"))
    }

    /// Returns `true` when the reference starts with the repository,
    /// whatever its tag.
    #[must_use]
    pub fn belongs_to(&self, repository: &ImageRepository) -> bool {
        self.0.starts_with(repository.as_str())
    }

    /// Returns `true` when the reference starts with the repository and
    /// ends with `:tag`.
    #[must_use]
    pub fn matches_push(&self, repository: &ImageRepository, tag: &ImageTag) -> bool {
        self.belongs_to(repository) && self.0.ends_with(&format!(":{tag}"))
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
