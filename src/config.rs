//! Process configuration for the deployer.
//!
//! The handler reads its settings once at startup and passes them to the
//! orchestrator explicitly; nothing below the entry point consults the
//! environment.

use crate::deployment::domain::{ClusterSuffix, DeploymentDomainError};
use thiserror::Error;

/// Environment variable naming the cluster suffix.
pub const CLUSTER_SUFFIX_VAR: &str = "CLUSTER_SUFFIX";

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    /// A variable is set but its value is unusable.
    #[error("environment variable {name} is invalid: {source}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Validation failure.
        source: DeploymentDomainError,
    },
}

/// Settings shared by every deployment the process handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployerConfig {
    cluster_suffix: ClusterSuffix,
}

impl DeployerConfig {
    /// Creates a configuration from validated values.
    #[must_use]
    pub const fn new(cluster_suffix: ClusterSuffix) -> Self {
        Self { cluster_suffix }
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `CLUSTER_SUFFIX` is missing or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `CLUSTER_SUFFIX` is missing or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(CLUSTER_SUFFIX_VAR).ok_or(ConfigError::Missing(CLUSTER_SUFFIX_VAR))?;
        let cluster_suffix = ClusterSuffix::new(raw).map_err(|source| ConfigError::Invalid {
            name: CLUSTER_SUFFIX_VAR,
            source,
        })?;
        Ok(Self::new(cluster_suffix))
    }

    /// Returns the suffix appended to the image tag to name the cluster.
    #[must_use]
    pub const fn cluster_suffix(&self) -> &ClusterSuffix {
        &self.cluster_suffix
    }
}
