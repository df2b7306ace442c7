//! Running service records.

use super::{FamilyRef, ServiceArn, TaskDefinitionArn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status reported for a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceStatus {
    /// Eligible for updates.
    Active,
    /// Being scaled down ahead of deletion.
    Draining,
    /// Deleted.
    Inactive,
    /// Any status this crate does not know about.
    Other(String),
}

impl ServiceStatus {
    /// Parses a control plane status string.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "ACTIVE" => Self::Active,
            "DRAINING" => Self::Draining,
            "INACTIVE" => Self::Inactive,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns the status in control plane form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Draining => "DRAINING",
            Self::Inactive => "INACTIVE",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A service of a cluster and the revision it currently runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    arn: ServiceArn,
    status: ServiceStatus,
    task_definition: TaskDefinitionArn,
}

impl Service {
    /// Creates a service record.
    #[must_use]
    pub const fn new(
        arn: ServiceArn,
        status: ServiceStatus,
        task_definition: TaskDefinitionArn,
    ) -> Self {
        Self {
            arn,
            status,
            task_definition,
        }
    }

    /// Returns the service reference.
    #[must_use]
    pub const fn arn(&self) -> &ServiceArn {
        &self.arn
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> &ServiceStatus {
        &self.status
    }

    /// Returns the revision the service runs.
    #[must_use]
    pub const fn task_definition(&self) -> &TaskDefinitionArn {
        &self.task_definition
    }

    /// Returns `true` when the service may be updated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ServiceStatus::Active
    }

    /// Returns the running revision with its revision suffix stripped.
    #[must_use]
    pub fn family_ref(&self) -> FamilyRef {
        self.task_definition.family_ref()
    }
}
