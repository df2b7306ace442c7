//! Port for the container orchestration control plane.

use super::pagination::{Page, PageToken};
use crate::deployment::domain::{
    ClusterName, RevisionDraft, Service, ServiceArn, TaskDefinition, TaskDefinitionArn,
    TaskDefinitionFamily,
};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Result type for control plane calls.
pub type ControlPlaneResult<T> = Result<T, ControlPlaneError>;

/// Remote operations the deployer consumes.
///
/// Every call is a single request; pagination is driven by the caller.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Adapter-specific task definition fields carried into the next
    /// revision unchanged.
    type Attributes: Clone + fmt::Debug + Send + Sync;

    /// Lists one page of active task definition families.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ControlPlaneError`] when the call fails.
    async fn list_task_definition_families(
        &self,
        next_token: Option<PageToken>,
    ) -> ControlPlaneResult<Page<TaskDefinitionFamily>>;

    /// Describes the latest active revision of a family.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPlaneError::NotFound`] when the family has no active
    /// revision.
    async fn describe_task_definition(
        &self,
        family: &TaskDefinitionFamily,
    ) -> ControlPlaneResult<TaskDefinition<Self::Attributes>>;

    /// Registers a draft as the next revision of its family.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ControlPlaneError`] when registration fails.
    async fn register_task_definition(
        &self,
        draft: &RevisionDraft<Self::Attributes>,
    ) -> ControlPlaneResult<TaskDefinitionArn>;

    /// Lists one page of service references in a cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPlaneError::NotFound`] when the cluster does not
    /// exist.
    async fn list_services(
        &self,
        cluster: &ClusterName,
        next_token: Option<PageToken>,
    ) -> ControlPlaneResult<Page<ServiceArn>>;

    /// Resolves service details in one batch.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ControlPlaneError`] when the call fails.
    async fn describe_services(
        &self,
        cluster: &ClusterName,
        services: &[ServiceArn],
    ) -> ControlPlaneResult<Vec<Service>>;

    /// Points a service at a new revision and lets the platform roll it out.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ControlPlaneError`] when the call fails.
    async fn update_service(
        &self,
        cluster: &ClusterName,
        service: &ServiceArn,
        task_definition: &TaskDefinitionArn,
    ) -> ControlPlaneResult<()>;
}

/// Control plane operations, used to label faults and call logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// `ListTaskDefinitionFamilies`.
    ListTaskDefinitionFamilies,
    /// `DescribeTaskDefinition`.
    DescribeTaskDefinition,
    /// `RegisterTaskDefinition`.
    RegisterTaskDefinition,
    /// `ListServices`.
    ListServices,
    /// `DescribeServices`.
    DescribeServices,
    /// `UpdateService`.
    UpdateService,
}

impl Operation {
    /// Returns the operation's API name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListTaskDefinitionFamilies => "ListTaskDefinitionFamilies",
            Self::DescribeTaskDefinition => "DescribeTaskDefinition",
            Self::RegisterTaskDefinition => "RegisterTaskDefinition",
            Self::ListServices => "ListServices",
            Self::DescribeServices => "DescribeServices",
            Self::UpdateService => "UpdateService",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified control plane fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    /// The request was rate limited.
    #[error("{operation} throttled: {message}")]
    Throttled {
        /// Failed operation.
        operation: Operation,
        /// Provider message.
        message: String,
    },

    /// The addressed cluster, family, or service does not exist.
    #[error("{operation} target not found: {message}")]
    NotFound {
        /// Failed operation.
        operation: Operation,
        /// Provider message.
        message: String,
    },

    /// The request was refused as invalid or unauthorised.
    #[error("{operation} rejected: {message}")]
    Rejected {
        /// Failed operation.
        operation: Operation,
        /// Provider message.
        message: String,
    },

    /// The service or the network failed.
    #[error("{operation} unavailable: {message}")]
    Unavailable {
        /// Failed operation.
        operation: Operation,
        /// Provider message.
        message: String,
    },

    /// The call succeeded but its response lacked a required field.
    #[error("{operation} returned a malformed response: {message}")]
    MalformedResponse {
        /// Failed operation.
        operation: Operation,
        /// What was missing.
        message: String,
    },
}

impl ControlPlaneError {
    /// Builds a [`Self::MalformedResponse`] for a missing response field.
    #[must_use]
    pub fn missing_field(operation: Operation, field: &str) -> Self {
        Self::MalformedResponse {
            operation,
            message: format!("missing {field}"),
        }
    }

    /// Returns the operation that failed.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Throttled { operation, .. }
            | Self::NotFound { operation, .. }
            | Self::Rejected { operation, .. }
            | Self::Unavailable { operation, .. }
            | Self::MalformedResponse { operation, .. } => *operation,
        }
    }

    /// Returns `true` for faults a retry may clear.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled { .. } | Self::Unavailable { .. })
    }
}
