//! Locating active services and pointing them at new revisions.

use std::sync::Arc;
use tracing::{debug, info};

use crate::deployment::{
    domain::{ClusterName, Service, TaskDefinitionArn},
    ports::{ControlPlane, ControlPlaneResult, drain, paginate},
};

/// Rolls services of a cluster onto new revisions.
#[derive(Clone)]
pub struct RolloutService<P>
where
    P: ControlPlane,
{
    control_plane: Arc<P>,
}

impl<P> RolloutService<P>
where
    P: ControlPlane,
{
    /// Creates a rollout service.
    #[must_use]
    pub const fn new(control_plane: Arc<P>) -> Self {
        Self { control_plane }
    }

    /// Returns every `ACTIVE` service of `cluster`.
    ///
    /// All listing pages are collected, then resolved in one describe batch.
    ///
    /// # Errors
    ///
    /// Returns the first failed listing or describe call.
    pub async fn locate_active(&self, cluster: &ClusterName) -> ControlPlaneResult<Vec<Service>> {
        let control_plane = &self.control_plane;
        let arns = drain(paginate(move |token| control_plane.list_services(cluster, token))).await?;
        debug!(%cluster, count = arns.len(), "collected service references");

        let services = control_plane.describe_services(cluster, &arns).await?;
        Ok(services.into_iter().filter(Service::is_active).collect())
    }

    /// Asks the platform to converge `service` onto `revision`.
    ///
    /// The rollout itself is owned by the platform; nothing is awaited
    /// beyond the acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns the failed update call.
    pub async fn roll(
        &self,
        cluster: &ClusterName,
        service: &Service,
        revision: &TaskDefinitionArn,
    ) -> ControlPlaneResult<()> {
        info!(service = %service.arn(), %revision, "updating service");
        self.control_plane
            .update_service(cluster, service.arn(), revision)
            .await
    }
}
