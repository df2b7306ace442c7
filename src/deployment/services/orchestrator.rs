//! Drives one deployment pass from a push notification to service updates.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, info, info_span};

use super::{DefinitionService, RolloutService};
use crate::config::DeployerConfig;
use crate::deployment::{
    domain::{
        DeploymentDomainError, DeploymentId, DeploymentTarget, ImagePushEvent, RevisionMapping,
        ServiceArn,
    },
    ports::{ControlPlane, ControlPlaneError},
};

/// Service-level errors for a deployment pass.
#[derive(Debug, Error)]
pub enum DeploymentError {
    /// The push notification could not be interpreted.
    #[error(transparent)]
    Domain(#[from] DeploymentDomainError),
    /// A control plane call failed; earlier registrations stay in place.
    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),
}

/// Result type for deployment passes.
pub type DeploymentResult<T> = Result<T, DeploymentError>;

/// Stages a deployment pass moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStage {
    /// Nothing has run yet.
    Start,
    /// Task definitions referencing the pushed image are known.
    DefinitionsLocated,
    /// New revisions are registered.
    DefinitionsUpdated,
    /// Active services of the target cluster are known.
    ServicesLocated,
    /// Matching services point at the new revisions.
    ServicesUpdated,
    /// No revision was registered, so services were left alone.
    Skipped,
    /// The pass finished.
    Done,
}

/// Summary of a finished deployment pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentReport {
    /// Identifier of this pass.
    pub id: DeploymentId,
    /// What was deployed and where.
    pub target: DeploymentTarget,
    /// Stages visited, in order, ending with [`DeploymentStage::Done`].
    pub stages: Vec<DeploymentStage>,
    /// Stripped source reference to registered revision.
    pub revisions: RevisionMapping,
    /// Services asked to roll onto a new revision.
    pub updated_services: Vec<ServiceArn>,
    /// When the pass started.
    pub started_at: DateTime<Utc>,
    /// When the pass finished.
    pub finished_at: DateTime<Utc>,
}

impl DeploymentReport {
    /// Returns `true` when services were skipped because nothing was
    /// registered.
    #[must_use]
    pub fn skipped(&self) -> bool {
        self.stages.contains(&DeploymentStage::Skipped)
    }
}

/// Deployment orchestration service.
pub struct DeploymentOrchestrator<P, C>
where
    P: ControlPlane,
    C: Clock + Send + Sync,
{
    definitions: DefinitionService<P>,
    rollout: RolloutService<P>,
    clock: Arc<C>,
    config: DeployerConfig,
}

impl<P, C> DeploymentOrchestrator<P, C>
where
    P: ControlPlane,
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator over one control plane.
    #[must_use]
    pub fn new(control_plane: Arc<P>, clock: Arc<C>, config: DeployerConfig) -> Self {
        Self {
            definitions: DefinitionService::new(Arc::clone(&control_plane)),
            rollout: RolloutService::new(control_plane),
            clock,
            config,
        }
    }

    /// Parses a raw push notification and deploys it.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::Domain`] for a malformed event before any
    /// remote call is made, or the first failed control plane call.
    pub async fn handle(&self, event: serde_json::Value) -> DeploymentResult<DeploymentReport> {
        let target = ImagePushEvent::from_value(event)?.target(self.config.cluster_suffix())?;
        self.deploy(target).await
    }

    /// Runs one forward pass: locate and revise task definitions, then roll
    /// the matching active services of the target cluster.
    ///
    /// # Errors
    ///
    /// Returns the first failed control plane call. Revisions registered
    /// before the failure are not withdrawn.
    pub async fn deploy(&self, target: DeploymentTarget) -> DeploymentResult<DeploymentReport> {
        let id = DeploymentId::new();
        let span = info_span!(
            "deployment",
            %id,
            repository = %target.repository,
            tag = %target.tag,
            cluster = %target.cluster,
        );
        self.run(id, target).instrument(span).await
    }

    async fn run(&self, id: DeploymentId, target: DeploymentTarget) -> DeploymentResult<DeploymentReport> {
        let started_at = self.clock.utc();
        let mut stages = vec![DeploymentStage::Start];

        let definitions = self
            .definitions
            .locate(&target.repository, &target.tag)
            .await?;
        advance(&mut stages, DeploymentStage::DefinitionsLocated);
        info!(count = definitions.len(), "located task definitions");

        let mut revisions = RevisionMapping::new();
        for definition in &definitions {
            self.definitions
                .revise(definition, &target.repository, &target.tag, &mut revisions)
                .await?;
        }
        advance(&mut stages, DeploymentStage::DefinitionsUpdated);

        let mut updated_services = Vec::new();
        if revisions.is_empty() {
            advance(&mut stages, DeploymentStage::Skipped);
        } else {
            let services = self.rollout.locate_active(&target.cluster).await?;
            advance(&mut stages, DeploymentStage::ServicesLocated);

            for service in &services {
                let Some(revision) = revisions.get(&service.family_ref()) else {
                    continue;
                };
                self.rollout.roll(&target.cluster, service, revision).await?;
                updated_services.push(service.arn().clone());
            }
            advance(&mut stages, DeploymentStage::ServicesUpdated);
        }
        advance(&mut stages, DeploymentStage::Done);

        info!(
            revisions = revisions.len(),
            services = updated_services.len(),
            "deployment finished"
        );
        Ok(DeploymentReport {
            id,
            target,
            stages,
            revisions,
            updated_services,
            started_at,
            finished_at: self.clock.utc(),
        })
    }
}

fn advance(stages: &mut Vec<DeploymentStage>, stage: DeploymentStage) {
    info!(?stage, "deployment stage reached");
    stages.push(stage);
}
