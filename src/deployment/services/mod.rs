//! Application services for image-triggered deployments.

mod definitions;
mod orchestrator;
mod rollout;

pub use definitions::DefinitionService;
pub use orchestrator::{
    DeploymentError, DeploymentOrchestrator, DeploymentReport, DeploymentResult, DeploymentStage,
};
pub use rollout::RolloutService;
