//! Lambda entry point reacting to container registry push notifications.
//!
//! The function expects the push event forwarded by the event bus and one
//! environment variable, `CLUSTER_SUFFIX`. Each invocation builds an ECS
//! client for the event's region and runs a single deployment pass; any
//! failure is returned to the runtime so the platform can record or retry
//! the invocation.

use std::sync::Arc;

use aws_config::{BehaviorVersion, SdkConfig};
use ecr_deployer::config::DeployerConfig;
use ecr_deployer::deployment::{
    adapters::aws::EcsControlPlane,
    domain::ImagePushEvent,
    services::{DeploymentOrchestrator, DeploymentReport},
};
use ecr_deployer::observability::{LogFormat, init_logging};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use mockable::DefaultClock;
use serde_json::Value;

async fn handle_push(
    event: LambdaEvent<Value>,
    shared: &SdkConfig,
    config: &DeployerConfig,
) -> Result<DeploymentReport, Error> {
    let target = ImagePushEvent::from_value(event.payload)?.target(config.cluster_suffix())?;
    let control_plane = Arc::new(EcsControlPlane::for_region(shared, &target.region));
    let orchestrator =
        DeploymentOrchestrator::new(control_plane, Arc::new(DefaultClock), config.clone());
    Ok(orchestrator.deploy(target).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging(LogFormat::from_env());
    let config = DeployerConfig::from_env()?;
    let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;

    run(service_fn(|event| handle_push(event, &shared, &config))).await
}
