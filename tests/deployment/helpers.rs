//! Shared fixtures for in-memory deployment tests.

use std::sync::Arc;

use ecr_deployer::config::DeployerConfig;
use ecr_deployer::deployment::{
    adapters::memory::{InMemoryControlPlane, RevisionAttributes},
    domain::{ClusterName, ClusterSuffix, ImageReference, Region, TaskDefinitionFamily},
    services::DeploymentOrchestrator,
};
use mockable::DefaultClock;
use serde_json::{Value, json};

/// Registry URI of the `myapp` repository in account `123`.
pub const REPOSITORY: &str = "123.dkr.ecr.us-east-1.amazonaws.com/myapp";

/// Orchestrator over the in-memory control plane.
pub type TestOrchestrator = DeploymentOrchestrator<InMemoryControlPlane, DefaultClock>;

/// Creates an empty control plane in `us-east-1` for account `123`.
pub fn control_plane(page_size: usize) -> Arc<InMemoryControlPlane> {
    let region = Region::new("us-east-1").expect("valid region");
    Arc::new(InMemoryControlPlane::new(region, "123").with_page_size(page_size))
}

/// Creates an orchestrator configured with `CLUSTER_SUFFIX=prod`.
pub fn orchestrator(plane: &Arc<InMemoryControlPlane>) -> TestOrchestrator {
    let config = DeployerConfig::from_lookup(|name| {
        (name == "CLUSTER_SUFFIX").then(|| "prod".to_owned())
    })
    .expect("valid config");
    DeploymentOrchestrator::new(Arc::clone(plane), Arc::new(DefaultClock), config)
}

/// Builds the push notification for `myapp:{tag}`.
pub fn push_event(tag: &str) -> Value {
    json!({
        "version": "0",
        "detail-type": "AWS API Call via CloudTrail",
        "source": "aws.ecr",
        "region": "us-east-1",
        "detail": {
            "eventName": "PutImage",
            "responseElements": {
                "image": {
                    "repositoryName": "myapp",
                    "registryId": "123",
                    "imageId": { "imageTag": tag },
                    "imageManifest": "{\"schemaVersion\":2}"
                }
            }
        }
    })
}

/// Returns `REPOSITORY:{tag}`.
pub fn image(tag: &str) -> ImageReference {
    ImageReference::new(format!("{REPOSITORY}:{tag}"))
}

/// Returns a validated family name.
pub fn family(name: &str) -> TaskDefinitionFamily {
    TaskDefinitionFamily::new(name).expect("valid family")
}

/// Returns the `{tag}-prod` cluster.
pub fn cluster(tag: &str) -> ClusterName {
    let suffix = ClusterSuffix::new("prod").expect("valid suffix");
    ClusterName::new(format!("{tag}-{suffix}")).expect("valid cluster")
}

/// Attributes a production task definition typically carries.
pub fn attributes() -> RevisionAttributes {
    RevisionAttributes {
        task_role_arn: Some("arn:aws:iam::123:role/myapp-task".to_owned()),
        volumes: vec!["shared-cache".to_owned()],
        placement_constraints: vec!["distinctInstance".to_owned()],
        compatibilities: vec!["EC2".to_owned()],
    }
}
