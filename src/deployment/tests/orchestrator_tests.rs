//! Deployment pass orchestration tests.

use std::sync::Arc;

use crate::config::DeployerConfig;
use crate::deployment::{
    adapters::memory::{InMemoryControlPlane, RevisionAttributes},
    domain::{
        ClusterName, ClusterSuffix, ContainerDefinition, DeploymentTarget, ImagePushEvent,
        ImageReference, Region, RevisionDraft, Service, ServiceArn, ServiceStatus,
        TaskDefinition, TaskDefinitionArn, TaskDefinitionFamily,
    },
    ports::{ControlPlane, ControlPlaneError, ControlPlaneResult, Operation, Page, PageToken},
    services::{DeploymentError, DeploymentOrchestrator, DeploymentStage},
};
use async_trait::async_trait;
use mockable::DefaultClock;
use mockall::mock;
use rstest::{fixture, rstest};
use serde_json::json;

mock! {
    Plane {}

    #[async_trait]
    impl ControlPlane for Plane {
        type Attributes = ();

        async fn list_task_definition_families(
            &self,
            next_token: Option<PageToken>,
        ) -> ControlPlaneResult<Page<TaskDefinitionFamily>>;

        async fn describe_task_definition(
            &self,
            family: &TaskDefinitionFamily,
        ) -> ControlPlaneResult<TaskDefinition<()>>;

        async fn register_task_definition(
            &self,
            draft: &RevisionDraft<()>,
        ) -> ControlPlaneResult<TaskDefinitionArn>;

        async fn list_services(
            &self,
            cluster: &ClusterName,
            next_token: Option<PageToken>,
        ) -> ControlPlaneResult<Page<ServiceArn>>;

        async fn describe_services(
            &self,
            cluster: &ClusterName,
            services: &[ServiceArn],
        ) -> ControlPlaneResult<Vec<Service>>;

        async fn update_service(
            &self,
            cluster: &ClusterName,
            service: &ServiceArn,
            task_definition: &TaskDefinitionArn,
        ) -> ControlPlaneResult<()>;
    }
}

const REPOSITORY: &str = "123.dkr.ecr.us-east-1.amazonaws.com/myapp";

fn image(tag: &str) -> ImageReference {
    ImageReference::new(format!("{REPOSITORY}:{tag}"))
}

fn family(name: &str) -> TaskDefinitionFamily {
    TaskDefinitionFamily::new(name).expect("valid family")
}

fn arn(text: &str) -> TaskDefinitionArn {
    TaskDefinitionArn::new(text).expect("valid arn")
}

#[fixture]
fn config() -> DeployerConfig {
    DeployerConfig::new(ClusterSuffix::new("prod").expect("valid suffix"))
}

#[fixture]
fn target(config: DeployerConfig) -> DeploymentTarget {
    ImagePushEvent::from_value(push_event("v2"))
        .expect("event should parse")
        .target(config.cluster_suffix())
        .expect("target should derive")
}

#[fixture]
fn plane() -> Arc<InMemoryControlPlane> {
    let region = Region::new("us-east-1").expect("valid region");
    Arc::new(InMemoryControlPlane::new(region, "123"))
}

fn push_event(tag: &str) -> serde_json::Value {
    json!({
        "region": "us-east-1",
        "detail": {
            "responseElements": {
                "image": {
                    "repositoryName": "myapp",
                    "registryId": "123",
                    "imageId": { "imageTag": tag },
                    "imageManifest": "{}"
                }
            }
        }
    })
}

fn cluster() -> ClusterName {
    ClusterName::new("v2-prod").expect("valid cluster")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn no_matching_definitions_never_touches_services(
    config: DeployerConfig,
    target: DeploymentTarget,
) {
    let mut mock = MockPlane::new();
    mock.expect_list_task_definition_families()
        .times(1)
        .returning(|_| Ok(Page::last(vec![family("other-task")])));
    mock.expect_describe_task_definition().times(1).returning(|name| {
        Ok(TaskDefinition::new(
            arn("arn:aws:ecs:us-east-1:123:task-definition/other-task:1"),
            name.clone(),
            vec![ContainerDefinition::new("app", ImageReference::new("nginx:v2"))],
            (),
        ))
    });
    mock.expect_register_task_definition().never();
    mock.expect_list_services().never();
    mock.expect_describe_services().never();
    mock.expect_update_service().never();
    let orchestrator = DeploymentOrchestrator::new(Arc::new(mock), Arc::new(DefaultClock), config);

    let report = orchestrator.deploy(target).await.expect("deploy should succeed");

    assert!(report.skipped());
    assert!(report.revisions.is_empty());
    assert_eq!(
        report.stages,
        vec![
            DeploymentStage::Start,
            DeploymentStage::DefinitionsLocated,
            DeploymentStage::DefinitionsUpdated,
            DeploymentStage::Skipped,
            DeploymentStage::Done,
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn describe_failure_aborts_before_registration(
    config: DeployerConfig,
    target: DeploymentTarget,
) {
    let mut mock = MockPlane::new();
    mock.expect_list_task_definition_families()
        .returning(|_| Ok(Page::last(vec![family("myapp-task")])));
    mock.expect_describe_task_definition().returning(|_| {
        Err(ControlPlaneError::Unavailable {
            operation: Operation::DescribeTaskDefinition,
            message: "connection reset".to_owned(),
        })
    });
    mock.expect_register_task_definition().never();
    mock.expect_list_services().never();
    let orchestrator = DeploymentOrchestrator::new(Arc::new(mock), Arc::new(DefaultClock), config);

    let result = orchestrator.deploy(target).await;

    assert!(matches!(
        result,
        Err(DeploymentError::ControlPlane(ControlPlaneError::Unavailable {
            operation: Operation::DescribeTaskDefinition,
            ..
        }))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_event_fails_before_any_remote_call(config: DeployerConfig) {
    let mut mock = MockPlane::new();
    mock.expect_list_task_definition_families().never();
    let orchestrator = DeploymentOrchestrator::new(Arc::new(mock), Arc::new(DefaultClock), config);

    let result = orchestrator.handle(json!({ "region": "us-east-1" })).await;

    assert!(matches!(result, Err(DeploymentError::Domain(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_services_on_revised_families_are_updated(
    config: DeployerConfig,
    plane: Arc<InMemoryControlPlane>,
) {
    let myapp = plane.seed_task_definition(
        &family("myapp-task"),
        vec![ContainerDefinition::new("web", image("v2"))],
        RevisionAttributes::default(),
    );
    let other = plane.seed_task_definition(
        &family("other-task"),
        vec![ContainerDefinition::new("web", ImageReference::new("nginx:1.27"))],
        RevisionAttributes::default(),
    );
    let web = plane.seed_service(&cluster(), "web", ServiceStatus::Active, myapp.clone());
    let sidecar = plane.seed_service(&cluster(), "sidecar", ServiceStatus::Active, other.clone());
    let retired = plane.seed_service(&cluster(), "retired", ServiceStatus::Inactive, myapp);
    let orchestrator =
        DeploymentOrchestrator::new(Arc::clone(&plane), Arc::new(DefaultClock), config);

    let report = orchestrator
        .handle(push_event("v2"))
        .await
        .expect("deploy should succeed");

    assert_eq!(report.updated_services, vec![web.clone()]);
    assert_eq!(
        report.stages.last(),
        Some(&DeploymentStage::Done)
    );
    assert!(report.stages.contains(&DeploymentStage::ServicesUpdated));
    let revised = plane
        .service(&cluster(), &web)
        .expect("web exists")
        .task_definition()
        .clone();
    assert!(revised.as_str().ends_with("task-definition/myapp-task:2"));
    assert_eq!(
        plane.service(&cluster(), &sidecar).map(|service| service.task_definition().clone()),
        Some(other)
    );
    assert!(
        plane
            .service(&cluster(), &retired)
            .is_some_and(|service| service.task_definition().as_str().ends_with(":1"))
    );
    assert!(report.started_at <= report.finished_at);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_service_update_keeps_registered_revisions(
    config: DeployerConfig,
    plane: Arc<InMemoryControlPlane>,
) {
    let name = family("myapp-task");
    let source = plane.seed_task_definition(
        &name,
        vec![ContainerDefinition::new("web", image("v2"))],
        RevisionAttributes::default(),
    );
    plane.seed_service(&cluster(), "web", ServiceStatus::Active, source);
    plane.fail_on(
        Operation::UpdateService,
        ControlPlaneError::Rejected {
            operation: Operation::UpdateService,
            message: "access denied".to_owned(),
        },
    );
    let orchestrator =
        DeploymentOrchestrator::new(Arc::clone(&plane), Arc::new(DefaultClock), config);

    let result = orchestrator.handle(push_event("v2")).await;

    assert!(matches!(result, Err(DeploymentError::ControlPlane(_))));
    assert_eq!(plane.revisions(&name).len(), 2);
}
