//! End-to-end deployment passes driven by push notifications.

use super::helpers::{REPOSITORY, attributes, cluster, control_plane, family, image, orchestrator, push_event};
use ecr_deployer::deployment::{
    domain::{ContainerDefinition, ImageReference, ServiceStatus},
    ports::Operation,
    services::DeploymentStage,
};

#[tokio::test(flavor = "multi_thread")]
async fn push_retags_definition_and_rolls_matching_service() -> eyre::Result<()> {
    let plane = control_plane(100);
    let name = family("myapp-task");
    let source = plane.seed_task_definition(
        &name,
        vec![
            ContainerDefinition::new("web", image("v2")),
            ContainerDefinition::new("migrate", image("v1")),
            ContainerDefinition::new("proxy", ImageReference::new("nginx:1.27")),
        ],
        attributes(),
    );
    let web = plane.seed_service(&cluster("v2"), "web", ServiceStatus::Active, source.clone());

    let report = orchestrator(&plane).handle(push_event("v2")).await?;

    eyre::ensure!(report.target.repository.as_str() == REPOSITORY, "repository mismatch");
    eyre::ensure!(report.target.cluster.as_str() == "v2-prod", "cluster mismatch");

    let revisions = plane.revisions(&name);
    let registered = revisions
        .last()
        .ok_or_else(|| eyre::eyre!("no revision registered"))?;
    eyre::ensure!(revisions.len() == 2, "expected exactly one new revision");
    let images: Vec<String> = registered
        .containers()
        .iter()
        .map(|container| container.image().to_string())
        .collect();
    eyre::ensure!(
        images == [format!("{REPOSITORY}:v2"), format!("{REPOSITORY}:v2"), "nginx:1.27".to_owned()],
        "unexpected images {images:?}"
    );
    eyre::ensure!(registered.attributes() == &attributes(), "attributes changed");
    eyre::ensure!(registered.family() == &name, "family changed");

    let rolled = report
        .revisions
        .get(&source.family_ref())
        .ok_or_else(|| eyre::eyre!("mapping lacks source family"))?;
    eyre::ensure!(rolled == registered.arn(), "mapping points elsewhere");

    let service = plane
        .service(&cluster("v2"), &web)
        .ok_or_else(|| eyre::eyre!("service vanished"))?;
    eyre::ensure!(service.task_definition() == registered.arn(), "service not updated");
    eyre::ensure!(report.updated_services == vec![web], "unexpected updates");
    eyre::ensure!(
        report.stages.ends_with(&[DeploymentStage::ServicesLocated, DeploymentStage::ServicesUpdated, DeploymentStage::Done]),
        "unexpected stages {:?}",
        report.stages
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn push_of_unused_tag_is_a_no_op() -> eyre::Result<()> {
    let plane = control_plane(100);
    let source = plane.seed_task_definition(
        &family("myapp-task"),
        vec![ContainerDefinition::new("web", image("v1"))],
        attributes(),
    );
    plane.seed_service(&cluster("v2"), "web", ServiceStatus::Active, source);

    let report = orchestrator(&plane).handle(push_event("v2")).await?;

    eyre::ensure!(report.skipped(), "services should be skipped");
    eyre::ensure!(plane.calls(Operation::RegisterTaskDefinition) == 0, "registered a revision");
    eyre::ensure!(plane.calls(Operation::ListServices) == 0, "listed services");
    eyre::ensure!(plane.calls(Operation::DescribeServices) == 0, "described services");
    eyre::ensure!(plane.service_updates().is_empty(), "updated a service");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn services_in_other_clusters_are_left_alone() -> eyre::Result<()> {
    let plane = control_plane(100);
    let source = plane.seed_task_definition(
        &family("myapp-task"),
        vec![ContainerDefinition::new("web", image("v2"))],
        attributes(),
    );
    plane.seed_service(&cluster("v2"), "web", ServiceStatus::Active, source.clone());
    let staging = plane.seed_service(&cluster("v1"), "web", ServiceStatus::Active, source.clone());

    orchestrator(&plane).handle(push_event("v2")).await?;

    let untouched = plane
        .service(&cluster("v1"), &staging)
        .ok_or_else(|| eyre::eyre!("staging service vanished"))?;
    eyre::ensure!(untouched.task_definition() == &source, "staging service was updated");
    eyre::ensure!(plane.service_updates().len() == 1, "expected one update");
    Ok(())
}
