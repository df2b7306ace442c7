//! Multi-page listings feed every item into the deployment pass.

use super::helpers::{attributes, cluster, control_plane, family, image, orchestrator, push_event};
use ecr_deployer::deployment::{
    domain::{ContainerDefinition, ServiceStatus},
    ports::Operation,
};

#[tokio::test(flavor = "multi_thread")]
async fn families_on_every_page_are_revised() -> eyre::Result<()> {
    let plane = control_plane(1);
    let first = family("alpha-task");
    let second = family("beta-task");
    for name in [&first, &second] {
        plane.seed_task_definition(
            name,
            vec![ContainerDefinition::new("web", image("v2"))],
            attributes(),
        );
    }

    let report = orchestrator(&plane).handle(push_event("v2")).await?;

    eyre::ensure!(
        plane.calls(Operation::ListTaskDefinitionFamilies) == 2,
        "expected two listing pages"
    );
    eyre::ensure!(report.revisions.len() == 2, "expected both families revised");
    eyre::ensure!(plane.revisions(&first).len() == 2, "first page family not revised");
    eyre::ensure!(plane.revisions(&second).len() == 2, "second page family not revised");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn services_on_every_page_are_rolled() -> eyre::Result<()> {
    let plane = control_plane(2);
    let source = plane.seed_task_definition(
        &family("myapp-task"),
        vec![ContainerDefinition::new("web", image("v2"))],
        attributes(),
    );
    let target = cluster("v2");
    for name in ["web", "worker", "scheduler", "api", "admin"] {
        plane.seed_service(&target, name, ServiceStatus::Active, source.clone());
    }

    let report = orchestrator(&plane).handle(push_event("v2")).await?;

    eyre::ensure!(plane.calls(Operation::ListServices) == 3, "expected three listing pages");
    eyre::ensure!(plane.calls(Operation::DescribeServices) == 1, "expected one describe batch");
    eyre::ensure!(report.updated_services.len() == 5, "expected every service rolled");
    Ok(())
}
