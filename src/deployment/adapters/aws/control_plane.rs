//! Amazon ECS implementation of the control plane port.

use async_trait::async_trait;
use aws_sdk_ecs::Client;
use aws_sdk_ecs::operation::register_task_definition::builders::RegisterTaskDefinitionFluentBuilder;
use aws_sdk_ecs::types::{
    ContainerDefinition as EcsContainerDefinition, Service as EcsService,
    TaskDefinition as EcsTaskDefinition, TaskDefinitionFamilyStatus,
};
use tracing::{debug, warn};

use super::errors::classify;
use crate::deployment::{
    domain::{
        ClusterName, ContainerDefinition, ImageReference, Region, RevisionDraft, Service,
        ServiceArn, ServiceStatus, TaskDefinition, TaskDefinitionArn, TaskDefinitionFamily,
    },
    ports::{ControlPlane, ControlPlaneError, ControlPlaneResult, Operation, Page, PageToken},
};

/// Largest batch `DescribeServices` accepts.
const DESCRIBE_SERVICES_BATCH: usize = 10;

/// Control plane backed by the ECS API.
///
/// Task definitions keep the full described record as their attributes, so
/// registration forwards every field the deployer does not rewrite.
#[derive(Debug, Clone)]
pub struct EcsControlPlane {
    client: Client,
}

impl EcsControlPlane {
    /// Wraps a configured ECS client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client addressing `region`, reusing the shared credentials
    /// and retry settings.
    #[must_use]
    pub fn for_region(shared: &aws_config::SdkConfig, region: &Region) -> Self {
        let config = aws_sdk_ecs::config::Builder::from(shared)
            .region(aws_sdk_ecs::config::Region::new(region.as_str().to_owned()))
            .build();
        Self::new(Client::from_conf(config))
    }
}

fn malformed(operation: Operation, err: impl ToString) -> ControlPlaneError {
    ControlPlaneError::MalformedResponse {
        operation,
        message: err.to_string(),
    }
}

fn container_from_native(
    operation: Operation,
    native: &EcsContainerDefinition,
) -> ControlPlaneResult<ContainerDefinition> {
    let image = native
        .image()
        .ok_or_else(|| ControlPlaneError::missing_field(operation, "containerDefinitions.image"))?;
    Ok(ContainerDefinition::new(
        native.name().unwrap_or_default(),
        ImageReference::new(image),
    ))
}

fn task_definition_from_native(
    operation: Operation,
    native: EcsTaskDefinition,
) -> ControlPlaneResult<TaskDefinition<EcsTaskDefinition>> {
    let arn = native
        .task_definition_arn()
        .ok_or_else(|| ControlPlaneError::missing_field(operation, "taskDefinitionArn"))
        .and_then(|arn| TaskDefinitionArn::new(arn).map_err(|err| malformed(operation, err)))?;
    let family = native
        .family()
        .ok_or_else(|| ControlPlaneError::missing_field(operation, "family"))
        .and_then(|family| {
            TaskDefinitionFamily::new(family).map_err(|err| malformed(operation, err))
        })?;
    let containers = native
        .container_definitions()
        .iter()
        .map(|container| container_from_native(operation, container))
        .collect::<ControlPlaneResult<Vec<_>>>()?;
    Ok(TaskDefinition::new(arn, family, containers, native))
}

fn service_from_native(operation: Operation, native: &EcsService) -> ControlPlaneResult<Service> {
    let arn = native
        .service_arn()
        .ok_or_else(|| ControlPlaneError::missing_field(operation, "serviceArn"))
        .and_then(|arn| ServiceArn::new(arn).map_err(|err| malformed(operation, err)))?;
    let status = ServiceStatus::parse(native.status().unwrap_or_default());
    let task_definition = native
        .task_definition()
        .ok_or_else(|| ControlPlaneError::missing_field(operation, "taskDefinition"))
        .and_then(|arn| TaskDefinitionArn::new(arn).map_err(|err| malformed(operation, err)))?;
    Ok(Service::new(arn, status, task_definition))
}

/// Copies the source containers, replacing each image with the draft's.
fn revised_containers(draft: &RevisionDraft<EcsTaskDefinition>) -> Vec<EcsContainerDefinition> {
    draft
        .attributes()
        .container_definitions()
        .iter()
        .zip(draft.containers())
        .map(|(native, revised)| {
            let mut container = native.clone();
            container.image = Some(revised.image().as_str().to_owned());
            container
        })
        .collect()
}

fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    (!items.is_empty()).then(|| items.to_vec())
}

/// Fills a registration request from the draft, forwarding every
/// registrable field of the described source record unchanged.
fn revision_request(
    request: RegisterTaskDefinitionFluentBuilder,
    draft: &RevisionDraft<EcsTaskDefinition>,
) -> RegisterTaskDefinitionFluentBuilder {
    let source = draft.attributes();
    request
        .family(draft.family().as_str())
        .set_task_role_arn(source.task_role_arn().map(str::to_owned))
        .set_execution_role_arn(source.execution_role_arn().map(str::to_owned))
        .set_network_mode(source.network_mode().cloned())
        .set_cpu(source.cpu().map(str::to_owned))
        .set_memory(source.memory().map(str::to_owned))
        .set_container_definitions(Some(revised_containers(draft)))
        .set_volumes(non_empty(source.volumes()))
        .set_placement_constraints(non_empty(source.placement_constraints()))
        .set_requires_compatibilities(non_empty(source.compatibilities()))
        .set_runtime_platform(source.runtime_platform().cloned())
        .set_ephemeral_storage(source.ephemeral_storage().cloned())
        .set_pid_mode(source.pid_mode().cloned())
        .set_ipc_mode(source.ipc_mode().cloned())
        .set_proxy_configuration(source.proxy_configuration().cloned())
        .set_inference_accelerators(non_empty(source.inference_accelerators()))
}

#[async_trait]
impl ControlPlane for EcsControlPlane {
    type Attributes = EcsTaskDefinition;

    async fn list_task_definition_families(
        &self,
        next_token: Option<PageToken>,
    ) -> ControlPlaneResult<Page<TaskDefinitionFamily>> {
        let operation = Operation::ListTaskDefinitionFamilies;
        let output = self
            .client
            .list_task_definition_families()
            .status(TaskDefinitionFamilyStatus::Active)
            .set_next_token(next_token.map(PageToken::into_inner))
            .send()
            .await
            .map_err(|err| classify(operation, err))?;
        let families = output
            .families()
            .iter()
            .map(|family| TaskDefinitionFamily::new(family.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| malformed(operation, err))?;
        debug!(count = families.len(), "listed task definition families");
        Ok(Page {
            items: families,
            next_token: output.next_token().map(PageToken::new),
        })
    }

    async fn describe_task_definition(
        &self,
        family: &TaskDefinitionFamily,
    ) -> ControlPlaneResult<TaskDefinition<EcsTaskDefinition>> {
        let operation = Operation::DescribeTaskDefinition;
        let output = self
            .client
            .describe_task_definition()
            .task_definition(family.as_str())
            .send()
            .await
            .map_err(|err| classify(operation, err))?;
        let native = output
            .task_definition
            .ok_or_else(|| ControlPlaneError::missing_field(operation, "taskDefinition"))?;
        task_definition_from_native(operation, native)
    }

    async fn register_task_definition(
        &self,
        draft: &RevisionDraft<EcsTaskDefinition>,
    ) -> ControlPlaneResult<TaskDefinitionArn> {
        let operation = Operation::RegisterTaskDefinition;
        let output = revision_request(self.client.register_task_definition(), draft)
            .send()
            .await
            .map_err(|err| classify(operation, err))?;
        output
            .task_definition()
            .and_then(EcsTaskDefinition::task_definition_arn)
            .ok_or_else(|| ControlPlaneError::missing_field(operation, "taskDefinition.taskDefinitionArn"))
            .and_then(|arn| TaskDefinitionArn::new(arn).map_err(|err| malformed(operation, err)))
    }

    async fn list_services(
        &self,
        cluster: &ClusterName,
        next_token: Option<PageToken>,
    ) -> ControlPlaneResult<Page<ServiceArn>> {
        let operation = Operation::ListServices;
        let output = self
            .client
            .list_services()
            .cluster(cluster.as_str())
            .set_next_token(next_token.map(PageToken::into_inner))
            .send()
            .await
            .map_err(|err| classify(operation, err))?;
        let services = output
            .service_arns()
            .iter()
            .map(|arn| ServiceArn::new(arn.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| malformed(operation, err))?;
        Ok(Page {
            items: services,
            next_token: output.next_token().map(PageToken::new),
        })
    }

    async fn describe_services(
        &self,
        cluster: &ClusterName,
        services: &[ServiceArn],
    ) -> ControlPlaneResult<Vec<Service>> {
        let operation = Operation::DescribeServices;
        let mut described = Vec::with_capacity(services.len());
        for batch in services.chunks(DESCRIBE_SERVICES_BATCH) {
            let output = self
                .client
                .describe_services()
                .cluster(cluster.as_str())
                .set_services(Some(batch.iter().map(|arn| arn.as_str().to_owned()).collect()))
                .send()
                .await
                .map_err(|err| classify(operation, err))?;
            for failure in output.failures() {
                warn!(
                    arn = failure.arn().unwrap_or_default(),
                    reason = failure.reason().unwrap_or_default(),
                    "service could not be described"
                );
            }
            for service in output.services() {
                described.push(service_from_native(operation, service)?);
            }
        }
        Ok(described)
    }

    async fn update_service(
        &self,
        cluster: &ClusterName,
        service: &ServiceArn,
        task_definition: &TaskDefinitionArn,
    ) -> ControlPlaneResult<()> {
        self.client
            .update_service()
            .cluster(cluster.as_str())
            .service(service.as_str())
            .task_definition(task_definition.as_str())
            .send()
            .await
            .map_err(|err| classify(Operation::UpdateService, err))?;
        Ok(())
    }
}
