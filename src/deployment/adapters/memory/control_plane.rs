//! In-memory control plane for deployment tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use crate::deployment::{
    domain::{
        ClusterName, ContainerDefinition, Region, RevisionDraft, Service, ServiceArn,
        ServiceStatus, TaskDefinition, TaskDefinitionArn, TaskDefinitionFamily,
    },
    ports::{ControlPlane, ControlPlaneError, ControlPlaneResult, Operation, Page, PageToken},
};

const DEFAULT_PAGE_SIZE: usize = 100;

/// Fields the in-memory control plane copies into each new revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionAttributes {
    /// IAM role assumed by the task.
    pub task_role_arn: Option<String>,
    /// Volume declarations.
    pub volumes: Vec<String>,
    /// Placement constraint expressions.
    pub placement_constraints: Vec<String>,
    /// Launch types the definition is compatible with.
    pub compatibilities: Vec<String>,
}

/// A recorded `UpdateService` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUpdate {
    /// Cluster addressed.
    pub cluster: ClusterName,
    /// Service updated.
    pub service: ServiceArn,
    /// Revision the service was pointed at.
    pub task_definition: TaskDefinitionArn,
}

/// Thread-safe in-memory control plane.
///
/// Listings are paginated with numeric offset tokens so multi-page
/// behaviour can be exercised with a small page size.
///
/// Every access, port call or test helper, reads through a poisoned lock:
/// each mutation is a single push or assignment, so the state stays
/// consistent after a panicking holder.
#[derive(Debug, Clone)]
pub struct InMemoryControlPlane {
    region: Region,
    account: String,
    page_size: usize,
    state: Arc<RwLock<InMemoryControlPlaneState>>,
}

#[derive(Debug, Default)]
struct InMemoryControlPlaneState {
    families: BTreeMap<TaskDefinitionFamily, Vec<TaskDefinition<RevisionAttributes>>>,
    clusters: BTreeMap<ClusterName, Vec<Service>>,
    calls: Vec<Operation>,
    updates: Vec<ServiceUpdate>,
    faults: HashMap<Operation, ControlPlaneError>,
}

impl InMemoryControlPlane {
    /// Creates an empty control plane for one account and region.
    #[must_use]
    pub fn new(region: Region, account: impl Into<String>) -> Self {
        Self {
            region,
            account: account.into(),
            page_size: DEFAULT_PAGE_SIZE,
            state: Arc::default(),
        }
    }

    /// Sets the number of items returned per listing page (at least one).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Registers a revision directly, bypassing the call log.
    pub fn seed_task_definition(
        &self,
        family: &TaskDefinitionFamily,
        containers: Vec<ContainerDefinition>,
        attributes: RevisionAttributes,
    ) -> TaskDefinitionArn {
        let mut state = self.lock();
        self.push_revision(&mut state, family, containers, attributes)
    }

    /// Adds a service to a cluster, bypassing the call log.
    pub fn seed_service(
        &self,
        cluster: &ClusterName,
        name: &str,
        status: ServiceStatus,
        task_definition: TaskDefinitionArn,
    ) -> ServiceArn {
        let arn = ServiceArn::compose(&self.region, &self.account, cluster, name);
        let service = Service::new(arn.clone(), status, task_definition);
        self.lock()
            .clusters
            .entry(cluster.clone())
            .or_default()
            .push(service);
        arn
    }

    /// Makes every later call of `operation` fail with `error`.
    pub fn fail_on(&self, operation: Operation, error: ControlPlaneError) {
        self.lock().faults.insert(operation, error);
    }

    /// Returns how often `operation` was called.
    #[must_use]
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.iter().filter(|call| **call == operation).count()
    }

    /// Returns every call in order.
    #[must_use]
    pub fn call_log(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    /// Returns every `UpdateService` call in order.
    #[must_use]
    pub fn service_updates(&self) -> Vec<ServiceUpdate> {
        self.lock().updates.clone()
    }

    /// Returns all revisions of a family, oldest first.
    #[must_use]
    pub fn revisions(&self, family: &TaskDefinitionFamily) -> Vec<TaskDefinition<RevisionAttributes>> {
        self.lock().families.get(family).cloned().unwrap_or_default()
    }

    /// Returns the current state of a service.
    #[must_use]
    pub fn service(&self, cluster: &ClusterName, arn: &ServiceArn) -> Option<Service> {
        self.lock()
            .clusters
            .get(cluster)
            .and_then(|services| services.iter().find(|service| service.arn() == arn))
            .cloned()
    }

    fn lock(&self) -> RwLockWriteGuard<'_, InMemoryControlPlaneState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn push_revision(
        &self,
        state: &mut InMemoryControlPlaneState,
        family: &TaskDefinitionFamily,
        containers: Vec<ContainerDefinition>,
        attributes: RevisionAttributes,
    ) -> TaskDefinitionArn {
        let revisions = state.families.entry(family.clone()).or_default();
        let revision = u32::try_from(revisions.len()).map_or(u32::MAX, |count| count.saturating_add(1));
        let arn = TaskDefinitionArn::compose(&self.region, &self.account, family, revision);
        revisions.push(TaskDefinition::new(
            arn.clone(),
            family.clone(),
            containers,
            attributes,
        ));
        arn
    }

    /// Logs the call and returns the injected fault, if any.
    fn enter(&self, operation: Operation) -> ControlPlaneResult<RwLockWriteGuard<'_, InMemoryControlPlaneState>> {
        let mut state = self.lock();
        state.calls.push(operation);
        if let Some(fault) = state.faults.get(&operation) {
            return Err(fault.clone());
        }
        Ok(state)
    }

    fn page<T: Clone>(
        &self,
        operation: Operation,
        items: &[T],
        next_token: Option<PageToken>,
    ) -> ControlPlaneResult<Page<T>> {
        let start = match next_token {
            None => 0,
            Some(token) => token.as_str().parse::<usize>().map_err(|_| {
                ControlPlaneError::Rejected {
                    operation,
                    message: format!("invalid next token '{}'", token.as_str()),
                }
            })?,
        };
        let end = start.saturating_add(self.page_size).min(items.len());
        let slice = items.get(start..end).unwrap_or_default().to_vec();
        if end < items.len() {
            Ok(Page::with_next(slice, PageToken::new(end.to_string())))
        } else {
            Ok(Page::last(slice))
        }
    }
}

#[async_trait]
impl ControlPlane for InMemoryControlPlane {
    type Attributes = RevisionAttributes;

    async fn list_task_definition_families(
        &self,
        next_token: Option<PageToken>,
    ) -> ControlPlaneResult<Page<TaskDefinitionFamily>> {
        let operation = Operation::ListTaskDefinitionFamilies;
        let state = self.enter(operation)?;
        let families: Vec<TaskDefinitionFamily> = state.families.keys().cloned().collect();
        self.page(operation, &families, next_token)
    }

    async fn describe_task_definition(
        &self,
        family: &TaskDefinitionFamily,
    ) -> ControlPlaneResult<TaskDefinition<RevisionAttributes>> {
        let operation = Operation::DescribeTaskDefinition;
        let state = self.enter(operation)?;
        state
            .families
            .get(family)
            .and_then(|revisions| revisions.last())
            .cloned()
            .ok_or_else(|| ControlPlaneError::NotFound {
                operation,
                message: format!("task definition family {family}"),
            })
    }

    async fn register_task_definition(
        &self,
        draft: &RevisionDraft<RevisionAttributes>,
    ) -> ControlPlaneResult<TaskDefinitionArn> {
        let mut state = self.enter(Operation::RegisterTaskDefinition)?;
        Ok(self.push_revision(
            &mut state,
            draft.family(),
            draft.containers().to_vec(),
            draft.attributes().clone(),
        ))
    }

    async fn list_services(
        &self,
        cluster: &ClusterName,
        next_token: Option<PageToken>,
    ) -> ControlPlaneResult<Page<ServiceArn>> {
        let operation = Operation::ListServices;
        let state = self.enter(operation)?;
        let services = state
            .clusters
            .get(cluster)
            .ok_or_else(|| ControlPlaneError::NotFound {
                operation,
                message: format!("cluster {cluster}"),
            })?;
        let arns: Vec<ServiceArn> = services.iter().map(|service| service.arn().clone()).collect();
        self.page(operation, &arns, next_token)
    }

    async fn describe_services(
        &self,
        cluster: &ClusterName,
        services: &[ServiceArn],
    ) -> ControlPlaneResult<Vec<Service>> {
        let operation = Operation::DescribeServices;
        let state = self.enter(operation)?;
        let known = state
            .clusters
            .get(cluster)
            .ok_or_else(|| ControlPlaneError::NotFound {
                operation,
                message: format!("cluster {cluster}"),
            })?;
        Ok(services
            .iter()
            .filter_map(|arn| known.iter().find(|service| service.arn() == arn))
            .cloned()
            .collect())
    }

    async fn update_service(
        &self,
        cluster: &ClusterName,
        service: &ServiceArn,
        task_definition: &TaskDefinitionArn,
    ) -> ControlPlaneResult<()> {
        let operation = Operation::UpdateService;
        let mut state = self.enter(operation)?;
        let target = state
            .clusters
            .get_mut(cluster)
            .and_then(|services| services.iter_mut().find(|candidate| candidate.arn() == service))
            .ok_or_else(|| ControlPlaneError::NotFound {
                operation,
                message: format!("service {service} in cluster {cluster}"),
            })?;
        *target = Service::new(
            service.clone(),
            target.status().clone(),
            task_definition.clone(),
        );
        state.updates.push(ServiceUpdate {
            cluster: cluster.clone(),
            service: service.clone(),
            task_definition: task_definition.clone(),
        });
        Ok(())
    }
}
