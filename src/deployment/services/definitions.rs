//! Locating task definitions that run a pushed image and revising them.

use std::sync::Arc;
use tracing::{debug, info};

use crate::deployment::{
    domain::{ImageRepository, ImageTag, RevisionMapping, TaskDefinition, TaskDefinitionArn},
    ports::{ControlPlane, ControlPlaneResult, drain, paginate},
};

/// Finds and revises task definitions for a pushed image.
#[derive(Clone)]
pub struct DefinitionService<P>
where
    P: ControlPlane,
{
    control_plane: Arc<P>,
}

impl<P> DefinitionService<P>
where
    P: ControlPlane,
{
    /// Creates a definition service.
    #[must_use]
    pub const fn new(control_plane: Arc<P>) -> Self {
        Self { control_plane }
    }

    /// Returns the latest revision of every family with at least one
    /// container on `repository` ending in `:tag`.
    ///
    /// Families are gathered from every listing page before any of them is
    /// described.
    ///
    /// # Errors
    ///
    /// Returns the first failed listing or describe call.
    pub async fn locate(
        &self,
        repository: &ImageRepository,
        tag: &ImageTag,
    ) -> ControlPlaneResult<Vec<TaskDefinition<P::Attributes>>> {
        let control_plane = &self.control_plane;
        let families =
            drain(paginate(move |token| control_plane.list_task_definition_families(token))).await?;
        debug!(count = families.len(), "collected task definition families");

        let mut located = Vec::new();
        for family in &families {
            let definition = control_plane.describe_task_definition(family).await?;
            if definition.references_push(repository, tag) {
                located.push(definition);
            } else {
                debug!(%family, "family does not run the pushed image");
            }
        }
        Ok(located)
    }

    /// Registers the next revision of `definition` with every container of
    /// `repository` pointed at `repository:tag`, and records it in `mapping`.
    ///
    /// # Errors
    ///
    /// Returns the registration failure; `mapping` is left unchanged.
    pub async fn revise(
        &self,
        definition: &TaskDefinition<P::Attributes>,
        repository: &ImageRepository,
        tag: &ImageTag,
        mapping: &mut RevisionMapping,
    ) -> ControlPlaneResult<TaskDefinitionArn> {
        info!(family = %definition.family(), "updating task definition");
        let draft = definition.retag(repository, tag);
        for rewrite in draft.rewrites() {
            info!(
                container = %rewrite.container,
                from = %rewrite.from,
                to = %rewrite.to,
                "updating container definition image"
            );
        }

        let revision = self.control_plane.register_task_definition(&draft).await?;
        info!(source = %definition.arn(), %revision, "registered task definition revision");
        mapping.record(definition.arn(), revision.clone());
        Ok(revision)
    }
}
