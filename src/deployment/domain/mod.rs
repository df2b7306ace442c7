//! Domain model for image-triggered deployments.
//!
//! Task definitions are immutable: a deployment never edits one, it drafts
//! the next revision with rewritten container images and leaves every other
//! field as it was. Infrastructure concerns stay outside this module.

mod error;
mod event;
mod ids;
mod image;
mod mapping;
mod service;
mod task_definition;

pub use error::DeploymentDomainError;
pub use event::{
    DeploymentTarget, ImagePushEvent, PushDetail, PushResponseElements, PushedImage,
    PushedImageId,
};
pub use ids::{
    ClusterName, ClusterSuffix, DeploymentId, FamilyRef, Region, ServiceArn, TaskDefinitionArn,
    TaskDefinitionFamily, strip_revision,
};
pub use image::{ImageReference, ImageRepository, ImageTag};
pub use mapping::RevisionMapping;
pub use service::{Service, ServiceStatus};
pub use task_definition::{ContainerDefinition, ImageRewrite, RevisionDraft, TaskDefinition};
