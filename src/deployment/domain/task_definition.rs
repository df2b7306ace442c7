//! Task definition records and the revision drafts derived from them.

use super::{FamilyRef, ImageReference, ImageRepository, ImageTag, TaskDefinitionArn, TaskDefinitionFamily};
use serde::{Deserialize, Serialize};

/// One container of a task definition.
///
/// Only the image is visible to the deployer; every other container setting
/// travels inside the owning definition's attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDefinition {
    name: String,
    image: ImageReference,
}

impl ContainerDefinition {
    /// Creates a container record.
    #[must_use]
    pub fn new(name: impl Into<String>, image: ImageReference) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    /// Returns the container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current image reference.
    #[must_use]
    pub const fn image(&self) -> &ImageReference {
        &self.image
    }
}

/// Immutable, revisioned task definition as described by the control plane.
///
/// `A` holds the fields the deployer never inspects (role reference,
/// volumes, placement constraints, compatibility modes, non-image container
/// settings). They are cloned into the next revision untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinition<A> {
    arn: TaskDefinitionArn,
    family: TaskDefinitionFamily,
    containers: Vec<ContainerDefinition>,
    attributes: A,
}

impl<A: Clone> TaskDefinition<A> {
    /// Creates a task definition record.
    #[must_use]
    pub const fn new(
        arn: TaskDefinitionArn,
        family: TaskDefinitionFamily,
        containers: Vec<ContainerDefinition>,
        attributes: A,
    ) -> Self {
        Self {
            arn,
            family,
            containers,
            attributes,
        }
    }

    /// Returns the revisioned reference.
    #[must_use]
    pub const fn arn(&self) -> &TaskDefinitionArn {
        &self.arn
    }

    /// Returns the reference with its revision stripped.
    #[must_use]
    pub fn family_ref(&self) -> FamilyRef {
        self.arn.family_ref()
    }

    /// Returns the family name.
    #[must_use]
    pub const fn family(&self) -> &TaskDefinitionFamily {
        &self.family
    }

    /// Returns the containers in definition order.
    #[must_use]
    pub fn containers(&self) -> &[ContainerDefinition] {
        &self.containers
    }

    /// Returns the pass-through attributes.
    #[must_use]
    pub const fn attributes(&self) -> &A {
        &self.attributes
    }

    /// Returns `true` when at least one container runs `repository:...tag`.
    #[must_use]
    pub fn references_push(&self, repository: &ImageRepository, tag: &ImageTag) -> bool {
        self.containers
            .iter()
            .any(|container| container.image.matches_push(repository, tag))
    }

    /// Drafts the next revision, pointing every container of `repository`
    /// at `repository:tag`.
    ///
    /// Containers of other repositories keep their image.
    #[must_use]
    pub fn retag(&self, repository: &ImageRepository, tag: &ImageTag) -> RevisionDraft<A> {
        let target = ImageReference::tagged(repository, tag);
        let mut rewrites = Vec::new();
        let containers = self
            .containers
            .iter()
            .map(|container| {
                if !container.image.belongs_to(repository) {
                    return container.clone();
                }
                rewrites.push(ImageRewrite {
                    container: container.name.clone(),
                    from: container.image.clone(),
                    to: target.clone(),
                });
                ContainerDefinition::new(container.name.clone(), target.clone())
            })
            .collect();

        RevisionDraft {
            source: self.arn.clone(),
            family: self.family.clone(),
            containers,
            attributes: self.attributes.clone(),
            rewrites,
        }
    }
}

/// A single container image change made while drafting a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRewrite {
    /// Container name.
    pub container: String,
    /// Image before the rewrite.
    pub from: ImageReference,
    /// Image after the rewrite.
    pub to: ImageReference,
}

/// Next revision of a task definition, ready for registration.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionDraft<A> {
    source: TaskDefinitionArn,
    family: TaskDefinitionFamily,
    containers: Vec<ContainerDefinition>,
    attributes: A,
    rewrites: Vec<ImageRewrite>,
}

impl<A> RevisionDraft<A> {
    /// Returns the revision this draft was derived from.
    #[must_use]
    pub const fn source(&self) -> &TaskDefinitionArn {
        &self.source
    }

    /// Returns the family the revision is registered under.
    #[must_use]
    pub const fn family(&self) -> &TaskDefinitionFamily {
        &self.family
    }

    /// Returns the containers, in the source's order.
    #[must_use]
    pub fn containers(&self) -> &[ContainerDefinition] {
        &self.containers
    }

    /// Returns the attributes copied from the source revision.
    #[must_use]
    pub const fn attributes(&self) -> &A {
        &self.attributes
    }

    /// Returns the image changes relative to the source.
    #[must_use]
    pub fn rewrites(&self) -> &[ImageRewrite] {
        &self.rewrites
    }
}
