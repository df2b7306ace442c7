//! ECR deployer: rolls ECS services onto freshly pushed images.
//!
//! A container registry push notification triggers one forward pass over
//! the current task definitions and services of a cluster. No rollback,
//! health gating, or canary logic lives here; the platform owns the rollout
//! once a service has been pointed at its new revision.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure deployment values with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the orchestration control plane
//! - **Adapters**: In-memory and Amazon ECS implementations of the ports
//!
//! # Modules
//!
//! - [`deployment`]: Task definition revision and service rollout
//! - [`config`]: Process configuration
//! - [`observability`]: Logging initialisation

pub mod config;
pub mod deployment;
pub mod observability;
