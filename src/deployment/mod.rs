//! Image-triggered task definition and service updates.
//!
//! A registry push names a repository and a tag. Every task definition
//! family whose latest revision already runs that tag gets a fresh revision
//! (all containers of the repository pinned to `repository:tag`), and every
//! active service of the `{tag}-{suffix}` cluster that runs one of the old
//! revisions is pointed at its replacement. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
