//! Port contracts for image-triggered deployments.
//!
//! Ports define infrastructure-agnostic interfaces used by deployment
//! services.

pub mod control_plane;
pub mod pagination;

pub use control_plane::{ControlPlane, ControlPlaneError, ControlPlaneResult, Operation};
pub use pagination::{Page, PageToken, drain, paginate};
