//! Amazon ECS adapters.

mod control_plane;
mod errors;

pub use control_plane::EcsControlPlane;
