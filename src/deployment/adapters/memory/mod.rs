//! In-memory adapters for deployment tests and local runs.

mod control_plane;

pub use control_plane::{InMemoryControlPlane, RevisionAttributes, ServiceUpdate};
