//! Adapter implementations for the deployment ports.

pub mod aws;
pub mod memory;
