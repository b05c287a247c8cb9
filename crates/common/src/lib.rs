//! Shared types for the vista workspace.

mod types;

pub use types::{Color, NodeId, Transform};
