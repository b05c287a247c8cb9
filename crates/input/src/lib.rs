//! Input mapping: raw pointer and key events become high-level actions.
//!
//! # Invariants
//! - Consumers (camera controls, panel) see actions, never raw window events.
//! - At most one pointer gesture is active at a time.

pub mod action;
mod pointer;

pub use action::{Action, ControlAction, key_action};
pub use pointer::{PointerButton, PointerState};

pub fn crate_info() -> &'static str {
    "vista-input v0.1.0"
}
