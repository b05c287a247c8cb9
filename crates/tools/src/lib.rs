//! Developer tooling: scene inspector and live-tweak debug panel model.
//!
//! # Invariants
//! - Inspection is read-only.
//! - A tweak's value always lies within its range and on its step grid.

mod inspector;
mod panel;

pub use inspector::{SceneInspector, SceneSummary};
pub use panel::{DebugPanel, Tweak};

pub fn crate_info() -> &'static str {
    "vista-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
