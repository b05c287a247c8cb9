//! Rendering interface shared by the GPU renderer and text dumps.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - Output derives only from scene state and the view.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "vista-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
