//! wgpu render backend for vista scenes.
//!
//! Draws scene nodes instanced per geometry with one shader covering every
//! material kind. A perspective camera is driven by damped orbit controls.
//!
//! # Invariants
//! - Renderer never mutates scene state beyond draining its event log.
//! - GPU resources change only in `SceneRenderer::sync`; `render` reads.
//! - Textures that have not loaded are replaced by 1×1 fallbacks.

mod camera;
mod gpu;
mod shaders;
mod texture;

pub use camera::{OrbitControls, PerspectiveCamera};
pub use gpu::{DrawBatch, MAX_POINT_LIGHTS, SceneRenderer, collect_batches};
pub use texture::{GpuTexture, flip_rows};

use vista_scene::TextureId;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("image data does not match {width}x{height} RGBA8 ({len} bytes)")]
    ImageSize { width: u32, height: u32, len: usize },
    #[error("texture {0:?} is unknown or has no image")]
    UnknownTexture(TextureId),
}

pub fn crate_info() -> &'static str {
    "vista-render-wgpu v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_info_names_backend() {
        assert!(crate_info().contains("wgpu"));
    }
}
