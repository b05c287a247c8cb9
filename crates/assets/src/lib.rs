//! Asset loading for the demo scenes: images, typeface fonts and text geometry.
//!
//! Assets are requested with web-style paths (`/textures/door/color.jpg`) that
//! resolve against an asset root directory. Decoding happens on background
//! threads; the owner of the [`AssetLoader`] polls for results once per frame.
//!
//! # Invariants
//! - Loaded images are always tightly packed RGBA8.
//! - Loaded assets are immutable and shared through `Arc`.

mod font;
mod loader;
mod texture;

pub use font::{Font, TextOptions, text_geometry};
pub use loader::{AssetHandle, AssetLoader, LoadResult, LoadedAsset};
pub use texture::{FilterMode, ImageData, TextureOptions};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed outline for glyph {glyph:?}: {reason}")]
    Outline { glyph: char, reason: String },
    #[error("geometry error: {0}")]
    Geometry(#[from] vista_geometry::GeometryError),
    #[error("asset loader disconnected")]
    Disconnected,
}

pub fn crate_info() -> &'static str {
    "vista-assets v0.1.0"
}
