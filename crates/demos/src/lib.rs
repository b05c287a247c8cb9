//! The two demo scenes and the stage that runs them.
//!
//! A [`Demo`] builds its scene once, queues its asset loads, and animates
//! node transforms from elapsed time. The [`Stage`] owns the scene, the asset
//! loader, the clock and the debug panel, and routes everything between them.
//!
//! # Invariants
//! - Animation is a pure function of elapsed time: rotation = elapsed × constant.
//! - Random placement comes from a seeded generator and is reproducible.
//! - A failed asset load never aborts a demo; the fallback stays in place.

mod materials;
mod stage;
mod text;
mod textures;

pub use materials::MaterialsDemo;
pub use stage::Stage;
pub use text::TextDemo;
pub use textures::TextureRequests;

use vista_assets::{AssetError, AssetHandle, AssetLoader, LoadedAsset};
use vista_scene::{ParseMaterialKindError, Scene, SceneError};
use vista_tools::Tweak;

/// Names accepted by [`create`].
pub const DEMO_NAMES: [&str; 2] = ["materials", "text"];

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    MaterialKind(#[from] ParseMaterialKindError),
    #[error("unknown demo {0:?} (expected one of: materials, text)")]
    UnknownDemo(String),
    #[error("tweak {0:?} does not apply to this demo")]
    UnknownTweak(String),
}

/// A self-contained animated scene.
pub trait Demo {
    fn name(&self) -> &'static str;

    /// Populate `scene` and queue asset loads. Called once.
    fn setup(&mut self, scene: &mut Scene, loader: &mut AssetLoader) -> Result<(), DemoError>;

    /// Pose the scene for `elapsed` seconds since start.
    fn update(&mut self, scene: &mut Scene, elapsed: f32) -> Result<(), DemoError>;

    /// Tweaks to expose on the debug panel, with their initial values.
    fn tweaks(&self) -> Vec<Tweak> {
        Vec::new()
    }

    /// Apply an already clamped and snapped tweak value.
    fn apply_tweak(&mut self, _scene: &mut Scene, key: &str, _value: f32) -> Result<(), DemoError> {
        Err(DemoError::UnknownTweak(key.to_string()))
    }

    /// A load finished. Returns false if the handle is not one of ours.
    fn asset_loaded(&mut self, scene: &mut Scene, handle: AssetHandle, asset: LoadedAsset) -> Result<bool, DemoError>;

    /// A load failed; whatever was waiting on it keeps its fallback.
    fn asset_failed(&mut self, _handle: AssetHandle) {}
}

/// Build a demo by name. `material` picks the materials demo's shading
/// kind and is ignored by the text demo.
pub fn create(name: &str, material: &str, seed: u64) -> Result<Box<dyn Demo>, DemoError> {
    match name.to_ascii_lowercase().as_str() {
        "materials" => Ok(Box::new(MaterialsDemo::from_name(material)?)),
        "text" => Ok(Box::new(TextDemo::new(seed))),
        _ => Err(DemoError::UnknownDemo(name.to_string())),
    }
}

pub fn crate_info() -> &'static str {
    "vista-demos v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_by_name() {
        assert_eq!(create("materials", "standard", 0).unwrap().name(), "materials");
        assert_eq!(create("TEXT", "standard", 0).unwrap().name(), "text");
        assert!(matches!(create("shadows", "standard", 0), Err(DemoError::UnknownDemo(_))));
        assert!(matches!(
            create("materials", "glass", 0),
            Err(DemoError::MaterialKind(_))
        ));
    }

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("demos"));
    }
}
