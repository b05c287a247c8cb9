//! Scene state for the demos: nodes, shared geometry, materials, textures and lights.
//!
//! The scene owns the truth; the GPU renderer derives its buffers from it by
//! draining [`SceneEvent`]s and reading node transforms every frame.
//!
//! # Invariants
//! - Node, geometry, material and texture ids come from one counter, so
//!   iteration follows creation order.
//! - Every structural mutation appends an event; transform updates do not.
//! - Stored transforms are always finite.

mod clock;
mod light;
mod material;
mod scene;

pub use clock::Clock;
pub use light::Light;
pub use material::{Material, MaterialKind, ParseMaterialKindError};
pub use scene::{GeometryId, MaterialId, Node, Scene, SceneError, SceneEvent, TextureId, TextureSlot};

pub fn crate_info() -> &'static str {
    "vista-scene v0.1.0"
}
