//! CPU-side geometry for the demo scenes.
//!
//! Everything here produces plain [`MeshData`]; uploading to the GPU is the
//! renderer's job.
//!
//! # Invariants
//! - Front faces wind counter-clockwise.
//! - Texture coordinates have v pointing up (v = 1 is the top edge).

mod extrude;
mod mesh;
mod primitives;
mod shape;
mod triangulate;

pub use extrude::{ExtrudeOptions, extrude};
pub use mesh::{Aabb, MeshData};
pub use primitives::{cuboid, plane, sphere, torus};
pub use shape::{Shape, ShapePath, SubPath, is_clockwise, signed_area};
pub use triangulate::triangulate;

/// Errors from geometry construction.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("invalid extrude options: {0}")]
    InvalidOptions(&'static str),
}
