use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Triangle mesh with per-vertex normals and texture coordinates.
///
/// `indices` always describe a triangle list; non-indexed meshes (flat shaded
/// extrusions) carry the trivial `0..n` index sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub(crate) fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        index
    }

    /// Bounds of all positions, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Aabb { min, max })
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Move the mesh so its bounding box is centred on the origin.
    /// Returns the applied offset.
    pub fn center(&mut self) -> Vec3 {
        let Some(bounds) = self.bounding_box() else {
            return Vec3::ZERO;
        };
        let offset = -bounds.center();
        self.translate(offset);
        offset
    }

    /// Per-triangle normals written to each triangle's own vertices.
    ///
    /// Only meaningful for non-indexed meshes where no vertex is shared.
    pub fn compute_flat_normals(&mut self) {
        self.normals.resize(self.positions.len(), Vec3::ZERO);
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (pa, pb, pc) = (self.positions[a], self.positions[b], self.positions[c]);
            let normal = (pc - pb).cross(pa - pb).normalize_or_zero();
            self.normals[a] = normal;
            self.normals[b] = normal;
            self.normals[c] = normal;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        let mut mesh = MeshData::default();
        mesh.push_vertex(Vec3::new(0.0, 0.0, 0.0), Vec3::ZERO, Vec2::ZERO);
        mesh.push_vertex(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, Vec2::ZERO);
        mesh.push_vertex(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO, Vec2::ZERO);
        mesh.indices = vec![0, 1, 2];
        mesh
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(MeshData::default().bounding_box().is_none());
        assert_eq!(MeshData::default().center(), Vec3::ZERO);
    }

    #[test]
    fn center_moves_bounds_to_origin() {
        let mut mesh = triangle();
        let offset = mesh.center();
        assert_eq!(offset, Vec3::new(-1.0, -2.0, 0.0));
        let bounds = mesh.bounding_box().unwrap();
        assert!(bounds.center().abs_diff_eq(Vec3::ZERO, 1e-6));
        assert_eq!(bounds.size(), Vec3::new(2.0, 4.0, 0.0));
    }

    #[test]
    fn flat_normals_follow_counter_clockwise_winding() {
        let mut mesh = triangle();
        mesh.compute_flat_normals();
        for n in &mesh.normals {
            assert!(n.abs_diff_eq(Vec3::Z, 1e-6));
        }
    }
}
