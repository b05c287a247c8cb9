//! Primitive mesh generators.

use crate::mesh::MeshData;
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// UV sphere. Pole rows skip their degenerate triangles and shift their uv
/// by half a segment so the texture seam stays symmetric.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut mesh = MeshData::default();
    let mut grid = Vec::with_capacity(height_segments as usize + 1);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };

        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (phi, theta) = (u * TAU, v * PI);
            let position = Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );
            let normal = position.normalize_or_zero();
            row.push(mesh.push_vertex(position, normal, Vec2::new(u + u_offset, 1.0 - v)));
        }
        grid.push(row);
    }

    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                mesh.indices.extend([a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                mesh.indices.extend([b, c, d]);
            }
        }
    }
    mesh
}

/// Single quad in the XY plane facing +Z.
pub fn plane(width: f32, height: f32) -> MeshData {
    let mut mesh = MeshData::default();
    build_face(&mut mesh, [0, 1, 2], [1.0, -1.0], [width, height, 0.0], 1.0);
    mesh
}

/// Axis-aligned box centred on the origin, one quad per face.
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let mut mesh = MeshData::default();
    #[rustfmt::skip]
    let faces: [([usize; 3], [f32; 2], [f32; 3], f32); 6] = [
        // +X
        ([2, 1, 0], [-1.0, -1.0], [depth, height, width], 1.0),
        // -X
        ([2, 1, 0], [ 1.0, -1.0], [depth, height, width], -1.0),
        // +Y
        ([0, 2, 1], [ 1.0,  1.0], [width, depth, height], 1.0),
        // -Y
        ([0, 2, 1], [ 1.0, -1.0], [width, depth, height], -1.0),
        // +Z
        ([0, 1, 2], [ 1.0, -1.0], [width, height, depth], 1.0),
        // -Z
        ([0, 1, 2], [-1.0, -1.0], [width, height, depth], -1.0),
    ];
    for (axes, dirs, dims, facing) in faces {
        build_face(&mut mesh, axes, dirs, dims, facing);
    }
    mesh
}

/// Emit one quad. `axes` maps (u, v, w) onto x/y/z, `dirs` flips u and v,
/// `dims` is (u extent, v extent, w extent) and `facing` picks the +w or -w side.
fn build_face(mesh: &mut MeshData, axes: [usize; 3], dirs: [f32; 2], dims: [f32; 3], facing: f32) {
    let [u_axis, v_axis, w_axis] = axes;
    let [width, height, depth] = dims;
    let base = mesh.vertex_count() as u32;

    for iy in 0..=1u32 {
        let y = iy as f32 * height - height * 0.5;
        for ix in 0..=1u32 {
            let x = ix as f32 * width - width * 0.5;
            let mut position = [0.0f32; 3];
            position[u_axis] = x * dirs[0];
            position[v_axis] = y * dirs[1];
            position[w_axis] = depth * 0.5 * facing;
            let mut normal = [0.0f32; 3];
            normal[w_axis] = facing;
            mesh.push_vertex(
                Vec3::from_array(position),
                Vec3::from_array(normal),
                Vec2::new(ix as f32, 1.0 - iy as f32),
            );
        }
    }

    let (a, b, c, d) = (base, base + 2, base + 3, base + 1);
    mesh.indices.extend([a, b, d, b, c, d]);
}

/// Torus around the Z axis: `radius` to the tube centre, `tube` is the tube radius.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);
    let mut mesh = MeshData::default();

    for j in 0..=radial_segments {
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let v = j as f32 / radial_segments as f32 * TAU;
            let ring = radius + tube * v.cos();
            let position = Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            mesh.push_vertex(
                position,
                (position - center).normalize_or_zero(),
                Vec2::new(
                    i as f32 / tubular_segments as f32,
                    j as f32 / radial_segments as f32,
                ),
            );
        }
    }

    let stride = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            mesh.indices.extend([a, b, d, b, c, d]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every triangle's geometric normal should agree with its vertex normals.
    fn assert_outward_winding(mesh: &MeshData) {
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = (mesh.positions[b] - mesh.positions[a])
                .cross(mesh.positions[c] - mesh.positions[a]);
            if face.length_squared() < 1e-12 {
                continue;
            }
            let avg = mesh.normals[a] + mesh.normals[b] + mesh.normals[c];
            assert!(face.dot(avg) > 0.0, "triangle {tri:?} winds inward");
        }
    }

    #[test]
    fn sphere_counts_and_radius() {
        let mesh = sphere(0.5, 16, 16);
        assert_eq!(mesh.vertex_count(), 17 * 17);
        // Two triangles per cell minus one per cell on each pole row.
        assert_eq!(mesh.triangle_count(), 16 * 16 * 2 - 16 * 2);
        for p in &mesh.positions {
            assert!((p.length() - 0.5).abs() < 1e-5);
        }
        assert_outward_winding(&mesh);
    }

    #[test]
    fn plane_is_unit_quad_facing_z() {
        let mesh = plane(1.0, 1.0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices.len(), 6);
        let bounds = mesh.bounding_box().unwrap();
        assert_eq!(bounds.min, Vec3::new(-0.5, -0.5, 0.0));
        assert_eq!(bounds.max, Vec3::new(0.5, 0.5, 0.0));
        assert_outward_winding(&mesh);
        // Top-left corner maps to the top-left of the texture.
        assert_eq!(mesh.positions[0], Vec3::new(-0.5, 0.5, 0.0));
        assert_eq!(mesh.uvs[0], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn cuboid_has_six_faces() {
        let mesh = cuboid(0.5, 0.5, 0.5);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.indices.len(), 36);
        let bounds = mesh.bounding_box().unwrap();
        assert!(bounds.size().abs_diff_eq(Vec3::splat(0.5), 1e-6));
        assert_outward_winding(&mesh);
    }

    #[test]
    fn torus_counts_and_extent() {
        let mesh = torus(0.3, 0.2, 20, 45);
        assert_eq!(mesh.vertex_count(), 21 * 46);
        assert_eq!(mesh.triangle_count(), 20 * 45 * 2);
        let bounds = mesh.bounding_box().unwrap();
        assert!((bounds.max.x - 0.5).abs() < 1e-5);
        assert!((bounds.max.z - 0.2).abs() < 1e-3);
        assert_outward_winding(&mesh);
    }
}
