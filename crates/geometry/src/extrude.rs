//! Extrusion of flat shapes into solid, optionally bevelled meshes.

use crate::GeometryError;
use crate::mesh::MeshData;
use crate::shape::{Shape, is_clockwise};
use crate::triangulate::triangulate;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Extrusion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrudeOptions {
    /// Distance along +Z between the two lids (before bevel).
    pub depth: f32,
    /// Subdivisions of the straight wall.
    pub steps: u32,
    pub bevel_enabled: bool,
    /// How far the bevel reaches beyond each lid along Z.
    pub bevel_thickness: f32,
    /// How far the bevel reaches outward from the outline.
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
    /// Points per curve when flattening outlines.
    pub curve_segments: u32,
}

impl Default for ExtrudeOptions {
    fn default() -> Self {
        Self {
            depth: 1.0,
            steps: 1,
            bevel_enabled: true,
            bevel_thickness: 0.2,
            bevel_size: 0.1,
            bevel_offset: 0.0,
            bevel_segments: 3,
            curve_segments: 12,
        }
    }
}

/// Extrude every shape and merge the results into one flat-shaded mesh.
pub fn extrude(shapes: &[Shape], options: &ExtrudeOptions) -> Result<MeshData, GeometryError> {
    if options.steps == 0 {
        return Err(GeometryError::InvalidOptions("steps must be at least 1"));
    }
    if options.curve_segments == 0 {
        return Err(GeometryError::InvalidOptions("curve_segments must be at least 1"));
    }
    if !options.depth.is_finite() || options.depth < 0.0 {
        return Err(GeometryError::InvalidOptions("depth must be finite and non-negative"));
    }

    let mut mesh = MeshData::default();
    for shape in shapes {
        extrude_shape(&mut mesh, shape, options);
    }
    mesh.compute_flat_normals();
    Ok(mesh)
}

fn extrude_shape(mesh: &mut MeshData, shape: &Shape, options: &ExtrudeOptions) {
    let (mut contour, mut holes) = shape.extract_points(options.curve_segments);
    if contour.len() < 3 {
        return;
    }
    // Outline clockwise, holes counter-clockwise.
    if !is_clockwise(&contour) {
        contour.reverse();
    }
    holes.retain(|h| h.len() >= 3);
    for hole in &mut holes {
        if is_clockwise(hole) {
            hole.reverse();
        }
    }

    let faces = triangulate(&contour, &holes);

    let (bevel_segments, bevel_thickness, bevel_size, bevel_offset) = if options.bevel_enabled {
        (
            options.bevel_segments,
            options.bevel_thickness,
            options.bevel_size,
            options.bevel_offset,
        )
    } else {
        (0, 0.0, 0.0, 0.0)
    };

    let mut flat: Vec<Vec2> = contour.clone();
    let mut movements: Vec<Vec2> = bevel_movements(&contour);
    for hole in &holes {
        flat.extend_from_slice(hole);
        movements.extend(bevel_movements(hole));
    }
    let vlen = flat.len();
    let steps = options.steps;

    // Layered vertex rings: front bevel, straight wall, back bevel.
    let mut layers: Vec<Vec3> = Vec::with_capacity(vlen * (steps + 2 * bevel_segments + 1) as usize);
    let mut push_layer = |bevel: f32, z: f32| {
        for (p, m) in flat.iter().zip(&movements) {
            let v = *p + *m * bevel;
            layers.push(Vec3::new(v.x, v.y, z));
        }
    };

    for b in 0..bevel_segments {
        let t = b as f32 / bevel_segments as f32;
        let z = bevel_thickness * (t * FRAC_PI_2).cos();
        let bs = bevel_size * (t * FRAC_PI_2).sin() + bevel_offset;
        push_layer(bs, -z);
    }
    let bs = bevel_size + bevel_offset;
    for s in 0..=steps {
        push_layer(bs, options.depth / steps as f32 * s as f32);
    }
    for b in (0..bevel_segments).rev() {
        let t = b as f32 / bevel_segments as f32;
        let z = bevel_thickness * (t * FRAC_PI_2).cos();
        let bs = bevel_size * (t * FRAC_PI_2).sin() + bevel_offset;
        push_layer(bs, options.depth + z);
    }

    // Lids.
    let top_offset = vlen * (steps + bevel_segments * 2) as usize;
    for &face in &faces {
        let [a, b, c] = face.map(|i| i as usize);
        push_lid(mesh, &layers, [c, b, a]);
        push_lid(mesh, &layers, [a + top_offset, b + top_offset, c + top_offset]);
    }

    // Side walls.
    let wall_layers = (steps + bevel_segments * 2) as usize;
    let mut ring_offset = 0;
    let mut rings: Vec<usize> = vec![contour.len()];
    rings.extend(holes.iter().map(Vec::len));
    for ring_len in rings {
        for i in 0..ring_len {
            let j = i;
            let k = if i == 0 { ring_len - 1 } else { i - 1 };
            for s in 0..wall_layers {
                let lower = vlen * s;
                let upper = vlen * (s + 1);
                let a = ring_offset + j + lower;
                let b = ring_offset + k + lower;
                let c = ring_offset + k + upper;
                let d = ring_offset + j + upper;
                push_wall(mesh, &layers, [a, b, c, d]);
            }
        }
        ring_offset += ring_len;
    }
}

fn push_lid(mesh: &mut MeshData, layers: &[Vec3], tri: [usize; 3]) {
    for i in tri {
        let p = layers[i];
        let index = mesh.push_vertex(p, Vec3::ZERO, Vec2::new(p.x, p.y));
        mesh.indices.push(index);
    }
}

fn push_wall(mesh: &mut MeshData, layers: &[Vec3], quad: [usize; 4]) {
    let [a, b, c, d] = quad.map(|i| layers[i]);
    let uvs = if (a.y - b.y).abs() < (a.x - b.x).abs() {
        [a, b, c, d].map(|p| Vec2::new(p.x, 1.0 - p.z))
    } else {
        [a, b, c, d].map(|p| Vec2::new(p.y, 1.0 - p.z))
    };
    for (p, uv) in [(a, uvs[0]), (b, uvs[1]), (d, uvs[3]), (b, uvs[1]), (c, uvs[2]), (d, uvs[3])] {
        let index = mesh.push_vertex(p, Vec3::ZERO, uv);
        mesh.indices.push(index);
    }
}

fn bevel_movements(ring: &[Vec2]) -> Vec<Vec2> {
    let n = ring.len();
    (0..n)
        .map(|i| bevel_vector(ring[i], ring[(i + n - 1) % n], ring[(i + 1) % n]))
        .collect()
}

/// Direction (not unit length) in which a ring vertex moves when the outline
/// is grown by one unit, so that both adjacent edges shift by the same amount.
fn bevel_vector(point: Vec2, prev: Vec2, next: Vec2) -> Vec2 {
    let v_prev = point - prev;
    let v_next = next - point;
    let prev_len_sq = v_prev.length_squared();
    let collinear = v_prev.perp_dot(v_next);

    let (shift, shrink_by) = if collinear.abs() > f32::EPSILON {
        let prev_len = prev_len_sq.sqrt();
        let next_len = v_next.length();
        let prev_shift = Vec2::new(prev.x - v_prev.y / prev_len, prev.y + v_prev.x / prev_len);
        let next_shift = Vec2::new(next.x - v_next.y / next_len, next.y + v_next.x / next_len);
        let sf = ((next_shift.x - prev_shift.x) * v_next.y - (next_shift.y - prev_shift.y) * v_next.x)
            / (v_prev.x * v_next.y - v_prev.y * v_next.x);
        let shift = prev_shift + v_prev * sf - point;
        let shift_len_sq = shift.length_squared();
        if shift_len_sq <= 2.0 {
            return shift;
        }
        (shift, (shift_len_sq / 2.0).sqrt())
    } else {
        let same_direction = if v_prev.x > f32::EPSILON {
            v_next.x > f32::EPSILON
        } else if v_prev.x < -f32::EPSILON {
            v_next.x < -f32::EPSILON
        } else {
            v_prev.y.signum() == v_next.y.signum()
        };
        if same_direction {
            (Vec2::new(-v_prev.y, v_prev.x), prev_len_sq.sqrt())
        } else {
            (v_prev, (prev_len_sq / 2.0).sqrt())
        }
    };
    shift / shrink_by
}
