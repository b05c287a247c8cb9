//! Ear-clipping triangulation of a polygon with holes.
//!
//! Holes are merged into the outer ring through bridge edges (rightmost hole
//! vertex first), then ears are clipped from the single resulting ring.

use glam::Vec2;

const EPSILON: f32 = 1e-9;

/// Triangulate `contour` with `holes`.
///
/// Returned indices address the concatenation `contour ++ holes[0] ++ …` and
/// every triangle winds counter-clockwise regardless of input orientation.
/// Contours are expected without a repeated closing point.
pub fn triangulate(contour: &[Vec2], holes: &[Vec<Vec2>]) -> Vec<[u32; 3]> {
    if contour.len() < 3 {
        return Vec::new();
    }

    let mut points: Vec<Vec2> = contour.to_vec();
    let mut ring: Vec<usize> = (0..contour.len()).collect();
    if crate::shape::signed_area(contour) < 0.0 {
        ring.reverse();
    }

    let mut hole_rings: Vec<Vec<usize>> = Vec::with_capacity(holes.len());
    for hole in holes {
        let start = points.len();
        points.extend_from_slice(hole);
        if hole.len() < 3 {
            continue;
        }
        let mut hole_ring: Vec<usize> = (start..start + hole.len()).collect();
        if crate::shape::signed_area(hole) > 0.0 {
            hole_ring.reverse();
        }
        hole_rings.push(hole_ring);
    }

    // Bridge holes from right to left so earlier bridges never cross later ones.
    hole_rings.sort_by(|a, b| max_x(&points, b).total_cmp(&max_x(&points, a)));
    for hole in hole_rings {
        ring = merge_hole(&points, ring, &hole);
    }

    clip_ears(&points, ring)
}

fn max_x(points: &[Vec2], ring: &[usize]) -> f32 {
    ring.iter()
        .map(|&i| points[i].x)
        .fold(f32::NEG_INFINITY, f32::max)
}

fn merge_hole(points: &[Vec2], ring: Vec<usize>, hole: &[usize]) -> Vec<usize> {
    let Some(m_pos) = (0..hole.len()).max_by(|&a, &b| points[hole[a]].x.total_cmp(&points[hole[b]].x))
    else {
        return ring;
    };
    let m = points[hole[m_pos]];
    let bridge = find_bridge(points, &ring, m);

    let mut merged = Vec::with_capacity(ring.len() + hole.len() + 2);
    merged.extend_from_slice(&ring[..=bridge]);
    for k in 0..hole.len() {
        merged.push(hole[(m_pos + k) % hole.len()]);
    }
    merged.push(hole[m_pos]);
    merged.push(ring[bridge]);
    merged.extend_from_slice(&ring[bridge + 1..]);
    merged
}

/// Position in `ring` of a vertex visible from `m` (a hole's rightmost point).
fn find_bridge(points: &[Vec2], ring: &[usize], m: Vec2) -> usize {
    let n = ring.len();
    let mut best_x = f32::INFINITY;
    let mut candidate = None;

    for i in 0..n {
        let (a, b) = (points[ring[i]], points[ring[(i + 1) % n]]);
        if (a.y - b.y).abs() < EPSILON {
            continue;
        }
        let crosses = (a.y <= m.y && m.y <= b.y) || (b.y <= m.y && m.y <= a.y);
        if !crosses {
            continue;
        }
        let x = a.x + (m.y - a.y) * (b.x - a.x) / (b.y - a.y);
        if x >= m.x && x < best_x {
            best_x = x;
            candidate = Some(if a.x >= b.x { i } else { (i + 1) % n });
        }
    }

    let Some(candidate) = candidate else {
        // No edge to the right; fall back to the closest ring vertex.
        return (0..n)
            .min_by(|&a, &b| {
                points[ring[a]]
                    .distance_squared(m)
                    .total_cmp(&points[ring[b]].distance_squared(m))
            })
            .unwrap_or(0);
    };

    let hit = Vec2::new(best_x, m.y);
    let p = points[ring[candidate]];
    if p.abs_diff_eq(hit, EPSILON) {
        return candidate;
    }

    // A vertex inside triangle (m, hit, p) may block the view of p; the one
    // with the smallest angle to the ray is visible.
    let mut chosen = candidate;
    let mut best_tan = ((p.y - m.y) / (p.x - m.x)).abs();
    for i in 0..n {
        let v = points[ring[i]];
        if i == candidate || v.x < m.x || !point_in_triangle(v, m, hit, p) {
            continue;
        }
        let dx = v.x - m.x;
        if dx.abs() < EPSILON {
            continue;
        }
        let tan = ((v.y - m.y) / dx).abs();
        let closer = v.distance_squared(m) < points[ring[chosen]].distance_squared(m);
        if tan < best_tan || ((tan - best_tan).abs() < EPSILON && closer) {
            chosen = i;
            best_tan = tan;
        }
    }
    chosen
}

fn cross(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - b)
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    let has_neg = d1 < -EPSILON || d2 < -EPSILON || d3 < -EPSILON;
    let has_pos = d1 > EPSILON || d2 > EPSILON || d3 > EPSILON;
    !(has_neg && has_pos)
}

fn clip_ears(points: &[Vec2], mut ring: Vec<usize>) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));

    while ring.len() > 3 {
        let n = ring.len();
        let mut clipped = false;
        let mut fallback: Option<(usize, f32)> = None;

        for i in 0..n {
            let (ip, iv, inx) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            let (a, b, c) = (points[ip], points[iv], points[inx]);
            let turn = cross(a, b, c);

            if turn.abs() <= EPSILON {
                // Collinear: drop the middle vertex without emitting a triangle.
                ring.remove(i);
                clipped = true;
                break;
            }
            if turn < 0.0 {
                continue;
            }
            if fallback.is_none_or(|(_, best)| turn > best) {
                fallback = Some((i, turn));
            }

            let blocked = ring.iter().any(|&other| {
                let q = points[other];
                !(q.abs_diff_eq(a, EPSILON) || q.abs_diff_eq(b, EPSILON) || q.abs_diff_eq(c, EPSILON))
                    && point_in_triangle(q, a, b, c)
            });
            if !blocked {
                triangles.push([ip as u32, iv as u32, inx as u32]);
                ring.remove(i);
                clipped = true;
                break;
            }
        }

        if !clipped {
            let Some((i, _)) = fallback else {
                tracing::debug!(remaining = ring.len(), "triangulation stalled on a non-simple ring");
                break;
            };
            let n = ring.len();
            triangles.push([
                ring[(i + n - 1) % n] as u32,
                ring[i] as u32,
                ring[(i + 1) % n] as u32,
            ]);
            ring.remove(i);
        }
    }

    if ring.len() == 3 && cross(points[ring[0]], points[ring[1]], points[ring[2]]) > EPSILON {
        triangles.push([ring[0] as u32, ring[1] as u32, ring[2] as u32]);
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(points: &[Vec2], tris: &[[u32; 3]]) -> f32 {
        tris.iter()
            .map(|t| {
                let (a, b, c) = (points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]);
                (b - a).perp_dot(c - a) * 0.5
            })
            .sum()
    }

    fn square(min: f32, max: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(min, min),
            Vec2::new(max, min),
            Vec2::new(max, max),
            Vec2::new(min, max),
        ]
    }

    #[test]
    fn degenerate_input_yields_nothing() {
        assert!(triangulate(&[Vec2::ZERO, Vec2::X], &[]).is_empty());
    }

    #[test]
    fn convex_quad() {
        let quad = square(0.0, 1.0);
        let tris = triangulate(&quad, &[]);
        assert_eq!(tris.len(), 2);
        assert!((area(&quad, &tris) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn clockwise_input_still_yields_ccw_triangles() {
        let mut quad = square(0.0, 2.0);
        quad.reverse();
        let tris = triangulate(&quad, &[]);
        for t in &tris {
            let (a, b, c) = (quad[t[0] as usize], quad[t[1] as usize], quad[t[2] as usize]);
            assert!((b - a).perp_dot(c - a) > 0.0);
        }
        assert!((area(&quad, &tris) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn concave_l_shape() {
        let l = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        let tris = triangulate(&l, &[]);
        assert_eq!(tris.len(), 4);
        assert!((area(&l, &tris) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn square_with_hole() {
        let outer = square(0.0, 4.0);
        let hole = square(1.0, 3.0);
        let tris = triangulate(&outer, &[hole.clone()]);
        let mut all = outer.clone();
        all.extend(hole);
        assert_eq!(tris.len(), 8);
        assert!((area(&all, &tris) - 12.0).abs() < 1e-4);
        for t in &tris {
            assert!(t.iter().all(|&i| (i as usize) < all.len()));
        }
    }

    #[test]
    fn two_holes() {
        let outer = square(0.0, 10.0);
        let holes = vec![square(1.0, 3.0), square(6.0, 8.0)];
        let tris = triangulate(&outer, &holes);
        let mut all = outer.clone();
        for h in &holes {
            all.extend(h.iter().copied());
        }
        assert!((area(&all, &tris) - (100.0 - 4.0 - 4.0)).abs() < 1e-3);
    }
}
