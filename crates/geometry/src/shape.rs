//! 2D outlines built from line and Bézier segments.

use glam::Vec2;

/// Number of subdivisions used when only the winding of a path matters.
const CLASSIFY_DIVISIONS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    Line(Vec2),
    Quadratic { control: Vec2, end: Vec2 },
    Cubic { c1: Vec2, c2: Vec2, end: Vec2 },
}

/// One closed contour: a start point followed by segments.
#[derive(Debug, Clone, PartialEq)]
pub struct SubPath {
    start: Vec2,
    segments: Vec<Segment>,
}

impl SubPath {
    fn new(start: Vec2) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    /// Flatten into points. Lines contribute their end point; curves are
    /// sampled at `divisions` evenly spaced parameters. Consecutive duplicates
    /// and a closing point equal to the start are dropped.
    pub fn points(&self, divisions: u32) -> Vec<Vec2> {
        let divisions = divisions.max(1);
        let mut points = vec![self.start];
        let mut cursor = self.start;
        let push = |points: &mut Vec<Vec2>, p: Vec2| {
            if points.last().is_none_or(|last| !last.abs_diff_eq(p, f32::EPSILON)) {
                points.push(p);
            }
        };

        for segment in &self.segments {
            match *segment {
                Segment::Line(end) => {
                    push(&mut points, end);
                    cursor = end;
                }
                Segment::Quadratic { control, end } => {
                    for step in 1..=divisions {
                        let t = step as f32 / divisions as f32;
                        push(&mut points, quadratic(cursor, control, end, t));
                    }
                    cursor = end;
                }
                Segment::Cubic { c1, c2, end } => {
                    for step in 1..=divisions {
                        let t = step as f32 / divisions as f32;
                        push(&mut points, cubic(cursor, c1, c2, end, t));
                    }
                    cursor = end;
                }
            }
        }

        if points.len() > 1 && points[0].abs_diff_eq(points[points.len() - 1], f32::EPSILON) {
            points.pop();
        }
        points
    }
}

fn quadratic(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k) + p1 * (2.0 * k * t) + p2 * (t * t)
}

fn cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k * k) + p1 * (3.0 * k * k * t) + p2 * (3.0 * k * t * t) + p3 * (t * t * t)
}

/// A filled outline with optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub outline: SubPath,
    pub holes: Vec<SubPath>,
}

impl Shape {
    /// Flattened outline and holes.
    pub fn extract_points(&self, divisions: u32) -> (Vec<Vec2>, Vec<Vec<Vec2>>) {
        let outline = self.outline.points(divisions);
        let holes = self.holes.iter().map(|h| h.points(divisions)).collect();
        (outline, holes)
    }
}

/// Pen-style path builder. Each `move_to` starts a new contour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePath {
    subpaths: Vec<SubPath>,
}

impl ShapePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.subpaths.push(SubPath::new(Vec2::new(x, y)));
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.push(Segment::Line(Vec2::new(x, y)))
    }

    pub fn quadratic_curve_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) -> &mut Self {
        self.push(Segment::Quadratic {
            control: Vec2::new(cx, cy),
            end: Vec2::new(x, y),
        })
    }

    pub fn bezier_curve_to(
        &mut self,
        c1x: f32,
        c1y: f32,
        c2x: f32,
        c2y: f32,
        x: f32,
        y: f32,
    ) -> &mut Self {
        self.push(Segment::Cubic {
            c1: Vec2::new(c1x, c1y),
            c2: Vec2::new(c2x, c2y),
            end: Vec2::new(x, y),
        })
    }

    fn push(&mut self, segment: Segment) -> &mut Self {
        if self.subpaths.is_empty() {
            self.subpaths.push(SubPath::new(Vec2::ZERO));
        }
        if let Some(current) = self.subpaths.last_mut() {
            current.segments.push(segment);
        }
        self
    }

    pub fn subpath_count(&self) -> usize {
        self.subpaths.len()
    }

    /// Group contours into shapes. Clockwise contours are solids, the rest are
    /// holes. A hole belongs to the first solid that contains its first point,
    /// falling back to the solid preceding it. When every contour is a hole the
    /// winding is assumed inverted and each contour becomes its own shape.
    pub fn to_shapes(&self) -> Vec<Shape> {
        if self.subpaths.len() == 1 {
            return vec![Shape {
                outline: self.subpaths[0].clone(),
                holes: Vec::new(),
            }];
        }

        let mut solids: Vec<(Shape, Vec<Vec2>)> = Vec::new();
        let mut holes: Vec<(SubPath, Vec2, usize)> = Vec::new();

        for subpath in &self.subpaths {
            let points = subpath.points(CLASSIFY_DIVISIONS);
            if points.len() < 3 {
                continue;
            }
            if is_clockwise(&points) {
                solids.push((
                    Shape {
                        outline: subpath.clone(),
                        holes: Vec::new(),
                    },
                    points,
                ));
            } else {
                let preceding = solids.len().saturating_sub(1);
                holes.push((subpath.clone(), points[0], preceding));
            }
        }

        if solids.is_empty() {
            return self
                .subpaths
                .iter()
                .map(|s| Shape {
                    outline: s.clone(),
                    holes: Vec::new(),
                })
                .collect();
        }

        for (hole, inside_point, preceding) in holes {
            let owner = solids
                .iter()
                .position(|(_, outline)| point_in_polygon(inside_point, outline))
                .unwrap_or(preceding);
            solids[owner].0.holes.push(hole);
        }

        solids.into_iter().map(|(shape, _)| shape).collect()
    }
}

/// Shoelace area; positive for counter-clockwise contours.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (p, q) = (points[i], points[(i + 1) % n]);
            p.x * q.y - q.x * p.y
        })
        .sum::<f32>()
        * 0.5
}

pub fn is_clockwise(points: &[Vec2]) -> bool {
    signed_area(points) < 0.0
}

pub(crate) fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(path: &mut ShapePath, min: f32, max: f32, clockwise: bool) {
        path.move_to(min, min);
        if clockwise {
            path.line_to(min, max).line_to(max, max).line_to(max, min);
        } else {
            path.line_to(max, min).line_to(max, max).line_to(min, max);
        }
        path.line_to(min, min);
    }

    #[test]
    fn closing_point_is_dropped() {
        let mut path = ShapePath::new();
        square(&mut path, 0.0, 1.0, true);
        let shapes = path.to_shapes();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].outline.points(5).len(), 4);
    }

    #[test]
    fn curves_are_sampled_by_divisions() {
        let mut path = ShapePath::new();
        path.move_to(0.0, 0.0)
            .quadratic_curve_to(1.0, 2.0, 2.0, 0.0)
            .bezier_curve_to(1.5, -1.0, 0.5, -1.0, 0.0, 0.0);
        let points = path.to_shapes()[0].outline.points(5);
        // start + 5 quadratic + 5 cubic samples, minus the closing duplicate
        assert_eq!(points.len(), 10);
        assert!(points[5].abs_diff_eq(Vec2::new(2.0, 0.0), 1e-6));
        // quadratic midpoint
        let mid = quadratic(Vec2::ZERO, Vec2::new(1.0, 2.0), Vec2::new(2.0, 0.0), 0.5);
        assert!(mid.abs_diff_eq(Vec2::new(1.0, 1.0), 1e-6));
    }

    #[test]
    fn winding_sign() {
        let ccw = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        assert!((signed_area(&ccw) - 1.0).abs() < 1e-6);
        assert!(!is_clockwise(&ccw));
        let mut cw = ccw;
        cw.reverse();
        assert!(is_clockwise(&cw));
    }

    #[test]
    fn holes_attach_to_containing_solid() {
        let mut path = ShapePath::new();
        square(&mut path, 10.0, 14.0, true);
        square(&mut path, 0.0, 4.0, true);
        // Hole inside the first solid but listed after the second one.
        square(&mut path, 11.0, 12.0, false);
        let shapes = path.to_shapes();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].holes.len(), 1);
        assert!(shapes[1].holes.is_empty());
    }

    #[test]
    fn all_holes_become_shapes() {
        let mut path = ShapePath::new();
        square(&mut path, 0.0, 1.0, false);
        square(&mut path, 2.0, 3.0, false);
        assert_eq!(path.to_shapes().len(), 2);
    }

    #[test]
    fn point_in_polygon_basic() {
        let poly = [Vec2::ZERO, Vec2::new(2.0, 0.0), Vec2::new(2.0, 2.0), Vec2::new(0.0, 2.0)];
        assert!(point_in_polygon(Vec2::new(1.0, 1.0), &poly));
        assert!(!point_in_polygon(Vec2::new(3.0, 1.0), &poly));
    }
}
