//! Typeface JSON fonts and extruded text geometry.
//!
//! The typeface format stores each glyph outline as a whitespace separated
//! command string in font units:
//!
//! | command | operands | meaning |
//! |---|---|---|
//! | `m` | `x y` | start a contour |
//! | `l` | `x y` | line to |
//! | `q` | `x y cx cy` | quadratic curve, end point first |
//! | `b` | `x y c1x c1y c2x c2y` | cubic curve, end point first |

use crate::AssetError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use vista_geometry::{ExtrudeOptions, MeshData, Shape, ShapePath};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFont {
    glyphs: BTreeMap<String, RawGlyph>,
    #[serde(default)]
    family_name: String,
    #[serde(default)]
    ascender: f32,
    #[serde(default)]
    descender: f32,
    #[serde(default)]
    underline_thickness: f32,
    bounding_box: BoundingBox,
    resolution: f32,
}

#[derive(Debug, Deserialize)]
struct RawGlyph {
    ha: f32,
    #[serde(default)]
    o: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoundingBox {
    y_min: f32,
    y_max: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Move(f32, f32),
    Line(f32, f32),
    Quadratic { x: f32, y: f32, cx: f32, cy: f32 },
    Cubic { x: f32, y: f32, c1x: f32, c1y: f32, c2x: f32, c2y: f32 },
}

#[derive(Debug, Clone)]
struct Glyph {
    advance: f32,
    commands: Vec<Command>,
}

/// A parsed typeface font. Outlines are validated on load.
#[derive(Debug, Clone)]
pub struct Font {
    family_name: String,
    resolution: f32,
    ascender: f32,
    descender: f32,
    y_min: f32,
    y_max: f32,
    underline_thickness: f32,
    glyphs: BTreeMap<char, Glyph>,
}

impl Font {
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let raw: RawFont = serde_json::from_str(json)?;
        let mut glyphs = BTreeMap::new();
        for (key, glyph) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                tracing::debug!(key = %key, "skipping multi-character glyph key");
                continue;
            };
            let commands = match &glyph.o {
                Some(outline) => parse_outline(ch, outline)?,
                None => Vec::new(),
            };
            glyphs.insert(
                ch,
                Glyph {
                    advance: glyph.ha,
                    commands,
                },
            );
        }

        let resolution = if raw.resolution > 0.0 { raw.resolution } else { 1000.0 };
        Ok(Self {
            family_name: raw.family_name,
            resolution,
            ascender: raw.ascender,
            descender: raw.descender,
            y_min: raw.bounding_box.y_min,
            y_max: raw.bounding_box.y_max,
            underline_thickness: raw.underline_thickness,
            glyphs,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let font = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            family = %font.family_name,
            glyphs = font.glyphs.len(),
            "loaded font"
        );
        Ok(font)
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    /// Characters of `text` with no glyph of their own, in first-seen order.
    /// Whitespace is skipped. These render with the `?` glyph when the font
    /// has one.
    pub fn missing_glyphs(&self, text: &str) -> Vec<char> {
        let mut missing = Vec::new();
        for ch in text.chars() {
            if !ch.is_whitespace() && !self.has_glyph(ch) && !missing.contains(&ch) {
                missing.push(ch);
            }
        }
        missing
    }

    /// Ascender and descender scaled to `size`.
    pub fn metrics(&self, size: f32) -> (f32, f32) {
        let scale = size / self.resolution;
        (self.ascender * scale, self.descender * scale)
    }

    /// Distance between baselines at `size`.
    pub fn line_height(&self, size: f32) -> f32 {
        (self.y_max - self.y_min + self.underline_thickness) * size / self.resolution
    }

    fn lookup(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch).or_else(|| self.glyphs.get(&'?'))
    }

    /// Lay out `text` and return its outlines as shapes. The first line's
    /// baseline sits at y = 0, and each `\n` starts a new line below it.
    pub fn generate_shapes(&self, text: &str, size: f32) -> Vec<Shape> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);
        let (mut offset_x, mut offset_y) = (0.0f32, 0.0f32);
        let mut shapes = Vec::new();

        for ch in text.chars() {
            if ch == '\n' {
                offset_x = 0.0;
                offset_y -= line_height;
                continue;
            }
            let Some(glyph) = self.lookup(ch) else {
                tracing::error!(character = %ch, family = %self.family_name, "character missing from font");
                continue;
            };

            let mut path = ShapePath::new();
            let at = |x: f32, y: f32| (x * scale + offset_x, y * scale + offset_y);
            for command in &glyph.commands {
                match *command {
                    Command::Move(x, y) => {
                        let (x, y) = at(x, y);
                        path.move_to(x, y);
                    }
                    Command::Line(x, y) => {
                        let (x, y) = at(x, y);
                        path.line_to(x, y);
                    }
                    Command::Quadratic { x, y, cx, cy } => {
                        let ((x, y), (cx, cy)) = (at(x, y), at(cx, cy));
                        path.quadratic_curve_to(cx, cy, x, y);
                    }
                    Command::Cubic { x, y, c1x, c1y, c2x, c2y } => {
                        let ((x, y), (c1x, c1y), (c2x, c2y)) = (at(x, y), at(c1x, c1y), at(c2x, c2y));
                        path.bezier_curve_to(c1x, c1y, c2x, c2y, x, y);
                    }
                }
            }
            if path.subpath_count() > 0 {
                shapes.extend(path.to_shapes());
            }
            offset_x += glyph.advance * scale;
        }
        shapes
    }
}

fn parse_outline(glyph: char, outline: &str) -> Result<Vec<Command>, AssetError> {
    let malformed = |reason: String| AssetError::Outline { glyph, reason };
    let mut tokens = outline.split_whitespace();
    let mut commands = Vec::new();

    while let Some(op) = tokens.next() {
        let arity = match op {
            "m" | "l" => 2,
            "q" => 4,
            "b" => 6,
            "z" => continue,
            other => return Err(malformed(format!("unknown command {other:?}"))),
        };
        let mut v = [0.0f32; 6];
        for slot in v.iter_mut().take(arity) {
            let token = tokens
                .next()
                .ok_or_else(|| malformed(format!("command {op:?} is missing operands")))?;
            *slot = token
                .parse()
                .map_err(|_| malformed(format!("bad number {token:?}")))?;
        }
        commands.push(match op {
            "m" => Command::Move(v[0], v[1]),
            "l" => Command::Line(v[0], v[1]),
            "q" => Command::Quadratic { x: v[0], y: v[1], cx: v[2], cy: v[3] },
            _ => Command::Cubic { x: v[0], y: v[1], c1x: v[2], c1y: v[3], c2x: v[4], c2y: v[5] },
        });
    }
    Ok(commands)
}

/// Text extrusion parameters, in scene units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 100.0,
            depth: 50.0,
            curve_segments: 12,
            bevel_enabled: false,
            bevel_thickness: 10.0,
            bevel_size: 8.0,
            bevel_offset: 0.0,
            bevel_segments: 3,
        }
    }
}

impl From<TextOptions> for ExtrudeOptions {
    fn from(opts: TextOptions) -> Self {
        ExtrudeOptions {
            depth: opts.depth,
            steps: 1,
            bevel_enabled: opts.bevel_enabled,
            bevel_thickness: opts.bevel_thickness,
            bevel_size: opts.bevel_size,
            bevel_offset: opts.bevel_offset,
            bevel_segments: opts.bevel_segments,
            curve_segments: opts.curve_segments,
        }
    }
}

/// Extruded, flat-shaded mesh for `text`. The mesh is not centred.
pub fn text_geometry(font: &Font, text: &str, options: &TextOptions) -> Result<MeshData, AssetError> {
    let shapes = font.generate_shapes(text, options.size);
    let mesh = vista_geometry::extrude(&shapes, &(*options).into())?;
    tracing::debug!(
        text,
        shapes = shapes.len(),
        triangles = mesh.triangle_count(),
        "built text geometry"
    );
    Ok(mesh)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Three glyphs: a bar `I`, a boxy `O` with a counter, and a curved `?`.
    pub(crate) const TEST_FONT: &str = r#"{
        "glyphs": {
            "I": { "ha": 200, "x_min": 0, "x_max": 100,
                   "o": "m 0 0 l 0 700 l 100 700 l 100 0 l 0 0" },
            "O": { "ha": 600, "x_min": 0, "x_max": 500,
                   "o": "m 0 0 l 0 700 l 500 700 l 500 0 l 0 0 m 100 100 l 400 100 l 400 600 l 100 600 l 100 100" },
            "?": { "ha": 400, "x_min": 0, "x_max": 300,
                   "o": "m 0 0 q 0 300 150 300 b 300 0 300 150 150 0 l 0 0" },
            " ": { "ha": 250 }
        },
        "familyName": "Testface",
        "ascender": 800,
        "descender": -200,
        "underlineThickness": 50,
        "boundingBox": { "yMin": -200, "xMin": 0, "yMax": 800, "xMax": 600 },
        "resolution": 1000
    }"#;

    fn font() -> Font {
        Font::from_json(TEST_FONT).unwrap()
    }

    #[test]
    fn parses_metadata_and_glyphs() {
        let font = font();
        assert_eq!(font.family_name(), "Testface");
        assert_eq!(font.glyph_count(), 4);
        assert!(font.has_glyph('O'));
        assert!(!font.has_glyph('Z'));
        assert_eq!(font.missing_glyphs("IZ O\nZx"), vec!['Z', 'x']);
        assert!(font.missing_glyphs("OI ?").is_empty());
        assert!((font.line_height(1.0) - 1.05).abs() < 1e-6);
        let (asc, desc) = font.metrics(0.5);
        assert!((asc - 0.4).abs() < 1e-6 && (desc + 0.1).abs() < 1e-6);
    }

    #[test]
    fn glyph_with_counter_becomes_shape_with_hole() {
        let shapes = font().generate_shapes("IO", 1.0);
        assert_eq!(shapes.len(), 2);
        assert!(shapes[0].holes.is_empty());
        assert_eq!(shapes[1].holes.len(), 1);
        // Second glyph is advanced by the first glyph's `ha`.
        let (outline, _) = shapes[1].extract_points(4);
        let min_x = outline.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        assert!((min_x - 0.2).abs() < 1e-6);
    }

    #[test]
    fn newline_moves_down_one_line() {
        let shapes = font().generate_shapes("I\nI", 1.0);
        assert_eq!(shapes.len(), 2);
        let (outline, _) = shapes[1].extract_points(4);
        let min_y = outline.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let min_x = outline.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        assert!((min_y + 1.05).abs() < 1e-5);
        assert!(min_x.abs() < 1e-6);
    }

    #[test]
    fn missing_glyph_falls_back_to_question_mark() {
        let shapes = font().generate_shapes("Z", 1.0);
        assert_eq!(shapes.len(), 1);
        // Empty outlines advance without producing shapes.
        assert!(font().generate_shapes("  ", 1.0).is_empty());
    }

    #[test]
    fn malformed_outline_is_rejected() {
        let json = TEST_FONT.replace("l 0 700 l 100", "l 0 seven l 100");
        assert!(matches!(
            Font::from_json(&json),
            Err(AssetError::Outline { glyph: 'I', .. })
        ));
    }

    #[test]
    fn text_geometry_extrudes_outline() {
        let options = TextOptions {
            size: 1.0,
            depth: 0.2,
            bevel_enabled: false,
            ..TextOptions::default()
        };
        let mesh = text_geometry(&font(), "I", &options).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        let bounds = mesh.bounding_box().unwrap();
        assert!(bounds.max.abs_diff_eq(glam::Vec3::new(0.1, 0.7, 0.2), 1e-5));
    }

    #[test]
    fn bevelled_text_is_closed_and_centres() {
        let options = TextOptions {
            size: 0.5,
            depth: 0.2,
            curve_segments: 5,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 4,
        };
        let mut mesh = text_geometry(&font(), "IO?", &options).unwrap();
        assert!(!mesh.is_empty());
        mesh.center();
        let bounds = mesh.bounding_box().unwrap();
        assert!(bounds.center().abs_diff_eq(glam::Vec3::ZERO, 1e-5));
        assert!((bounds.size().z - 0.26).abs() < 1e-5);
    }
}
