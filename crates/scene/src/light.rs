use glam::Vec3;
use serde::{Deserialize, Serialize};
use vista_common::Color;

/// Scene light. Point light positions are in scene space and follow the
/// scene root transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    /// Uniform light from every direction.
    Ambient { color: Color, intensity: f32 },
    /// Light radiating from a point. A `distance` of 0 means no falloff;
    /// otherwise intensity fades to zero at `distance` with exponent `decay`.
    Point {
        color: Color,
        intensity: f32,
        position: Vec3,
        distance: f32,
        decay: f32,
    },
}

impl Light {
    pub fn ambient(color: u32, intensity: f32) -> Self {
        Self::Ambient {
            color: Color::from_hex(color),
            intensity,
        }
    }

    pub fn point(color: u32, intensity: f32, position: Vec3) -> Self {
        Self::Point {
            color: Color::from_hex(color),
            intensity,
            position,
            distance: 0.0,
            decay: 1.0,
        }
    }

    /// Colour premultiplied by intensity.
    pub fn radiance(&self) -> Color {
        match *self {
            Self::Ambient { color, intensity } | Self::Point { color, intensity, .. } => {
                color.scaled(intensity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radiance_scales_colour() {
        let light = Light::ambient(0xffffff, 0.5);
        assert_eq!(light.radiance(), Color::new(0.5, 0.5, 0.5));
    }
}
