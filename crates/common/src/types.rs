use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Identifier for a node in a scene. Ids are handed out by the scene in
/// creation order, so sorting by id gives insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Spatial transform: position, Euler rotation (radians, XYZ order), scale.
///
/// The rotation is kept as Euler angles because the demos animate the
/// individual axes directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Rotation as a quaternion, equivalent to `Rx * Ry * Rz`.
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Local-to-parent matrix (translation * rotation * scale).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

/// Linear RGB colour with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_order_numerically() {
        assert!(NodeId(2) < NodeId(10));
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
        assert!(t.matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn euler_order_is_x_then_y_then_z() {
        let t = Transform {
            rotation: Vec3::new(0.3, -1.1, 0.7),
            ..Transform::default()
        };
        let expected = Mat4::from_rotation_x(0.3)
            * Mat4::from_rotation_y(-1.1)
            * Mat4::from_rotation_z(0.7);
        assert!(t.matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn matrix_applies_scale_before_translation() {
        let t = Transform {
            position: Vec3::new(1.5, 0.0, 0.0),
            scale: Vec3::splat(2.0),
            ..Transform::default()
        };
        let p = t.matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(3.5, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn non_finite_transform_detected() {
        let t = Transform::from_position(Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(!t.is_finite());
        assert!(Transform::default().is_finite());
    }

    #[test]
    fn color_hex_round_trip() {
        let c = Color::from_hex(0x1188ff);
        assert!((c.r - 0x11 as f32 / 255.0).abs() < 1e-6);
        assert!((c.b - 1.0).abs() < 1e-6);
        assert_eq!(c.to_hex(), 0x1188ff);
    }
}
