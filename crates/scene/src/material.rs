use crate::TextureId;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vista_common::Color;

/// Shading model of a material, with the parameters only that model uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Unlit colour and textures.
    Basic,
    /// Surface normal mapped to RGB.
    Normal { flat_shading: bool },
    /// Colour looked up from the matcap texture by view-space normal.
    Matcap,
    /// Gray level from fragment depth, white near and black far.
    Depth,
    /// Diffuse only.
    Lambert,
    /// Diffuse plus Blinn-Phong specular.
    Phong { shininess: f32, specular: Color },
    /// Diffuse quantised through the gradient map.
    Toon,
    /// Metal/roughness physically based shading.
    Standard { metalness: f32, roughness: f32 },
}

impl MaterialKind {
    pub const NAMES: [&'static str; 8] = [
        "basic", "normal", "matcap", "depth", "lambert", "phong", "toon", "standard",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Normal { .. } => "normal",
            Self::Matcap => "matcap",
            Self::Depth => "depth",
            Self::Lambert => "lambert",
            Self::Phong { .. } => "phong",
            Self::Toon => "toon",
            Self::Standard { .. } => "standard",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown material kind {0:?} (expected one of: basic, normal, matcap, depth, lambert, phong, toon, standard)")]
pub struct ParseMaterialKindError(pub String);

impl FromStr for MaterialKind {
    type Err = ParseMaterialKindError;

    /// Parses a kind name with its usual default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "basic" => Self::Basic,
            "normal" => Self::Normal { flat_shading: false },
            "matcap" => Self::Matcap,
            "depth" => Self::Depth,
            "lambert" => Self::Lambert,
            "phong" => Self::Phong {
                shininess: 30.0,
                specular: Color::from_hex(0x111111),
            },
            "toon" => Self::Toon,
            "standard" => Self::Standard {
                metalness: 0.0,
                roughness: 1.0,
            },
            _ => return Err(ParseMaterialKindError(s.to_string())),
        })
    }
}

/// Surface appearance shared by any number of nodes.
///
/// Texture slots hold ids into the scene's texture table. Channels read from
/// single-purpose maps: alpha from green, roughness from green, metalness
/// from blue, ambient occlusion from red.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Color,
    pub opacity: f32,
    /// Draw after opaque geometry with alpha blending.
    pub transparent: bool,
    pub map: Option<TextureId>,
    pub alpha_map: Option<TextureId>,
    pub ao_map: Option<TextureId>,
    pub ao_intensity: f32,
    pub displacement_map: Option<TextureId>,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    pub metalness_map: Option<TextureId>,
    pub roughness_map: Option<TextureId>,
    pub normal_map: Option<TextureId>,
    pub normal_scale: Vec2,
    pub matcap: Option<TextureId>,
    pub gradient_map: Option<TextureId>,
}

impl Material {
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            kind,
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            map: None,
            alpha_map: None,
            ao_map: None,
            ao_intensity: 1.0,
            displacement_map: None,
            displacement_scale: 1.0,
            displacement_bias: 0.0,
            metalness_map: None,
            roughness_map: None,
            normal_map: None,
            normal_scale: Vec2::ONE,
            matcap: None,
            gradient_map: None,
        }
    }

    /// Every bound texture with its slot name.
    pub fn textures(&self) -> impl Iterator<Item = (&'static str, TextureId)> + '_ {
        [
            ("map", self.map),
            ("alpha_map", self.alpha_map),
            ("ao_map", self.ao_map),
            ("displacement_map", self.displacement_map),
            ("metalness_map", self.metalness_map),
            ("roughness_map", self.roughness_map),
            ("normal_map", self.normal_map),
            ("matcap", self.matcap),
            ("gradient_map", self.gradient_map),
        ]
        .into_iter()
        .filter_map(|(name, id)| id.map(|id| (name, id)))
    }

    pub fn uses_texture(&self, id: TextureId) -> bool {
        self.textures().any(|(_, t)| t == id)
    }

    /// Read a named scalar parameter, if this material has it.
    pub fn scalar(&self, key: &str) -> Option<f32> {
        match (key, &self.kind) {
            ("opacity", _) => Some(self.opacity),
            ("ao_intensity", _) => Some(self.ao_intensity),
            ("displacement_scale", _) => Some(self.displacement_scale),
            ("displacement_bias", _) => Some(self.displacement_bias),
            ("metalness", MaterialKind::Standard { metalness, .. }) => Some(*metalness),
            ("roughness", MaterialKind::Standard { roughness, .. }) => Some(*roughness),
            ("shininess", MaterialKind::Phong { shininess, .. }) => Some(*shininess),
            _ => None,
        }
    }

    /// Write a named scalar parameter. Returns false if the key does not
    /// apply to this material.
    pub fn set_scalar(&mut self, key: &str, value: f32) -> bool {
        let slot = match (key, &mut self.kind) {
            ("opacity", _) => &mut self.opacity,
            ("ao_intensity", _) => &mut self.ao_intensity,
            ("displacement_scale", _) => &mut self.displacement_scale,
            ("displacement_bias", _) => &mut self.displacement_bias,
            ("metalness", MaterialKind::Standard { metalness, .. }) => metalness,
            ("roughness", MaterialKind::Standard { roughness, .. }) => roughness,
            ("shininess", MaterialKind::Phong { shininess, .. }) => shininess,
            _ => return false,
        };
        *slot = value;
        true
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(MaterialKind::Basic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_every_kind_name() {
        for name in MaterialKind::NAMES {
            let kind: MaterialKind = name.parse().unwrap();
            assert_eq!(kind.name(), name);
        }
        assert!("chrome".parse::<MaterialKind>().is_err());
        assert_eq!("Standard".parse::<MaterialKind>().unwrap().name(), "standard");
    }

    #[test]
    fn scalar_access_depends_on_kind() {
        let mut standard = Material::new(MaterialKind::Standard {
            metalness: 0.45,
            roughness: 0.65,
        });
        assert_eq!(standard.scalar("metalness"), Some(0.45));
        assert!(standard.set_scalar("roughness", 0.2));
        assert_eq!(standard.scalar("roughness"), Some(0.2));
        assert!(!standard.set_scalar("shininess", 10.0));

        let mut basic = Material::default();
        assert_eq!(basic.scalar("metalness"), None);
        assert!(basic.set_scalar("opacity", 0.5));
        assert_eq!(basic.opacity, 0.5);
    }

    #[test]
    fn textures_lists_bound_slots() {
        let mut m = Material::default();
        m.map = Some(TextureId(1));
        m.normal_map = Some(TextureId(2));
        let slots: Vec<_> = m.textures().collect();
        assert_eq!(slots, vec![("map", TextureId(1)), ("normal_map", TextureId(2))]);
        assert!(m.uses_texture(TextureId(2)));
        assert!(!m.uses_texture(TextureId(3)));
    }
}
