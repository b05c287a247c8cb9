use crate::{Demo, DemoError, TextureRequests};
use glam::{Vec2, Vec3};
use vista_assets::{AssetHandle, AssetLoader, LoadedAsset, TextureOptions};
use vista_common::{Color, NodeId, Transform};
use vista_geometry::{plane, sphere, torus};
use vista_scene::{Light, Material, MaterialId, MaterialKind, Scene};
use vista_tools::Tweak;

const SPIN_Y: f32 = 0.1;
const SPIN_X: f32 = 0.15;

const DOOR_COLOR: &str = "/textures/door/color.jpg";
const DOOR_ALPHA: &str = "/textures/door/alpha.jpg";
const DOOR_AO: &str = "/textures/door/ambientOcclusion.jpg";
const DOOR_HEIGHT: &str = "/textures/door/height.jpg";
const DOOR_METALNESS: &str = "/textures/door/metalness.jpg";
const DOOR_NORMAL: &str = "/textures/door/normal.jpg";
const DOOR_ROUGHNESS: &str = "/textures/door/roughness.jpg";
const MATCAP: &str = "/textures/matcaps/3.png";
const GRADIENT: &str = "/textures/gradients/5.jpg";

/// Sphere, plane and torus side by side sharing one material, each
/// spinning slowly about X and Y.
pub struct MaterialsDemo {
    kind: MaterialKind,
    material: Option<MaterialId>,
    meshes: Vec<NodeId>,
    textures: TextureRequests,
}

impl MaterialsDemo {
    /// The demo with `kind`'s preset parameters and maps.
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            kind: preset_kind(kind),
            material: None,
            meshes: Vec::new(),
            textures: TextureRequests::new(),
        }
    }

    pub fn from_name(name: &str) -> Result<Self, DemoError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    pub fn meshes(&self) -> &[NodeId] {
        &self.meshes
    }

    fn build_material(&mut self, scene: &mut Scene, loader: &mut AssetLoader) -> Material {
        let mut texture = |path: &str, options| self.textures.request(scene, loader, path, options);
        let mut material = Material::new(self.kind);
        match self.kind {
            MaterialKind::Basic => {
                material.map = Some(texture(DOOR_COLOR, TextureOptions::default()));
                material.color = Color::from_hex(0xffc0cb);
                material.transparent = true;
                material.alpha_map = Some(texture(DOOR_ALPHA, TextureOptions::default()));
            }
            MaterialKind::Matcap => {
                material.matcap = Some(texture(MATCAP, TextureOptions::default()));
            }
            MaterialKind::Toon => {
                material.gradient_map = Some(texture(GRADIENT, TextureOptions::nearest()));
            }
            MaterialKind::Standard { .. } => {
                material.map = Some(texture(DOOR_COLOR, TextureOptions::default()));
                material.ao_map = Some(texture(DOOR_AO, TextureOptions::default()));
                material.displacement_map = Some(texture(DOOR_HEIGHT, TextureOptions::default()));
                material.displacement_scale = 0.05;
                material.metalness_map = Some(texture(DOOR_METALNESS, TextureOptions::default()));
                material.roughness_map = Some(texture(DOOR_ROUGHNESS, TextureOptions::default()));
                material.normal_map = Some(texture(DOOR_NORMAL, TextureOptions::default()));
                material.normal_scale = Vec2::new(0.5, 0.5);
                material.alpha_map = Some(texture(DOOR_ALPHA, TextureOptions::default()));
                material.transparent = true;
            }
            MaterialKind::Normal { .. } | MaterialKind::Depth | MaterialKind::Lambert | MaterialKind::Phong { .. } => {}
        }
        material
    }
}

impl Default for MaterialsDemo {
    fn default() -> Self {
        Self::new(MaterialKind::Standard {
            metalness: 0.45,
            roughness: 0.65,
        })
    }
}

/// Replace a kind's generic defaults with the demo's parameters.
fn preset_kind(kind: MaterialKind) -> MaterialKind {
    match kind {
        MaterialKind::Normal { .. } => MaterialKind::Normal { flat_shading: true },
        MaterialKind::Phong { .. } => MaterialKind::Phong {
            shininess: 100.0,
            specular: Color::from_hex(0x1188ff),
        },
        MaterialKind::Standard { .. } => MaterialKind::Standard {
            metalness: 0.45,
            roughness: 0.65,
        },
        other => other,
    }
}

impl Demo for MaterialsDemo {
    fn name(&self) -> &'static str {
        "materials"
    }

    fn setup(&mut self, scene: &mut Scene, loader: &mut AssetLoader) -> Result<(), DemoError> {
        let material = self.build_material(scene, loader);
        let material = scene.add_material(material);
        self.material = Some(material);

        let meshes = [
            ("sphere", sphere(0.5, 16, 16), Vec3::new(-1.5, 0.0, 0.0)),
            ("plane", plane(1.0, 1.0), Vec3::ZERO),
            ("torus", torus(0.3, 0.2, 16, 32), Vec3::new(1.5, 0.0, 0.0)),
        ];
        for (name, mesh, position) in meshes {
            let geometry = scene.add_geometry(mesh);
            let node = scene.add_node(name, geometry, material, Transform::from_position(position))?;
            self.meshes.push(node);
        }

        scene.add_light(Light::ambient(0xffffff, 0.5));
        scene.add_light(Light::point(0xffffff, 0.5, Vec3::new(2.0, 3.0, 4.0)));

        tracing::info!(kind = %self.kind, textures = self.textures.pending(), "materials demo ready");
        Ok(())
    }

    fn update(&mut self, scene: &mut Scene, elapsed: f32) -> Result<(), DemoError> {
        for &id in &self.meshes {
            let Some(node) = scene.node(id) else {
                continue;
            };
            let mut transform = node.transform;
            transform.rotation.y = elapsed * SPIN_Y;
            transform.rotation.x = elapsed * SPIN_X;
            scene.set_node_transform(id, transform)?;
        }
        Ok(())
    }

    fn tweaks(&self) -> Vec<Tweak> {
        match self.kind {
            MaterialKind::Standard { metalness, roughness } => vec![
                Tweak::new("metalness", metalness, 0.0, 1.0, 0.001),
                Tweak::new("roughness", roughness, 0.0, 1.0, 0.001),
            ],
            _ => Vec::new(),
        }
    }

    fn apply_tweak(&mut self, scene: &mut Scene, key: &str, value: f32) -> Result<(), DemoError> {
        let unknown = || DemoError::UnknownTweak(key.to_string());
        let id = self.material.ok_or_else(unknown)?;
        let mut material = scene.material(id).cloned().ok_or_else(unknown)?;
        if !material.set_scalar(key, value) {
            return Err(unknown());
        }
        self.kind = material.kind;
        scene.set_material(id, material)?;
        Ok(())
    }

    fn asset_loaded(&mut self, scene: &mut Scene, handle: AssetHandle, asset: LoadedAsset) -> Result<bool, DemoError> {
        Ok(match asset {
            LoadedAsset::Texture(image) => self.textures.complete(scene, handle, image),
            LoadedAsset::Font(_) => false,
        })
    }

    fn asset_failed(&mut self, handle: AssetHandle) {
        self.textures.forget(handle);
    }
}
