use crate::{Demo, DemoError, TextureRequests};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::PI;
use std::sync::Arc;
use vista_assets::{AssetError, AssetHandle, AssetLoader, Font, LoadedAsset, TextOptions, TextureOptions, text_geometry};
use vista_common::Transform;
use vista_geometry::{GeometryError, MeshData, cuboid, torus};
use vista_scene::{GeometryId, Material, MaterialId, MaterialKind, Scene};
use vista_tools::Tweak;

const SPIN: f32 = 0.15;
const OBJECT_PAIRS: usize = 70;
const SPREAD: f32 = 10.0;
const MATCAP: &str = "/textures/matcaps/4.png";
const FONT: &str = "/fonts/helvetiker_regular.typeface.json";

/// Centred 3D text among randomly scattered donuts and boxes, all sharing
/// one matcap material. The whole scene tumbles about every axis.
pub struct TextDemo {
    seed: u64,
    text: String,
    options: TextOptions,
    material: Option<MaterialId>,
    font_handle: Option<AssetHandle>,
    font: Option<Arc<Font>>,
    text_geometry: Option<GeometryId>,
    textures: TextureRequests,
}

impl TextDemo {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            text: "Hello There".to_string(),
            options: TextOptions {
                size: 0.5,
                depth: 0.2,
                curve_segments: 5,
                bevel_enabled: true,
                bevel_thickness: 0.03,
                bevel_size: 0.02,
                bevel_offset: 0.0,
                bevel_segments: 4,
            },
            material: None,
            font_handle: None,
            font: None,
            text_geometry: None,
            textures: TextureRequests::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn options(&self) -> &TextOptions {
        &self.options
    }

    pub fn text_geometry(&self) -> Option<GeometryId> {
        self.text_geometry
    }

    fn build_text(&self, font: &Font) -> Result<MeshData, DemoError> {
        let mut mesh = text_geometry(font, &self.text, &self.options)?;
        mesh.center();
        Ok(mesh)
    }

    /// Create or rebuild the text mesh from the loaded font.
    fn refresh_text(&mut self, scene: &mut Scene) -> Result<(), DemoError> {
        let (Some(font), Some(material)) = (self.font.clone(), self.material) else {
            return Ok(());
        };
        let mesh = self.build_text(&font)?;
        tracing::debug!(text = %self.text, size = self.options.size, triangles = mesh.triangle_count(), "text geometry built");
        match self.text_geometry {
            Some(id) => scene.replace_geometry(id, mesh)?,
            None => {
                let id = scene.add_geometry(mesh);
                scene.add_node("text", id, material, Transform::default())?;
                self.text_geometry = Some(id);
            }
        }
        Ok(())
    }
}

/// Draw one position component in [-SPREAD/2, SPREAD/2).
fn spread(rng: &mut impl Rng) -> f32 {
    (rng.random::<f32>() - 0.5) * SPREAD
}

/// Transforms for every donut and box pair. Values are drawn per pair in a
/// fixed order: donut position, box position, donut rotation, box rotation,
/// then one scale shared by both.
pub(crate) fn scatter(seed: u64, pairs: usize) -> Vec<(Transform, Transform)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..pairs)
        .map(|_| {
            let donut_position = Vec3::new(spread(&mut rng), spread(&mut rng), spread(&mut rng));
            let box_position = Vec3::new(spread(&mut rng), spread(&mut rng), spread(&mut rng));
            let donut_rotation = Vec3::new(rng.random::<f32>() * PI, rng.random::<f32>() * PI, 0.0);
            let box_rotation = Vec3::new(rng.random::<f32>() * PI, rng.random::<f32>() * PI, 0.0);
            let scale = Vec3::splat(rng.random::<f32>());
            (
                Transform {
                    position: donut_position,
                    rotation: donut_rotation,
                    scale,
                },
                Transform {
                    position: box_position,
                    rotation: box_rotation,
                    scale,
                },
            )
        })
        .collect()
}

impl Demo for TextDemo {
    fn name(&self) -> &'static str {
        "text"
    }

    fn setup(&mut self, scene: &mut Scene, loader: &mut AssetLoader) -> Result<(), DemoError> {
        let matcap = self
            .textures
            .request(scene, loader, MATCAP, TextureOptions::default());
        let mut material = Material::new(MaterialKind::Matcap);
        material.matcap = Some(matcap);
        let material = scene.add_material(material);
        self.material = Some(material);

        self.font_handle = Some(loader.load_font(FONT));

        let donut = scene.add_geometry(torus(0.3, 0.2, 20, 45));
        let boxy = scene.add_geometry(cuboid(0.5, 0.5, 0.5));
        for (donut_transform, box_transform) in scatter(self.seed, OBJECT_PAIRS) {
            scene.add_node("donut", donut, material, donut_transform)?;
            scene.add_node("box", boxy, material, box_transform)?;
        }

        // The camera is a child of the spinning root.
        scene.attach_camera_to_root();

        tracing::info!(seed = self.seed, objects = OBJECT_PAIRS * 2, "text demo ready");
        Ok(())
    }

    fn update(&mut self, scene: &mut Scene, elapsed: f32) -> Result<(), DemoError> {
        let mut root = *scene.transform();
        root.rotation = Vec3::splat(elapsed * SPIN);
        scene.set_transform(root)?;
        Ok(())
    }

    fn tweaks(&self) -> Vec<Tweak> {
        vec![Tweak::new("size", self.options.size, 0.1, 1.0, 0.01).with_label("text size")]
    }

    fn apply_tweak(&mut self, scene: &mut Scene, key: &str, value: f32) -> Result<(), DemoError> {
        if key != "size" {
            return Err(DemoError::UnknownTweak(key.to_string()));
        }
        if !(value > 0.0) {
            return Err(AssetError::from(GeometryError::InvalidOptions("text size must be positive")).into());
        }
        self.options.size = value;
        self.refresh_text(scene)
    }

    fn asset_loaded(&mut self, scene: &mut Scene, handle: AssetHandle, asset: LoadedAsset) -> Result<bool, DemoError> {
        match asset {
            LoadedAsset::Texture(image) => Ok(self.textures.complete(scene, handle, image)),
            LoadedAsset::Font(font) if self.font_handle == Some(handle) => {
                self.font_handle = None;
                self.font = Some(font);
                self.refresh_text(scene)?;
                Ok(true)
            }
            LoadedAsset::Font(_) => Ok(false),
        }
    }

    fn asset_failed(&mut self, handle: AssetHandle) {
        if self.font_handle == Some(handle) {
            tracing::warn!(path = FONT, "font unavailable, text will not be shown");
            self.font_handle = None;
        }
        self.textures.forget(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_scene::SceneEvent;

    const FONT_JSON: &str = r#"{
        "glyphs": {
            "I": { "ha": 200, "x_min": 0, "x_max": 100,
                   "o": "m 0 0 l 0 700 l 100 700 l 100 0 l 0 0" },
            "O": { "ha": 600, "x_min": 0, "x_max": 500,
                   "o": "m 0 0 l 0 700 l 500 700 l 500 0 l 0 0 m 100 100 l 400 100 l 400 600 l 100 600 l 100 100" },
            "?": { "ha": 400, "x_min": 0, "x_max": 300,
                   "o": "m 0 0 l 0 300 l 300 300 l 300 0 l 0 0" }
        },
        "familyName": "Testface",
        "ascender": 800,
        "descender": -200,
        "underlineThickness": 50,
        "boundingBox": { "yMin": -200, "xMin": 0, "yMax": 800, "xMax": 600 },
        "resolution": 1000
    }"#;

    fn setup(seed: u64) -> (TextDemo, Scene, AssetLoader, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = Scene::new();
        let mut loader = AssetLoader::new(dir.path());
        let mut demo = TextDemo::new(seed).with_text("IO");
        demo.setup(&mut scene, &mut loader).unwrap();
        (demo, scene, loader, dir)
    }

    fn deliver_font(demo: &mut TextDemo, scene: &mut Scene) -> bool {
        let font = Arc::new(Font::from_json(FONT_JSON).unwrap());
        let handle = demo.font_handle.unwrap();
        demo.asset_loaded(scene, handle, LoadedAsset::Font(font)).unwrap()
    }

    #[test]
    fn scatters_seventy_pairs() {
        let (_demo, scene, loader, _dir) = setup(7);
        assert_eq!(scene.node_count(), 140);
        assert_eq!(scene.geometries().len(), 2);
        assert_eq!(scene.materials().len(), 1);
        assert_eq!(loader.pending(), 2);
        assert!(scene.camera_on_root());
        for node in scene.nodes().values() {
            let t = node.transform;
            assert!(t.position.abs().max_element() <= SPREAD / 2.0);
            assert!(t.rotation.x >= 0.0 && t.rotation.x < PI);
            assert_eq!(t.rotation.z, 0.0);
            assert!(t.scale.x >= 0.0 && t.scale.x < 1.0);
            assert_eq!(t.scale.x, t.scale.z);
        }
    }

    #[test]
    fn scatter_is_reproducible_per_seed() {
        assert_eq!(scatter(42, OBJECT_PAIRS), scatter(42, OBJECT_PAIRS));
        assert_ne!(scatter(42, 3), scatter(43, 3));
    }

    #[test]
    fn pair_shares_one_scale() {
        for (donut, boxy) in scatter(1, 10) {
            assert_eq!(donut.scale, boxy.scale);
            assert_ne!(donut.position, boxy.position);
        }
    }

    #[test]
    fn root_rotation_is_elapsed_times_constant() {
        let (mut demo, mut scene, _loader, _dir) = setup(0);
        demo.update(&mut scene, 4.0).unwrap();
        assert_eq!(scene.transform().rotation, Vec3::splat(4.0 * 0.15));
        assert_eq!(scene.transform().position, Vec3::ZERO);
        demo.update(&mut scene, 0.0).unwrap();
        assert_eq!(scene.transform().rotation, Vec3::ZERO);
    }

    #[test]
    fn font_arrival_adds_centred_text() {
        let (mut demo, mut scene, _loader, _dir) = setup(0);
        assert!(deliver_font(&mut demo, &mut scene));
        let id = demo.text_geometry().unwrap();
        assert_eq!(scene.node_count(), 141);

        let bounds = scene.geometry(id).unwrap().bounding_box().unwrap();
        assert!(bounds.center().length() < 1e-4);
        // "IO" at size 0.5 spans 0.2 * 0.5 + 0.5 * 0.5 plus bevel on both sides.
        assert!((bounds.size().x - (0.35 + 0.04)).abs() < 1e-3);
    }

    #[test]
    fn size_tweak_rebuilds_in_place() {
        let (mut demo, mut scene, _loader, _dir) = setup(0);
        deliver_font(&mut demo, &mut scene);
        let id = demo.text_geometry().unwrap();
        let before = scene.geometry(id).unwrap().bounding_box().unwrap().size();
        scene.drain_events();

        demo.apply_tweak(&mut scene, "size", 1.0).unwrap();
        assert_eq!(scene.events(), &[SceneEvent::GeometryReplaced(id)]);
        let after = scene.geometry(id).unwrap().bounding_box().unwrap().size();
        assert!(after.y > before.y * 1.5);
        assert_eq!(demo.text_geometry(), Some(id));
        assert!(matches!(
            demo.apply_tweak(&mut scene, "depth", 1.0),
            Err(DemoError::UnknownTweak(_))
        ));
    }

    #[test]
    fn size_tweak_before_font_only_records() {
        let (mut demo, mut scene, _loader, _dir) = setup(0);
        demo.apply_tweak(&mut scene, "size", 0.8).unwrap();
        assert_eq!(demo.options().size, 0.8);
        assert!(demo.text_geometry().is_none());
    }

    #[test]
    fn foreign_font_is_ignored() {
        let (mut demo, mut scene, _loader, _dir) = setup(0);
        let font = Arc::new(Font::from_json(FONT_JSON).unwrap());
        assert!(!demo.asset_loaded(&mut scene, AssetHandle(999), LoadedAsset::Font(font)).unwrap());
        assert!(demo.text_geometry().is_none());
    }
}
