use crate::{Light, Material};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use vista_assets::{ImageData, TextureOptions};
use vista_common::{Color, NodeId, Transform};
use vista_geometry::MeshData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeometryId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// A record of every structural mutation, drained by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneEvent {
    NodeAdded(NodeId),
    GeometryAdded(GeometryId),
    GeometryReplaced(GeometryId),
    MaterialAdded(MaterialId),
    MaterialChanged(MaterialId),
    TextureAdded(TextureId),
    TextureLoaded(TextureId),
}

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("unknown geometry {0:?}")]
    UnknownGeometry(GeometryId),
    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialId),
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("transform contains non-finite values")]
    NonFiniteTransform,
}

/// A renderable object: one geometry drawn with one material.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub transform: Transform,
    pub visible: bool,
}

/// A texture requested by path. `image` stays `None` until the load lands,
/// and renderers substitute a fallback in the meantime.
#[derive(Debug, Clone)]
pub struct TextureSlot {
    pub path: String,
    pub options: TextureOptions,
    pub image: Option<Arc<ImageData>>,
}

/// The scene graph: a root transform applied to every node and light.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    transform: Transform,
    background: Color,
    nodes: BTreeMap<NodeId, Node>,
    geometries: BTreeMap<GeometryId, Arc<MeshData>>,
    materials: BTreeMap<MaterialId, Material>,
    textures: BTreeMap<TextureId, TextureSlot>,
    lights: Vec<Light>,
    camera_on_root: bool,
    next_id: u64,
    events: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            background: Color::BLACK,
            ..Self::default()
        }
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) -> Result<(), SceneError> {
        if !transform.is_finite() {
            return Err(SceneError::NonFiniteTransform);
        }
        self.transform = transform;
        Ok(())
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Parent the viewing camera to the scene root, so it turns with the
    /// root transform and the content appears still on screen.
    pub fn attach_camera_to_root(&mut self) {
        self.camera_on_root = true;
    }

    pub fn camera_on_root(&self) -> bool {
        self.camera_on_root
    }

    // --- Geometry ---

    pub fn add_geometry(&mut self, mesh: MeshData) -> GeometryId {
        let id = GeometryId(self.allocate());
        tracing::debug!(id = id.0, triangles = mesh.triangle_count(), "geometry added");
        self.geometries.insert(id, Arc::new(mesh));
        self.events.push(SceneEvent::GeometryAdded(id));
        id
    }

    /// Swap the mesh behind `id`; every node using it picks up the change.
    pub fn replace_geometry(&mut self, id: GeometryId, mesh: MeshData) -> Result<(), SceneError> {
        let slot = self
            .geometries
            .get_mut(&id)
            .ok_or(SceneError::UnknownGeometry(id))?;
        *slot = Arc::new(mesh);
        self.events.push(SceneEvent::GeometryReplaced(id));
        Ok(())
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Arc<MeshData>> {
        self.geometries.get(&id)
    }

    pub fn geometries(&self) -> &BTreeMap<GeometryId, Arc<MeshData>> {
        &self.geometries
    }

    // --- Materials ---

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.allocate());
        self.materials.insert(id, material);
        self.events.push(SceneEvent::MaterialAdded(id));
        id
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn materials(&self) -> &BTreeMap<MaterialId, Material> {
        &self.materials
    }

    /// Replace a material's parameters. No event is logged when nothing changed.
    pub fn set_material(&mut self, id: MaterialId, material: Material) -> Result<(), SceneError> {
        let slot = self
            .materials
            .get_mut(&id)
            .ok_or(SceneError::UnknownMaterial(id))?;
        if *slot != material {
            *slot = material;
            self.events.push(SceneEvent::MaterialChanged(id));
        }
        Ok(())
    }

    // --- Textures ---

    pub fn add_texture(&mut self, path: impl Into<String>, options: TextureOptions) -> TextureId {
        let id = TextureId(self.allocate());
        self.textures.insert(
            id,
            TextureSlot {
                path: path.into(),
                options,
                image: None,
            },
        );
        self.events.push(SceneEvent::TextureAdded(id));
        id
    }

    /// Attach decoded pixels to a texture slot. Returns false for unknown ids.
    pub fn set_texture_image(&mut self, id: TextureId, image: Arc<ImageData>) -> bool {
        let Some(slot) = self.textures.get_mut(&id) else {
            return false;
        };
        slot.image = Some(image);
        self.events.push(SceneEvent::TextureLoaded(id));
        true
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureSlot> {
        self.textures.get(&id)
    }

    pub fn textures(&self) -> &BTreeMap<TextureId, TextureSlot> {
        &self.textures
    }

    // --- Nodes ---

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        geometry: GeometryId,
        material: MaterialId,
        transform: Transform,
    ) -> Result<NodeId, SceneError> {
        if !self.geometries.contains_key(&geometry) {
            return Err(SceneError::UnknownGeometry(geometry));
        }
        if !self.materials.contains_key(&material) {
            return Err(SceneError::UnknownMaterial(material));
        }
        if !transform.is_finite() {
            return Err(SceneError::NonFiniteTransform);
        }
        let id = NodeId(self.allocate());
        self.nodes.insert(
            id,
            Node {
                name: name.into(),
                geometry,
                material,
                transform,
                visible: true,
            },
        );
        self.events.push(SceneEvent::NodeAdded(id));
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Update a node's transform. Transforms are read every frame, so no
    /// event is logged.
    pub fn set_node_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError> {
        if !transform.is_finite() {
            return Err(SceneError::NonFiniteTransform);
        }
        let node = self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))?;
        node.transform = transform;
        Ok(())
    }

    pub fn set_node_visible(&mut self, id: NodeId, visible: bool) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))?;
        node.visible = visible;
        Ok(())
    }

    // --- Lights ---

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MaterialKind;
    use glam::Vec3;
    use vista_geometry::cuboid;

    fn scene_with_box() -> (Scene, GeometryId, MaterialId) {
        let mut scene = Scene::new();
        let geometry = scene.add_geometry(cuboid(1.0, 1.0, 1.0));
        let material = scene.add_material(Material::new(MaterialKind::Basic));
        (scene, geometry, material)
    }

    #[test]
    fn scene_starts_empty() {
        let scene = Scene::new();
        assert_eq!(scene.node_count(), 0);
        assert!(scene.events().is_empty());
        assert_eq!(scene.background(), Color::BLACK);
    }

    #[test]
    fn structural_changes_are_logged_in_order() {
        let (mut scene, geometry, material) = scene_with_box();
        let node = scene
            .add_node("box", geometry, material, Transform::default())
            .unwrap();
        let tex = scene.add_texture("/textures/a.png", TextureOptions::default());
        assert!(scene.set_texture_image(tex, Arc::new(ImageData::solid_color(1, 1, [0; 4]))));

        assert_eq!(
            scene.drain_events(),
            vec![
                SceneEvent::GeometryAdded(geometry),
                SceneEvent::MaterialAdded(material),
                SceneEvent::NodeAdded(node),
                SceneEvent::TextureAdded(tex),
                SceneEvent::TextureLoaded(tex),
            ]
        );
        assert!(scene.events().is_empty());
    }

    #[test]
    fn add_node_validates_references() {
        let (mut scene, geometry, material) = scene_with_box();
        assert!(matches!(
            scene.add_node("x", GeometryId(999), material, Transform::default()),
            Err(SceneError::UnknownGeometry(_))
        ));
        assert!(matches!(
            scene.add_node("x", geometry, MaterialId(999), Transform::default()),
            Err(SceneError::UnknownMaterial(_))
        ));
        let bad = Transform::from_position(Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(matches!(
            scene.add_node("x", geometry, material, bad),
            Err(SceneError::NonFiniteTransform)
        ));
    }

    #[test]
    fn transform_updates_do_not_log() {
        let (mut scene, geometry, material) = scene_with_box();
        let node = scene
            .add_node("box", geometry, material, Transform::default())
            .unwrap();
        scene.drain_events();
        let moved = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        scene.set_node_transform(node, moved).unwrap();
        assert_eq!(scene.node(node).unwrap().transform, moved);
        assert!(scene.events().is_empty());
        assert!(scene.set_node_transform(node, Transform {
            scale: Vec3::INFINITY,
            ..moved
        })
        .is_err());
    }

    #[test]
    fn unchanged_material_is_not_logged() {
        let (mut scene, _, material) = scene_with_box();
        scene.drain_events();
        let same = scene.material(material).unwrap().clone();
        scene.set_material(material, same.clone()).unwrap();
        assert!(scene.events().is_empty());

        let mut changed = same;
        changed.opacity = 0.5;
        scene.set_material(material, changed).unwrap();
        assert_eq!(scene.events(), &[SceneEvent::MaterialChanged(material)]);
    }

    #[test]
    fn replace_geometry_keeps_id() {
        let (mut scene, geometry, _) = scene_with_box();
        scene.drain_events();
        scene.replace_geometry(geometry, cuboid(2.0, 2.0, 2.0)).unwrap();
        let bounds = scene.geometry(geometry).unwrap().bounding_box().unwrap();
        assert!(bounds.size().abs_diff_eq(Vec3::splat(2.0), 1e-6));
        assert_eq!(scene.events(), &[SceneEvent::GeometryReplaced(geometry)]);
        assert!(scene.replace_geometry(GeometryId(42), MeshData::default()).is_err());
    }

    #[test]
    fn camera_starts_detached_from_root() {
        let mut scene = Scene::new();
        assert!(!scene.camera_on_root());
        scene.attach_camera_to_root();
        assert!(scene.camera_on_root());
    }

    fn named_scene() -> Scene {
        let (mut scene, geometry, material) = scene_with_box();
        for name in ["sphere", "plane", "torus", "a", "b", "c", "d", "e"] {
            scene
                .add_node(name, geometry, material, Transform::default())
                .unwrap();
        }
        scene
    }

    #[test]
    fn nodes_iterate_in_insertion_order() {
        let names = |scene: &Scene| -> Vec<String> {
            scene.nodes().values().map(|n| n.name.clone()).collect()
        };
        let first = names(&named_scene());
        assert_eq!(first, ["sphere", "plane", "torus", "a", "b", "c", "d", "e"]);
        assert_eq!(first, names(&named_scene()));
    }
}
