use vista_scene::Scene;

/// Read-only queries against a scene for debugging and the debug panel.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &Scene) -> SceneSummary {
        let triangles = scene
            .nodes()
            .values()
            .filter(|n| n.visible)
            .filter_map(|n| scene.geometry(n.geometry))
            .map(|mesh| mesh.triangle_count())
            .sum();
        SceneSummary {
            nodes: scene.node_count(),
            geometries: scene.geometries().len(),
            triangles,
            materials: scene.materials().len(),
            textures: scene.textures().len(),
            textures_loaded: scene.textures().values().filter(|t| t.image.is_some()).count(),
            lights: scene.lights().len(),
            pending_events: scene.events().len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    pub nodes: usize,
    pub geometries: usize,
    /// Triangles submitted per frame across visible nodes.
    pub triangles: usize,
    pub materials: usize,
    pub textures: usize,
    pub textures_loaded: usize,
    pub lights: usize,
    pub pending_events: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} geometries={} triangles={} materials={} textures={}/{} lights={}",
            self.nodes,
            self.geometries,
            self.triangles,
            self.materials,
            self.textures_loaded,
            self.textures,
            self.lights
        )
    }
}
