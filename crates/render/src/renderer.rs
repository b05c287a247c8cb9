use glam::Vec3;
use std::fmt::Write;
use vista_scene::{Light, MaterialKind, Scene};

/// Camera configuration a frame is rendered from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(1.0, 1.0, 2.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
            aspect: 1.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a view, then produces output.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of a scene, for the CLI and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// List every node instead of a per-geometry count.
    pub verbose: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let root = scene.transform();
        let _ = writeln!(out, "=== Scene ===");
        let _ = writeln!(
            out,
            "Root rotation: ({:.3}, {:.3}, {:.3})",
            root.rotation.x, root.rotation.y, root.rotation.z
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.2}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z, view.fov_degrees, view.aspect
        );
        if scene.camera_on_root() {
            let _ = writeln!(out, "Camera parent: scene root");
        }

        let _ = writeln!(out, "Geometries: {}", scene.geometries().len());
        for (id, mesh) in scene.geometries() {
            let users = scene.nodes().values().filter(|n| n.geometry == *id).count();
            let _ = writeln!(
                out,
                "  geometry#{} vertices={} triangles={} nodes={}",
                id.0,
                mesh.vertex_count(),
                mesh.triangle_count(),
                users
            );
        }

        let _ = writeln!(out, "Materials: {}", scene.materials().len());
        for (id, material) in scene.materials() {
            let _ = write!(out, "  material#{} kind={}", id.0, material.kind);
            match material.kind {
                MaterialKind::Standard { metalness, roughness } => {
                    let _ = write!(out, " metalness={metalness:.3} roughness={roughness:.3}");
                }
                MaterialKind::Phong { shininess, specular } => {
                    let _ = write!(out, " shininess={shininess:.1} specular=#{:06x}", specular.to_hex());
                }
                _ => {}
            }
            if material.transparent {
                let _ = write!(out, " transparent");
            }
            let slots: Vec<&str> = material.textures().map(|(name, _)| name).collect();
            if !slots.is_empty() {
                let _ = write!(out, " textures=[{}]", slots.join(", "));
            }
            let _ = writeln!(out);
        }

        let loaded = scene.textures().values().filter(|t| t.image.is_some()).count();
        let _ = writeln!(out, "Textures: {} ({} loaded)", scene.textures().len(), loaded);
        for slot in scene.textures().values() {
            match &slot.image {
                Some(img) => {
                    let _ = writeln!(out, "  {} {}x{}", slot.path, img.width, img.height);
                }
                None => {
                    let _ = writeln!(out, "  {} (pending)", slot.path);
                }
            }
        }

        let _ = writeln!(out, "Lights: {}", scene.lights().len());
        for light in scene.lights() {
            let c = light.radiance();
            match light {
                Light::Ambient { .. } => {
                    let _ = writeln!(out, "  ambient radiance=({:.2}, {:.2}, {:.2})", c.r, c.g, c.b);
                }
                Light::Point { position, .. } => {
                    let _ = writeln!(
                        out,
                        "  point radiance=({:.2}, {:.2}, {:.2}) at ({:.2}, {:.2}, {:.2})",
                        c.r, c.g, c.b, position.x, position.y, position.z
                    );
                }
            }
        }

        let _ = writeln!(out, "Nodes: {}", scene.node_count());
        if self.verbose {
            for (id, node) in scene.nodes() {
                let t = &node.transform;
                let _ = writeln!(
                    out,
                    "  node#{} {} geometry#{} pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
                    id.0,
                    node.name,
                    node.geometry.0,
                    t.position.x, t.position.y, t.position.z,
                    t.rotation.x, t.rotation.y, t.rotation.z,
                    t.scale.x, t.scale.y, t.scale.z
                );
            }
        }
        tracing::trace!(bytes = out.len(), "rendered scene as text");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vista_assets::{ImageData, TextureOptions};
    use vista_common::Transform;
    use vista_geometry::{cuboid, torus};
    use vista_scene::Material;

    fn sample_scene() -> Scene {
        let mut scene = Scene::new();
        let donut = scene.add_geometry(torus(0.3, 0.2, 20, 45));
        let boxy = scene.add_geometry(cuboid(0.5, 0.5, 0.5));
        let tex = scene.add_texture("/textures/matcaps/4.png", TextureOptions::default());
        let mut material = Material::new(MaterialKind::Matcap);
        material.matcap = Some(tex);
        let material = scene.add_material(material);
        scene.add_node("donut", donut, material, Transform::default()).unwrap();
        scene
            .add_node("box", boxy, material, Transform::from_position(Vec3::new(1.0, 2.0, 3.0)))
            .unwrap();
        scene
    }

    #[test]
    fn summary_lists_resources() {
        let scene = sample_scene();
        let out = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(out.contains("Geometries: 2"));
        assert!(out.contains("triangles=1800"));
        assert!(out.contains("kind=matcap"));
        assert!(out.contains("textures=[matcap]"));
        assert!(out.contains("/textures/matcaps/4.png (pending)"));
        assert!(out.contains("Nodes: 2"));
        assert!(!out.contains("pos="));
    }

    #[test]
    fn verbose_lists_nodes_and_loaded_textures() {
        let mut scene = sample_scene();
        let tex = *scene.textures().keys().next().unwrap();
        scene.set_texture_image(tex, Arc::new(ImageData::solid_color(2, 2, [255; 4])));
        let out = DebugTextRenderer::verbose().render(&scene, &RenderView::default());
        assert!(out.contains("pos=(1.00, 2.00, 3.00)"));
        assert!(out.contains("4.png 2x2"));
        assert!(out.contains("(1 loaded)"));
    }

    #[test]
    fn verbose_listing_is_stable_across_builds() {
        let render = || DebugTextRenderer::verbose().render(&sample_scene(), &RenderView::default());
        let out = render();
        assert_eq!(out, render());
        let donut = out.find("donut geometry#").unwrap();
        let boxy = out.find("box geometry#").unwrap();
        assert!(donut < boxy);
        assert!(!out.contains("Camera parent"));
    }

    #[test]
    fn lights_and_standard_parameters_are_reported() {
        let mut scene = Scene::new();
        scene.add_material(Material::new(MaterialKind::Standard {
            metalness: 0.45,
            roughness: 0.65,
        }));
        scene.add_light(Light::ambient(0xffffff, 0.5));
        scene.add_light(Light::point(0xffffff, 0.5, Vec3::new(2.0, 3.0, 4.0)));
        let out = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(out.contains("metalness=0.450 roughness=0.650"));
        assert!(out.contains("Lights: 2"));
        assert!(out.contains("at (2.00, 3.00, 4.00)"));
    }

    #[test]
    fn render_view_default_matches_demo_camera() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 75.0);
        assert_eq!(view.eye, Vec3::new(1.0, 1.0, 2.0));
    }
}
