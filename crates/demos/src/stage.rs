use crate::{Demo, DemoError};
use std::path::PathBuf;
use std::time::Duration;
use vista_assets::{AssetLoader, LoadResult};
use vista_scene::{Clock, Scene};
use vista_tools::DebugPanel;

/// Runs one demo: owns its scene, asset loader, clock and debug panel.
pub struct Stage {
    demo: Box<dyn Demo>,
    scene: Scene,
    loader: AssetLoader,
    clock: Clock,
    panel: DebugPanel,
    failed_assets: usize,
}

impl Stage {
    /// Set the demo up against assets under `assets_root`. Loads start in
    /// the background; the scene is usable immediately.
    pub fn new(mut demo: Box<dyn Demo>, assets_root: impl Into<PathBuf>) -> Result<Self, DemoError> {
        let mut scene = Scene::new();
        let mut loader = AssetLoader::new(assets_root);
        demo.setup(&mut scene, &mut loader)?;
        let panel = DebugPanel::new(demo.tweaks());
        tracing::info!(
            demo = demo.name(),
            root = %loader.root().display(),
            nodes = scene.node_count(),
            pending = loader.pending(),
            "stage ready"
        );
        Ok(Self {
            demo,
            scene,
            loader,
            clock: Clock::new(),
            panel,
            failed_assets: 0,
        })
    }

    pub fn demo_name(&self) -> &'static str {
        self.demo.name()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn panel(&self) -> &DebugPanel {
        &self.panel
    }

    pub fn toggle_panel(&mut self) -> bool {
        self.panel.toggle()
    }

    /// Normalise a tweak value, forward it to the demo, then store it on the
    /// panel. Returns the applied value, or `None` when nothing changed. The
    /// panel keeps its old value if the demo rejects the new one.
    pub fn set_tweak(&mut self, key: &str, value: f32) -> Result<Option<f32>, DemoError> {
        let Some(current) = self.panel.tweak(key) else {
            return Err(DemoError::UnknownTweak(key.to_string()));
        };
        let mut candidate = current.clone();
        if !candidate.set(value) {
            return Ok(None);
        }
        let applied = candidate.value();
        self.demo.apply_tweak(&mut self.scene, key, applied)?;
        self.panel.set(key, applied);
        tracing::debug!(key, value = applied, "tweak applied");
        Ok(Some(applied))
    }

    /// Hand finished loads to the demo. Returns how many were consumed.
    /// A load the demo cannot take counts as failed and the rest still go
    /// through.
    pub fn pump_assets(&mut self) -> Result<usize, DemoError> {
        let results = self.loader.poll();
        self.deliver(results)
    }

    /// Block until every queued load has finished or `timeout` passes.
    pub fn wait_for_assets(&mut self, timeout: Duration) -> Result<usize, DemoError> {
        let results = self.loader.wait(timeout)?;
        self.deliver(results)
    }

    fn deliver(&mut self, results: Vec<LoadResult>) -> Result<usize, DemoError> {
        let mut consumed = 0;
        for LoadResult { handle, path, result } in results {
            match result {
                Ok(asset) => match self.demo.asset_loaded(&mut self.scene, handle, asset) {
                    Ok(true) => consumed += 1,
                    Ok(false) => tracing::debug!(%path, "no one was waiting on asset"),
                    Err(e) => {
                        tracing::warn!(%path, error = %e, "demo rejected loaded asset");
                        self.failed_assets += 1;
                        self.demo.asset_failed(handle);
                    }
                },
                Err(_) => {
                    self.failed_assets += 1;
                    self.demo.asset_failed(handle);
                }
            }
        }
        Ok(consumed)
    }

    pub fn pending_assets(&self) -> usize {
        self.loader.pending()
    }

    pub fn failed_assets(&self) -> usize {
        self.failed_assets
    }

    /// Pose the scene for the current wall-clock time. Returns elapsed seconds.
    pub fn tick(&mut self) -> Result<f32, DemoError> {
        let elapsed = self.clock.elapsed();
        self.advance(elapsed)?;
        Ok(elapsed)
    }

    /// Pose the scene for `elapsed` seconds since start.
    pub fn advance(&mut self, elapsed: f32) -> Result<(), DemoError> {
        self.demo.update(&mut self.scene, elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MaterialsDemo, TextDemo};
    use vista_assets::{AssetHandle, ImageData, LoadedAsset};
    use vista_scene::{MaterialKind, SceneError};
    use vista_tools::Tweak;

    /// Loads two textures and refuses the first. Its one tweak rejects
    /// values above one half.
    #[derive(Default)]
    struct PickyDemo {
        refused: Option<AssetHandle>,
        gain: f32,
        failed: Vec<AssetHandle>,
    }

    impl Demo for PickyDemo {
        fn name(&self) -> &'static str {
            "picky"
        }

        fn setup(&mut self, _scene: &mut Scene, loader: &mut AssetLoader) -> Result<(), DemoError> {
            self.refused = Some(loader.load_texture("/textures/a.png"));
            loader.load_texture("/textures/b.png");
            Ok(())
        }

        fn update(&mut self, _scene: &mut Scene, _elapsed: f32) -> Result<(), DemoError> {
            Ok(())
        }

        fn tweaks(&self) -> Vec<Tweak> {
            vec![Tweak::new("gain", 0.2, 0.0, 1.0, 0.1)]
        }

        fn apply_tweak(&mut self, _scene: &mut Scene, _key: &str, value: f32) -> Result<(), DemoError> {
            if value > 0.5 {
                return Err(SceneError::NonFiniteTransform.into());
            }
            self.gain = value;
            Ok(())
        }

        fn asset_loaded(&mut self, _scene: &mut Scene, handle: AssetHandle, _asset: LoadedAsset) -> Result<bool, DemoError> {
            if Some(handle) == self.refused {
                return Err(SceneError::NonFiniteTransform.into());
            }
            Ok(true)
        }

        fn asset_failed(&mut self, handle: AssetHandle) {
            self.failed.push(handle);
        }
    }

    fn write_png(root: &std::path::Path, web_path: &str) {
        let path = root.join(web_path.trim_start_matches('/'));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let pixels = ImageData::solid_color(2, 2, [200, 100, 50, 255]);
        image::save_buffer(&path, &pixels.data, 2, 2, image::ColorType::Rgba8).unwrap();
    }

    #[test]
    fn missing_assets_keep_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let mut stage = Stage::new(Box::new(MaterialsDemo::default()), dir.path()).unwrap();
        assert_eq!(stage.pending_assets(), 7);

        let consumed = stage.wait_for_assets(Duration::from_secs(10)).unwrap();
        assert_eq!(consumed, 0);
        assert_eq!(stage.failed_assets(), 7);
        assert_eq!(stage.pending_assets(), 0);
        assert!(stage.scene().textures().values().all(|t| t.image.is_none()));
        assert_eq!(stage.scene().node_count(), 3);
    }

    #[test]
    fn loaded_textures_reach_the_scene() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "/textures/matcaps/3.png");
        let demo = MaterialsDemo::new(MaterialKind::Matcap);
        let mut stage = Stage::new(Box::new(demo), dir.path()).unwrap();

        assert_eq!(stage.wait_for_assets(Duration::from_secs(10)).unwrap(), 1);
        assert_eq!(stage.failed_assets(), 0);
        let slot = stage.scene().textures().values().next().unwrap();
        assert_eq!(slot.image.as_ref().map(|i| (i.width, i.height)), Some((2, 2)));
    }

    #[test]
    fn tweaks_go_through_the_panel() {
        let dir = tempfile::tempdir().unwrap();
        let mut stage = Stage::new(Box::new(MaterialsDemo::default()), dir.path()).unwrap();
        assert_eq!(stage.panel().tweaks().len(), 2);

        assert_eq!(stage.set_tweak("metalness", 5.0).unwrap(), Some(1.0));
        assert_eq!(stage.set_tweak("metalness", 1.0).unwrap(), None);
        let material = stage.scene().materials().values().next().unwrap();
        assert_eq!(material.scalar("metalness"), Some(1.0));
        assert!(matches!(stage.set_tweak("size", 0.3), Err(DemoError::UnknownTweak(_))));
    }

    #[test]
    fn rejected_asset_does_not_drop_the_others() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "/textures/a.png");
        write_png(dir.path(), "/textures/b.png");
        let mut stage = Stage::new(Box::<PickyDemo>::default(), dir.path()).unwrap();
        assert_eq!(stage.pending_assets(), 2);

        assert_eq!(stage.wait_for_assets(Duration::from_secs(10)).unwrap(), 1);
        assert_eq!(stage.failed_assets(), 1);
        assert_eq!(stage.pending_assets(), 0);
    }

    #[test]
    fn rejected_tweak_leaves_the_panel_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut stage = Stage::new(Box::<PickyDemo>::default(), dir.path()).unwrap();

        assert!(stage.set_tweak("gain", 0.9).is_err());
        assert_eq!(stage.panel().get("gain"), Some(0.2));

        assert_eq!(stage.set_tweak("gain", 0.4).unwrap(), Some(0.4));
        assert_eq!(stage.panel().get("gain"), Some(0.4));
        assert_eq!(stage.set_tweak("gain", 0.41).unwrap(), None);
    }

    #[test]
    fn panel_toggles() {
        let dir = tempfile::tempdir().unwrap();
        let mut stage = Stage::new(Box::new(TextDemo::new(3)), dir.path()).unwrap();
        assert_eq!(stage.demo_name(), "text");
        assert!(stage.panel().visible());
        assert!(!stage.toggle_panel());
        assert!(stage.toggle_panel());
    }

    #[test]
    fn advance_poses_by_elapsed_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut stage = Stage::new(Box::new(TextDemo::new(3)), dir.path()).unwrap();
        stage.advance(2.0).unwrap();
        assert!((stage.scene().transform().rotation.x - 0.3).abs() < 1e-6);
        let elapsed = stage.tick().unwrap();
        assert!(elapsed >= 0.0);
        assert!((stage.scene().transform().rotation.y - elapsed * 0.15).abs() < 1e-6);
    }
}
