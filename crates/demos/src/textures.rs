use std::collections::BTreeMap;
use std::sync::Arc;
use vista_assets::{AssetHandle, AssetLoader, ImageData, TextureOptions};
use vista_scene::{Scene, TextureId};

/// Texture loads a demo has issued, keyed by loader handle.
#[derive(Debug, Default)]
pub struct TextureRequests {
    pending: BTreeMap<AssetHandle, TextureId>,
}

impl TextureRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture slot in the scene and start loading it.
    pub fn request(
        &mut self,
        scene: &mut Scene,
        loader: &mut AssetLoader,
        path: &str,
        options: TextureOptions,
    ) -> TextureId {
        let id = scene.add_texture(path, options);
        let handle = loader.load_texture(path);
        self.pending.insert(handle, id);
        id
    }

    /// Attach loaded pixels to the slot waiting on `handle`. Returns false
    /// for handles this set did not issue.
    pub fn complete(&mut self, scene: &mut Scene, handle: AssetHandle, image: Arc<ImageData>) -> bool {
        match self.pending.remove(&handle) {
            Some(id) => scene.set_texture_image(id, image),
            None => false,
        }
    }

    /// Stop waiting on `handle`. The slot keeps no image.
    pub fn forget(&mut self, handle: AssetHandle) -> Option<TextureId> {
        self.pending.remove(&handle)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
