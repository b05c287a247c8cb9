use crate::{AssetError, Font, ImageData};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

/// Ticket for an in-flight or completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetHandle(pub u64);

/// A successfully decoded asset.
#[derive(Debug, Clone)]
pub enum LoadedAsset {
    Texture(Arc<ImageData>),
    Font(Arc<Font>),
}

/// Completion message for one request.
#[derive(Debug)]
pub struct LoadResult {
    pub handle: AssetHandle,
    /// The web-style path the asset was requested with.
    pub path: String,
    pub result: Result<LoadedAsset, AssetError>,
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Texture,
    Font,
}

/// Loads assets on background threads, one thread per request.
///
/// Results are collected with [`AssetLoader::poll`] (non-blocking, once per
/// frame) or [`AssetLoader::wait`] (blocking, for headless use).
pub struct AssetLoader {
    root: PathBuf,
    next_handle: u64,
    pending: usize,
    tx: Sender<LoadResult>,
    rx: Receiver<LoadResult>,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            root: root.into(),
            next_handle: 1,
            pending: 0,
            tx,
            rx,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a web-style path onto the asset root. A leading `/` is stripped
    /// so `/textures/a.png` resolves to `<root>/textures/a.png`.
    pub fn resolve(&self, web_path: &str) -> PathBuf {
        let relative = web_path.trim_start_matches('/');
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    pub fn load_texture(&mut self, web_path: &str) -> AssetHandle {
        self.spawn(web_path, Kind::Texture)
    }

    pub fn load_font(&mut self, web_path: &str) -> AssetHandle {
        self.spawn(web_path, Kind::Font)
    }

    /// Requests issued but not yet returned by `poll` or `wait`.
    pub fn pending(&self) -> usize {
        self.pending
    }

    fn spawn(&mut self, web_path: &str, kind: Kind) -> AssetHandle {
        let handle = AssetHandle(self.next_handle);
        self.next_handle += 1;
        self.pending += 1;

        let file = self.resolve(web_path);
        let path = web_path.to_string();
        let tx = self.tx.clone();
        tracing::debug!(handle = handle.0, path = %path, file = %file.display(), ?kind, "queued asset load");

        let worker = {
            let path = path.clone();
            move || {
                let result = match kind {
                    Kind::Texture => ImageData::from_file(&file).map(|img| LoadedAsset::Texture(Arc::new(img))),
                    Kind::Font => Font::from_file(&file).map(|font| LoadedAsset::Font(Arc::new(font))),
                };
                // The receiver may be gone if the loader was dropped mid-flight.
                let _ = tx.send(LoadResult { handle, path, result });
            }
        };

        if let Err(err) = std::thread::Builder::new()
            .name(format!("asset-{}", handle.0))
            .spawn(worker)
        {
            let _ = self.tx.send(LoadResult {
                handle,
                path,
                result: Err(AssetError::Io(err)),
            });
        }
        handle
    }

    /// Drain every completed load without blocking.
    pub fn poll(&mut self) -> Vec<LoadResult> {
        let done: Vec<LoadResult> = self.rx.try_iter().collect();
        self.pending = self.pending.saturating_sub(done.len());
        for item in &done {
            log_completion(item);
        }
        done
    }

    /// Block until every pending load completes or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Result<Vec<LoadResult>, AssetError> {
        let deadline = Instant::now() + timeout;
        let mut done = Vec::new();
        while self.pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(item) => {
                    self.pending -= 1;
                    log_completion(&item);
                    done.push(item);
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(pending = self.pending, "timed out waiting for assets");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => return Err(AssetError::Disconnected),
            }
        }
        Ok(done)
    }
}

fn log_completion(item: &LoadResult) {
    match &item.result {
        Ok(LoadedAsset::Texture(img)) => {
            tracing::info!(path = %item.path, width = img.width, height = img.height, "texture loaded")
        }
        Ok(LoadedAsset::Font(font)) => {
            tracing::info!(path = %item.path, family = font.family_name(), "font loaded")
        }
        Err(err) => tracing::warn!(path = %item.path, error = %err, "asset failed to load"),
    }
}
