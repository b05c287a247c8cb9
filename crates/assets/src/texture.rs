use crate::AssetError;
use image::RgbaImage;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decoded RGBA8 image ready for GPU upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows, top row first.
    pub data: Vec<u8>,
}

impl ImageData {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let image = Self::from_bytes(&bytes)?;
        tracing::debug!(path = %path.display(), width = image.width, height = image.height, "decoded image");
        Ok(image)
    }

    /// Decode PNG or JPEG data; the format is sniffed from the content.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            data: rgba.into_raw(),
        })
    }

    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: color.repeat(pixels),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let p = self.data.get(offset..offset + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Number of levels in a full mip chain down to 1×1.
    pub fn mip_level_count(&self) -> u32 {
        32 - self.width.max(self.height).max(1).leading_zeros()
    }

    /// Full mip chain, level 0 first. Each level halves both dimensions
    /// (never below 1) with a triangle filter.
    pub fn mip_chain(&self) -> Vec<ImageData> {
        let mut levels = vec![self.clone()];
        let Some(mut current) = RgbaImage::from_raw(self.width, self.height, self.data.clone()) else {
            tracing::warn!(width = self.width, height = self.height, "image buffer size mismatch, skipping mips");
            return levels;
        };
        for _ in 1..self.mip_level_count() {
            let (w, h) = ((current.width() / 2).max(1), (current.height() / 2).max(1));
            current = image::imageops::resize(&current, w, h, FilterType::Triangle);
            levels.push(ImageData {
                width: w,
                height: h,
                data: current.as_raw().clone(),
            });
        }
        levels
    }
}

/// Texel filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

/// How a texture is sampled once uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureOptions {
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub generate_mipmaps: bool,
    /// Sample with v measured from the bottom row, matching uv conventions
    /// where v = 1 is the top edge.
    pub flip_y: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            generate_mipmaps: true,
            flip_y: true,
        }
    }
}

impl TextureOptions {
    /// Hard-edged lookup table sampling (toon gradients).
    pub fn nearest() -> Self {
        Self {
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            generate_mipmaps: false,
            ..Self::default()
        }
    }
}
