use crate::RenderError;
use vista_assets::{FilterMode, ImageData, TextureOptions};

/// A sampled texture resident on the GPU.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub mip_levels: u32,
}

impl GpuTexture {
    /// Upload `image` with the sampling behaviour in `options`. Rows are
    /// flipped first when `flip_y` is set so uv (0, 0) lands on the bottom
    /// left texel.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &ImageData,
        options: &TextureOptions,
        label: &str,
    ) -> Result<Self, RenderError> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.width == 0 || image.height == 0 || image.data.len() != expected {
            return Err(RenderError::ImageSize {
                width: image.width,
                height: image.height,
                len: image.data.len(),
            });
        }

        let base = if options.flip_y { flip_rows(image) } else { image.clone() };
        let levels = if options.generate_mipmaps {
            base.mip_chain()
        } else {
            vec![base]
        };
        let mip_levels = levels.len() as u32;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(image.width, image.height),
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (level, mip) in levels.iter().enumerate() {
            write_level(queue, &texture, level as u32, mip);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&sampler_descriptor(options, label));
        tracing::debug!(label, width = image.width, height = image.height, mip_levels, "texture uploaded");
        Ok(Self {
            texture,
            view,
            sampler,
            mip_levels,
        })
    }

    /// 1×1 placeholder bound while a texture is missing or still loading.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4], label: &str) -> Self {
        let image = ImageData::solid_color(1, 1, rgba);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(1, 1),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_level(queue, &texture, 0, &image);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&sampler_descriptor(&TextureOptions::default(), label));
        Self {
            texture,
            view,
            sampler,
            mip_levels: 1,
        }
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn write_level(queue: &wgpu::Queue, texture: &wgpu::Texture, mip_level: u32, image: &ImageData) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        extent(image.width, image.height),
    );
}

fn filter(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

/// Clamp-to-edge sampler honouring the option filters. Mipmapped textures
/// blend between levels.
pub fn sampler_descriptor<'a>(options: &TextureOptions, label: &'a str) -> wgpu::SamplerDescriptor<'a> {
    wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter(options.mag_filter),
        min_filter: filter(options.min_filter),
        mipmap_filter: if options.generate_mipmaps {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        },
        ..Default::default()
    }
}

/// Copy of `image` with the row order reversed.
pub fn flip_rows(image: &ImageData) -> ImageData {
    let stride = image.width as usize * 4;
    let data = if stride == 0 {
        Vec::new()
    } else {
        image.data.chunks_exact(stride).rev().flatten().copied().collect()
    };
    ImageData {
        width: image.width,
        height: image.height,
        data,
    }
}
