use crate::render::backend::{PixelFormat, TextureBackend, TextureId, TextureUsage};
use crate::render::ViewSize;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Texture backend on top of a host-owned wgpu device and queue.
///
/// The host resolves [`TextureId`]s through [`WgpuTextureBackend::texture_view`] when it
/// builds its bind groups for the quad.
pub struct WgpuTextureBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    textures: HashMap<TextureId, (wgpu::Texture, wgpu::TextureView, ViewSize)>,
    next_id: u64,
}

impl WgpuTextureBackend {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            textures: HashMap::new(),
            next_id: 0,
        }
    }

    /// Largest 2D texture the device can allocate.
    pub fn max_texture_size(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    pub fn texture_view(&self, id: TextureId) -> Option<&wgpu::TextureView> {
        self.textures.get(&id).map(|(_, view, _)| view)
    }
}

fn to_wgpu_format(format: PixelFormat) -> wgpu::TextureFormat {
    match format {
        PixelFormat::Bgra8 => wgpu::TextureFormat::Bgra8Unorm,
        PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
    }
}

impl TextureBackend for WgpuTextureBackend {
    fn name(&self) -> &str {
        "WgpuTextureBackend"
    }

    fn create_texture(&mut self, size: ViewSize, format: PixelFormat, usage: TextureUsage) -> Result<TextureId> {
        if size.width > self.max_texture_size() || size.height > self.max_texture_size() {
            return Err(anyhow!("{:?} exceeds the device texture limit", size));
        }

        let usage = match usage {
            TextureUsage::WriteOnly => wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("webview-frame"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: to_wgpu_format(format),
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.next_id += 1;
        let id = TextureId(self.next_id);
        self.textures.insert(id, (texture, view, size));
        Ok(id)
    }

    fn upload(&mut self, id: TextureId, size: ViewSize, pixels: &[u8]) -> Result<()> {
        let (texture, _, texture_size) = self
            .textures
            .get(&id)
            .ok_or_else(|| anyhow!("unknown texture {:?}", id))?;

        if *texture_size != size {
            return Err(anyhow!("upload of {:?} into {:?} texture", size, texture_size));
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.width * 4),
                rows_per_image: Some(size.height),
            },
            wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
        );

        Ok(())
    }

    fn dispose(&mut self, id: TextureId) {
        if let Some((texture, _, _)) = self.textures.remove(&id) {
            texture.destroy();
        }
    }
}
