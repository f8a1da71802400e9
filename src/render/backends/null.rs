use crate::render::backend::{PixelFormat, TextureBackend, TextureId, TextureUsage};
use crate::render::ViewSize;
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;

/// A texture as tracked by the [`NullTextureBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NullTexture {
    pub size: ViewSize,
    pub format: PixelFormat,
    /// Number of uploads into this texture.
    pub uploads: u64,
    /// Size of the last upload.
    pub last_upload: Option<ViewSize>,
}

/// Texture backend that keeps bookkeeping only and never touches a GPU.
#[derive(Debug, Default)]
pub struct NullTextureBackend {
    textures: BTreeMap<TextureId, NullTexture>,
    next_id: u64,
    created: u64,
    disposed: u64,
    fail_create: bool,
}

impl NullTextureBackend {
    /// Creates a new instance of the null backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `create_texture` fail.
    pub fn fail_create(&mut self, fail: bool) {
        self.fail_create = fail;
    }

    pub fn texture(&self, id: TextureId) -> Option<&NullTexture> {
        self.textures.get(&id)
    }

    /// Number of live textures.
    pub fn live(&self) -> usize {
        self.textures.len()
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn disposed(&self) -> u64 {
        self.disposed
    }

    /// Total number of uploads over all live textures.
    pub fn uploads(&self) -> u64 {
        self.textures.values().map(|t| t.uploads).sum()
    }
}

impl TextureBackend for NullTextureBackend {
    fn name(&self) -> &str {
        "NullTextureBackend"
    }

    fn create_texture(&mut self, size: ViewSize, format: PixelFormat, _usage: TextureUsage) -> Result<TextureId> {
        if self.fail_create {
            return Err(anyhow!("texture creation disabled"));
        }

        self.next_id += 1;
        let id = TextureId(self.next_id);
        self.textures.insert(
            id,
            NullTexture {
                size,
                format,
                uploads: 0,
                last_upload: None,
            },
        );
        self.created += 1;
        Ok(id)
    }

    fn upload(&mut self, id: TextureId, size: ViewSize, pixels: &[u8]) -> Result<()> {
        let texture = self
            .textures
            .get_mut(&id)
            .ok_or_else(|| anyhow!("unknown texture {:?}", id))?;

        if texture.size != size {
            return Err(anyhow!("upload of {:?} into {:?} texture", size, texture.size));
        }
        if pixels.len() != size.frame_len() {
            return Err(anyhow!("upload of {} bytes, expected {}", pixels.len(), size.frame_len()));
        }

        texture.uploads += 1;
        texture.last_upload = Some(size);
        Ok(())
    }

    fn dispose(&mut self, id: TextureId) {
        if self.textures.remove(&id).is_some() {
            self.disposed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_upload_dispose() {
        let mut b = NullTextureBackend::new();
        let size = ViewSize::new(2, 2);
        let id = b.create_texture(size, PixelFormat::Bgra8, TextureUsage::WriteOnly).unwrap();

        b.upload(id, size, &[0u8; 16]).unwrap();
        assert_eq!(b.texture(id).unwrap().uploads, 1);
        assert!(b.upload(id, ViewSize::new(1, 1), &[0u8; 4]).is_err());
        assert!(b.upload(id, size, &[0u8; 4]).is_err());

        b.dispose(id);
        b.dispose(id);
        assert_eq!(b.live(), 0);
        assert_eq!(b.disposed(), 1);
    }

    #[test]
    fn creation_can_fail() {
        let mut b = NullTextureBackend::new();
        b.fail_create(true);
        assert!(b
            .create_texture(ViewSize::new(1, 1), PixelFormat::Bgra8, TextureUsage::WriteOnly)
            .is_err());
        assert_eq!(b.created(), 0);
    }
}
