use crate::platform::Platform;
use crate::render::backend::{
    Canvas, HorizontalAlign, PixelFormat, QuadTexture, TextureBackend, TextureFiltering, TextureId, TextureUsage,
    VerticalAlign,
};
use crate::render::{Color, FrameBuffer, NormalizedRect, ViewSize};

/// Result of [`Compositor::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    /// There is no texture to upload into.
    NoTexture,
    /// The frame buffer has not changed since the last upload.
    Unchanged,
    /// The engine has not painted anything yet.
    Empty,
    /// A frame was uploaded.
    Uploaded(ViewSize),
    /// The buffered frame has a different size than the texture. Nothing was uploaded
    /// and the placeholder is drawn until a matching frame arrives.
    SizeMismatch { frame: ViewSize, texture: ViewSize },
    /// The texture backend refused the upload.
    Failed,
}

/// Turns engine frames into a texture and draws it into the host canvas.
///
/// The texture is owned here and only ever recreated, never resized in place.
pub struct Compositor<B: TextureBackend> {
    backend: B,
    /// Current texture and the size it was created with
    texture: Option<(TextureId, ViewSize)>,
    /// Recreate the texture on the next `ensure_texture`, even when the size matches
    needs_recreate: bool,
    /// Upload on the next `update`, even when the frame generation did not change
    needs_upload: bool,
    /// Frame generation last taken from the frame buffer
    last_generation: Option<u64>,
    /// True when the texture holds a frame of its own size
    has_frame: bool,
}

impl<B: TextureBackend> Compositor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            texture: None,
            needs_recreate: false,
            needs_upload: true,
            last_generation: None,
            has_frame: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current texture id and size.
    pub fn texture(&self) -> Option<(TextureId, ViewSize)> {
        self.texture
    }

    /// True when the next draw shows an engine frame instead of the placeholder.
    pub fn shows_frame(&self) -> bool {
        self.texture.is_some() && self.has_frame
    }

    /// Force the texture to be recreated on the next tick.
    pub fn mark_for_recreate(&mut self) {
        self.needs_recreate = true;
    }

    /// Force a re-upload of the current frame on the next tick, e.g. after the GPU
    /// device was restored and lost its texture contents.
    pub fn request_upload(&mut self) {
        self.needs_upload = true;
    }

    /// Makes sure a texture of `size` exists. Returns true when a new texture was created.
    pub fn ensure_texture(&mut self, size: ViewSize) -> bool {
        let matches = matches!(self.texture, Some((_, s)) if s == size);
        if matches && !self.needs_recreate {
            return false;
        }

        if let Some((old, old_size)) = self.texture.take() {
            log::debug!("compositor: disposing {:?} texture {:?}", old_size, old);
            self.backend.dispose(old);
        }

        self.needs_recreate = false;
        self.needs_upload = true;
        self.has_frame = false;

        match self
            .backend
            .create_texture(size, PixelFormat::Bgra8, TextureUsage::WriteOnly)
        {
            Ok(id) => {
                log::debug!("compositor: created {:?} texture {:?} on {}", size, id, self.backend.name());
                self.texture = Some((id, size));
                true
            }
            Err(e) => {
                log::error!("compositor: cannot create {:?} texture: {}", size, e);
                false
            }
        }
    }

    /// Uploads the latest frame when it changed or an upload was requested.
    ///
    /// The frame is cloned out of the buffer first, so the frame buffer lock is not
    /// held during the upload. A frame whose size differs from the texture is never
    /// uploaded.
    pub fn update(&mut self, frames: &FrameBuffer) -> UploadOutcome {
        let Some((id, texture_size)) = self.texture else {
            return UploadOutcome::NoTexture;
        };

        if !self.needs_upload && self.last_generation == Some(frames.generation()) {
            return UploadOutcome::Unchanged;
        }
        self.needs_upload = false;

        let Some(snapshot) = frames.snapshot() else {
            self.has_frame = false;
            return UploadOutcome::Empty;
        };
        self.last_generation = Some(snapshot.generation);

        if snapshot.size != texture_size {
            log::trace!(
                "compositor: skipping {:?} frame for {:?} texture",
                snapshot.size,
                texture_size
            );
            self.has_frame = false;
            return UploadOutcome::SizeMismatch {
                frame: snapshot.size,
                texture: texture_size,
            };
        }

        match self.backend.upload(id, texture_size, &snapshot.pixels) {
            Ok(()) => {
                self.has_frame = true;
                UploadOutcome::Uploaded(texture_size)
            }
            Err(e) => {
                log::error!("compositor: upload of {:?} frame failed: {}", texture_size, e);
                self.has_frame = false;
                UploadOutcome::Failed
            }
        }
    }

    /// Draws the texture (or the placeholder) into `rect`.
    ///
    /// On a screen canvas the quad is sized to exactly `size` pixels from the top-left
    /// of `rect` and sampled with nearest-neighbour filtering, so every texel lands on
    /// one screen pixel.
    pub fn draw(&self, canvas: &mut dyn Canvas, rect: NormalizedRect, size: ViewSize) {
        let texture = match self.texture {
            Some((id, _)) if self.has_frame => QuadTexture::Texture(id),
            _ => QuadTexture::Placeholder,
        };

        let viewport = canvas.viewport_size();
        if canvas.is_screen() && !viewport.is_empty() {
            let span = (
                size.width as f64 / viewport.width as f64,
                size.height as f64 / viewport.height as f64,
            );
            let fixed = NormalizedRect::from_origin(rect.left_top(), span);

            canvas.push_texture_filtering(TextureFiltering::Point);
            canvas.add_quad(fixed, NormalizedRect::UNIT, texture, Color::WHITE, true);
            canvas.pop_texture_filtering();
        } else {
            canvas.add_quad(rect, NormalizedRect::UNIT, texture, Color::WHITE, true);
        }
    }

    /// Draws the "not supported" notice centered on `rect`.
    pub fn draw_unsupported(&self, canvas: &mut dyn Canvas, rect: NormalizedRect, platform: &Platform) {
        let text = format!("WebView: {} is not supported.", platform);
        canvas.add_text(
            &text,
            rect.center(),
            HorizontalAlign::Center,
            VerticalAlign::Center,
            Color::RED,
        );
    }

    /// Disposes the texture. The next `ensure_texture` creates a fresh one.
    pub fn release(&mut self) {
        if let Some((id, _)) = self.texture.take() {
            self.backend.dispose(id);
        }
        self.has_frame = false;
        self.needs_upload = true;
        self.last_generation = None;
    }
}

impl<B: TextureBackend> Drop for Compositor<B> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::null::NullTextureBackend;
    use crate::render::{DisplayItem, PaintElementType, Point, RenderList};

    fn paint(fb: &FrameBuffer, size: ViewSize) {
        fb.on_engine_paint(PaintElementType::View, &[], &vec![0xAB; size.frame_len()], size.width, size.height)
            .unwrap();
    }

    fn only_quad(list: &RenderList) -> (NormalizedRect, QuadTexture, TextureFiltering) {
        let quads: Vec<_> = list.quads().collect();
        assert_eq!(quads.len(), 1);
        match quads[0] {
            DisplayItem::Quad {
                rect,
                texture,
                filtering,
                ..
            } => (*rect, *texture, *filtering),
            _ => unreachable!(),
        }
    }

    #[test]
    fn creates_texture_once_per_size() {
        let mut c = Compositor::new(NullTextureBackend::new());
        assert!(c.ensure_texture(ViewSize::new(64, 32)));
        assert!(!c.ensure_texture(ViewSize::new(64, 32)));
        assert!(c.ensure_texture(ViewSize::new(32, 32)));

        assert_eq!(c.backend().created(), 2);
        assert_eq!(c.backend().disposed(), 1);
        assert_eq!(c.backend().live(), 1);
    }

    #[test]
    fn recreate_flag_forces_new_texture() {
        let mut c = Compositor::new(NullTextureBackend::new());
        c.ensure_texture(ViewSize::new(8, 8));
        let (first, _) = c.texture().unwrap();

        c.mark_for_recreate();
        assert!(c.ensure_texture(ViewSize::new(8, 8)));
        let (second, _) = c.texture().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn uploads_matching_frame_only_when_changed() {
        let mut c = Compositor::new(NullTextureBackend::new());
        let fb = FrameBuffer::new();
        let size = ViewSize::new(4, 4);

        assert_eq!(c.update(&fb), UploadOutcome::NoTexture);
        c.ensure_texture(size);
        assert_eq!(c.update(&fb), UploadOutcome::Empty);

        paint(&fb, size);
        assert_eq!(c.update(&fb), UploadOutcome::Uploaded(size));
        assert_eq!(c.update(&fb), UploadOutcome::Unchanged);
        assert!(c.shows_frame());

        c.request_upload();
        assert_eq!(c.update(&fb), UploadOutcome::Uploaded(size));
        assert_eq!(c.backend().uploads(), 2);
    }

    #[test]
    fn mismatched_frame_is_never_uploaded() {
        let mut c = Compositor::new(NullTextureBackend::new());
        let fb = FrameBuffer::new();

        // Stale 800x600 frame, texture already at the new 400x300 size
        paint(&fb, ViewSize::new(800, 600));
        c.ensure_texture(ViewSize::new(400, 300));

        assert_eq!(
            c.update(&fb),
            UploadOutcome::SizeMismatch {
                frame: ViewSize::new(800, 600),
                texture: ViewSize::new(400, 300)
            }
        );
        assert_eq!(c.backend().uploads(), 0);
        assert!(!c.shows_frame());

        let mut list = RenderList::new(ViewSize::new(800, 600), false);
        c.draw(&mut list, NormalizedRect::UNIT, ViewSize::new(400, 300));
        assert_eq!(only_quad(&list).1, QuadTexture::Placeholder);

        // Matching paint arrives
        paint(&fb, ViewSize::new(400, 300));
        assert_eq!(c.update(&fb), UploadOutcome::Uploaded(ViewSize::new(400, 300)));
        let (id, _) = c.texture().unwrap();

        list.clear();
        c.draw(&mut list, NormalizedRect::UNIT, ViewSize::new(400, 300));
        assert_eq!(only_quad(&list).1, QuadTexture::Texture(id));
    }

    #[test]
    fn new_texture_shows_placeholder_until_upload() {
        let mut c = Compositor::new(NullTextureBackend::new());
        let fb = FrameBuffer::new();
        let size = ViewSize::new(4, 4);
        c.ensure_texture(size);
        paint(&fb, size);
        c.update(&fb);
        assert!(c.shows_frame());

        c.mark_for_recreate();
        c.ensure_texture(size);
        assert!(!c.shows_frame());

        // The unchanged frame is uploaded again into the fresh texture
        assert_eq!(c.update(&fb), UploadOutcome::Uploaded(size));
        assert!(c.shows_frame());
    }

    #[test]
    fn texture_creation_failure_draws_placeholder() {
        let mut backend = NullTextureBackend::new();
        backend.fail_create(true);
        let mut c = Compositor::new(backend);

        assert!(!c.ensure_texture(ViewSize::new(4, 4)));
        assert!(c.texture().is_none());

        let mut list = RenderList::new(ViewSize::new(4, 4), false);
        c.draw(&mut list, NormalizedRect::UNIT, ViewSize::new(4, 4));
        assert_eq!(only_quad(&list).1, QuadTexture::Placeholder);
    }

    #[test]
    fn screen_canvas_draws_pixel_exact_quad() {
        let c = Compositor::new(NullTextureBackend::new());
        let mut list = RenderList::new(ViewSize::new(1000, 500), true);
        let rect = NormalizedRect::new(0.1, 0.2, 0.6, 0.7);

        c.draw(&mut list, rect, ViewSize::new(500, 250));

        let (drawn, _, filtering) = only_quad(&list);
        assert_eq!(filtering, TextureFiltering::Point);
        assert_eq!(drawn.left_top(), Point::new(0.1, 0.2));
        assert!((drawn.width() - 0.5).abs() < 1e-12);
        assert!((drawn.height() - 0.5).abs() < 1e-12);
        assert_eq!(list.filtering_depth(), 0);
    }

    #[test]
    fn non_screen_canvas_uses_control_rect() {
        let c = Compositor::new(NullTextureBackend::new());
        let mut list = RenderList::new(ViewSize::new(1000, 500), false);
        let rect = NormalizedRect::new(0.1, 0.2, 0.6, 0.7);

        c.draw(&mut list, rect, ViewSize::new(500, 250));
        let (drawn, _, filtering) = only_quad(&list);
        assert_eq!(drawn, rect);
        assert_eq!(filtering, TextureFiltering::Default);
    }

    #[test]
    fn unsupported_notice_is_centered() {
        let c = Compositor::new(NullTextureBackend::new());
        let mut list = RenderList::new(ViewSize::new(100, 100), true);
        c.draw_unsupported(&mut list, NormalizedRect::new(0.0, 0.0, 0.5, 0.5), &Platform::MacOS);

        match &list.items[0] {
            DisplayItem::Text {
                text,
                position,
                horizontal,
                color,
                ..
            } => {
                assert_eq!(text, "WebView: MacOS is not supported.");
                assert_eq!(*position, Point::new(0.25, 0.25));
                assert_eq!(*horizontal, HorizontalAlign::Center);
                assert_eq!(*color, Color::RED);
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn release_disposes_texture() {
        let mut c = Compositor::new(NullTextureBackend::new());
        c.ensure_texture(ViewSize::new(2, 2));
        c.release();
        assert!(c.texture().is_none());
        assert_eq!(c.backend().live(), 0);
    }
}
