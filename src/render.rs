pub mod backend;

/// Texture backends for the compositor.
pub mod backends {
    pub mod null;
    /// Wgpu texture backend
    #[cfg(feature = "backend_wgpu")]
    pub mod wgpu;
}

mod compositor;
mod framebuffer;
mod render_list;
mod viewport;

pub use backend::{
    Canvas, HorizontalAlign, PixelFormat, QuadTexture, TextureBackend, TextureFiltering, TextureId, TextureUsage,
    VerticalAlign,
};
pub use compositor::{Compositor, UploadOutcome};
pub use framebuffer::{FrameBuffer, FrameSnapshot, PaintElementType, PixelRect};
pub use render_list::*;
pub use viewport::{negotiate_view_size, NormalizedRect, Point, ViewSize};
