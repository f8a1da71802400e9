use crate::render::{Color, NormalizedRect, Point, ViewSize};

/// Pixel layouts a texture can be created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8 bits per channel, bytes ordered B, G, R, A. This is what the engine paints.
    Bgra8,
    /// 8 bits per channel, bytes ordered R, G, B, A.
    Rgba8,
}

/// How a texture is going to be used by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureUsage {
    /// Written from the CPU every frame, only sampled by the GPU.
    WriteOnly,
}

/// Opaque id of a texture living in a [`TextureBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Texture to put on a quad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuadTexture {
    /// A texture created through the compositor's [`TextureBackend`].
    Texture(TextureId),
    /// The host's plain white texture, used while no valid frame is available.
    Placeholder,
}

/// Sampling filter for textured quads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextureFiltering {
    /// Host default (usually linear).
    #[default]
    Default,
    /// Nearest neighbour, keeps 1:1 pixel alignment.
    Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

/// GPU texture allocation. Calls occur on the host's render thread.
pub trait TextureBackend {
    /// Name of the backend, for logging.
    fn name(&self) -> &str;

    /// Create a 2D texture with the given size and format.
    fn create_texture(&mut self, size: ViewSize, format: PixelFormat, usage: TextureUsage) -> anyhow::Result<TextureId>;

    /// Replace the full contents of the texture. `pixels` holds exactly `size.frame_len()` bytes.
    fn upload(&mut self, id: TextureId, size: ViewSize, pixels: &[u8]) -> anyhow::Result<()>;

    /// Release the texture. Unknown ids are ignored.
    fn dispose(&mut self, id: TextureId);
}

/// The host's UI canvas.
///
/// Coordinates are normalized to the host viewport, like the control's screen rectangle.
pub trait Canvas {
    /// True when the canvas maps directly onto screen pixels (as opposed to a canvas
    /// drawn in 3D space).
    fn is_screen(&self) -> bool;

    /// Size of the viewport this canvas renders into.
    fn viewport_size(&self) -> ViewSize;

    fn push_texture_filtering(&mut self, filtering: TextureFiltering);
    fn pop_texture_filtering(&mut self);

    /// Add a textured quad mapping `uv` of `texture` onto `rect`.
    fn add_quad(&mut self, rect: NormalizedRect, uv: NormalizedRect, texture: QuadTexture, color: Color, clamp: bool);

    /// Add a line of text anchored at `position`.
    fn add_text(
        &mut self,
        text: &str,
        position: Point,
        horizontal: HorizontalAlign,
        vertical: VerticalAlign,
        color: Color,
    );
}
