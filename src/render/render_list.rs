//! Render list and display items.
//!
//! A [`RenderList`] is a [`Canvas`] that records what the compositor draws
//! instead of drawing it. Hosts without an immediate-mode canvas can replay the
//! items into their own renderer; tests and the headless demo inspect them
//! directly.
//!
//! # Example
//!
//! ```rust
//! use gosub_webview::render::{Canvas, Color, DisplayItem, NormalizedRect, QuadTexture, RenderList, ViewSize};
//!
//! let mut list = RenderList::new(ViewSize::new(800, 600), true);
//! list.add_quad(NormalizedRect::UNIT, NormalizedRect::UNIT, QuadTexture::Placeholder, Color::WHITE, true);
//!
//! assert!(matches!(list.items[0], DisplayItem::Quad { texture: QuadTexture::Placeholder, .. }));
//! ```

use crate::render::backend::{Canvas, HorizontalAlign, QuadTexture, TextureFiltering, VerticalAlign};
use crate::render::{NormalizedRect, Point, ViewSize};

/// RGBA color used for drawing commands.
///
/// Channels are represented as `f32` in the range `0.0 ..= 1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel (opacity)
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

    /// Creates a new color from `f32` channel values in the range `0.0 ..= 1.0`.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color { r, g, b, a }
    }

    /// Creates a new color from `u8` channel values in the range `0 ..= 255`.
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }
}

/// A single recorded drawing command.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayItem {
    /// Textured quad.
    Quad {
        /// Target rectangle, normalized to the viewport.
        rect: NormalizedRect,
        /// Source rectangle in texture coordinates.
        uv: NormalizedRect,
        texture: QuadTexture,
        color: Color,
        clamp: bool,
        /// Filtering mode active when the quad was added.
        filtering: TextureFiltering,
    },

    /// A line of text.
    Text {
        text: String,
        position: Point,
        horizontal: HorizontalAlign,
        vertical: VerticalAlign,
        color: Color,
    },
}

/// A list of display items recorded from a [`Canvas`].
#[derive(Clone, Debug)]
pub struct RenderList {
    /// Sequence of drawing commands, in submission order.
    pub items: Vec<DisplayItem>,
    viewport: ViewSize,
    screen: bool,
    filtering: Vec<TextureFiltering>,
}

impl RenderList {
    /// Creates a new, empty render list for a viewport of the given size.
    pub fn new(viewport: ViewSize, screen: bool) -> Self {
        RenderList {
            items: Vec::new(),
            viewport,
            screen,
            filtering: Vec::new(),
        }
    }

    /// Adds a new display item to the list.
    pub fn add_command(&mut self, command: DisplayItem) {
        self.items.push(command);
    }

    /// Clears all display items and the filtering stack.
    pub fn clear(&mut self) {
        self.items.clear();
        self.filtering.clear();
    }

    /// Changes the viewport size reported to the compositor.
    pub fn set_viewport(&mut self, viewport: ViewSize) {
        self.viewport = viewport;
    }

    /// Depth of the filtering stack; zero after balanced push/pop pairs.
    pub fn filtering_depth(&self) -> usize {
        self.filtering.len()
    }

    /// All quads in the list.
    pub fn quads(&self) -> impl Iterator<Item = &DisplayItem> {
        self.items.iter().filter(|i| matches!(i, DisplayItem::Quad { .. }))
    }
}

impl Canvas for RenderList {
    fn is_screen(&self) -> bool {
        self.screen
    }

    fn viewport_size(&self) -> ViewSize {
        self.viewport
    }

    fn push_texture_filtering(&mut self, filtering: TextureFiltering) {
        self.filtering.push(filtering);
    }

    fn pop_texture_filtering(&mut self) {
        self.filtering.pop();
    }

    fn add_quad(&mut self, rect: NormalizedRect, uv: NormalizedRect, texture: QuadTexture, color: Color, clamp: bool) {
        let filtering = self.filtering.last().copied().unwrap_or_default();
        self.add_command(DisplayItem::Quad {
            rect,
            uv,
            texture,
            color,
            clamp,
            filtering,
        });
    }

    fn add_text(
        &mut self,
        text: &str,
        position: Point,
        horizontal: HorizontalAlign,
        vertical: VerticalAlign,
        color: Color,
    ) {
        self.add_command(DisplayItem::Text {
            text: text.to_string(),
            position,
            horizontal,
            vertical,
            color,
        });
    }
}
