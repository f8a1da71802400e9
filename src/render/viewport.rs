//! View size negotiation.
//!
//! A [`ViewSize`] is the pixel size the embedded engine renders at. It is
//! derived every frame from the host viewport and the control's
//! [`NormalizedRect`] on screen, and clamped against the largest texture the
//! GPU can allocate.
//!
//! # Examples
//!
//! A control covering half of a 1920x1080 viewport:
//! ```
//! use gosub_webview::render::{negotiate_view_size, ViewSize};
//!
//! let size = negotiate_view_size(ViewSize::new(1920, 1080), (0.5, 0.5), 8192);
//! assert_eq!(size, ViewSize::new(960, 540));
//! ```
//!
//! Clamping keeps the aspect ratio:
//! ```
//! use gosub_webview::render::{negotiate_view_size, ViewSize};
//!
//! let size = negotiate_view_size(ViewSize::new(8000, 2000), (1.0, 1.0), 4000);
//! assert_eq!(size, ViewSize::new(4000, 1000));
//! ```

use serde::{Deserialize, Serialize};

/// Size of a view or texture in pixels.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub struct ViewSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl std::fmt::Debug for ViewSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl ViewSize {
    /// Creates a new [`ViewSize`].
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of bytes a 4-bytes-per-pixel frame of this size occupies.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Returns true when either axis is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A point in normalized space (control-local or screen fractions).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangle in normalized coordinates.
///
/// Used for the control's rectangle on screen (fractions of the host viewport),
/// for the `[0,1]x[0,1]` local hit test and for texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for NormalizedRect {
    fn default() -> Self {
        Self::UNIT
    }
}

impl NormalizedRect {
    /// The unit square `[0,1]x[0,1]`.
    pub const UNIT: NormalizedRect = NormalizedRect {
        left: 0.0,
        top: 0.0,
        right: 1.0,
        bottom: 1.0,
    };

    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle starting at `left_top` spanning `size`.
    pub fn from_origin(left_top: Point, size: (f64, f64)) -> Self {
        Self::new(
            left_top.x,
            left_top.y,
            left_top.x + size.0,
            left_top.y + size.1,
        )
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// `(width, height)` of the rectangle.
    pub fn size(&self) -> (f64, f64) {
        (self.width(), self.height())
    }

    pub fn left_top(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Computes the pixel size the engine should render at.
///
/// `viewport` is the host viewport in pixels, `fraction` the control's size as a
/// fraction of that viewport. Each axis is rounded and floored to 1. When an axis
/// exceeds `max_texture_size`, both axes are scaled down by the same divisor and any
/// residual overflow is clamped, so the aspect ratio survives clamping.
pub fn negotiate_view_size(viewport: ViewSize, fraction: (f64, f64), max_texture_size: u32) -> ViewSize {
    let max = max_texture_size.max(1);

    let mut w = axis(viewport.width as f64 * fraction.0);
    let mut h = axis(viewport.height as f64 * fraction.1);

    if w > max as f64 || h > max as f64 {
        let divide = (w / max as f64).max(h / max as f64).max(1.0);
        if divide != 1.0 {
            w = axis(w / divide);
            h = axis(h / divide);
        }
    }

    ViewSize {
        width: (w as u32).min(max),
        height: (h as u32).min(max),
    }
}

/// Rounds one axis and floors it to 1. NaN and negative values collapse to 1.
fn axis(v: f64) -> f64 {
    let v = v.round();
    if v.is_nan() || v < 1.0 {
        1.0
    } else {
        // u32 range is enough for any texture limit
        v.min(u32::MAX as f64)
    }
}
