use crate::errors::FrameError;
use crate::render::ViewSize;
use std::sync::Mutex;

/// Kind of element the engine painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintElementType {
    /// The main view.
    View,
    /// A popup widget (select dropdowns and the like).
    Popup,
}

/// A rectangle in view pixels, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle at the origin spanning `size`.
    pub fn from_size(size: ViewSize) -> Self {
        Self::new(0, 0, size.width as i32, size.height as i32)
    }
}

/// A copy of the frame buffer taken for upload.
#[derive(Clone)]
pub struct FrameSnapshot {
    /// BGRA pixels, `size.width * size.height * 4` bytes.
    pub pixels: Vec<u8>,
    /// Size the frame was painted at.
    pub size: ViewSize,
    /// Generation of the frame buffer when the snapshot was taken.
    pub generation: u64,
}

impl std::fmt::Debug for FrameSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSnapshot")
            .field("size", &self.size)
            .field("generation", &self.generation)
            .field("len", &self.pixels.len())
            .finish()
    }
}

#[derive(Default)]
struct FrameState {
    pixels: Vec<u8>,
    size: ViewSize,
    generation: u64,
}

/// Holds the most recent frame painted by the engine.
///
/// The engine writes from its own threads through [`FrameBuffer::on_engine_paint`],
/// the render tick reads through [`FrameBuffer::snapshot`]. Both take the same
/// mutex and only for the duration of a memcpy, so the lock is never held across
/// a GPU upload or a call into the engine.
#[derive(Default)]
pub struct FrameBuffer {
    state: Mutex<FrameState>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a paint from the engine.
    ///
    /// Only [`PaintElementType::View`] paints are stored; popup paints are accepted
    /// and dropped (returns `Ok(false)`). A paint with a different size than the
    /// stored frame reallocates the buffer, a same-size paint is copied in place.
    /// Dirty rects are accepted but the whole frame is always copied.
    pub fn on_engine_paint(
        &self,
        kind: PaintElementType,
        _dirty_rects: &[PixelRect],
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<bool, FrameError> {
        if kind == PaintElementType::Popup {
            // Popup widgets are not composed into the view yet
            return Ok(false);
        }

        let size = ViewSize::new(width, height);
        if size.is_empty() {
            return Err(FrameError::EmptyFrame(size));
        }

        let len = size.frame_len();
        if pixels.len() < len {
            return Err(FrameError::BufferTooSmall {
                size,
                expected: len,
                actual: pixels.len(),
            });
        }

        let mut state = self.state.lock().map_err(|_| FrameError::Poisoned)?;
        if state.size != size || state.pixels.len() != len {
            state.pixels = pixels[..len].to_vec();
            state.size = size;
        } else {
            state.pixels.copy_from_slice(&pixels[..len]);
        }
        state.generation = state.generation.wrapping_add(1);

        Ok(true)
    }

    /// Clones the current frame. Returns `None` until the first view paint arrived.
    pub fn snapshot(&self) -> Option<FrameSnapshot> {
        let state = self.state.lock().ok()?;
        if state.pixels.is_empty() {
            return None;
        }

        Some(FrameSnapshot {
            pixels: state.pixels.clone(),
            size: state.size,
            generation: state.generation,
        })
    }

    /// Incremented on every stored paint.
    pub fn generation(&self) -> u64 {
        self.state.lock().map(|s| s.generation).unwrap_or(0)
    }

    /// Size of the stored frame, if any.
    pub fn size(&self) -> Option<ViewSize> {
        let state = self.state.lock().ok()?;
        if state.pixels.is_empty() {
            None
        } else {
            Some(state.size)
        }
    }

    /// Drops the stored frame.
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.pixels = Vec::new();
            state.size = ViewSize::default();
            state.generation = state.generation.wrapping_add(1);
        }
    }
}
