use crate::platform::Platform;
use crate::render::ViewSize;

#[derive(Debug, Clone, thiserror::Error)]
pub enum WebViewError {
    #[error("{0} is not supported")]
    Unsupported(Platform),

    #[error("Runtime initialization failed: {0}")]
    RuntimeInit(String),

    #[error("Runtime is already initialized")]
    AlreadyInitialized,

    #[error("Runtime token was issued by another runtime")]
    InvalidToken,

    #[error("Session creation failed: {0}")]
    SessionCreate(String),

    #[error("Texture error: {0}")]
    Texture(String),
}

/// Errors raised when the engine hands us a frame we cannot store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("Empty frame ({0:?})")]
    EmptyFrame(ViewSize),

    #[error("Pixel buffer too small for {size:?}: got {actual} bytes, need {expected}")]
    BufferTooSmall {
        size: ViewSize,
        expected: usize,
        actual: usize,
    },

    #[error("Frame buffer lock is poisoned")]
    Poisoned,
}
