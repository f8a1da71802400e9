//! An off-screen web engine embedded as a UI control.
//!
//! The engine renders windowless into a pixel buffer; the [`WebView`] control uploads
//! that buffer into a GPU texture and draws it as a quad on the host's canvas. Host
//! input is translated into engine input, engine notifications are relayed to host
//! observers on the render tick.
//!
//! - [`engine`]: the engine seam (`BrowserBackend`, `EngineClient`), runtime, sessions,
//!   input translation and event relay.
//! - [`render`]: size negotiation, frame buffer, compositor and the host drawing seam
//!   (`Canvas`, `TextureBackend`).
//! - [`config`]: what a control shows at start-up.

pub mod config;
pub mod engine;
pub mod errors;
pub mod platform;
pub mod render;
pub mod webview;

pub use config::{ConfigError, NavigationTarget, WebViewConfig};
pub use engine::{
    BrowserBackend, ControlState, CursorKind, EngineClient, EngineRuntime, EventResponse, FocusChange,
    HostMouseButton, InputOutcome, LoadState, RuntimeSettings, SessionState, SubscriptionId, WebViewEvent,
};
pub use errors::{FrameError, WebViewError};
pub use platform::Platform;
pub use webview::{HostFrame, WebView};
