//! The embedded browser engine and everything that talks to it.
//!
//! - [`BrowserBackend`]: the engine itself, one per process.
//! - [`EngineRuntime`]: process-wide start-up of the engine.
//! - [`BrowserSession`]: one engine instance bound to a control.
//! - [`EngineClient`] / [`ClientBridge`]: callbacks from the engine.
//! - [`EventRelay`]: engine notifications fanned out to host observers.
//! - [`InputTranslator`]: host input to engine input.

pub mod backend;
pub mod client;
pub mod events;
pub mod input;
pub mod relay;
pub mod runtime;
pub mod session;

/// Browser backends shipped with the crate.
pub mod backends {
    pub mod null;
}

pub use backend::{BrowserBackend, LoadRequest, SessionId, SessionRequest};
pub use client::{BeforeDownloadCallback, DownloadItem, DownloadItemCallback, EngineClient, FrameInfo};
pub use events::{
    CursorKind, EventResponse, KeyEvent, KeyEventKind, LoadState, Modifiers, MouseButton, MouseEvent, PointerEvent,
    WebViewEvent, WheelEvent,
};
pub use input::{ControlState, EngineInput, FocusChange, HostMouseButton, InputOutcome, InputTranslator, Translation};
pub use relay::{ClientBridge, EventRelay, SubscriptionId, ViewState};
pub use runtime::{EngineRuntime, LogSeverity, RuntimeSettings, RuntimeToken};
pub use session::{clamp_zoom, normalize_url, BrowserSession, SessionState, ABOUT_BLANK, MAX_ZOOM, MIN_ZOOM};
