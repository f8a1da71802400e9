//! Engine input and notification types.
//!
//! This module defines the input events the control sends into the engine and the
//! notifications the engine sends back to the host.
//!
//! # Main Types
//!
//! - [`MouseButton`]: Mouse buttons the engine understands (left, middle, right).
//! - [`Modifiers`]: Keyboard modifiers (Shift, Control, Alt, Meta).
//! - [`PointerEvent`], [`WheelEvent`], [`KeyEvent`]: Input events in view pixels.
//! - [`WebViewEvent`]: Notifications emitted by the engine, relayed to observers once per render tick.

use crate::engine::backend::SessionId;
use crate::engine::client::{BeforeDownloadCallback, DownloadItem, DownloadItemCallback, FrameInfo};
use bitflags::bitflags;
use std::fmt::{Debug, Display};
use std::sync::Arc;

/// Represents a mouse button that can be pressed or released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left mouse button pressed (or depressed)
    Left,
    /// Middle mouse button pressed (or depressed)
    Middle,
    /// Right mouse button pressed (or depressed)
    Right,
}

impl Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MouseButton::Left => write!(f, "Left"),
            MouseButton::Middle => write!(f, "Middle"),
            MouseButton::Right => write!(f, "Right"),
        }
    }
}

bitflags! {
    #[derive(Default)]
    pub struct Modifiers: u8 {
        const SHIFT   = 0b0001;
        const CONTROL = 0b0010;
        const ALT     = 0b0100;
        const META    = 0b1000;
    }
}

impl Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();

        if self.contains(Modifiers::SHIFT) {
            parts.push("Shift");
        }
        if self.contains(Modifiers::CONTROL) {
            parts.push("Control");
        }
        if self.contains(Modifiers::ALT) {
            parts.push("Alt");
        }
        if self.contains(Modifiers::META) {
            parts.push("Meta");
        }

        if parts.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}

/// Pointer position in view pixels plus the modifiers held at the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseEvent {
    pub x: i32,
    pub y: i32,
    pub modifiers: Modifiers,
}

/// Pointer input for the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Pointer moved (or left the view when `leave` is set)
    Move { event: MouseEvent, leave: bool },
    /// Button pressed (`mouse_up == false`) or released. A double click is sent as a
    /// press with `click_count == 2`.
    Click {
        event: MouseEvent,
        button: MouseButton,
        mouse_up: bool,
        click_count: u32,
    },
}

/// Scroll input for the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelEvent {
    pub event: MouseEvent,
    pub delta_x: i32,
    pub delta_y: i32,
}

/// Kind of keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    /// Key pressed, before any character translation
    RawKeyDown,
    /// Key released
    KeyUp,
    /// Character produced by a key press
    Char,
}

/// Keyboard input for the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    /// Platform key code, or the character code for [`KeyEventKind::Char`]
    pub key_code: i32,
    /// Native key code. Equal to `key_code` for raw events, zero for characters.
    pub native_key_code: i32,
    pub modifiers: Modifiers,
}

/// Cursor shape requested by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorKind {
    #[default]
    Pointer,
    Hand,
    IBeam,
    Wait,
    Progress,
    Crosshair,
    Move,
    ResizeEastWest,
    ResizeNorthSouth,
    NotAllowed,
    /// Engine specific cursor handle
    Custom(u64),
}

/// Loading state of the main frame, as last reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadState {
    pub loading: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

/// Answer of an observer to a [`WebViewEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventResponse {
    /// The observer took care of the event. Only meaningful for [`WebViewEvent::BeforePopup`].
    Handled,
    #[default]
    Ignored,
}

/// Notifications sent by the engine to the host.
#[derive(Debug, Clone)]
pub enum WebViewEvent {
    // ****************************************
    // ** Session lifecycle
    /// The engine finished creating the session
    SessionCreated { session: SessionId },

    // ****************************************
    // ** Page state
    /// Title of the page has changed
    TitleChanged { title: String },
    /// Address of a frame has changed
    AddressChanged { frame: FrameInfo, url: String },
    /// The pointer hovers a link (empty when it left the link)
    TargetUrlChanged { url: String },
    /// The engine wants to show a tooltip. Always declined.
    Tooltip { text: String },
    /// Cursor shape has changed
    CursorChanged { cursor: CursorKind },

    // ****************************************
    // ** Loading
    /// Loading state or history availability has changed
    LoadingStateChanged(LoadState),
    /// A frame started loading
    LoadStart { frame: FrameInfo },
    /// A frame finished loading
    LoadEnd { frame: FrameInfo, http_status: i32 },
    /// A frame failed to load
    LoadError {
        frame: FrameInfo,
        error_code: i32,
        error_text: String,
        failed_url: String,
    },

    // ****************************************
    // ** Popups and downloads
    /// The page wants to open a new window. Unless an observer handles it, the control
    /// navigates itself to `target_url`.
    BeforePopup { target_url: String },
    /// A download is about to start
    DownloadBefore {
        item: DownloadItem,
        suggested_name: String,
        callback: Arc<dyn BeforeDownloadCallback>,
    },
    /// Progress of a running download
    DownloadUpdated {
        item: DownloadItem,
        callback: Arc<dyn DownloadItemCallback>,
    },
}

impl WebViewEvent {
    /// Short name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            WebViewEvent::SessionCreated { .. } => "SessionCreated",
            WebViewEvent::TitleChanged { .. } => "TitleChanged",
            WebViewEvent::AddressChanged { .. } => "AddressChanged",
            WebViewEvent::TargetUrlChanged { .. } => "TargetUrlChanged",
            WebViewEvent::Tooltip { .. } => "Tooltip",
            WebViewEvent::CursorChanged { .. } => "CursorChanged",
            WebViewEvent::LoadingStateChanged(_) => "LoadingStateChanged",
            WebViewEvent::LoadStart { .. } => "LoadStart",
            WebViewEvent::LoadEnd { .. } => "LoadEnd",
            WebViewEvent::LoadError { .. } => "LoadError",
            WebViewEvent::BeforePopup { .. } => "BeforePopup",
            WebViewEvent::DownloadBefore { .. } => "DownloadBefore",
            WebViewEvent::DownloadUpdated { .. } => "DownloadUpdated",
        }
    }
}
