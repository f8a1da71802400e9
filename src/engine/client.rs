use crate::engine::backend::SessionId;
use crate::engine::events::{CursorKind, LoadState};
use crate::render::{PaintElementType, PixelRect};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A frame inside the page, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameInfo {
    /// Engine specific frame identifier
    pub identifier: String,
    /// True for the top-level frame
    pub is_main: bool,
    /// Current URL of the frame
    pub url: String,
}

impl FrameInfo {
    pub fn main<S: Into<String>>(url: S) -> Self {
        Self {
            identifier: "main".to_string(),
            is_main: true,
            url: url.into(),
        }
    }
}

/// State of a download.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadItem {
    pub id: u32,
    pub url: String,
    pub mime_type: String,
    /// Where the download is written, once known
    pub full_path: Option<PathBuf>,
    pub received_bytes: u64,
    /// Zero when unknown
    pub total_bytes: u64,
    /// -1 when unknown
    pub percent_complete: i32,
    pub is_in_progress: bool,
    pub is_complete: bool,
    pub is_canceled: bool,
}

/// Decision callback for a download that is about to start.
pub trait BeforeDownloadCallback: Send + Sync + Debug {
    /// Start the download. `path` overrides the target file; `show_dialog` lets the engine
    /// ask the user for a location.
    fn accept(&self, path: Option<&Path>, show_dialog: bool);
    fn cancel(&self);
}

/// Control callback for a running download.
pub trait DownloadItemCallback: Send + Sync + Debug {
    fn resume(&self);
    fn pause(&self);
    fn cancel(&self);
}

/// Callbacks the engine makes into the crate.
///
/// All methods are invoked on engine threads, concurrently with the host render tick.
/// Implementations must not block for long and must never call back into the engine.
pub trait EngineClient: Send + Sync {
    /// The session has been created and accepts commands from now on.
    fn on_after_created(&self, session: SessionId);

    /// View rectangle in view pixels. Always starts at the origin.
    fn get_view_rect(&self) -> PixelRect;
    /// Converts a view coordinate into a screen coordinate.
    fn get_screen_point(&self, x: i32, y: i32) -> (i32, i32);

    /// A new frame. `pixels` holds BGRA bytes, at least `width * height * 4` of them.
    fn on_paint(&self, kind: PaintElementType, dirty_rects: &[PixelRect], pixels: &[u8], width: u32, height: u32);
    fn on_cursor_change(&self, cursor: CursorKind);

    fn on_title_change(&self, title: &str);
    fn on_address_change(&self, frame: &FrameInfo, url: &str);
    fn on_target_url_change(&self, url: &str);
    /// Returns true when the tooltip was shown by the client.
    fn on_tooltip(&self, text: &str) -> bool;

    fn on_loading_state_change(&self, state: LoadState);
    fn on_load_start(&self, frame: &FrameInfo);
    fn on_load_end(&self, frame: &FrameInfo, http_status: i32);
    fn on_load_error(&self, frame: &FrameInfo, error_code: i32, error_text: &str, failed_url: &str);

    /// Returns true to suppress the native popup window.
    fn on_before_popup(&self, target_url: &str) -> bool;

    fn on_before_download(&self, item: &DownloadItem, suggested_name: &str, callback: Arc<dyn BeforeDownloadCallback>);
    fn on_download_updated(&self, item: &DownloadItem, callback: Arc<dyn DownloadItemCallback>);
}
