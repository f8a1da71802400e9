use crate::engine::client::EngineClient;
use crate::engine::events::{KeyEvent, PointerEvent, WheelEvent};
use crate::engine::runtime::RuntimeSettings;
use crate::render::{PaintElementType, ViewSize};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for a browser session.
///
/// Internally a `SessionId` wraps a [`Uuid`]. Treat it as an opaque handle; the
/// representation may change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new unique `SessionId` using a random UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the engine is asked to load in the main frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    /// Load a URL (including `file://` and `about:` URLs)
    Url(String),
    /// Load literal HTML, resolving relative references against `base_url`
    Html { content: String, base_url: String },
}

/// Everything the engine needs to create a windowless session.
pub struct SessionRequest {
    pub id: SessionId,
    /// Always true; the crate never asks for a native window
    pub windowless: bool,
    pub initial_url: String,
    pub size: ViewSize,
    /// Callback surface the engine reports to
    pub client: Arc<dyn EngineClient>,
}

impl std::fmt::Debug for SessionRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRequest")
            .field("id", &self.id)
            .field("windowless", &self.windowless)
            .field("initial_url", &self.initial_url)
            .field("size", &self.size)
            .field("client", &"Arc<dyn EngineClient>")
            .finish()
    }
}

/// The embedded browser engine.
///
/// One backend serves every session of the process. Calls are fire-and-forget: an
/// `Ok` means the engine accepted the command, outcomes arrive later through the
/// session's [`EngineClient`].
pub trait BrowserBackend: Send + Sync {
    /// Name of the backend, for logging.
    fn name(&self) -> &str;

    /// Process-wide engine start-up. Called at most once per process.
    fn initialize_runtime(&self, settings: &RuntimeSettings) -> anyhow::Result<()>;

    /// Create a windowless session. The engine answers with
    /// [`EngineClient::on_after_created`] once the session is usable.
    fn create_session(&self, request: SessionRequest) -> anyhow::Result<()>;
    fn destroy_session(&self, id: SessionId) -> anyhow::Result<()>;

    fn navigate(&self, id: SessionId, request: &LoadRequest) -> anyhow::Result<()>;
    fn execute_script(&self, id: SessionId, code: &str, source_url: &str, line: i32) -> anyhow::Result<()>;
    fn go_back(&self, id: SessionId) -> anyhow::Result<()>;
    fn go_forward(&self, id: SessionId) -> anyhow::Result<()>;
    fn stop(&self, id: SessionId) -> anyhow::Result<()>;
    fn reload(&self, id: SessionId) -> anyhow::Result<()>;
    fn set_zoom(&self, id: SessionId, level: f64) -> anyhow::Result<()>;

    /// The view size changed. The engine reads the new size through
    /// [`EngineClient::get_view_rect`].
    fn resize(&self, id: SessionId, size: ViewSize) -> anyhow::Result<()>;
    /// Request a full repaint of the given element.
    fn invalidate(&self, id: SessionId, kind: PaintElementType) -> anyhow::Result<()>;

    fn send_pointer_event(&self, id: SessionId, event: &PointerEvent) -> anyhow::Result<()>;
    fn send_wheel_event(&self, id: SessionId, event: &WheelEvent) -> anyhow::Result<()>;
    fn send_key_event(&self, id: SessionId, event: &KeyEvent) -> anyhow::Result<()>;
    fn send_focus_event(&self, id: SessionId, focused: bool) -> anyhow::Result<()>;
}
