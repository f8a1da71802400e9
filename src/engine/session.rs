use crate::engine::backend::{BrowserBackend, LoadRequest, SessionId, SessionRequest};
use crate::engine::client::EngineClient;
use crate::engine::events::{KeyEvent, PointerEvent, WheelEvent};
use crate::engine::runtime::{EngineRuntime, RuntimeToken};
use crate::errors::WebViewError;
use crate::render::{PaintElementType, ViewSize};
use std::sync::Arc;

pub const ABOUT_BLANK: &str = "about:blank";
pub const MIN_ZOOM: f64 = -10.0;
pub const MAX_ZOOM: f64 = 10.0;

/// Lifecycle of a browser session.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been requested yet.
    #[default]
    Uninitialized,

    /// The engine was asked for a session and has not confirmed it yet. Commands are
    /// dropped until it does.
    Initializing,

    /// The session accepts commands.
    Ready,

    /// The session was closed. Terminal.
    Destroyed,

    /// The platform cannot run the engine. Terminal, reached without touching the engine.
    Unsupported,
}

/// Clamps a zoom level into `[-10, 10]`. Non-finite levels become `0.0`.
pub fn clamp_zoom(level: f64) -> f64 {
    if level.is_finite() {
        level.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        0.0
    }
}

/// Drops leading whitespace from a URL; an empty result becomes `about:blank`.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim_start();
    if url.is_empty() {
        ABOUT_BLANK.to_string()
    } else {
        url.to_string()
    }
}

fn normalize_request(request: LoadRequest) -> LoadRequest {
    match request {
        LoadRequest::Url(url) => LoadRequest::Url(normalize_url(&url)),
        LoadRequest::Html { content, base_url } => LoadRequest::Html {
            content,
            base_url: normalize_url(&base_url),
        },
    }
}

/// One engine instance.
///
/// Every command is a no-op unless the session is [`SessionState::Ready`]. Engine
/// errors are logged here and never returned.
pub struct BrowserSession {
    id: SessionId,
    state: SessionState,
    size: ViewSize,
    /// Size the engine was last told about
    engine_size: ViewSize,
    zoom: f64,
    backend: Arc<dyn BrowserBackend>,
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("size", &self.size)
            .field("zoom", &self.zoom)
            .finish()
    }
}

impl BrowserSession {
    /// Asks the engine for a new windowless session of `size` starting at `initial_url`.
    ///
    /// The session stays [`SessionState::Initializing`] until the engine reports it
    /// created and [`BrowserSession::mark_ready`] is called.
    pub fn create(
        runtime: &EngineRuntime,
        token: RuntimeToken,
        initial_url: &str,
        size: ViewSize,
        client: Arc<dyn EngineClient>,
    ) -> Result<Self, WebViewError> {
        runtime.verify(token)?;

        let id = SessionId::new();
        let backend = runtime.backend().clone();
        let request = SessionRequest {
            id,
            windowless: true,
            initial_url: normalize_url(initial_url),
            size,
            client,
        };

        log::debug!("session {}: creating {:?} at {}", id, size, request.initial_url);
        backend
            .create_session(request)
            .map_err(|e| WebViewError::SessionCreate(e.to_string()))?;

        Ok(Self {
            id,
            state: SessionState::Initializing,
            size,
            engine_size: size,
            zoom: 0.0,
            backend,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Size the engine currently renders at.
    pub fn size(&self) -> ViewSize {
        self.size
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// The engine reported session `id` as created. Returns true when this moved the
    /// session to [`SessionState::Ready`].
    ///
    /// A resize that happened while the session was initializing is sent now.
    pub fn mark_ready(&mut self, id: SessionId) -> bool {
        if id != self.id || self.state != SessionState::Initializing {
            return false;
        }
        log::debug!("session {}: ready", self.id);
        self.state = SessionState::Ready;

        if self.engine_size != self.size {
            self.send_size();
        }
        true
    }

    fn send_size(&mut self) {
        let size = self.size;
        if self.call("resize", |b, id| b.resize(id, size)) {
            self.engine_size = size;
        }
    }

    /// Runs `f` on a ready session. Returns true when the engine accepted the command.
    fn call(&self, op: &str, f: impl FnOnce(&dyn BrowserBackend, SessionId) -> anyhow::Result<()>) -> bool {
        if !self.is_ready() {
            log::trace!("session {}: {} dropped in state {:?}", self.id, op, self.state);
            return false;
        }
        match f(self.backend.as_ref(), self.id) {
            Ok(()) => true,
            Err(e) => {
                log::error!("session {}: {} failed: {}", self.id, op, e);
                false
            }
        }
    }

    pub fn navigate(&self, request: LoadRequest) {
        let request = normalize_request(request);
        self.call("navigate", |b, id| b.navigate(id, &request));
    }

    pub fn execute_script(&self, code: &str, source_url: &str, line: i32) {
        self.call("execute_script", |b, id| b.execute_script(id, code, source_url, line));
    }

    pub fn go_back(&self) {
        self.call("go_back", |b, id| b.go_back(id));
    }

    pub fn go_forward(&self) {
        self.call("go_forward", |b, id| b.go_forward(id));
    }

    pub fn stop(&self) {
        self.call("stop", |b, id| b.stop(id));
    }

    pub fn reload(&self) {
        self.call("reload", |b, id| b.reload(id));
    }

    /// Stores the clamped zoom level and sends it to the engine. Returns the level in effect.
    pub fn set_zoom(&mut self, level: f64) -> f64 {
        self.zoom = clamp_zoom(level);
        let zoom = self.zoom;
        self.call("set_zoom", |b, id| b.set_zoom(id, zoom));
        zoom
    }

    /// Records the new view size and tells the engine. Returns false when the size did
    /// not change.
    pub fn resize(&mut self, size: ViewSize) -> bool {
        if size == self.size {
            return false;
        }
        log::debug!("session {}: resize {:?} -> {:?}", self.id, self.size, size);
        self.size = size;
        self.send_size();
        true
    }

    /// Requests a full repaint of the view.
    pub fn invalidate(&self) {
        self.call("invalidate", |b, id| b.invalidate(id, PaintElementType::View));
    }

    pub fn send_pointer(&self, event: &PointerEvent) {
        self.call("pointer event", |b, id| b.send_pointer_event(id, event));
    }

    pub fn send_wheel(&self, event: &WheelEvent) {
        self.call("wheel event", |b, id| b.send_wheel_event(id, event));
    }

    pub fn send_key(&self, event: &KeyEvent) {
        self.call("key event", |b, id| b.send_key_event(id, event));
    }

    pub fn send_focus(&self, focused: bool) {
        self.call("focus event", |b, id| b.send_focus_event(id, focused));
    }

    /// Closes the engine instance. Also done on drop.
    pub fn destroy(&mut self) {
        if matches!(self.state, SessionState::Destroyed | SessionState::Unsupported) {
            return;
        }

        log::debug!("session {}: destroying", self.id);
        if let Err(e) = self.backend.destroy_session(self.id) {
            log::error!("session {}: destroy failed: {}", self.id, e);
        }
        self.state = SessionState::Destroyed;
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.destroy();
    }
}
