use crate::engine::backend::{BrowserBackend, LoadRequest, SessionId, SessionRequest};
use crate::engine::client::EngineClient;
use crate::engine::events::{KeyEvent, PointerEvent, WheelEvent};
use crate::engine::runtime::RuntimeSettings;
use crate::render::{PaintElementType, PixelRect, ViewSize};
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call received by the [`NullBrowser`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    InitializeRuntime,
    CreateSession {
        id: SessionId,
        initial_url: String,
        size: ViewSize,
    },
    DestroySession(SessionId),
    Navigate(SessionId, LoadRequest),
    ExecuteScript {
        id: SessionId,
        code: String,
        source_url: String,
        line: i32,
    },
    GoBack(SessionId),
    GoForward(SessionId),
    Stop(SessionId),
    Reload(SessionId),
    SetZoom(SessionId, f64),
    Resize(SessionId, ViewSize),
    Invalidate(SessionId, PaintElementType),
    Pointer(SessionId, PointerEvent),
    Wheel(SessionId, WheelEvent),
    Key(SessionId, KeyEvent),
    Focus(SessionId, bool),
}

/// Browser backend without an engine.
///
/// Records every call and keeps the registered clients, so the host (or a test) can
/// play the engine side: complete session creation, paint frames, report navigation.
#[derive(Default)]
pub struct NullBrowser {
    calls: Mutex<Vec<BackendCall>>,
    sessions: Mutex<Vec<(SessionId, Arc<dyn EngineClient>)>>,
    runtime_inits: AtomicUsize,
    fail_init: AtomicBool,
    fail_create: AtomicBool,
}

impl std::fmt::Debug for NullBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NullBrowser")
            .field("calls", &lock(&self.calls).len())
            .field("sessions", &lock(&self.sessions).len())
            .finish()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl NullBrowser {
    /// Creates a new instance of the null browser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `initialize_runtime` fail, as if the engine libraries were missing.
    pub fn set_fail_init(&self, fail: bool) {
        self.fail_init.store(fail, Ordering::SeqCst);
    }

    /// Make `create_session` fail.
    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Number of `initialize_runtime` calls received.
    pub fn runtime_inits(&self) -> usize {
        self.runtime_inits.load(Ordering::SeqCst)
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.calls).clone()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Sessions that were created and not destroyed, oldest first.
    pub fn sessions(&self) -> Vec<SessionId> {
        lock(&self.sessions).iter().map(|(id, _)| *id).collect()
    }

    /// Client registered for the session.
    pub fn client(&self, id: SessionId) -> Option<Arc<dyn EngineClient>> {
        lock(&self.sessions)
            .iter()
            .find(|(sid, _)| *sid == id)
            .map(|(_, client)| client.clone())
    }

    /// Finish session creation, as the engine does asynchronously.
    pub fn complete_creation(&self, id: SessionId) -> bool {
        match self.client(id) {
            Some(client) => {
                client.on_after_created(id);
                true
            }
            None => false,
        }
    }

    /// Paint a solid frame at the size the client currently reports.
    pub fn paint(&self, id: SessionId, fill: u8) -> Option<ViewSize> {
        let client = self.client(id)?;
        let rect = client.get_view_rect();
        let size = ViewSize::new(rect.width.max(0) as u32, rect.height.max(0) as u32);
        self.paint_sized(id, size, fill);
        Some(size)
    }

    /// Paint a solid frame of the given size, regardless of the view rect.
    pub fn paint_sized(&self, id: SessionId, size: ViewSize, fill: u8) -> bool {
        let Some(client) = self.client(id) else {
            return false;
        };
        let pixels = vec![fill; size.frame_len()];
        client.on_paint(
            PaintElementType::View,
            &[PixelRect::from_size(size)],
            &pixels,
            size.width,
            size.height,
        );
        true
    }

    fn record(&self, call: BackendCall) {
        log::trace!("null browser: {:?}", call);
        lock(&self.calls).push(call);
    }

    fn known(&self, id: SessionId) -> Result<()> {
        if lock(&self.sessions).iter().any(|(sid, _)| *sid == id) {
            Ok(())
        } else {
            Err(anyhow!("unknown session {}", id))
        }
    }
}

impl BrowserBackend for NullBrowser {
    fn name(&self) -> &str {
        "NullBrowser"
    }

    fn initialize_runtime(&self, _settings: &RuntimeSettings) -> Result<()> {
        self.runtime_inits.fetch_add(1, Ordering::SeqCst);
        self.record(BackendCall::InitializeRuntime);
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(anyhow!("engine libraries not found"));
        }
        Ok(())
    }

    fn create_session(&self, request: SessionRequest) -> Result<()> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(anyhow!("cannot create session"));
        }
        if !request.windowless {
            return Err(anyhow!("windowed sessions are not supported"));
        }

        self.record(BackendCall::CreateSession {
            id: request.id,
            initial_url: request.initial_url.clone(),
            size: request.size,
        });
        lock(&self.sessions).push((request.id, request.client));
        Ok(())
    }

    fn destroy_session(&self, id: SessionId) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::DestroySession(id));
        lock(&self.sessions).retain(|(sid, _)| *sid != id);
        Ok(())
    }

    fn navigate(&self, id: SessionId, request: &LoadRequest) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::Navigate(id, request.clone()));
        Ok(())
    }

    fn execute_script(&self, id: SessionId, code: &str, source_url: &str, line: i32) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::ExecuteScript {
            id,
            code: code.to_string(),
            source_url: source_url.to_string(),
            line,
        });
        Ok(())
    }

    fn go_back(&self, id: SessionId) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::GoBack(id));
        Ok(())
    }

    fn go_forward(&self, id: SessionId) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::GoForward(id));
        Ok(())
    }

    fn stop(&self, id: SessionId) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::Stop(id));
        Ok(())
    }

    fn reload(&self, id: SessionId) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::Reload(id));
        Ok(())
    }

    fn set_zoom(&self, id: SessionId, level: f64) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::SetZoom(id, level));
        Ok(())
    }

    fn resize(&self, id: SessionId, size: ViewSize) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::Resize(id, size));
        Ok(())
    }

    fn invalidate(&self, id: SessionId, kind: PaintElementType) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::Invalidate(id, kind));
        Ok(())
    }

    fn send_pointer_event(&self, id: SessionId, event: &PointerEvent) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::Pointer(id, *event));
        Ok(())
    }

    fn send_wheel_event(&self, id: SessionId, event: &WheelEvent) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::Wheel(id, *event));
        Ok(())
    }

    fn send_key_event(&self, id: SessionId, event: &KeyEvent) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::Key(id, *event));
        Ok(())
    }

    fn send_focus_event(&self, id: SessionId, focused: bool) -> Result<()> {
        self.known(id)?;
        self.record(BackendCall::Focus(id, focused));
        Ok(())
    }
}
