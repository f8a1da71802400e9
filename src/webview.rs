//! The WebView control.
//!
//! A [`WebView`] puts one engine session on a host UI canvas. The host drives it from
//! its UI thread:
//!
//! - once per frame, [`WebView::render`] with the canvas and the current [`HostFrame`];
//! - for every input event, the matching `on_*` handler with the current [`ControlState`].
//!
//! The session is created lazily on the first render after [`WebView::enable`], and
//! destroyed by [`WebView::disable`]. Engine notifications are delivered to observers
//! registered with [`WebView::subscribe`] at the start of each render.
//!
//! # Example
//!
//! ```rust
//! use gosub_webview::engine::backends::null::NullBrowser;
//! use gosub_webview::render::backends::null::NullTextureBackend;
//! use gosub_webview::render::{NormalizedRect, RenderList, ViewSize};
//! use gosub_webview::{EngineRuntime, HostFrame, Platform, RuntimeSettings, SessionState, WebView, WebViewConfig};
//! use std::sync::Arc;
//!
//! let browser = Arc::new(NullBrowser::new());
//! let runtime = Arc::new(EngineRuntime::new(browser.clone(), Platform::Linux, RuntimeSettings::default()));
//!
//! let mut view = WebView::new(WebViewConfig::default(), runtime, NullTextureBackend::new());
//! view.enable();
//!
//! let frame = HostFrame::new(ViewSize::new(800, 600), NormalizedRect::UNIT, 8192);
//! let mut canvas = RenderList::new(frame.viewport_size, true);
//! view.render(&mut canvas, &frame);
//!
//! assert_eq!(view.session_state(), SessionState::Initializing);
//! assert_eq!(view.view_size(), ViewSize::new(800, 600));
//! ```

use crate::config::{NavigationTarget, WebViewConfig};
use crate::engine::backend::{LoadRequest, SessionId};
use crate::engine::events::{CursorKind, EventResponse, LoadState, WebViewEvent};
use crate::engine::input::{ControlState, EngineInput, HostMouseButton, InputOutcome, InputTranslator, Translation};
use crate::engine::relay::{EventRelay, SubscriptionId, ViewState};
use crate::engine::runtime::EngineRuntime;
use crate::engine::session::{clamp_zoom, BrowserSession, SessionState, ABOUT_BLANK};
use crate::render::{
    negotiate_view_size, Canvas, Compositor, FrameBuffer, NormalizedRect, TextureBackend, TextureId, ViewSize,
};
use std::path::Path;
use std::sync::Arc;

/// What the host knows about the frame being rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostFrame {
    /// Host viewport in pixels
    pub viewport_size: ViewSize,
    /// The control's rectangle as fractions of the viewport
    pub screen_rect: NormalizedRect,
    /// Largest texture the GPU can allocate
    pub max_texture_size: u32,
}

impl HostFrame {
    pub fn new(viewport_size: ViewSize, screen_rect: NormalizedRect, max_texture_size: u32) -> Self {
        Self {
            viewport_size,
            screen_rect,
            max_texture_size,
        }
    }
}

/// An off-screen browser drawn as a UI control.
pub struct WebView<T: TextureBackend> {
    config: WebViewConfig,
    runtime: Arc<EngineRuntime>,
    compositor: Compositor<T>,
    /// Written by the engine, read by the compositor
    frames: Arc<FrameBuffer>,
    /// View size and cursor, shared with the engine
    view: Arc<ViewState>,
    relay: EventRelay,
    session: Option<BrowserSession>,

    enabled: bool,
    destroyed: bool,
    /// Session creation failed; not retried until the control is enabled again
    create_failed: bool,
    /// Reassert zoom and repaint the whole view on the next render
    needs_invalidate: bool,

    title: String,
    address: String,
    hovered_url: String,
    load_state: LoadState,
}

impl<T: TextureBackend> WebView<T> {
    /// Creates a disabled control. Nothing touches the engine before [`WebView::enable`]
    /// and the first render.
    pub fn new(config: WebViewConfig, runtime: Arc<EngineRuntime>, textures: T) -> Self {
        Self {
            config,
            runtime,
            compositor: Compositor::new(textures),
            frames: Arc::new(FrameBuffer::new()),
            view: Arc::new(ViewState::default()),
            relay: EventRelay::new(),
            session: None,
            enabled: false,
            destroyed: false,
            create_failed: false,
            needs_invalidate: true,
            title: String::new(),
            address: String::new(),
            hovered_url: String::new(),
            load_state: LoadState::default(),
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
        self.create_failed = false;
    }

    /// Destroys the session and releases the texture. The runtime keeps running.
    pub fn disable(&mut self) {
        self.enabled = false;

        if let Some(mut session) = self.session.take() {
            session.destroy();
            self.destroyed = true;
        }
        self.compositor.release();
        self.frames.clear();

        // Leftovers of the old session must not leak into the next one
        self.relay.drain();
        self.needs_invalidate = true;
        self.title.clear();
        self.address.clear();
        self.hovered_url.clear();
        self.load_state = LoadState::default();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// One host frame: deliver engine notifications, follow the control's size, upload
    /// the latest engine frame and draw it.
    pub fn render(&mut self, canvas: &mut dyn Canvas, frame: &HostFrame) {
        if !self.enabled {
            return;
        }

        self.process_events();

        let size = negotiate_view_size(frame.viewport_size, frame.screen_rect.size(), frame.max_texture_size);

        if self.runtime.is_supported() {
            if self.session.is_none() && !self.create_failed {
                self.create_session(size);
            }
            self.update_session(size);
        }

        self.compositor.draw(canvas, frame.screen_rect, size);

        if !self.runtime.is_supported() {
            self.compositor
                .draw_unsupported(canvas, frame.screen_rect, self.runtime.platform());
        }
    }

    fn create_session(&mut self, size: ViewSize) {
        // Failures are logged once by the runtime
        let Some(token) = self.runtime.ensure_initialized() else {
            return;
        };

        // Late paints of an earlier session keep landing in that session's buffers
        self.frames = Arc::new(FrameBuffer::new());
        self.view = Arc::new(ViewState::default());
        self.view.set_size(size);
        let client = self.relay.bridge(self.frames.clone(), self.view.clone());
        let url = self.config.initial_url();

        match BrowserSession::create(&self.runtime, token, &url, size, client) {
            Ok(session) => {
                self.session = Some(session);
                self.destroyed = false;
                self.needs_invalidate = true;
            }
            Err(e) => {
                log::error!("webview: {}", e);
                self.create_failed = true;
            }
        }
    }

    fn update_session(&mut self, size: ViewSize) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if session.size() != size {
            self.view.set_size(size);
            session.resize(size);
            self.compositor.mark_for_recreate();
        }

        self.compositor.ensure_texture(size);

        if self.needs_invalidate && session.is_ready() {
            session.set_zoom(self.config.zoom);
            session.invalidate();
            self.needs_invalidate = false;
        }

        self.compositor.update(&self.frames);
    }

    fn process_events(&mut self) {
        for event in self.relay.drain() {
            self.apply(&event);
            let handled = self.relay.dispatch(&event);

            if let WebViewEvent::BeforePopup { target_url } = &event {
                if !handled {
                    log::debug!("webview: opening popup {} in place", target_url);
                    self.load_url(target_url);
                }
            }
        }
    }

    fn apply(&mut self, event: &WebViewEvent) {
        match event {
            WebViewEvent::SessionCreated { session: id } => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                if !session.mark_ready(*id) {
                    return;
                }

                // Zoom is reasserted with the invalidate on this tick
                self.needs_invalidate = true;

                // Literal HTML can only be loaded once the session runs
                if let NavigationTarget::Html(content) = self.config.resolve_target() {
                    session.navigate(LoadRequest::Html {
                        content,
                        base_url: ABOUT_BLANK.to_string(),
                    });
                }
            }
            WebViewEvent::TitleChanged { title } => self.title = title.clone(),
            WebViewEvent::AddressChanged { frame, url } if frame.is_main => self.address = url.clone(),
            WebViewEvent::TargetUrlChanged { url } => self.hovered_url = url.clone(),
            WebViewEvent::LoadingStateChanged(state) => self.load_state = *state,
            WebViewEvent::LoadEnd { .. } => self.needs_invalidate = true,
            _ => {}
        }
    }

    fn ready_session(&self) -> Option<&BrowserSession> {
        self.session.as_ref().filter(|s| s.is_ready())
    }

    // ****************************************
    // ** Navigation

    fn load_request(&self, target: NavigationTarget) -> LoadRequest {
        match target {
            NavigationTarget::Url(url) => LoadRequest::Url(url),
            NavigationTarget::File(path) => LoadRequest::Url(self.config.file_url(&path)),
            NavigationTarget::Html(content) => LoadRequest::Html {
                content,
                base_url: ABOUT_BLANK.to_string(),
            },
            NavigationTarget::Blank => LoadRequest::Url(ABOUT_BLANK.to_string()),
        }
    }

    /// Loads `target` in the main frame. Does nothing until the session is ready.
    pub fn navigate(&self, target: NavigationTarget) {
        if let Some(session) = &self.session {
            session.navigate(self.load_request(target));
        }
    }

    pub fn load_url(&self, url: &str) {
        self.navigate(NavigationTarget::Url(url.to_string()));
    }

    pub fn load_file<P: AsRef<Path>>(&self, path: P) {
        self.navigate(NavigationTarget::File(path.as_ref().to_path_buf()));
    }

    /// Loads literal HTML. Relative references resolve against `base_url`.
    pub fn load_html(&self, content: &str, base_url: &str) {
        if let Some(session) = &self.session {
            session.navigate(LoadRequest::Html {
                content: content.to_string(),
                base_url: base_url.to_string(),
            });
        }
    }

    /// Runs a script in the main frame. The result is not reported back.
    pub fn execute_javascript(&self, code: &str, url: &str, line: i32) {
        if let Some(session) = &self.session {
            session.execute_script(code, url, line);
        }
    }

    pub fn go_back(&self) {
        if let Some(session) = &self.session {
            session.go_back();
        }
    }

    pub fn go_forward(&self) {
        if let Some(session) = &self.session {
            session.go_forward();
        }
    }

    pub fn stop(&self) {
        if let Some(session) = &self.session {
            session.stop();
        }
    }

    pub fn reload(&self) {
        if let Some(session) = &self.session {
            session.reload();
        }
    }

    // ****************************************
    // ** State

    pub fn can_go_back(&self) -> bool {
        self.ready_session().is_some() && self.load_state.can_go_back
    }

    pub fn can_go_forward(&self) -> bool {
        self.ready_session().is_some() && self.load_state.can_go_forward
    }

    pub fn is_loading(&self) -> bool {
        self.ready_session().is_some() && self.load_state.loading
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Address of the main frame. Empty without a ready session.
    pub fn target_url(&self) -> &str {
        if self.ready_session().is_some() {
            &self.address
        } else {
            ""
        }
    }

    /// Link under the pointer, empty when none.
    pub fn hovered_url(&self) -> &str {
        &self.hovered_url
    }

    /// Size the engine renders at.
    pub fn view_size(&self) -> ViewSize {
        self.view.size()
    }

    pub fn current_cursor(&self) -> CursorKind {
        self.view.cursor()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id())
    }

    pub fn session_state(&self) -> SessionState {
        if !self.runtime.is_supported() {
            return SessionState::Unsupported;
        }
        match &self.session {
            Some(session) => session.state(),
            None if self.destroyed => SessionState::Destroyed,
            None => SessionState::Uninitialized,
        }
    }

    pub fn config(&self) -> &WebViewConfig {
        &self.config
    }

    pub fn can_focus(&self, state: &ControlState) -> bool {
        state.is_active()
    }

    pub fn textures(&self) -> &T {
        self.compositor.backend()
    }

    /// Texture currently drawn, if it holds an engine frame.
    pub fn texture(&self) -> Option<(TextureId, ViewSize)> {
        self.compositor.texture().filter(|_| self.compositor.shows_frame())
    }

    // ****************************************
    // ** Configuration

    fn reload_start_page(&self) {
        self.navigate(self.config.resolve_target());
    }

    pub fn set_start_url<S: Into<String>>(&mut self, url: S) {
        self.config.start_url = url.into();
        self.reload_start_page();
    }

    pub fn set_start_file<S: Into<String>>(&mut self, file: S) {
        self.config.start_file = file.into();
        self.reload_start_page();
    }

    pub fn set_start_string<S: Into<String>>(&mut self, html: S) {
        self.config.start_string = html.into();
        self.reload_start_page();
    }

    /// Sets the zoom level, clamped to `[-10, 10]`. Returns the level in effect.
    pub fn set_zoom(&mut self, level: f64) -> f64 {
        let zoom = clamp_zoom(level);
        self.config.zoom = zoom;

        if let Some(session) = self.session.as_mut().filter(|s| s.is_ready()) {
            session.set_zoom(zoom);
            self.needs_invalidate = true;
        }
        zoom
    }

    pub fn zoom(&self) -> f64 {
        self.config.zoom
    }

    // ****************************************
    // ** Input

    fn translator(&self) -> InputTranslator {
        InputTranslator::new(self.view.size(), self.ready_session().is_some())
    }

    fn forward(&self, translation: Translation) -> InputOutcome {
        if let Some(session) = self.ready_session() {
            for input in &translation.inputs {
                match input {
                    EngineInput::Pointer(e) => session.send_pointer(e),
                    EngineInput::Wheel(e) => session.send_wheel(e),
                    EngineInput::Key(e) => session.send_key(e),
                    EngineInput::Focus(focused) => session.send_focus(*focused),
                }
            }
        }
        translation.outcome
    }

    pub fn on_pointer_down(&self, state: &ControlState, button: HostMouseButton) -> InputOutcome {
        self.forward(self.translator().pointer_down(state, button))
    }

    pub fn on_pointer_up(&self, state: &ControlState, button: HostMouseButton) -> InputOutcome {
        self.forward(self.translator().pointer_up(state, button))
    }

    pub fn on_double_click(&self, state: &ControlState, button: HostMouseButton) -> InputOutcome {
        self.forward(self.translator().double_click(state, button))
    }

    pub fn on_pointer_move(&self, state: &ControlState) -> InputOutcome {
        self.forward(self.translator().pointer_move(state))
    }

    pub fn on_wheel(&self, state: &ControlState, delta: i32) -> InputOutcome {
        self.forward(self.translator().wheel(state, delta))
    }

    pub fn on_key_down(&self, state: &ControlState, key_code: i32) -> InputOutcome {
        self.forward(self.translator().key_down(state, key_code))
    }

    pub fn on_key_up(&self, state: &ControlState, key_code: i32) -> InputOutcome {
        self.forward(self.translator().key_up(state, key_code))
    }

    pub fn on_char(&self, state: &ControlState, ch: char) -> InputOutcome {
        self.forward(self.translator().char(state, ch))
    }

    // ****************************************
    // ** Events and device

    /// Registers an observer for engine notifications. Observers run inside
    /// [`WebView::render`].
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&WebViewEvent) -> EventResponse + 'static,
    {
        self.relay.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.relay.unsubscribe(id)
    }

    /// The GPU device was restored and lost its texture contents; upload again.
    pub fn notify_device_restored(&mut self) {
        self.compositor.request_upload();
    }
}
