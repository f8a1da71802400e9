//! Process-wide engine runtime.
//!
//! The engine has to be started once per process before any session can be created.
//! [`EngineRuntime`] owns that start-up: it is shared by all controls as an
//! `Arc<EngineRuntime>` and hands out a [`RuntimeToken`] once the engine runs. Sessions
//! can only be created with a token issued by the same runtime.
//!
//! A failed start-up is logged once and remembered; every later attempt returns the
//! same error without touching the engine again.
//!
//! # Example
//!
//! ```rust
//! use gosub_webview::engine::backends::null::NullBrowser;
//! use gosub_webview::engine::{EngineRuntime, RuntimeSettings};
//! use gosub_webview::Platform;
//! use std::sync::Arc;
//!
//! let runtime = EngineRuntime::new(Arc::new(NullBrowser::new()), Platform::Linux, RuntimeSettings::default());
//! assert!(runtime.ensure_initialized().is_some());
//! assert!(runtime.is_ready());
//! ```

use crate::engine::backend::BrowserBackend;
use crate::errors::WebViewError;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Log verbosity of the engine itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogSeverity {
    Default,
    #[default]
    Verbose,
    Info,
    Warning,
    Error,
    Disable,
}

/// Settings the engine is started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Run the renderer inside the host process
    pub single_process: bool,
    /// Render into off-screen buffers instead of native windows
    pub windowless_rendering_enabled: bool,
    /// Let the engine run its own message loop thread
    pub multi_threaded_message_loop: bool,
    pub log_severity: LogSeverity,
    /// Engine log file. Deleted before the engine starts.
    pub log_file: Option<PathBuf>,
    /// Helper executable for engine subprocesses; the host executable when unset
    pub browser_subprocess_path: Option<PathBuf>,
    /// On-disk cache. In-memory cache when unset.
    pub cache_path: Option<PathBuf>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            single_process: true,
            windowless_rendering_enabled: true,
            multi_threaded_message_loop: true,
            log_severity: LogSeverity::Verbose,
            log_file: None,
            browser_subprocess_path: None,
            cache_path: None,
        }
    }
}

/// Proof that the engine runtime was started.
///
/// Only [`EngineRuntime`] creates tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeToken {
    runtime: Uuid,
}

#[derive(Debug, Clone)]
enum RuntimeState {
    Uninitialized,
    Ready,
    Failed(WebViewError),
}

/// The engine runtime of this process.
pub struct EngineRuntime {
    id: Uuid,
    backend: Arc<dyn BrowserBackend>,
    platform: Platform,
    settings: RuntimeSettings,
    state: Mutex<RuntimeState>,
}

impl std::fmt::Debug for EngineRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRuntime")
            .field("id", &self.id)
            .field("backend", &self.backend.name())
            .field("platform", &self.platform)
            .field("state", &*self.state())
            .finish()
    }
}

impl EngineRuntime {
    pub fn new(backend: Arc<dyn BrowserBackend>, platform: Platform, settings: RuntimeSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            backend,
            platform,
            settings,
            state: Mutex::new(RuntimeState::Uninitialized),
        }
    }

    /// Runtime for the platform this binary was compiled for, with default settings.
    pub fn for_current_platform(backend: Arc<dyn BrowserBackend>) -> Self {
        Self::new(backend, Platform::current(), RuntimeSettings::default())
    }

    pub fn backend(&self) -> &Arc<dyn BrowserBackend> {
        &self.backend
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    pub fn is_supported(&self) -> bool {
        self.platform.is_supported()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state(), RuntimeState::Ready)
    }

    /// Error of a failed start-up, if any.
    pub fn failure(&self) -> Option<WebViewError> {
        match &*self.state() {
            RuntimeState::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }

    fn state(&self) -> MutexGuard<'_, RuntimeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn token(&self) -> RuntimeToken {
        RuntimeToken { runtime: self.id }
    }

    /// Starts the engine.
    ///
    /// Unsupported platforms are rejected before the engine is touched. A second call
    /// after a successful start is an error ([`WebViewError::AlreadyInitialized`]); a
    /// call after a failed start returns the first failure.
    pub fn initialize(&self) -> Result<RuntimeToken, WebViewError> {
        if !self.platform.is_supported() {
            return Err(WebViewError::Unsupported(self.platform.clone()));
        }

        let mut state = self.state();
        match &*state {
            RuntimeState::Ready => {
                log::error!("engine runtime: already initialized");
                return Err(WebViewError::AlreadyInitialized);
            }
            RuntimeState::Failed(e) => return Err(e.clone()),
            RuntimeState::Uninitialized => {}
        }

        self.remove_stale_log();

        log::debug!("engine runtime: starting {} on {}", self.backend.name(), self.platform);
        match self.backend.initialize_runtime(&self.settings) {
            Ok(()) => {
                *state = RuntimeState::Ready;
                Ok(self.token())
            }
            Err(e) => {
                log::error!("engine runtime: initialization failed: {}", e);
                let err = WebViewError::RuntimeInit(e.to_string());
                *state = RuntimeState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Starts the engine on first use. Returns a token once the engine runs, `None` when
    /// the platform is unsupported or the start-up failed.
    pub fn ensure_initialized(&self) -> Option<RuntimeToken> {
        if !self.platform.is_supported() {
            return None;
        }

        match &*self.state() {
            RuntimeState::Ready => return Some(self.token()),
            RuntimeState::Failed(_) => return None,
            RuntimeState::Uninitialized => {}
        }

        self.initialize().ok()
    }

    /// Checks that the token was issued by this runtime.
    pub fn verify(&self, token: RuntimeToken) -> Result<(), WebViewError> {
        if token.runtime != self.id {
            return Err(WebViewError::InvalidToken);
        }
        Ok(())
    }

    fn remove_stale_log(&self) {
        let Some(path) = &self.settings.log_file else {
            return;
        };

        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                log::debug!("engine runtime: cannot remove {}: {}", path.display(), e);
            }
        }
    }
}
