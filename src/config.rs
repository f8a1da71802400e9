//! WebView configuration.
//!
//! `WebViewConfig` decides what a control shows when its session starts, and at
//! which zoom level. Hosts usually persist it with the rest of their UI, so it is
//! serde (de)serializable.
//!
//! The start page is picked in this order: `start_url`, then `start_file`, then
//! `start_string` (literal HTML), then `about:blank`. Empty strings count as unset.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_webview::config::{NavigationTarget, WebViewConfig};
//! let cfg = WebViewConfig::default();
//! assert!(matches!(cfg.resolve_target(), NavigationTarget::Html(_)));
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_webview::config::{NavigationTarget, WebViewConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = WebViewConfig::builder()
//!     .start_url("https://example.com")
//!     .zoom(1.5)
//!     .build()?; // returns Result<WebViewConfig, ConfigError>
//! assert_eq!(cfg.resolve_target(), NavigationTarget::Url("https://example.com".into()));
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Validation returns [`ConfigError`] for a non-finite zoom level. Finite levels outside
//! `-10.0..=10.0` are clamped instead.

use crate::engine::session::{clamp_zoom, ABOUT_BLANK};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Page shown when nothing else is configured.
pub const DEFAULT_START_STRING: &str = "<h1 style='text-align: center;'><strong>Default page</strong></h1><p>&nbsp;</p><p style='text-align: center;'><span style='color: #ff6600;'>WebView</span></p>";

/// What the control navigates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// A URL string
    Url(String),
    /// A local file, absolute or relative to the resource root
    File(PathBuf),
    /// Literal HTML
    Html(String),
    /// `about:blank`
    Blank,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebViewConfig {
    /// Initial web page address
    pub start_url: String,
    /// Initial local file
    pub start_file: String,
    /// Initial literal HTML content
    pub start_string: String,
    /// Zoom level in `-10.0..=10.0`; 0 is 100%
    pub zoom: f64,
    /// Base directory for relative `start_file` paths. The working directory when unset.
    pub resource_root: Option<PathBuf>,
}

impl Default for WebViewConfig {
    fn default() -> Self {
        Self {
            start_url: String::new(),
            start_file: String::new(),
            start_string: DEFAULT_START_STRING.to_string(),
            zoom: 0.0,
            resource_root: None,
        }
    }
}

impl WebViewConfig {
    pub fn builder() -> WebViewConfigBuilder {
        WebViewConfigBuilder::default()
    }

    /// Parses and validates a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut cfg: WebViewConfig = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        normalize(&mut cfg)?;
        Ok(cfg)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The configured start page.
    pub fn resolve_target(&self) -> NavigationTarget {
        if !self.start_url.is_empty() {
            NavigationTarget::Url(self.start_url.clone())
        } else if !self.start_file.is_empty() {
            NavigationTarget::File(PathBuf::from(&self.start_file))
        } else if !self.start_string.is_empty() {
            NavigationTarget::Html(self.start_string.clone())
        } else {
            NavigationTarget::Blank
        }
    }

    /// URL a new session starts on. Literal HTML can only be loaded into a running
    /// session, so it starts on `about:blank`.
    pub fn initial_url(&self) -> String {
        match self.resolve_target() {
            NavigationTarget::Url(url) => url,
            NavigationTarget::File(path) => self.file_url(&path),
            NavigationTarget::Html(_) | NavigationTarget::Blank => ABOUT_BLANK.to_string(),
        }
    }

    /// `file://` URL for a local file. Relative paths resolve against
    /// [`WebViewConfig::resource_root`], or the working directory.
    pub fn file_url(&self, path: &Path) -> String {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            let root = match &self.resource_root {
                Some(root) => root.clone(),
                None => std::env::current_dir().unwrap_or_default(),
            };
            root.join(path)
        };

        match Url::from_file_path(&absolute) {
            Ok(url) => url.to_string(),
            Err(()) => {
                log::warn!("config: {} is not a valid file path", absolute.display());
                format!("file:///{}", absolute.display())
            }
        }
    }
}

/// Builder for [`WebViewConfig`].
#[derive(Debug, Clone, Default)]
pub struct WebViewConfigBuilder {
    inner: WebViewConfig,
}

impl WebViewConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut WebViewConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn start_url<S: Into<String>>(self, url: S) -> Self { self.map(|c| c.start_url = url.into()) }
    pub fn start_file<S: Into<String>>(self, file: S) -> Self { self.map(|c| c.start_file = file.into()) }
    pub fn start_string<S: Into<String>>(self, html: S) -> Self { self.map(|c| c.start_string = html.into()) }
    pub fn zoom(self, level: f64) -> Self { self.map(|c| c.zoom = level) }
    pub fn resource_root<P: Into<PathBuf>>(self, root: P) -> Self { self.map(|c| c.resource_root = Some(root.into())) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut WebViewConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(mut self) -> Result<WebViewConfig, ConfigError> {
        normalize(&mut self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("zoom {0} is not a finite number")]
    InvalidZoom(f64),

    #[error("cannot parse config: {0}")]
    Parse(String),
}

fn normalize(c: &mut WebViewConfig) -> Result<(), ConfigError> {
    if !c.zoom.is_finite() {
        return Err(ConfigError::InvalidZoom(c.zoom));
    }
    c.zoom = clamp_zoom(c.zoom);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_wins_over_file_and_string() {
        let cfg = WebViewConfig::builder()
            .start_url("https://example.com")
            .start_file("f.html")
            .start_string("<b>x</b>")
            .build()
            .unwrap();
        assert_eq!(cfg.resolve_target(), NavigationTarget::Url("https://example.com".into()));
    }

    #[test]
    fn file_wins_over_string() {
        let root = tempfile::tempdir().unwrap();
        let cfg = WebViewConfig::builder()
            .start_url("")
            .start_file("f.html")
            .start_string("<b>x</b>")
            .resource_root(root.path())
            .build()
            .unwrap();

        assert_eq!(cfg.resolve_target(), NavigationTarget::File(PathBuf::from("f.html")));
        let url = cfg.initial_url();
        assert!(url.starts_with("file:///"), "{url}");
        assert!(url.ends_with("/f.html"), "{url}");
    }

    #[test]
    fn string_then_blank() {
        let cfg = WebViewConfig::default();
        assert_eq!(cfg.resolve_target(), NavigationTarget::Html(DEFAULT_START_STRING.into()));
        assert_eq!(cfg.initial_url(), "about:blank");

        let cfg = WebViewConfig::builder().start_string("").build().unwrap();
        assert_eq!(cfg.resolve_target(), NavigationTarget::Blank);
    }

    #[test]
    fn absolute_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("page with space.html");
        std::fs::write(&file, "<p>hi</p>").unwrap();

        let cfg = WebViewConfig::default();
        let url = cfg.file_url(&file);
        assert_eq!(Url::parse(&url).unwrap().to_file_path().unwrap(), file);
        assert!(url.contains("%20"));
    }

    #[test]
    fn zoom_validation() {
        let cfg = WebViewConfig::builder().zoom(25.0).build().unwrap();
        assert_eq!(cfg.zoom, 10.0);

        let err = WebViewConfig::builder().zoom(f64::NAN).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidZoom(_)));
    }

    #[test]
    fn json_roundtrip_with_defaults() {
        let cfg = WebViewConfig::from_json(r#"{ "start_url": "https://example.com", "zoom": -12.0 }"#).unwrap();
        assert_eq!(cfg.start_url, "https://example.com");
        assert_eq!(cfg.zoom, -10.0);
        assert_eq!(cfg.start_string, DEFAULT_START_STRING);

        let back = WebViewConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(back, cfg);

        assert!(matches!(WebViewConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }
}
