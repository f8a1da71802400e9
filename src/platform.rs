use std::fmt::{Display, Formatter};

/// Platform the host application runs on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOS,
    Android,
    IOS,
    Web,
    Other(String),
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::IOS
        } else if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other(std::env::consts::OS.to_string())
        }
    }

    /// Whether the off-screen engine can run here.
    ///
    /// The engine integration has not been brought up on macOS, and the mobile and
    /// web targets have no engine build at all.
    pub fn is_supported(&self) -> bool {
        matches!(self, Platform::Windows | Platform::Linux)
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Windows => write!(f, "Windows"),
            Platform::Linux => write!(f, "Linux"),
            Platform::MacOS => write!(f, "MacOS"),
            Platform::Android => write!(f, "Android"),
            Platform::IOS => write!(f, "iOS"),
            Platform::Web => write!(f, "Web"),
            Platform::Other(name) => write!(f, "{name}"),
        }
    }
}
