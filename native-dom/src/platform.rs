use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform the native toolkit is running on.
///
/// Attribute namespaces are parsed with the same aliases as [`FromStr`],
/// so `iphone` and `ipad` both target [`Platform::Ios`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Web,
    Desktop,
    #[serde(other)]
    Unknown,
}

impl Platform {
    /// Platform of the current compilation target
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else if cfg!(any(target_os = "macos", target_os = "linux", target_os = "windows")) {
            Platform::Desktop
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Web => "web",
            Platform::Desktop => "desktop",
            Platform::Unknown => "unknown",
        }
    }

    /// Whether an attribute namespace targets this platform
    pub fn matches_namespace(self, namespace: &str) -> bool {
        self != Platform::Unknown && namespace.parse::<Platform>() == Ok(self)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let platform = match s.to_ascii_lowercase().as_str() {
            "ios" | "iphone" | "ipad" => Platform::Ios,
            "android" => Platform::Android,
            "web" | "mobileweb" => Platform::Web,
            "desktop" | "macos" | "linux" | "windows" => Platform::Desktop,
            _ => Platform::Unknown,
        };
        Ok(platform)
    }
}
