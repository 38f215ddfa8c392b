//! Runtime configuration: where things live on disk and which catalog to talk to.
//!
//! ```rust
//! use mangaka::config::ConfigBuilder;
//! use std::time::Duration;
//!
//! let config = ConfigBuilder::default()
//!     .library_dir("/tmp/library")
//!     .session_max_age(Duration::from_secs(3600))
//!     .build()
//!     .unwrap();
//! assert_eq!(config.favorites_path.to_str(), Some("favorites.json"));
//! ```

use derive_builder::Builder;
use std::path::PathBuf;
use std::time::Duration;

/// Base URL of the MangaDex REST API.
pub const DEFAULT_API_BASE: &str = "https://api.mangadex.org";

/// Favorites file, relative to the working directory.
pub const DEFAULT_FAVORITES_FILE: &str = "favorites.json";

/// Read-online sessions older than this are swept at startup.
pub const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct Config {
    /// Root of the offline library: `<library_dir>/<manga>/<chapter>.cbz`
    #[builder(default = "default_library_dir()")]
    pub library_dir: PathBuf,

    #[builder(default = "PathBuf::from(DEFAULT_FAVORITES_FILE)")]
    pub favorites_path: PathBuf,

    /// Parent of every scratch directory
    #[builder(default = "std::env::temp_dir().join(\"mangaka\")")]
    pub scratch_root: PathBuf,

    #[builder(default = "DEFAULT_SESSION_MAX_AGE")]
    pub session_max_age: Duration,

    #[builder(default = "DEFAULT_API_BASE.to_string()")]
    pub api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_dir: default_library_dir(),
            favorites_path: PathBuf::from(DEFAULT_FAVORITES_FILE),
            scratch_root: std::env::temp_dir().join("mangaka"),
            session_max_age: DEFAULT_SESSION_MAX_AGE,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Defaults with `MANGAKA_LIBRARY` and `MANGAKA_FAVORITES` overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os("MANGAKA_LIBRARY") {
            config.library_dir = PathBuf::from(dir);
        }
        if let Some(path) = std::env::var_os("MANGAKA_FAVORITES") {
            config.favorites_path = PathBuf::from(path);
        }
        config
    }
}

fn default_library_dir() -> PathBuf {
    dirs::document_dir()
        .map(|dir| dir.join("Mangaka"))
        .unwrap_or_else(|| PathBuf::from("library"))
}
