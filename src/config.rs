/// Application configuration read from the environment
use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::presets::{self, Preset, DEFAULT_URL_SCHEME};
use crate::storage::FileStorage;
use std::path::PathBuf;

pub const PLATFORM_VAR: &str = "SCHALTER_PLATFORM";
pub const URL_SCHEME_VAR: &str = "AUTH_URL_SCHEME";
pub const DATA_DIR_VAR: &str = "SCHALTER_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory name under the data dir
    pub app_name: String,
    pub platform: Platform,
    /// Scheme native redirect URIs are registered with
    pub url_scheme: String,
    /// Explicit storage directory; `None` uses the XDG data dir
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            platform: Platform::default(),
            url_scheme: DEFAULT_URL_SCHEME.to_string(),
            data_dir: None,
        }
    }

    /// Build the configuration from environment variables
    ///
    /// - `SCHALTER_PLATFORM`: `web` (default), `hybrid` or `capacitor`
    /// - `AUTH_URL_SCHEME`: native redirect scheme, default `msauth`
    /// - `SCHALTER_DATA_DIR`: storage directory override
    pub fn from_env(app_name: &str) -> Result<Self> {
        Self::from_lookup(app_name, |name| std::env::var(name).ok())
    }

    fn from_lookup<F>(app_name: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(app_name);

        if let Some(platform) = lookup(PLATFORM_VAR) {
            config.platform = platform.parse().map_err(Error::Config)?;
        }
        if let Some(scheme) = lookup(URL_SCHEME_VAR).filter(|s| !s.is_empty()) {
            config.url_scheme = scheme;
        }
        config.data_dir = lookup(DATA_DIR_VAR).filter(|s| !s.is_empty()).map(PathBuf::from);

        Ok(config)
    }

    /// Whether the built-in presets can be offered
    pub fn presets_enabled(&self) -> bool {
        Preset::is_available(&self.url_scheme)
    }

    /// Redirects for native custom configurations
    pub fn mobile_overrides(&self) -> presets::RedirectOverrides {
        presets::mobile_overrides(&self.url_scheme)
    }

    pub fn open_file_storage(&self) -> Result<FileStorage> {
        match &self.data_dir {
            Some(dir) => FileStorage::with_path(dir.clone()),
            None => FileStorage::new(&self.app_name),
        }
    }
}
