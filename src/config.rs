//! Engine configuration.
//!
//! Settings are read from a TOML file. Every key is optional; missing keys
//! keep their defaults and unknown keys are ignored.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CatalogError, Result};

/// Default PokeAPI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2/";

/// Tunables for the catalog engine.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL every relative request path is joined onto.
    pub base_url: String,
    /// Entries per page.
    pub page_size: usize,
    /// Maximum simultaneous detail resolutions during a page load.
    pub concurrency_limit: usize,
    /// First-choice language code for descriptions.
    pub preferred_language: String,
    /// Second-choice language code for descriptions.
    pub fallback_language: String,
    /// `limit` query parameter for the index request.
    pub index_limit: usize,
    /// Maximum number of search suggestions returned.
    pub suggestion_limit: usize,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Number of recent searches remembered.
    pub recent_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 30,
            concurrency_limit: 8,
            preferred_language: "de".to_string(),
            fallback_language: "en".to_string(),
            index_limit: 1000,
            suggestion_limit: 10,
            request_timeout_secs: 10,
            recent_capacity: 16,
        }
    }
}

impl EngineConfig {
    /// What: Parse and validate a configuration from TOML text.
    ///
    /// Inputs:
    /// - `text`: TOML document.
    ///
    /// Output:
    /// - Validated `EngineConfig`.
    ///
    /// # Errors
    /// - Returns `Config` for TOML syntax/type errors or failed validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: Self =
            toml::from_str(text).map_err(|e| CatalogError::Config(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// What: Read and validate a configuration file.
    ///
    /// Inputs:
    /// - `path`: TOML file to read.
    ///
    /// # Errors
    /// - Returns `Config` when the file cannot be read or does not validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// What: Read a configuration file, falling back to defaults when it is absent.
    ///
    /// Inputs:
    /// - `path`: TOML file that may not exist.
    ///
    /// Output:
    /// - Defaults when the file does not exist; the parsed file otherwise.
    ///
    /// # Errors
    /// - Returns `Config` when an existing file is unreadable or invalid.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file missing; using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// What: Check the invariants the engine relies on.
    ///
    /// # Errors
    /// - Returns `Config` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(CatalogError::Config("base_url must not be empty".into()));
        }
        let positive = [
            ("page_size", self.page_size),
            ("concurrency_limit", self.concurrency_limit),
            ("index_limit", self.index_limit),
            ("suggestion_limit", self.suggestion_limit),
            ("recent_capacity", self.recent_capacity),
        ];
        if let Some((key, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(CatalogError::Config(format!("{key} must be positive")));
        }
        if self.request_timeout_secs == 0 {
            return Err(CatalogError::Config(
                "request_timeout_secs must be positive".into(),
            ));
        }
        if self.preferred_language.trim().is_empty() || self.fallback_language.trim().is_empty() {
            return Err(CatalogError::Config(
                "description languages must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// What: Locate the per-user configuration file.
///
/// Output:
/// - `$XDG_CONFIG_HOME/dexcat/config.toml`, or `$HOME/.config/dexcat/config.toml`;
///   `None` when neither variable is set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    config_path_from(env::var("XDG_CONFIG_HOME").ok(), env::var("HOME").ok())
}

/// What: Resolve the config file location from the two environment values.
///
/// Details:
/// - A blank `XDG_CONFIG_HOME` counts as unset.
fn config_path_from(xdg_config_home: Option<String>, home: Option<String>) -> Option<PathBuf> {
    xdg_config_home
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| Path::new(&h).join(".config")))
        .map(|base| base.join("dexcat").join("config.toml"))
}
