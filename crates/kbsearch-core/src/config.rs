//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
    base: PathBuf,
}

impl Config {
    /// Load from the current working directory, environment chosen by `RUST_ENV`.
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    pub fn load_from(base: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(base.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base: base.to_path_buf() };
        config.validate_for_env(env_name)?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The `[search]` section, falling back to defaults when absent.
    pub fn search_settings(&self) -> Result<SearchSettings> {
        let mut settings: SearchSettings = if self.figment.contains("search") {
            self.figment
                .extract_inner("search")
                .map_err(|e| Error::InvalidConfig(format!("[search]: {e}")))?
        } else {
            SearchSettings::default()
        };
        settings.index_root = resolve_with_base(&self.base, settings.index_root.to_string_lossy());
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        if matches!(env, "prod" | "production") && !self.figment.contains("search.index_root") {
            return Err(anyhow::anyhow!("Prod config must set search.index_root explicitly"));
        }
        Ok(())
    }
}

/// Tunables of the query path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Directory holding `<schema_name>_index`.
    pub index_root: PathBuf,
    pub schema_name: String,
    pub n_top_results: usize,
    /// OR-group coordination coefficient.
    pub coordination: f32,
    pub fuzzy_distance: u8,
    pub timeout_ms: Option<u64>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            index_root: PathBuf::from("search_index"),
            schema_name: "ProtrendSchema".to_string(),
            n_top_results: 50,
            coordination: 0.99,
            fuzzy_distance: 1,
            timeout_ms: None,
        }
    }
}

impl SearchSettings {
    pub fn index_dir(&self) -> PathBuf {
        self.index_root.join(format!("{}_index", self.schema_name.to_lowercase()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.coordination) {
            return Err(Error::InvalidConfig(format!(
                "coordination must be within [0, 1], got {}",
                self.coordination
            )));
        }
        if self.n_top_results == 0 {
            return Err(Error::InvalidConfig("n_top_results must be > 0".into()));
        }
        if self.fuzzy_distance > 2 {
            return Err(Error::InvalidConfig(format!(
                "fuzzy_distance must be <= 2, got {}",
                self.fuzzy_distance
            )));
        }
        if self.schema_name.trim().is_empty() {
            return Err(Error::InvalidConfig("schema_name must not be empty".into()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
