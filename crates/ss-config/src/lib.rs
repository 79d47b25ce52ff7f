//! # ss-config
//!
//! Layered settings: built-in defaults, then an optional `stylesync.toml`,
//! then `STYLESYNC__SECTION__KEY` environment variables. A `.env` file is
//! loaded into the environment first. `SUPABASE_URL` and
//! `SUPABASE_ANON_KEY` are honoured as fallbacks for the backend section.

use config::{Config, ConfigError as SourceError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "STYLESYNC";
pub const DEFAULT_FILE: &str = "stylesync";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] SourceError),
    #[error("missing setting `{0}`")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub url: Option<String>,
    pub anon_key: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalSettings {
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory for the filesystem object store.
    pub root: String,
    /// Path the filesystem object store is served under.
    pub url_prefix: String,
    pub items_bucket: String,
    pub avatars_bucket: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FallbackSettings {
    /// Serve the demo dataset when remote and local sources come up empty.
    pub mock_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Session lifetime for the local auth provider.
    pub session_ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directives, overridden by `RUST_LOG`.
    pub filter: String,
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub backend: BackendSettings,
    pub local: LocalSettings,
    pub storage: StorageSettings,
    pub server: ServerSettings,
    pub fallback: FallbackSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Reads `.env`, `stylesync.toml` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_sources(Some(DEFAULT_FILE), std::env::vars().collect())
    }

    /// Builds settings from an optional file (name without extension is
    /// fine) and an explicit environment map.
    pub fn from_sources(file: Option<&str>, env: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("local.database_url", "sqlite://data/stylesync.db")?
            .set_default("storage.root", "./data/storage")?
            .set_default("storage.url_prefix", "/storage")?
            .set_default("storage.items_bucket", "items")?
            .set_default("storage.avatars_bucket", "avatars")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("fallback.mock_data", true)?
            .set_default("auth.session_ttl_hours", 24)?
            .set_default("log.filter", "info")?
            .set_default("log.json", false)?;

        if let Some(url) = env.get("SUPABASE_URL") {
            builder = builder.set_default("backend.url", url.as_str())?;
        }
        if let Some(key) = env.get("SUPABASE_ANON_KEY") {
            builder = builder.set_default("backend.anon_key", key.as_str())?;
        }
        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env)),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Backend URL and anon key, both required by the REST backend.
    pub fn require_backend(&self) -> Result<(&str, &SecretString), ConfigError> {
        let url = self.backend.url.as_deref().filter(|u| !u.is_empty()).ok_or(ConfigError::Missing("backend.url"))?;
        let key = self.backend.anon_key.as_ref().ok_or(ConfigError::Missing("backend.anon_key"))?;
        Ok((url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_apply_without_sources() {
        let settings = Settings::from_sources(None, HashMap::new()).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.storage.items_bucket, "items");
        assert_eq!(settings.storage.avatars_bucket, "avatars");
        assert!(settings.fallback.mock_data);
        assert!(settings.backend.url.is_none());
        assert!(matches!(settings.require_backend(), Err(ConfigError::Missing("backend.url"))));
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = Settings::from_sources(
            None,
            env(&[
                ("STYLESYNC__SERVER__PORT", "9000"),
                ("STYLESYNC__FALLBACK__MOCK_DATA", "false"),
                ("STYLESYNC__LOG__FILTER", "debug"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.server.port, 9000);
        assert!(!settings.fallback.mock_data);
        assert_eq!(settings.log.filter, "debug");
    }

    #[test]
    fn supabase_variables_feed_backend() {
        let settings = Settings::from_sources(
            None,
            env(&[("SUPABASE_URL", "https://p.example.co"), ("SUPABASE_ANON_KEY", "anon")]),
        )
        .unwrap();
        let (url, key) = settings.require_backend().unwrap();
        assert_eq!(url, "https://p.example.co");
        assert_eq!(key.expose_secret(), "anon");

        let settings = Settings::from_sources(
            None,
            env(&[("SUPABASE_URL", "https://p.example.co"), ("STYLESYNC__BACKEND__URL", "https://q.example.co")]),
        )
        .unwrap();
        assert_eq!(settings.backend.url.as_deref(), Some("https://q.example.co"));
        assert!(matches!(settings.require_backend(), Err(ConfigError::Missing("backend.anon_key"))));
    }

    #[test]
    fn file_sits_between_defaults_and_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stylesync.toml");
        std::fs::write(&path, "[server]\nhost = \"0.0.0.0\"\nport = 7000\n[storage]\nroot = \"/srv/blobs\"\n").unwrap();
        let file = path.to_string_lossy().into_owned();

        let settings = Settings::from_sources(Some(&file), env(&[("STYLESYNC__SERVER__PORT", "7001")])).unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 7001);
        assert_eq!(settings.storage.root, "/srv/blobs");
    }
}
