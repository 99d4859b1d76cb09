//! # vt-config
//!
//! Layered settings: built-in defaults, then `config/default.toml`, then
//! `config/local.toml`, then `VTUBE__SECTION__KEY` environment variables.
//! Both files are optional.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub const ENV_PREFIX: &str = "VTUBE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub media: MediaSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    Local,
    Cloudinary,
}

#[derive(Debug, Deserialize)]
pub struct MediaSettings {
    pub backend: MediaBackend,
    pub local: LocalMediaSettings,
    #[serde(default)]
    pub cloudinary: Option<CloudinarySettings>,
}

#[derive(Debug, Deserialize)]
pub struct LocalMediaSettings {
    pub root: PathBuf,
    pub url_prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    #[serde(deserialize_with = "secret")]
    pub api_secret: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    #[serde(deserialize_with = "secret")]
    pub access_token_secret: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    pub json: bool,
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

impl Settings {
    /// Loads `.env`, then the layered sources rooted at `./config`.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::load_from(Path::new("config"), None)
    }

    /// `env` replaces the process environment as the variable source when
    /// given; keys are full names such as `VTUBE__SERVER__PORT`.
    pub fn load_from(
        dir: &Path,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.cors_origin", "*")?
            .set_default("server.max_upload_bytes", 100 * 1024 * 1024)?
            .set_default("database.url", "sqlite://vtube.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("media.backend", "local")?
            .set_default("media.local.root", "./data/media")?
            .set_default("media.local.url_prefix", "/media")?
            .set_default("log.json", false)?
            .add_source(File::from(dir.join("default.toml")).required(false))
            .add_source(File::from(dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        use secrecy::ExposeSecret;

        if self.auth.access_token_secret.expose_secret().is_empty() {
            return Err(ConfigError::Invalid("auth.access_token_secret is empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be positive".into()));
        }
        if self.media.backend == MediaBackend::Cloudinary && self.media.cloudinary.is_none() {
            return Err(ConfigError::Invalid(
                "media.backend is cloudinary but media.cloudinary is not set".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
