use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "LEESLOG_ENV";
const CONFIG_DIR_ENV: &str = "LEESLOG_CONFIG_DIR";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Raised when a setting that is required at runtime is absent.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("missing secret `{0}`; set it in config or via LEESLOG_STORE__DATA_KEY")]
    MissingSecret(&'static str),
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{environment}.toml"));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix("LEESLOG")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parse_environment(&environment)?;

        Ok(settings)
    }
}

fn parse_environment(value: &str) -> anyhow::Result<Environment> {
    match value {
        "local" => Ok(Environment::Local),
        "staging" => Ok(Environment::Staging),
        "production" => Ok(Environment::Production),
        other => Err(anyhow!(
            "unsupported environment '{}'; expected local/staging/production",
            other
        )),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    /// Covers a catalog lookup: a search page and a product page, each bounded by
    /// `catalog.timeout_secs`.
    fn default_request_timeout_ms() -> u64 {
        45000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Which record store implementation backs the app.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Deta,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "StoreSettings::default_endpoint")]
    pub endpoint: String,
    #[serde(default = "StoreSettings::default_base")]
    pub base: String,
    #[serde(default)]
    pub data_key: Option<String>,
}

impl StoreSettings {
    fn default_endpoint() -> String {
        "https://database.deta.sh/v1".to_string()
    }

    fn default_base() -> String {
        "boeken".to_string()
    }

    /// The store secret. Blank values count as missing.
    pub fn data_key(&self) -> Result<&str, SettingsError> {
        self.data_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(SettingsError::MissingSecret("store.data_key"))
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            endpoint: Self::default_endpoint(),
            base: Self::default_base(),
            data_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "CatalogSettings::default_base_url")]
    pub base_url: String,
    #[serde(default = "CatalogSettings::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "CatalogSettings::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CatalogSettings {
    fn default_base_url() -> String {
        "https://www.bol.com".to_string()
    }

    fn default_user_agent() -> String {
        concat!("leeslog/", env!("CARGO_PKG_VERSION")).to_string()
    }

    fn default_timeout_secs() -> u64 {
        20
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            user_agent: Self::default_user_agent(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_store_targets_deta_boeken() {
        let settings = Settings::default();
        assert_eq!(settings.store.backend, StoreBackend::Deta);
        assert_eq!(settings.store.base, "boeken");
        assert_eq!(settings.store.endpoint, "https://database.deta.sh/v1");
    }

    #[test]
    fn default_catalog_is_bol() {
        let settings = Settings::default();
        assert_eq!(settings.catalog.base_url, "https://www.bol.com");
        assert_eq!(settings.catalog.timeout_secs, 20);
    }

    fn assert_lookup_fits_in_request(settings: &Settings) {
        let lookup_ms = 2 * settings.catalog.timeout_secs * 1000;
        assert!(
            settings.server.request_timeout_ms > lookup_ms,
            "request timeout {}ms cuts off a {}ms lookup",
            settings.server.request_timeout_ms,
            lookup_ms
        );
    }

    #[test]
    fn default_request_timeout_outlasts_a_lookup() {
        assert_lookup_fits_in_request(&Settings::default());
    }

    #[test]
    fn shipped_base_config_request_timeout_outlasts_a_lookup() {
        let base = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/base.toml");
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from(std::path::Path::new(base)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_lookup_fits_in_request(&settings);
    }

    #[test]
    fn missing_or_blank_data_key_is_an_error() {
        let mut store = StoreSettings::default();
        assert_eq!(
            store.data_key(),
            Err(SettingsError::MissingSecret("store.data_key"))
        );

        store.data_key = Some("   ".to_string());
        assert!(store.data_key().is_err());

        store.data_key = Some("a0abc_secret".to_string());
        assert_eq!(store.data_key(), Ok("a0abc_secret"));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(parse_environment("qa").is_err());
        assert_eq!(parse_environment("production").unwrap(), Environment::Production);
    }

    #[test]
    fn sections_deserialize_from_toml() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 9000

                [store]
                backend = "memory"

                [telemetry]
                log_format = "json"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let settings: Settings = cfg.try_deserialize().unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.store.backend, StoreBackend::Memory);
        assert_eq!(settings.telemetry.log_format, LogFormat::Json);
    }
}
