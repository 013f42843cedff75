//! Configuration infrastructure
//!
//! Settings live in a single JSON file under the user config directory. A
//! missing file is created with defaults; an unreadable one is backed up and
//! replaced so a crawl can always start.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::NameExceptionTable;
use crate::infrastructure::parsing::ParsingConfig;
use crate::infrastructure::parsing_error::ParsingError;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "HACKERBOX_CATALOG_CONFIG";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub http: HttpClientConfig,
    pub logging: LoggingConfig,
    pub parsing: ParsingConfig,
}

/// What to crawl and where downloaded images go
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Listing URL of the collection; detail pages hang off `{base_url}/products/`
    pub base_url: String,

    /// Directory images are written to
    pub assets_dir: PathBuf,

    /// Prefix used for image links in the rendered output
    pub assets_link_prefix: String,

    /// Generated slug -> slug the storefront actually uses
    pub name_exceptions: BTreeMap<String, String>,
}

/// HTTP client behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// 0 disables rate limiting
    pub max_requests_per_second: u32,
    pub follow_redirects: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Log to stderr
    pub console_output: bool,

    /// Log to a file in `log_dir`
    pub file_output: bool,

    /// Directory for the log file; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: hackerboxes::PAST_BOXES_URL.to_string(),
            assets_dir: PathBuf::from(defaults::ASSETS_DIR),
            assets_link_prefix: defaults::ASSETS_LINK_PREFIX.to_string(),
            name_exceptions: NameExceptionTable::KNOWN_EXCEPTIONS
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }
}

impl CatalogConfig {
    pub fn name_exception_table(&self) -> NameExceptionTable {
        NameExceptionTable::from(&self.name_exceptions)
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            follow_redirects: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Reject settings a crawl cannot run with
    pub fn validate(&self) -> Result<(), ParsingError> {
        url::Url::parse(&self.catalog.base_url).map_err(|e| ParsingError::ConfigurationError {
            message: format!("invalid base_url {:?}: {e}", self.catalog.base_url),
            field: "catalog.base_url".to_string(),
        })?;

        if self.catalog.assets_dir.as_os_str().is_empty() {
            return Err(ParsingError::ConfigurationError {
                message: "assets_dir must not be empty".to_string(),
                field: "catalog.assets_dir".to_string(),
            });
        }

        if self.http.timeout_seconds == 0 {
            return Err(ParsingError::ConfigurationError {
                message: "timeout_seconds must be greater than 0".to_string(),
                field: "http.timeout_seconds".to_string(),
            });
        }

        Ok(())
    }
}

/// How [`ConfigManager::load_config`] arrived at its configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Read from an existing file
    Loaded,
    /// No file existed; defaults were written
    CreatedDefault,
    /// The file could not be parsed and was replaced with defaults.
    /// `backup` is where the old contents were copied, or why that failed.
    Recovered {
        reason: String,
        backup: std::result::Result<PathBuf, String>,
    },
}

impl ConfigOrigin {
    /// Report the outcome through `tracing`
    pub fn log(&self, config_path: &Path) {
        match self {
            Self::Loaded => info!("Loaded configuration from: {:?}", config_path),
            Self::CreatedDefault => {
                info!("Configuration file not found, created default: {:?}", config_path);
            }
            Self::Recovered { reason, backup } => {
                warn!("Configuration file could not be parsed: {}", reason);
                match backup {
                    Ok(path) => info!("Backed up corrupted config to: {:?}", path),
                    Err(e) => warn!("Failed to create backup of corrupted config: {}", e),
                }
                info!("Reset to default configuration");
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub origin: ConfigOrigin,
}

/// Loads and saves [`AppConfig`]
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("hackerbox-catalog");

        Ok(config_dir)
    }

    /// Config manager for the default location, or `$HACKERBOX_CATALOG_CONFIG`
    pub fn new() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(Self::with_path(PathBuf::from(path)));
        }

        let config_path = Self::get_config_dir()?.join("hackerbox_catalog_config.json");
        Ok(Self { config_path })
    }

    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Load configuration from file, creating default if it doesn't exist.
    ///
    /// Loading usually runs before logging is up, so what happened is
    /// returned as a [`ConfigOrigin`] for the caller to log afterwards.
    pub async fn load_config(&self) -> Result<LoadedConfig> {
        if !self.config_path.exists() {
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(LoadedConfig {
                config: default_config,
                origin: ConfigOrigin::CreatedDefault,
            });
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => Ok(LoadedConfig {
                config,
                origin: ConfigOrigin::Loaded,
            }),
            Err(parse_error) => {
                let backup_path = self.config_path.with_extension("json.corrupted");
                let backup = fs::copy(&self.config_path, &backup_path)
                    .await
                    .map(|_| backup_path)
                    .map_err(|e| e.to_string());

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;

                Ok(LoadedConfig {
                    config: default_config,
                    origin: ConfigOrigin::Recovered {
                        reason: parse_error.to_string(),
                        backup,
                    },
                })
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

/// HackerBoxes storefront URLs
pub mod hackerboxes {
    /// Collection listing every box released so far
    pub const PAST_BOXES_URL: &str = "https://hackerboxes.com/collections/past-hackerboxes";

    /// Path segment between the collection URL and a product slug
    pub const PRODUCTS_PATH: &str = "products";

    /// Query parameter selecting a listing page
    pub const PAGE_PARAM: &str = "page";
}

/// Default configuration values
pub mod defaults {
    /// Default directory for downloaded images
    pub const ASSETS_DIR: &str = "assets";

    /// Default link prefix for images in rendered output
    pub const ASSETS_LINK_PREFIX: &str = "assets";

    /// Extension every stored image gets, whatever its encoding
    pub const IMAGE_EXTENSION: &str = "png";

    pub const USER_AGENT: &str = concat!("hackerbox-catalog/", env!("CARGO_PKG_VERSION"));

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Default polite request rate
    pub const MAX_REQUESTS_PER_SECOND: u32 = 5;

    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = false;

    /// Log file name inside the log directory
    pub const LOG_FILE_NAME: &str = "hackerbox-catalog.log";
}

/// URL building helper functions
pub mod utils {
    use super::hackerboxes::{PAGE_PARAM, PRODUCTS_PATH};

    /// Listing URL for a 1-based page number; page 1 is the bare base URL
    pub fn listing_page_url(base_url: &str, page: u32) -> String {
        if page <= 1 {
            base_url.to_string()
        } else {
            format!("{base_url}?{PAGE_PARAM}={page}")
        }
    }

    /// Detail page URL for a product slug
    pub fn product_detail_url(base_url: &str, slug: &str) -> String {
        format!("{}/{PRODUCTS_PATH}/{slug}", base_url.trim_end_matches('/'))
    }

    /// Turn a protocol-relative `featured_image` value into an https URL.
    ///
    /// The first two characters (the `//`) are dropped unconditionally.
    pub fn resolve_image_url(featured_image: &str) -> String {
        let host_and_path = featured_image
            .char_indices()
            .nth(2)
            .map_or("", |(offset, _)| &featured_image[offset..]);
        format!("https://{host_and_path}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::utils::*;
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog.name_exception_table(), NameExceptionTable::default());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut config = AppConfig::default();
        config.catalog.base_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ParsingError::ConfigurationError { ref field, .. } if field == "catalog.base_url"));
    }

    #[test]
    fn partial_config_file_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"catalog": {"assets_dir": "out/img"}, "logging": {"level": "debug"}}"#)
                .unwrap();
        assert_eq!(config.catalog.assets_dir, PathBuf::from("out/img"));
        assert_eq!(config.catalog.base_url, hackerboxes::PAST_BOXES_URL);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.console_output);
        assert_eq!(config.http.timeout_seconds, defaults::REQUEST_TIMEOUT_SECONDS);
    }

    #[test]
    fn listing_urls() {
        let base = "https://shop.test/collections/past";
        assert_eq!(listing_page_url(base, 1), base);
        assert_eq!(listing_page_url(base, 3), "https://shop.test/collections/past?page=3");
    }

    #[test]
    fn detail_urls() {
        assert_eq!(
            product_detail_url("https://shop.test/collections/past", "hackerbox-0041-circuit-breaker"),
            "https://shop.test/collections/past/products/hackerbox-0041-circuit-breaker"
        );
    }

    #[test]
    fn image_urls_drop_the_protocol_relative_prefix() {
        assert_eq!(
            resolve_image_url("//cdn.shop.test/files/a.jpg"),
            "https://cdn.shop.test/files/a.jpg"
        );
        assert_eq!(resolve_image_url("/"), "https://");
    }

    #[tokio::test]
    async fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));

        let loaded = manager.load_config().await.unwrap();
        assert_eq!(loaded.config.catalog.base_url, hackerboxes::PAST_BOXES_URL);
        assert_eq!(loaded.origin, ConfigOrigin::CreatedDefault);
        assert!(manager.config_path().exists());
    }

    #[tokio::test]
    async fn corrupted_file_is_backed_up_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let manager = ConfigManager::with_path(path.clone());
        let loaded = manager.load_config().await.unwrap();

        assert_eq!(loaded.config.logging.level, defaults::LOG_LEVEL);
        let backup = path.with_extension("json.corrupted");
        assert!(matches!(
            &loaded.origin,
            ConfigOrigin::Recovered { backup: Ok(p), .. } if *p == backup
        ));
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "{ not json");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn corrupted_file_recovery_is_reported_once_logging_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let manager = ConfigManager::with_path(path);
        let loaded = manager.load_config().await.unwrap();

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || loaded.origin.log(manager.config_path()));

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Configuration file could not be parsed"));
        assert!(output.contains("Backed up corrupted config to"));
        assert!(output.contains("Reset to default configuration"));
    }

    #[tokio::test]
    async fn saved_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));

        let mut config = AppConfig::default();
        config.http.max_requests_per_second = 0;
        config.catalog.name_exceptions.clear();
        manager.save_config(&config).await.unwrap();

        let loaded = manager.load_config().await.unwrap();
        assert_eq!(loaded.origin, ConfigOrigin::Loaded);
        assert_eq!(loaded.config.http.max_requests_per_second, 0);
        assert!(loaded.config.catalog.name_exceptions.is_empty());
    }
}
