//! Infrastructure layer: HTTP, parsing, storage, configuration and logging

pub mod asset_store;
pub mod config;
pub mod crawling;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod parsing_error;

// Re-export commonly used items
pub use asset_store::FileSystemAssetStore;
pub use config::{AppConfig, ConfigManager, ConfigOrigin, hackerboxes};
pub use crawling::CatalogCrawler;
pub use http_client::HttpClient;
pub use logging::init_logging_with_config;
pub use parsing::{ParsingConfig, ProductDetailParser, ProductListParser};
pub use parsing_error::{ParsingError, ParsingResult};
