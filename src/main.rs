//! Crawl the HackerBoxes past-box catalog and print it as a markdown table
//! followed by the same rows as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use hackerbox_catalog_lib::application::CatalogUseCases;
use hackerbox_catalog_lib::infrastructure::{
    CatalogCrawler, ConfigManager, FileSystemAssetStore, HttpClient, init_logging_with_config,
    logging::log_system_info,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config_manager = ConfigManager::new()?;
    let loaded = config_manager.load_config().await?;
    let config = loaded.config;
    config.validate().context("Invalid configuration")?;

    init_logging_with_config(&config.logging)?;
    log_system_info();
    loaded.origin.log(config_manager.config_path());

    let http_client = HttpClient::new(config.http.clone())?;
    info!(
        "HTTP timeout: {}s, rate limited: {}",
        http_client.config().timeout_seconds,
        http_client.is_rate_limited()
    );

    let asset_store = FileSystemAssetStore::new(
        config.catalog.assets_dir.clone(),
        config.catalog.assets_link_prefix.clone(),
    );
    info!("Images are written to: {:?}", asset_store.dir());
    let crawler = CatalogCrawler::new(Arc::new(http_client), Arc::new(asset_store), &config)
        .context("Failed to build catalog crawler")?;

    let report = CatalogUseCases::new(Arc::new(crawler))
        .collect_catalog()
        .await
        .context("Catalog crawl failed")?;

    let table = report.to_markdown().context("Failed to render markdown table")?;
    let json = report.to_json_pretty().context("Failed to serialize catalog")?;

    println!("{table}");
    println!("{json}");
    Ok(())
}
