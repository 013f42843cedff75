//! Catalog collection use case
//!
//! Runs the pagination walk once, then scrapes every listed box in order.
//! The first failing box aborts the run.

use std::sync::Arc;

use tracing::info;

use crate::application::report::CatalogReport;
use crate::infrastructure::CatalogCrawler;
use crate::infrastructure::parsing_error::ParsingResult;

pub struct CatalogUseCases {
    crawler: Arc<CatalogCrawler>,
}

impl CatalogUseCases {
    pub fn new(crawler: Arc<CatalogCrawler>) -> Self {
        Self { crawler }
    }

    /// Collect every box in the catalog into a report
    pub async fn collect_catalog(&self) -> ParsingResult<CatalogReport> {
        let slugs = self.crawler.collect_all_pages().await?;
        info!("Scraping {} boxes from {}", slugs.len(), self.crawler.base_url());

        let mut report = CatalogReport::default();
        for (index, slug) in slugs.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, slugs.len(), slug);
            let record = self.crawler.collect_single_product(slug).await?;
            report.push(record);
        }

        info!("Catalog complete: {} boxes", report.table_rows.len());
        Ok(report)
    }
}
