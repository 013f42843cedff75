//! Catalog crawler
//!
//! Walks listing pages until the storefront runs out of products, then
//! visits each product's detail page and stores its featured image. Every
//! request is awaited before the next one is issued.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{AssetStore, CanonicalSlug, ItemRecord, PageFetcher};
use crate::infrastructure::config::{
    AppConfig, defaults,
    utils::{listing_page_url, product_detail_url},
};
use crate::infrastructure::parsing::{
    ContextualParser, DetailParseContext, ParseContext, ProductDetailParser, ProductListParser,
};
use crate::infrastructure::parsing_error::ParsingResult;

/// File name an item's image is stored under
pub fn image_file_name(slug: &CanonicalSlug) -> String {
    format!("{slug}.{}", defaults::IMAGE_EXTENSION)
}

pub struct CatalogCrawler {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn AssetStore>,
    list_parser: ProductListParser,
    detail_parser: ProductDetailParser,
    base_url: String,
}

impl CatalogCrawler {
    /// Build a crawler from application configuration
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn AssetStore>,
        config: &AppConfig,
    ) -> ParsingResult<Self> {
        let list_parser =
            ProductListParser::with_config(&config.parsing, config.catalog.name_exception_table())?;
        let detail_parser = ProductDetailParser::with_config(&config.parsing)?;

        Ok(Self::with_parsers(
            fetcher,
            store,
            config.catalog.base_url.clone(),
            list_parser,
            detail_parser,
        ))
    }

    pub fn with_parsers(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn AssetStore>,
        base_url: String,
        list_parser: ProductListParser,
        detail_parser: ProductDetailParser,
    ) -> Self {
        Self {
            fetcher,
            store,
            list_parser,
            detail_parser,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Slugs listed on a single 1-based listing page
    pub async fn collect_single_page(&self, page: u32) -> ParsingResult<Vec<CanonicalSlug>> {
        let url = listing_page_url(&self.base_url, page);
        let body = self.fetcher.fetch_text(&url).await?;
        self.list_parser
            .parse_with_context(&body, &ParseContext::new(page, url))
    }

    /// Slugs from every listing page, in listing order.
    ///
    /// Page 1 must parse. From page 2 on, the first page that is missing,
    /// empty or answered with a non-2xx status ends the walk; everything
    /// collected so far is returned. Other failures propagate.
    pub async fn collect_all_pages(&self) -> ParsingResult<Vec<CanonicalSlug>> {
        let mut slugs = self.collect_single_page(1).await?;
        info!("Listing page 1: {} boxes", slugs.len());

        let mut page = 2;
        loop {
            match self.collect_single_page(page).await {
                Ok(found) => {
                    info!("Listing page {}: {} boxes", page, found.len());
                    slugs.extend(found);
                    page += 1;
                }
                Err(e) if e.ends_pagination() => {
                    debug!("Pagination stopped at page {}: {}", page, e);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        info!("Collected {} boxes from {} listing pages", slugs.len(), page - 1);
        Ok(slugs)
    }

    /// Scrape one detail page and store its image
    pub async fn collect_single_product(&self, slug: &CanonicalSlug) -> ParsingResult<ItemRecord> {
        let url = product_detail_url(&self.base_url, slug.as_str());
        let body = self.fetcher.fetch_text(&url).await?;

        let detail = self
            .detail_parser
            .parse_with_context(&body, &DetailParseContext::new(slug.clone(), url))?;

        let image = self.fetcher.fetch_bytes(&detail.image_url).await?;
        let stored = self.store.store(&image_file_name(slug), &image).await?;
        debug!("Stored image for {} at {}", slug, stored.path.display());

        Ok(ItemRecord {
            slug: detail.slug,
            detail_url: detail.detail_url,
            image_url: detail.image_url,
            picture_link: stored.link,
            bullets: detail.bullets,
        })
    }
}
