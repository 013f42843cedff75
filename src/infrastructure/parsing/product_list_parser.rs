//! Listing page parser
//!
//! A listing page embeds its products as `var meta = {"products": [...]};`.
//! Each product's first variant carries the display label that the slug is
//! derived from.

use serde::Deserialize;
use tracing::debug;

use super::{
    ContextualParser, EmbeddedJsonExtractor, ParseContext, ParsingConfig, ParsingError,
    ParsingResult, RegexJsonExtractor,
};
use crate::domain::{CanonicalSlug, NameExceptionTable, normalize_product_label};

#[derive(Debug, Deserialize)]
struct ListingMeta {
    products: Vec<ListingProduct>,
}

#[derive(Debug, Deserialize)]
struct ListingProduct {
    #[serde(default)]
    variants: Vec<ListingVariant>,
}

#[derive(Debug, Deserialize)]
struct ListingVariant {
    name: String,
}

/// Extracts canonical slugs from a listing page, in page order
pub struct ProductListParser {
    meta_extractor: Box<dyn EmbeddedJsonExtractor>,
    exceptions: NameExceptionTable,
}

impl ProductListParser {
    /// Create a parser with the default pattern and exception table
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default(), NameExceptionTable::default())
    }

    pub fn with_config(config: &ParsingConfig, exceptions: NameExceptionTable) -> ParsingResult<Self> {
        let extractor = RegexJsonExtractor::new("products", &config.listing_meta_pattern)?;
        Ok(Self::with_extractor(Box::new(extractor), exceptions))
    }

    /// Create a parser around any extraction strategy
    pub fn with_extractor(
        meta_extractor: Box<dyn EmbeddedJsonExtractor>,
        exceptions: NameExceptionTable,
    ) -> Self {
        Self {
            meta_extractor,
            exceptions,
        }
    }
}

impl ContextualParser for ProductListParser {
    type Output = Vec<CanonicalSlug>;
    type Context = ParseContext;

    fn parse_with_context(&self, body: &str, context: &Self::Context) -> ParsingResult<Self::Output> {
        debug!("Parsing listing page {} ({})", context.page_id, context.url);

        let json = self
            .meta_extractor
            .extract(body)
            .ok_or_else(|| ParsingError::NoProductsFound {
                url: context.url.clone(),
            })?;

        let meta: ListingMeta = serde_json::from_str(json)
            .map_err(|e| ParsingError::invalid_embedded_json(&context.url, &e))?;

        if meta.products.is_empty() {
            return Err(ParsingError::EmptyProductList {
                url: context.url.clone(),
            });
        }

        let slugs = meta
            .products
            .iter()
            .map(|product| {
                let label = product
                    .variants
                    .first()
                    .map(|variant| variant.name.as_str())
                    .ok_or_else(|| {
                        ParsingError::required_field_missing("variants[0].name", Some(&context.url))
                    })?;
                normalize_product_label(label, &self.exceptions)
            })
            .collect::<ParsingResult<Vec<_>>>()?;

        debug!(
            "Extracted {} slugs from listing page {}",
            slugs.len(),
            context.page_id
        );
        Ok(slugs)
    }
}
