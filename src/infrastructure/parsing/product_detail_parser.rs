//! Product detail page parser
//!
//! Detail pages embed the product record as JSON in the
//! `ProductJson-product-template` script. Its `description` is an HTML
//! fragment whose `<li>` items list the box contents, and `featured_image`
//! is a protocol-relative image URL.

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::{
    ContextualParser, DetailParseContext, EmbeddedJsonExtractor, ParsingConfig, ParsingError,
    ParsingResult, RegexJsonExtractor,
};
use crate::domain::CanonicalSlug;
use crate::infrastructure::config::utils::resolve_image_url;

const ITEM_GROUP: &str = "item";

#[derive(Debug, Deserialize)]
struct ProductTemplate {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    featured_image: Option<String>,
}

/// Fields pulled out of one detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetail {
    pub slug: CanonicalSlug,
    pub detail_url: String,
    /// Absolute `https://` URL of the featured image
    pub image_url: String,
    pub bullets: Vec<String>,
}

pub struct ProductDetailParser {
    template_extractor: Box<dyn EmbeddedJsonExtractor>,
    item_pattern: Regex,
}

impl ProductDetailParser {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    pub fn with_config(config: &ParsingConfig) -> ParsingResult<Self> {
        let extractor = RegexJsonExtractor::new("contents", &config.product_template_pattern)?;
        Self::with_extractor(Box::new(extractor), &config.description_item_pattern)
    }

    pub fn with_extractor(
        template_extractor: Box<dyn EmbeddedJsonExtractor>,
        item_pattern: &str,
    ) -> ParsingResult<Self> {
        let item_pattern = Regex::new(item_pattern).map_err(|e| ParsingError::ConfigurationError {
            message: format!("invalid description item pattern: {e}"),
            field: "description_item_pattern".to_string(),
        })?;

        if !item_pattern.capture_names().flatten().any(|name| name == ITEM_GROUP) {
            return Err(ParsingError::ConfigurationError {
                message: format!("description item pattern has no `{ITEM_GROUP}` capture group"),
                field: "description_item_pattern".to_string(),
            });
        }

        Ok(Self {
            template_extractor,
            item_pattern,
        })
    }

    /// Inner text of every list item in a description fragment
    pub fn extract_bullets(&self, description: &str) -> Vec<String> {
        self.item_pattern
            .captures_iter(description)
            .filter_map(|caps| caps.name(ITEM_GROUP))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl ContextualParser for ProductDetailParser {
    type Output = ProductDetail;
    type Context = DetailParseContext;

    fn parse_with_context(&self, body: &str, context: &Self::Context) -> ParsingResult<Self::Output> {
        debug!("Parsing product detail from: {}", context.url);

        let json = self.template_extractor.extract(body).ok_or_else(|| {
            ParsingError::embedded_json_not_found(self.template_extractor.marker(), context.slug.as_str())
        })?;

        let template: ProductTemplate = serde_json::from_str(json)
            .map_err(|e| ParsingError::invalid_embedded_json(context.slug.as_str(), &e))?;

        let description = template
            .description
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ParsingError::required_field_missing("description", Some(context.slug.as_str())))?;

        let featured_image = template
            .featured_image
            .filter(|img| !img.is_empty())
            .ok_or_else(|| {
                ParsingError::required_field_missing("featured_image", Some(context.slug.as_str()))
            })?;

        let bullets = self.extract_bullets(&description);
        debug!("Extracted {} bullets for {}", bullets.len(), context.slug);

        Ok(ProductDetail {
            slug: context.slug.clone(),
            detail_url: context.url.clone(),
            image_url: resolve_image_url(&featured_image),
            bullets,
        })
    }
}
