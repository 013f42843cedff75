//! Parsing context for listing and detail pages

use crate::domain::CanonicalSlug;

/// Context information for a listing page
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// 1-based page number
    pub page_id: u32,

    /// URL the body was fetched from
    pub url: String,
}

impl ParseContext {
    pub fn new(page_id: u32, url: String) -> Self {
        Self { page_id, url }
    }
}

/// Context information for a product detail page
#[derive(Debug, Clone)]
pub struct DetailParseContext {
    /// Slug the detail page was requested for
    pub slug: CanonicalSlug,

    /// Product URL being parsed
    pub url: String,
}

impl DetailParseContext {
    pub fn new(slug: CanonicalSlug, url: String) -> Self {
        Self { slug, url }
    }
}
