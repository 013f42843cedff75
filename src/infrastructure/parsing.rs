//! Text extraction for storefront pages
//!
//! Listing and detail pages both carry their useful data as JSON embedded in
//! inline scripts. Locating that JSON goes through [`EmbeddedJsonExtractor`]
//! so the matching strategy can change without touching the parsers.

pub mod config;
pub mod context;
pub mod embedded_json;
pub mod product_detail_parser;
pub mod product_list_parser;

// Re-export public types
pub use super::parsing_error::{ParsingError, ParsingResult};
pub use config::ParsingConfig;
pub use context::{DetailParseContext, ParseContext};
pub use embedded_json::RegexJsonExtractor;
pub use product_detail_parser::{ProductDetail, ProductDetailParser};
pub use product_list_parser::ProductListParser;

/// Locates a JSON document embedded somewhere in a page body
pub trait EmbeddedJsonExtractor: Send + Sync {
    /// Short name of what is being extracted, used in error messages
    fn marker(&self) -> &str;

    /// The embedded JSON text, if the page carries it
    fn extract<'a>(&self, body: &'a str) -> Option<&'a str>;
}

/// Parser over a fetched page body with per-call context
pub trait ContextualParser {
    type Output;
    type Context;

    fn parse_with_context(&self, body: &str, context: &Self::Context) -> ParsingResult<Self::Output>;
}
