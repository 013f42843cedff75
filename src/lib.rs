//! HackerBox Catalog - past box listing crawler
//!
//! Walks the paginated HackerBoxes "past boxes" collection, resolves every
//! listed box to a canonical slug, scrapes each detail page for its picture
//! and itemized contents, and renders the result as a markdown table and a
//! JSON document.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;

// Re-export the types the binary and integration tests reach for
pub use application::{CatalogReport, CatalogUseCases, MarkdownTable, RenderError};
pub use domain::{CanonicalSlug, ItemRecord, JsonRow, NameExceptionTable, TableRow};
pub use infrastructure::{CatalogCrawler, ParsingError, ParsingResult};
