//! Application layer module
//!
//! Use cases that drive the crawler, and the report they produce.

pub mod catalog_use_cases;
pub mod report;

pub use catalog_use_cases::CatalogUseCases;
pub use report::{CatalogReport, MarkdownRow, MarkdownTable, RenderError};
