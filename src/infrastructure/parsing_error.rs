//! Error types for fetching and parsing catalog pages
//!
//! Two variants double as the end-of-catalog signal for pagination; every
//! other variant aborts the crawl.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("No products found for: {url}")]
    NoProductsFound { url: String },

    #[error("Empty product list for: {url}")]
    EmptyProductList { url: String },

    #[error("HTTP request failed: {status} - {url}")]
    HttpRequestFailed { status: u16, url: String },

    #[error("Network failure for {url}: {message}")]
    NetworkFailure { url: String, message: String },

    #[error("No {marker} json found for: {target}")]
    EmbeddedJsonNotFound { marker: String, target: String },

    #[error("Invalid embedded json for {target}: {message}")]
    InvalidEmbeddedJson { target: String, message: String },

    #[error("Required field '{field}' missing or empty")]
    RequiredFieldMissing {
        field: String,
        context: Option<String>,
    },

    #[error("Malformed product label: {label:?}")]
    MalformedProductLabel { label: String },

    #[error("Failed to store asset {path}: {message}")]
    AssetStorageFailed { path: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String, field: String },
}

impl ParsingError {
    /// Create a required field missing error with context
    pub fn required_field_missing(field: &str, context: Option<&str>) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
            context: context.map(ToString::to_string),
        }
    }

    pub fn malformed_product_label(label: &str) -> Self {
        Self::MalformedProductLabel {
            label: label.to_string(),
        }
    }

    pub fn embedded_json_not_found(marker: &str, target: &str) -> Self {
        Self::EmbeddedJsonNotFound {
            marker: marker.to_string(),
            target: target.to_string(),
        }
    }

    pub fn invalid_embedded_json(target: &str, err: &serde_json::Error) -> Self {
        Self::InvalidEmbeddedJson {
            target: target.to_string(),
            message: err.to_string(),
        }
    }

    /// Whether this error means "no more listing pages" to the pagination walker.
    ///
    /// A non-2xx status is indistinguishable from a missing page here; a
    /// transport-level failure is not and stays fatal.
    pub fn ends_pagination(&self) -> bool {
        matches!(
            self,
            Self::NoProductsFound { .. }
                | Self::EmptyProductList { .. }
                | Self::HttpRequestFailed { .. }
        )
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
