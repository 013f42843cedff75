//! Collaborator seams for the crawler
//!
//! The crawler only needs to fetch pages and persist images; both sit
//! behind traits so tests can substitute in-memory versions.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::infrastructure::parsing_error::ParsingResult;

/// HTTP GET capability. Implementations fail with
/// [`ParsingError::HttpRequestFailed`](crate::ParsingError::HttpRequestFailed)
/// on any non-2xx status.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page body as text
    async fn fetch_text(&self, url: &str) -> ParsingResult<String>;

    /// Fetch a resource body as raw bytes
    async fn fetch_bytes(&self, url: &str) -> ParsingResult<Vec<u8>>;
}

/// Where a stored asset ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Location the bytes were written to
    pub path: PathBuf,
    /// Link to the asset as it should appear in rendered output
    pub link: String,
}

/// Write-once storage for downloaded images
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn store(&self, name: &str, bytes: &[u8]) -> ParsingResult<StoredAsset>;
}
