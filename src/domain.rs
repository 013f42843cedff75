//! Domain module - catalog entities and collaborator seams
//!
//! - `slug`: canonical slugs, the name exception table and the label normalizer
//! - `product`: the per-box record and its table/JSON projections
//! - `services`: traits for the fetch and storage collaborators

pub mod product;
pub mod services;
pub mod slug;

pub use product::{ItemRecord, JsonRow, TableRow};
pub use services::{AssetStore, PageFetcher, StoredAsset};
pub use slug::{CanonicalSlug, NameExceptionTable, normalize_product_label};
