//! Local product catalog: loading from JSON and in-memory queries.

pub mod fallback;
pub mod loader;
pub mod service;

pub use loader::{CatalogLoader, CatalogOrigin, LoadError, LoadedCatalog, TextEncoding};
pub use service::{within_price_range, CatalogService, RelevantProducts};
