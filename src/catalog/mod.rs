//! Satellite imagery catalog: STAC data model, search client and the
//! date-fallback resolver

pub mod item;
pub mod query;
pub mod stac;
pub mod resolver;

use async_trait::async_trait;

use crate::error::Result;

pub use item::{Asset, CatalogItem, ItemSet, RasterBand};
pub use query::{Comparison, DateRange, SearchFilters, SearchRequest};
pub use resolver::{nearest_date, CatalogResolver};
pub use stac::StacClient;

/// A searchable imagery catalog
///
/// Implementations return every matching item in catalog order.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<ItemSet>;
}
