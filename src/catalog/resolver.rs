//! Date-fallback resolution of catalog items

use std::sync::Arc;

use chrono::NaiveDate;
use geo::Polygon;
use tracing::{info, instrument};

use crate::config::CatalogConfig;
use crate::error::{Error, Result};

use super::item::ItemSet;
use super::query::{DateRange, SearchFilters, SearchRequest};
use super::Catalog;

/// Picks the date closest to `target`; ties go to the earlier date
pub fn nearest_date<I>(target: NaiveDate, available: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = NaiveDate>,
{
    available
        .into_iter()
        .min_by_key(|d| ((*d - target).num_days().abs(), *d))
}

/// Finds the items to use for a target date, widening the search to a
/// window around it when the exact day has no imagery
pub struct CatalogResolver {
    catalog: Arc<dyn Catalog>,
    config: CatalogConfig,
}

impl CatalogResolver {
    pub fn new(catalog: Arc<dyn Catalog>, config: CatalogConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    async fn search(
        &self,
        range: DateRange,
        polygon: &Polygon<f64>,
        filters: &SearchFilters,
    ) -> Result<ItemSet> {
        let request = SearchRequest::new(
            &self.config.collection,
            polygon,
            range,
            filters,
            self.config.page_size,
        );
        self.catalog.search(&request).await
    }

    /// Resolves the item set for `date`
    ///
    /// Issues one search when the exact day has items, otherwise a window
    /// search followed by an exact search on the nearest available date.
    #[instrument(skip(self, polygon, filters), fields(collection = %self.config.collection))]
    pub async fn resolve(
        &self,
        date: NaiveDate,
        polygon: &Polygon<f64>,
        filters: &SearchFilters,
    ) -> Result<ItemSet> {
        let window = DateRange::window(date, self.config.window_days).ok_or_else(|| {
            Error::InvalidTimestamp(format!(
                "{} ± {} days is outside the supported calendar",
                date, self.config.window_days
            ))
        })?;

        let items = self.search(DateRange::day(date), polygon, filters).await?;
        if !items.is_empty() {
            info!("Returned {} items", items.len());
            return Ok(items);
        }

        info!("No items on the requested date");
        info!(window = %window, "Searching date window");

        let windowed = self.search(window, polygon, filters).await?;
        let nearest = nearest_date(date, windowed.dates())
            .ok_or_else(|| Error::NoDataAvailable(date.to_string()))?;
        info!(nearest_date = %nearest, "Nearest available date");

        let items = self.search(DateRange::day(nearest), polygon, filters).await?;
        info!("Returned {} items", items.len());

        if items.is_empty() {
            return Err(Error::NoDataAvailable(date.to_string()));
        }
        Ok(items)
    }
}
