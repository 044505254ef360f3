//! NDVI request pipeline: validate, resolve, load, compute

use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::catalog::{Catalog, CatalogResolver, SearchFilters, StacClient};
use crate::config::{CatalogConfig, FilterDefaults, LoaderConfig};
use crate::error::{Error, FailureKind, Result};
use crate::geometry::{parse_timestamp, validate_polygon, GeoJsonPolygon};
use crate::ndvi::{compute_stats, NdviStats};
use crate::raster::{CogRasterSource, RasterLoaderAdapter, RasterSource};

/// Request processing stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validating,
    Resolving,
    Loading,
    Computing,
    Responded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Validating => "validating",
            Stage::Resolving => "resolving",
            Stage::Loading => "loading",
            Stage::Computing => "computing",
            Stage::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// Terminal failure of a request
#[derive(Debug)]
pub struct PipelineFailure {
    pub kind: FailureKind,
    pub stage: Stage,
    pub error: Error,
}

impl PipelineFailure {
    fn new(stage: Stage, error: Error) -> Self {
        Self { kind: error.failure_kind(), stage, error }
    }

    /// Client-facing message
    pub fn detail(&self) -> String {
        match self.kind {
            FailureKind::InvalidInput => format!("Invalid GeoJSON Polygon: {}", self.error),
            _ => format!("Error querying Sentinel2 data: {}", self.error),
        }
    }
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed while {}: {}", self.kind.code(), self.stage, self.error)
    }
}

impl std::error::Error for PipelineFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Shared, immutable request handler state
pub struct NdviPipeline {
    resolver: CatalogResolver,
    loader: RasterLoaderAdapter,
    filters: FilterDefaults,
}

impl NdviPipeline {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        source: Arc<dyn RasterSource>,
        catalog_config: CatalogConfig,
        loader_config: &LoaderConfig,
        filters: FilterDefaults,
    ) -> Self {
        Self {
            resolver: CatalogResolver::new(catalog, catalog_config),
            loader: RasterLoaderAdapter::new(source, loader_config),
            filters,
        }
    }

    /// Pipeline backed by the STAC API and HTTP range reads
    pub fn from_config(
        catalog_config: CatalogConfig,
        loader_config: LoaderConfig,
        filters: FilterDefaults,
    ) -> Result<Self> {
        let catalog = Arc::new(StacClient::new(catalog_config.clone())?);
        let source = Arc::new(CogRasterSource::http(loader_config.clone())?);
        Ok(Self::new(catalog, source, catalog_config, &loader_config, filters))
    }

    pub fn catalog_config(&self) -> &CatalogConfig {
        self.resolver.config()
    }

    /// Runs a query with the default scene filters
    pub async fn run(
        &self,
        timestamp: &str,
        polygon: &GeoJsonPolygon,
    ) -> std::result::Result<NdviStats, PipelineFailure> {
        let filters = SearchFilters::from_defaults(&self.filters);
        self.run_with_filters(timestamp, polygon, &filters).await
    }

    /// Runs a query; nothing leaves the process until both inputs are valid
    #[instrument(skip_all, fields(timestamp = %timestamp))]
    pub async fn run_with_filters(
        &self,
        timestamp: &str,
        polygon: &GeoJsonPolygon,
        filters: &SearchFilters,
    ) -> std::result::Result<NdviStats, PipelineFailure> {
        info!(stage = %Stage::Received, "Request received");

        let result = self.execute(timestamp, polygon, filters).await;
        match &result {
            Ok(stats) => info!(
                stage = %Stage::Responded,
                mean_ndvi = stats.mean_ndvi,
                std_ndvi = stats.std_ndvi,
                "Request completed"
            ),
            Err(failure) => warn!(
                stage = %failure.stage,
                kind = failure.kind.code(),
                error = %failure.error,
                "Request failed"
            ),
        }
        result
    }

    async fn execute(
        &self,
        timestamp: &str,
        polygon: &GeoJsonPolygon,
        filters: &SearchFilters,
    ) -> std::result::Result<NdviStats, PipelineFailure> {
        let stage = Stage::Validating;
        info!(stage = %stage, "Validating input");
        let date = parse_timestamp(timestamp).map_err(|e| PipelineFailure::new(stage, e))?;
        let area = validate_polygon(polygon).map_err(|e| PipelineFailure::new(stage, e))?;

        let stage = Stage::Resolving;
        info!(stage = %stage, date = %date, "Resolving catalog items");
        let items = self
            .resolver
            .resolve(date, &area, filters)
            .await
            .map_err(|e| PipelineFailure::new(stage, e))?;

        let stage = Stage::Loading;
        info!(stage = %stage, items = items.len(), "Loading bands");
        let raster = self
            .loader
            .load(&items, &area)
            .await
            .map_err(|e| PipelineFailure::new(stage, e.into_load()))?;

        let stage = Stage::Computing;
        info!(stage = %stage, "Computing NDVI");
        compute_stats(&raster).map_err(|e| PipelineFailure::new(stage, e))
    }
}
