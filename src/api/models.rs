use serde::{Deserialize, Serialize};

use crate::geometry::GeoJsonPolygon;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentinel2Query {
    pub timestamp: String,
    pub geojson_polygon: GeoJsonPolygon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    /// `invalid_input`, `upstream_data_error` or `computation_error`
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub collection: String,
    pub catalog_url: String,
}
