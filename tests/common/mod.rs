#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use geo::Polygon;
use serde_json::json;

use sentinel_ndvi::catalog::DateRange;
use sentinel_ndvi::{
    BandRequest, Catalog, CatalogConfig, CatalogItem, Error, FilterDefaults, ItemSet,
    LoaderConfig, NdviPipeline, RasterShape, RasterSource, RawRaster, Result, SearchRequest,
};

/// Catalog answering from a fixed list and recording each searched range
#[derive(Default)]
pub struct MockCatalog {
    items: Vec<CatalogItem>,
    requests: Mutex<Vec<DateRange>>,
    fail: bool,
}

impl MockCatalog {
    pub fn with_items(items: Vec<CatalogItem>) -> Arc<Self> {
        Arc::new(Self { items, ..Default::default() })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, ..Default::default() })
    }

    pub fn requests(&self) -> Vec<DateRange> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn search(&self, request: &SearchRequest) -> Result<ItemSet> {
        self.requests.lock().unwrap().push(request.range);
        if self.fail {
            return Err(Error::Catalog("POST /search returned 503".to_string()));
        }
        Ok(self
            .items
            .iter()
            .filter(|i| i.acquisition_date().is_some_and(|d| request.range.contains(d)))
            .filter(|i| {
                request.query.iter().all(|(property, comparison)| {
                    i.properties
                        .extra
                        .get(property)
                        .and_then(|v| v.as_f64())
                        .is_some_and(|v| comparison.matches(v))
                })
            })
            .cloned()
            .collect::<Vec<_>>()
            .into())
    }
}

/// Raster source returning fixed digital numbers for every band
pub struct MockRaster {
    shape: RasterShape,
    red: Vec<f64>,
    nir: Vec<f64>,
    calls: AtomicUsize,
    loaded_ids: Mutex<Vec<String>>,
    fail: bool,
}

impl MockRaster {
    pub fn new(shape: RasterShape, red: Vec<f64>, nir: Vec<f64>) -> Arc<Self> {
        Arc::new(Self {
            shape,
            red,
            nir,
            calls: AtomicUsize::new(0),
            loaded_ids: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    /// Fails every load the way a corrupt tile does
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            shape: RasterShape::new(1, 1, 1),
            red: Vec::new(),
            nir: Vec::new(),
            calls: AtomicUsize::new(0),
            loaded_ids: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn loaded_ids(&self) -> Vec<String> {
        self.loaded_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl RasterSource for MockRaster {
    async fn load_raw(
        &self,
        items: &ItemSet,
        _polygon: &Polygon<f64>,
        bands: &[BandRequest],
    ) -> Result<RawRaster> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.loaded_ids.lock().unwrap() = items.iter().map(|i| i.id.clone()).collect();
        if self.fail {
            return Err(Error::InvalidFormat("Corrupt deflate tile: invalid stored block lengths".to_string()));
        }

        let mut raw = RawRaster::new(self.shape, Vec::new());
        for request in bands {
            let values = match request.asset.as_str() {
                "red" => self.red.clone(),
                _ => self.nir.clone(),
            };
            raw.insert_band(request.band, values)?;
        }
        Ok(raw)
    }
}

/// Sentinel-2 L2A style item with 1e-4 scale and -0.1 offset on both bands
pub fn item(id: &str, datetime: &str) -> CatalogItem {
    item_with_cover(id, datetime, 0.1)
}

pub fn item_with_cover(id: &str, datetime: &str, cloud_cover: f64) -> CatalogItem {
    let band = json!([{"nodata": 0, "data_type": "uint16", "scale": 0.0001, "offset": -0.1}]);
    serde_json::from_value(json!({
        "id": id,
        "collection": "sentinel-2-l2a",
        "bbox": [8.0, 47.0, 9.0, 48.0],
        "properties": {
            "datetime": datetime,
            "eo:cloud_cover": cloud_cover,
            "s2:vegetation_percentage": 62.5
        },
        "assets": {
            "red": {"href": format!("https://example.com/{id}/B04.tif"), "raster:bands": band.clone()},
            "nir": {"href": format!("https://example.com/{id}/B08.tif"), "raster:bands": band}
        }
    }))
    .unwrap()
}

pub fn pipeline(catalog: Arc<MockCatalog>, raster: Arc<MockRaster>) -> NdviPipeline {
    NdviPipeline::new(
        catalog,
        raster,
        CatalogConfig::default(),
        &LoaderConfig::default(),
        FilterDefaults::default(),
    )
}

pub fn square() -> serde_json::Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[8.5, 47.3], [8.6, 47.3], [8.6, 47.4], [8.5, 47.4], [8.5, 47.3]]]
    })
}
