//! STAC item data model

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One scene returned by the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    #[serde(default)]
    pub geometry: Option<Value>,
    pub properties: ItemProperties,
    #[serde(default)]
    pub assets: HashMap<String, Asset>,
}

/// Item properties used by the service; everything else is kept verbatim
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemProperties {
    #[serde(default)]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_datetime: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// STAC Asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(rename = "raster:bands", default)]
    pub raster_bands: Option<Vec<RasterBand>>,
}

/// Per-band metadata from the STAC raster extension
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RasterBand {
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub offset: Option<f64>,
    /// Number, or one of the strings "nan", "inf", "-inf"
    #[serde(default)]
    pub nodata: Option<Value>,
    #[serde(default)]
    pub data_type: Option<String>,
}

impl RasterBand {
    /// Numeric nodata value, if declared
    pub fn nodata_value(&self) -> Option<f64> {
        match self.nodata.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "nan" => Some(f64::NAN),
                "inf" => Some(f64::INFINITY),
                "-inf" => Some(f64::NEG_INFINITY),
                _ => None,
            },
            _ => None,
        }
    }
}

impl CatalogItem {
    /// Acquisition time, falling back to the start of the acquisition interval
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.properties.datetime.or(self.properties.start_datetime)
    }

    /// Acquisition date in UTC
    pub fn acquisition_date(&self) -> Option<NaiveDate> {
        self.datetime().map(|dt| dt.date_naive())
    }

    pub fn asset(&self, key: &str) -> Option<&Asset> {
        self.assets.get(key)
    }

    /// First `raster:bands` entry of an asset
    pub fn raster_band(&self, key: &str) -> Option<&RasterBand> {
        self.asset(key)?.raster_bands.as_ref()?.first()
    }

    /// Centre longitude of the item footprint
    pub fn center_longitude(&self) -> Option<f64> {
        match self.bbox.as_deref()? {
            [min_x, _, max_x, _] | [min_x, _, _, max_x, _, _] => Some((min_x + max_x) / 2.0),
            _ => None,
        }
    }
}

/// Items returned by one search, in catalog order
#[derive(Debug, Clone, Default)]
pub struct ItemSet {
    items: Vec<CatalogItem>,
}

impl ItemSet {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&CatalogItem> {
        self.items.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogItem> {
        self.items.iter()
    }

    /// Distinct UTC acquisition dates, ascending
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.items.iter().filter_map(CatalogItem::acquisition_date).collect()
    }
}

impl From<Vec<CatalogItem>> for ItemSet {
    fn from(items: Vec<CatalogItem>) -> Self {
        Self::new(items)
    }
}

impl<'a> IntoIterator for &'a ItemSet {
    type Item = &'a CatalogItem;
    type IntoIter = std::slice::Iter<'a, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn earth_search_item() -> Value {
        json!({
            "type": "Feature",
            "stac_version": "1.0.0",
            "id": "S2B_32TMT_20240610_0_L2A",
            "collection": "sentinel-2-l2a",
            "bbox": [7.66, 45.94, 9.08, 46.95],
            "geometry": {"type": "Polygon", "coordinates": []},
            "properties": {
                "datetime": "2024-06-10T10:36:29.024000Z",
                "eo:cloud_cover": 0.05,
                "s2:vegetation_percentage": 40.1
            },
            "assets": {
                "red": {
                    "href": "https://example.com/B04.tif",
                    "type": "image/tiff; application=geotiff; profile=cloud-optimized",
                    "roles": ["data"],
                    "raster:bands": [{"nodata": 0, "data_type": "uint16", "scale": 0.0001, "offset": -0.1}]
                },
                "thumbnail": {"href": "https://example.com/thumb.jpg"}
            }
        })
    }

    #[test]
    fn test_deserialize_item() {
        let item: CatalogItem = serde_json::from_value(earth_search_item()).unwrap();
        assert_eq!(item.id, "S2B_32TMT_20240610_0_L2A");
        assert_eq!(item.acquisition_date(), NaiveDate::from_ymd_opt(2024, 6, 10));
        assert_eq!(item.properties.extra["eo:cloud_cover"], json!(0.05));

        let band = item.raster_band("red").unwrap();
        assert_eq!(band.scale, Some(0.0001));
        assert_eq!(band.offset, Some(-0.1));
        assert_eq!(band.nodata_value(), Some(0.0));
        assert!(item.raster_band("thumbnail").is_none());
        assert!(item.raster_band("nir").is_none());
    }

    #[test]
    fn test_start_datetime_fallback() {
        let mut value = earth_search_item();
        value["properties"]["datetime"] = Value::Null;
        value["properties"]["start_datetime"] = json!("2024-06-11T00:00:00Z");
        let item: CatalogItem = serde_json::from_value(value).unwrap();
        assert_eq!(item.acquisition_date(), NaiveDate::from_ymd_opt(2024, 6, 11));
    }

    #[test]
    fn test_center_longitude() {
        let item: CatalogItem = serde_json::from_value(earth_search_item()).unwrap();
        assert!((item.center_longitude().unwrap() - 8.37).abs() < 1e-9);
    }

    #[test]
    fn test_nan_nodata_string() {
        let band = RasterBand { nodata: Some(json!("nan")), ..Default::default() };
        assert!(band.nodata_value().unwrap().is_nan());
    }

    #[test]
    fn test_item_set_dates_distinct_sorted() {
        let mut a: CatalogItem = serde_json::from_value(earth_search_item()).unwrap();
        let mut b = a.clone();
        let c = a.clone();
        a.properties.datetime = Some("2024-06-20T10:00:00Z".parse().unwrap());
        b.properties.datetime = Some("2024-06-05T10:00:00Z".parse().unwrap());

        let set = ItemSet::new(vec![a, b, c.clone(), c]);
        let dates: Vec<_> = set.dates().into_iter().collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            ]
        );
    }
}
