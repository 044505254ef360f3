//! Catalog search requests

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, NaiveDate};
use geo::Polygon;
use serde::Serialize;

use crate::config::FilterDefaults;

/// Comparison against a numeric item property (STAC query extension)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Lt(f64),
    Lte(f64),
    Gt(f64),
    Gte(f64),
    Eq(f64),
}

impl Comparison {
    /// Evaluates the comparison against a property value
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Comparison::Lt(bound) => value < bound,
            Comparison::Lte(bound) => value <= bound,
            Comparison::Gt(bound) => value > bound,
            Comparison::Gte(bound) => value >= bound,
            Comparison::Eq(bound) => value == bound,
        }
    }
}

/// Property filters sent as the STAC `query` object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SearchFilters {
    properties: BTreeMap<String, Comparison>,
}

impl SearchFilters {
    /// Filters that match every item
    pub fn none() -> Self {
        Self { properties: BTreeMap::new() }
    }

    /// Cloud cover and vegetation filters from configured defaults
    pub fn from_defaults(defaults: &FilterDefaults) -> Self {
        Self::none()
            .with("eo:cloud_cover", Comparison::Lt(defaults.max_cloud_cover))
            .with("s2:vegetation_percentage", Comparison::Gt(defaults.min_vegetation_percentage))
    }

    /// Adds or replaces the filter on `property`
    pub fn with(mut self, property: impl Into<String>, comparison: Comparison) -> Self {
        self.properties.insert(property.into(), comparison);
        self
    }

    pub fn get(&self, property: &str) -> Option<Comparison> {
        self.properties.get(property).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Comparison)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self::from_defaults(&FilterDefaults::default())
    }
}

/// Inclusive range of whole UTC days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// A single day
    pub fn day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    /// `[center - days, center + days]`, or `None` past the calendar's range
    pub fn window(center: NaiveDate, days: u32) -> Option<Self> {
        let days = Days::new(u64::from(days));
        Some(Self {
            start: center.checked_sub_days(days)?,
            end: center.checked_add_days(days)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// RFC 3339 interval covering the whole range
    pub fn to_interval(&self) -> String {
        format!(
            "{}T00:00:00Z/{}T23:59:59Z",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_day() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}/{}", self.start, self.end)
        }
    }
}

/// Body of a STAC `/search` request
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub collections: Vec<String>,
    pub intersects: geojson::Geometry,
    pub datetime: String,
    pub query: SearchFilters,
    pub limit: usize,
    #[serde(skip)]
    pub range: DateRange,
}

impl SearchRequest {
    pub fn new(
        collection: &str,
        polygon: &Polygon<f64>,
        range: DateRange,
        filters: &SearchFilters,
        limit: usize,
    ) -> Self {
        Self {
            collections: vec![collection.to_string()],
            intersects: geojson::Geometry::new(geojson::Value::from(polygon)),
            datetime: range.to_interval(),
            query: filters.clone(),
            limit,
            range,
        }
    }
}
