//! Request input validation: GeoJSON polygons and timestamps

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// GeoJSON geometry as received in a request body
///
/// Coordinates are kept as raw JSON so that malformed input surfaces as a
/// validation error rather than a body deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoJsonPolygon {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub coordinates: Value,
}

/// Validates a GeoJSON Polygon and converts it to WGS84 `geo::Polygon`
///
/// Unclosed rings are closed by repeating the first position. Every ring
/// must hold at least four positions once closed.
pub fn validate_polygon(input: &GeoJsonPolygon) -> Result<Polygon<f64>> {
    if input.type_ != "Polygon" {
        return Err(Error::InvalidGeometry(format!(
            "Only Polygon type is supported, got {:?}",
            input.type_
        )));
    }

    let rings = input.coordinates.as_array().ok_or_else(|| {
        Error::InvalidGeometry("coordinates must be an array of linear rings".to_string())
    })?;
    if rings.is_empty() {
        return Err(Error::InvalidGeometry("polygon has no exterior ring".to_string()));
    }

    let mut parsed = rings
        .iter()
        .enumerate()
        .map(|(i, ring)| parse_ring(i, ring))
        .collect::<Result<Vec<_>>>()?
        .into_iter();

    let exterior = parsed.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Ok(Polygon::new(exterior, parsed.collect()))
}

fn parse_ring(index: usize, ring: &Value) -> Result<LineString<f64>> {
    let positions = ring.as_array().ok_or_else(|| {
        Error::InvalidGeometry(format!("ring {} must be an array of positions", index))
    })?;

    let mut coords = positions
        .iter()
        .map(|p| parse_position(index, p))
        .collect::<Result<Vec<_>>>()?;

    if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
        if first != last {
            coords.push(first);
        }
    }

    if coords.len() < 4 {
        return Err(Error::InvalidGeometry(format!(
            "ring {} needs at least 4 positions, got {}",
            index,
            coords.len()
        )));
    }

    Ok(LineString::new(coords))
}

fn parse_position(ring: usize, position: &Value) -> Result<Coord<f64>> {
    let invalid = || {
        Error::InvalidGeometry(format!(
            "ring {} has an invalid position {}",
            ring, position
        ))
    };

    let values = position.as_array().ok_or_else(invalid)?;
    if values.len() < 2 {
        return Err(invalid());
    }

    let x = values[0].as_f64().filter(|v| v.is_finite()).ok_or_else(invalid)?;
    let y = values[1].as_f64().filter(|v| v.is_finite()).ok_or_else(invalid)?;
    Ok(Coord { x, y })
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 date or date-time into its calendar date
///
/// The date is taken as written; offsets are not applied.
pub fn parse_timestamp(input: &str) -> Result<NaiveDate> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.date());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| Error::InvalidTimestamp(format!("{:?}: {}", input, e)))
}
