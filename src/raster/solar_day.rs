//! Solar-day grouping of acquisitions

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::catalog::{CatalogItem, ItemSet};
use crate::error::{Error, Result};

/// Local solar date of an acquisition at `longitude` degrees
pub fn solar_day(time: DateTime<Utc>, longitude: f64) -> NaiveDate {
    let shift = Duration::milliseconds((longitude / 15.0 * 3_600_000.0).round() as i64);
    (time + shift).date_naive()
}

/// Items acquired on one solar day, earliest first
#[derive(Debug, Clone)]
pub struct SolarDayGroup<'a> {
    pub day: NaiveDate,
    pub items: Vec<&'a CatalogItem>,
}

/// Groups items by solar day, in ascending day order
///
/// The footprint center is used as longitude, or `fallback_longitude` when
/// an item has no bbox.
pub fn group_by_solar_day(items: &ItemSet, fallback_longitude: f64) -> Result<Vec<SolarDayGroup<'_>>> {
    let mut groups: BTreeMap<NaiveDate, Vec<(DateTime<Utc>, &CatalogItem)>> = BTreeMap::new();

    for item in items {
        let time = item
            .datetime()
            .ok_or_else(|| Error::Load(format!("Item {} has no acquisition time", item.id)))?;
        let longitude = item.center_longitude().unwrap_or(fallback_longitude);
        groups.entry(solar_day(time, longitude)).or_default().push((time, item));
    }

    Ok(groups
        .into_iter()
        .map(|(day, mut members)| {
            members.sort_by_key(|(time, _)| *time);
            SolarDayGroup {
                day,
                items: members.into_iter().map(|(_, item)| item).collect(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, datetime: &str, min_lon: f64) -> CatalogItem {
        serde_json::from_value(json!({
            "id": id,
            "bbox": [min_lon, 45.0, min_lon + 1.0, 46.0],
            "properties": {"datetime": datetime}
        }))
        .unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_solar_day_shifts_by_longitude() {
        assert_eq!(solar_day(utc("2024-06-15T23:00:00Z"), 30.0), "2024-06-16".parse().unwrap());
        assert_eq!(solar_day(utc("2024-06-15T01:00:00Z"), -30.0), "2024-06-14".parse().unwrap());
        assert_eq!(solar_day(utc("2024-06-15T10:30:00Z"), 8.0), "2024-06-15".parse().unwrap());
    }

    #[test]
    fn test_group_orders_days_and_items() {
        let items = ItemSet::new(vec![
            item("b", "2024-06-15T10:40:00Z", 7.5),
            item("c", "2024-06-18T10:30:00Z", 7.5),
            item("a", "2024-06-15T10:30:00Z", 7.5),
        ]);
        let groups = group_by_solar_day(&items, 0.0).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].day, "2024-06-15".parse::<NaiveDate>().unwrap());
        let ids: Vec<_> = groups[0].items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(groups[1].items[0].id, "c");
    }

    #[test]
    fn test_item_without_time_is_load_error() {
        let item: CatalogItem = serde_json::from_value(json!({"id": "x", "properties": {}})).unwrap();
        let items = ItemSet::new(vec![item]);
        assert!(matches!(group_by_solar_day(&items, 0.0), Err(Error::Load(_))));
    }
}
