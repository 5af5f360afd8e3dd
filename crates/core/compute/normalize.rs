//! Translation of heterogeneous upstream records into canonical [`Point`]s.
//!
//! This is the only place that knows upstream field names. Each source
//! declares a [`FieldMap`] listing, for every canonical attribute, the
//! record keys to try in order. Keys may be dotted paths into nested
//! objects (`coordinates.latitude`).

use geocluster_types::point::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw record as returned by a listing source.
pub type RawRecord = Value;

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Per-source mapping from canonical attributes to record keys.
///
/// Defaults match the upstream MLS listing schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldMap {
    pub id: Vec<String>,
    pub listing_key: Vec<String>,
    pub latitude: Vec<String>,
    pub longitude: Vec<String>,
    pub price: Vec<String>,
    pub category: Vec<String>,
    pub property_sub_type: Vec<String>,
    pub slug: Vec<String>,
    pub slug_address: Vec<String>,
    pub city: Vec<String>,
    pub beds: Vec<String>,
    pub baths: Vec<String>,
    pub living_area: Vec<String>,
    pub pool: Vec<String>,
    pub spa: Vec<String>,
    pub status: Vec<String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            id: keys(&["listingKey", "listingId", "_id"]),
            listing_key: keys(&["listingKey", "listingId"]),
            latitude: keys(&["latitude"]),
            longitude: keys(&["longitude"]),
            price: keys(&["listPrice"]),
            category: keys(&["propertyType"]),
            property_sub_type: keys(&["propertySubType"]),
            slug: keys(&["slug"]),
            slug_address: keys(&["slugAddress"]),
            city: keys(&["city"]),
            beds: keys(&["bedroomsTotal", "bedsTotal"]),
            baths: keys(&["bathroomsTotalDecimal", "bathroomsTotalInteger"]),
            living_area: keys(&["livingArea"]),
            pool: keys(&["poolYn"]),
            spa: keys(&["spaYn"]),
            status: keys(&["standardStatus"]),
        }
    }
}

impl FieldMap {
    /// First non-null value among the candidate keys.
    fn lookup<'a>(record: &'a Value, candidates: &[String]) -> Option<&'a Value> {
        candidates.iter().find_map(|path| {
            path.split('.')
                .try_fold(record, |value, segment| value.get(segment))
                .filter(|value| !value.is_null())
        })
    }

    fn number(record: &Value, candidates: &[String]) -> Option<f64> {
        let number = match Self::lookup(record, candidates)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => crate::compute::filter::parse_number(s),
            _ => None,
        };
        number.filter(|n| n.is_finite())
    }

    fn text(record: &Value, candidates: &[String]) -> Option<String> {
        match Self::lookup(record, candidates)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            // Extended-JSON object ids: { "$oid": "..." }
            Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }

    fn flag(record: &Value, candidates: &[String]) -> Option<bool> {
        match Self::lookup(record, candidates)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Some(true),
                "false" | "no" | "n" | "0" => Some(false),
                _ => None,
            },
            Value::Number(n) => n.as_f64().map(|n| n != 0.0),
            _ => None,
        }
    }
}

/// Canonical coordinates, or `None` when the record cannot be placed on a map.
///
/// A zero latitude or longitude is the upstream "unset" marker and is
/// treated as missing.
fn coordinates(record: &Value, fields: &FieldMap) -> Option<(f64, f64)> {
    let lat = FieldMap::number(record, &fields.latitude)?;
    let lng = FieldMap::number(record, &fields.longitude)?;
    if lat == 0.0 || lng == 0.0 {
        return None;
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some((lat, lng))
}

/// Converts raw source records into canonical points, tagging provenance.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer;

impl RecordNormalizer {
    /// Normalize one record. `ordinal` is the record's position within its
    /// batch and becomes the native id when the record carries none.
    pub fn normalize_record(
        source_tag: &str,
        fields: &FieldMap,
        record: &RawRecord,
        ordinal: usize,
    ) -> Option<Point> {
        let (lat, lng) = coordinates(record, fields)?;
        let native_id =
            FieldMap::text(record, &fields.id).unwrap_or_else(|| ordinal.to_string());

        let mut point = Point::new(format!("{}:{}", source_tag, native_id), source_tag, lat, lng);
        point.price = FieldMap::number(record, &fields.price).filter(|p| *p >= 0.0);
        point.category = FieldMap::text(record, &fields.category);
        point.listing_key = FieldMap::text(record, &fields.listing_key);
        point.slug = FieldMap::text(record, &fields.slug);
        point.slug_address = FieldMap::text(record, &fields.slug_address);
        point.property_sub_type = FieldMap::text(record, &fields.property_sub_type);
        point.city = FieldMap::text(record, &fields.city);
        point.beds = FieldMap::number(record, &fields.beds);
        point.baths = FieldMap::number(record, &fields.baths);
        point.living_area = FieldMap::number(record, &fields.living_area);
        point.pool = FieldMap::flag(record, &fields.pool);
        point.spa = FieldMap::flag(record, &fields.spa);
        point.status = FieldMap::text(record, &fields.status);
        Some(point)
    }

    /// Normalize a batch, dropping records without usable coordinates.
    pub fn normalize_batch(source_tag: &str, fields: &FieldMap, records: &[RawRecord]) -> Vec<Point> {
        let points: Vec<Point> = records
            .iter()
            .enumerate()
            .filter_map(|(ordinal, record)| {
                Self::normalize_record(source_tag, fields, record, ordinal)
            })
            .collect();

        let dropped = records.len() - points.len();
        if dropped > 0 {
            log::debug!(
                "Dropped {} of {} records from '{}' without valid coordinates",
                dropped,
                records.len(),
                source_tag
            );
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upstream_record_mapping() {
        let record = json!({
            "_id": { "$oid": "65f0" },
            "listingKey": "K1",
            "latitude": 33.72,
            "longitude": "-116.37",
            "listPrice": 1250000,
            "propertyType": "A",
            "propertySubType": "SingleFamilyResidence",
            "bedroomsTotal": 4,
            "bathroomsTotalInteger": 3,
            "poolYn": true,
            "slugAddress": "1-main-st",
            "standardStatus": "Active"
        });

        let point =
            RecordNormalizer::normalize_record("gps", &FieldMap::default(), &record, 0).unwrap();
        assert_eq!(point.id, "gps:K1");
        assert_eq!(point.source_tag, "gps");
        assert_eq!(point.lng, -116.37);
        assert_eq!(point.price, Some(1_250_000.0));
        assert_eq!(point.beds, Some(4.0));
        assert_eq!(point.baths, Some(3.0));
        assert_eq!(point.pool, Some(true));
        assert_eq!(point.spa, None);
        assert_eq!(point.slug_address.as_deref(), Some("1-main-st"));
        assert_eq!(point.status.as_deref(), Some("Active"));
    }

    #[test]
    fn test_fallback_keys() {
        let record = json!({ "listingId": "L9", "latitude": 34.0, "longitude": -118.0, "bedsTotal": 2 });
        let point =
            RecordNormalizer::normalize_record("crmls", &FieldMap::default(), &record, 3).unwrap();
        assert_eq!(point.id, "crmls:L9");
        assert_eq!(point.listing_key.as_deref(), Some("L9"));
        assert_eq!(point.beds, Some(2.0));
        assert_eq!(point.price, None);
    }

    #[test]
    fn test_missing_id_uses_ordinal() {
        let record = json!({ "latitude": 34.0, "longitude": -118.0 });
        let point =
            RecordNormalizer::normalize_record("gps", &FieldMap::default(), &record, 7).unwrap();
        assert_eq!(point.id, "gps:7");
    }

    #[test]
    fn test_invalid_coordinates_dropped() {
        let records = vec![
            json!({ "listingKey": "a", "latitude": 34.0, "longitude": -118.0 }),
            json!({ "listingKey": "b", "latitude": null, "longitude": -118.0 }),
            json!({ "listingKey": "c", "latitude": 0, "longitude": -118.0 }),
            json!({ "listingKey": "d", "latitude": 95.0, "longitude": -118.0 }),
            json!({ "listingKey": "e", "latitude": "north", "longitude": -118.0 }),
            json!({ "listingKey": "f", "longitude": -118.0 }),
        ];
        let points = RecordNormalizer::normalize_batch("gps", &FieldMap::default(), &records);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, "gps:a");
    }

    #[test]
    fn test_custom_nested_field_map() {
        let fields = FieldMap {
            id: vec!["mls.number".to_string()],
            latitude: vec!["coordinates.lat".to_string()],
            longitude: vec!["coordinates.lon".to_string()],
            price: vec!["pricing.list".to_string()],
            ..FieldMap::default()
        };
        let record = json!({
            "mls": { "number": 88 },
            "coordinates": { "lat": 32.7, "lon": -117.2 },
            "pricing": { "list": "799000" }
        });
        let point = RecordNormalizer::normalize_record("sdmls", &fields, &record, 0).unwrap();
        assert_eq!(point.id, "sdmls:88");
        assert_eq!(point.price, Some(799_000.0));
    }

    #[test]
    fn test_field_map_partial_config() {
        let fields: FieldMap = serde_json::from_str(r#"{ "price": ["currentPrice"] }"#).unwrap();
        assert_eq!(fields.price, vec!["currentPrice".to_string()]);
        assert_eq!(fields.latitude, FieldMap::default().latitude);
    }
}
