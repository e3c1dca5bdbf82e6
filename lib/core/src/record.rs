//! Canonical POI records and their building blocks.

use crate::geometry::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical identifier: `<dataset prefix>-<source row id>`.
///
/// Stable across runs because both parts are taken from the source, never
/// generated. Uniqueness across the whole canonical dataset rests on the
/// configured dataset names having distinct prefixes, which is checked at
/// configuration time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoiId(String);

impl PoiId {
    pub fn new(prefix: &str, source_id: &str) -> Self {
        Self(format!("{}-{}", prefix, source_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PoiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PoiId {
    fn from(s: String) -> Self {
        PoiId(s)
    }
}

/// One source row, as the column-name-to-value mapping a relational store's
/// row-to-JSON conversion produces. Read-only input to a run.
pub type SourceRow = serde_json::Map<String, serde_json::Value>;

/// Street address pulled from a candidate's attribute bag.
///
/// Both parts are optional; a candidate without address attributes still
/// appears in `nearest_pois`, just with null members here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub housenumber: Option<String>,
}

impl Address {
    /// Extract `street`/`housenumber` from an attribute bag.
    pub fn from_attributes(attributes: &SourceRow) -> Self {
        let text = |key: &str| {
            attributes
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        Self {
            street: text("street"),
            housenumber: text("housenumber"),
        }
    }
}

/// Per-category nearest-neighbor summary attached to query-category records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestPoi {
    pub id: PoiId,
    pub name: Option<String>,
    /// Distance in the canonical SRS's coordinate units
    pub distance: f64,
    pub address: Address,
}

/// A record of the canonical, unified POI dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiRecord {
    pub poi_id: PoiId,
    pub name: Option<String>,
    /// Source dataset tag this record came from
    pub layer: String,
    pub district_id: Option<String>,
    pub district: Option<String>,
    pub neighborhood_id: Option<String>,
    pub neighborhood: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Normalized geometry; `None` when the source value was null or
    /// unparseable - the record still exists, it just cannot be enriched
    /// or serve as a nearest-neighbor candidate
    pub geometry: Option<GeoPoint>,
    /// All source columns not promoted to the named fields above, verbatim
    #[serde(default)]
    pub attributes: SourceRow,
    /// Present only on query-category records; keyed by candidate layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_pois: Option<BTreeMap<String, NearestPoi>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poi_id_format() {
        let id = PoiId::new("gall", "42");
        assert_eq!(id.as_str(), "gall-42");
        assert_eq!(id.to_string(), "gall-42");
    }

    #[test]
    fn test_poi_id_ordering_is_lexicographic() {
        assert!(PoiId::new("bank", "1") < PoiId::new("gall", "1"));
        assert!(PoiId::new("gall", "10") < PoiId::new("gall", "9"));
    }

    #[test]
    fn test_address_from_attributes() {
        let mut bag = SourceRow::new();
        bag.insert("street".to_string(), "Torstrasse".into());
        bag.insert("opening_hours".to_string(), "24/7".into());

        let addr = Address::from_attributes(&bag);
        assert_eq!(addr.street.as_deref(), Some("Torstrasse"));
        assert_eq!(addr.housenumber, None);
    }

    #[test]
    fn test_nearest_pois_skipped_when_absent() {
        let record = PoiRecord {
            poi_id: PoiId::new("gall", "1"),
            name: None,
            layer: "galleries".to_string(),
            district_id: None,
            district: None,
            neighborhood_id: None,
            neighborhood: None,
            latitude: None,
            longitude: None,
            geometry: None,
            attributes: SourceRow::new(),
            nearest_pois: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("nearest_pois").is_none());
    }
}
