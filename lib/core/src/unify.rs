//! Unification: projecting validated source rows into canonical records.
//!
//! The projection is data-driven - one field mapping applied to every
//! dataset's row stream, however many datasets a run carries. Columns the
//! mapping promotes become named fields; everything else folds into the
//! attribute bag verbatim.

use crate::error::{Error, Result};
use crate::geometry::parse_point;
use crate::record::{PoiId, PoiRecord, SourceRow};
use serde_json::Value;
use tracing::warn;

/// Width of the dataset tag leading every poi_id.
pub const PREFIX_LEN: usize = 4;

/// Source columns consumed by the named canonical fields; everything else
/// lands in the attribute bag.
const PROMOTED: [&str; 9] = [
    "id",
    "name",
    "district_id",
    "district",
    "neighborhood_id",
    "neighborhood",
    "latitude",
    "longitude",
    "geometry",
];

/// Derive the poi_id prefix for a dataset name: its first [`PREFIX_LEN`]
/// characters (the whole name when shorter).
///
/// Distinctness of prefixes across a run's datasets is a configuration-time
/// precondition checked by `RunConfig::validate`, never re-checked per row.
pub fn layer_prefix(dataset: &str) -> String {
    dataset.chars().take(PREFIX_LEN).collect()
}

/// Project one validated dataset's rows into canonical records.
///
/// Rows with null or unparseable geometry are kept (logged, geometry left
/// empty); a row without an identifier is treated as source corruption and
/// fails the run, since the schema gate guarantees NOT NULL on it.
pub fn unify_table(dataset: &str, rows: &[SourceRow]) -> Result<Vec<PoiRecord>> {
    let prefix = layer_prefix(dataset);
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let source_id = row_value(row, "id")
            .and_then(value_to_id)
            .ok_or_else(|| Error::InvalidRow {
                table: dataset.to_string(),
                reason: "null or missing id".to_string(),
            })?;
        let poi_id = PoiId::new(&prefix, &source_id);

        let geometry = match row_value(row, "geometry") {
            Some(Value::String(wkt)) => {
                let parsed = parse_point(wkt);
                if parsed.is_none() {
                    warn!(dataset, poi_id = %poi_id, "unparseable geometry, record kept without one");
                }
                parsed
            }
            _ => None,
        };

        let mut attributes = SourceRow::new();
        for (key, value) in row {
            if !PROMOTED.iter().any(|p| key.eq_ignore_ascii_case(p)) {
                attributes.insert(key.clone(), value.clone());
            }
        }

        records.push(PoiRecord {
            poi_id,
            name: row_text(row, "name"),
            layer: dataset.to_string(),
            district_id: row_text(row, "district_id"),
            district: row_text(row, "district"),
            neighborhood_id: row_text(row, "neighborhood_id"),
            neighborhood: row_text(row, "neighborhood"),
            latitude: row_number(row, "latitude"),
            longitude: row_number(row, "longitude"),
            geometry,
            attributes,
            nearest_pois: None,
        });
    }

    Ok(records)
}

/// Column lookup: exact key first, case-insensitive fallback.
fn row_value<'a>(row: &'a SourceRow, column: &str) -> Option<&'a Value> {
    if let Some(value) = row.get(column) {
        return Some(value);
    }
    row.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(column))
        .map(|(_, value)| value)
}

fn row_text(row: &SourceRow, column: &str) -> Option<String> {
    match row_value(row, column)? {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn row_number(row: &SourceRow, column: &str) -> Option<f64> {
    match row_value(row, column)? {
        Value::Number(n) => n.as_f64(),
        // Stores that serialize decimals as text still project cleanly.
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Identifier values may arrive as strings or integers; both concatenate
/// into the poi_id unchanged.
fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
