//! Nearest-neighbor enrichment over the run's in-flight unified set.
//!
//! Candidate categories are discovered at runtime: every distinct layer in
//! the set except the query layer supplies candidates, and each is handled
//! through the same per-layer index lookup. For every query-category record
//! the single nearest candidate per layer is summarized into `nearest_pois`.
//!
//! Query records are enriched in parallel; each worker writes only its own
//! record's summary map, so assembly is deterministic for any interleaving.
//!
//! With Q query records, L candidate layers and C candidates per layer this
//! costs O(Q x L x log C) lookups after an O(C log C) build per layer; a
//! linear scan per lookup would degrade to O(Q x total candidates) and is
//! not used.

use crate::index::SpatialIndex;
use crate::record::{Address, NearestPoi, PoiId, PoiRecord};
use ahash::AHashMap;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Candidate data captured at index-build time, so lookups never reach back
/// into the record set.
struct Candidate {
    id: PoiId,
    name: Option<String>,
    address: Address,
}

/// One candidate layer: its spatial index plus per-rank candidate summaries.
struct LayerIndex {
    layer: String,
    tree: SpatialIndex,
    candidates: Vec<Candidate>,
}

/// Attach `nearest_pois` to every record of `query_layer`.
///
/// Tie-break: equidistant candidates within a layer resolve to the smaller
/// poi_id. Records without geometry neither supply candidates nor receive
/// enrichment; a candidate layer whose members all lack geometry contributes
/// no entry.
pub fn enrich_nearest(records: &mut [PoiRecord], query_layer: &str) {
    let layer_indexes = build_layer_indexes(records, query_layer);
    debug!(
        layers = layer_indexes.len(),
        query_layer, "candidate layers indexed"
    );

    records.par_iter_mut().for_each(|record| {
        if record.layer != query_layer {
            return;
        }
        let Some(point) = record.geometry else {
            return;
        };

        let mut summary = BTreeMap::new();
        for li in &layer_indexes {
            if let Some((rank, distance)) = li.tree.nearest(point) {
                let candidate = &li.candidates[rank];
                summary.insert(
                    li.layer.clone(),
                    NearestPoi {
                        id: candidate.id.clone(),
                        name: candidate.name.clone(),
                        distance,
                        address: candidate.address.clone(),
                    },
                );
            }
        }
        record.nearest_pois = Some(summary);
    });
}

fn build_layer_indexes(records: &[PoiRecord], query_layer: &str) -> Vec<LayerIndex> {
    let mut members: AHashMap<&str, Vec<usize>> = AHashMap::new();
    for (i, record) in records.iter().enumerate() {
        if record.layer != query_layer && record.geometry.is_some() {
            members.entry(record.layer.as_str()).or_default().push(i);
        }
    }

    let mut layers: Vec<(&str, Vec<usize>)> = members.into_iter().collect();
    layers.sort_by(|a, b| a.0.cmp(b.0));

    layers
        .into_iter()
        .map(|(layer, mut indices)| {
            // Rank order is poi_id order, which makes the index's rank
            // tie-break the documented smaller-poi_id rule.
            indices.sort_by(|&a, &b| records[a].poi_id.cmp(&records[b].poi_id));
            let points = indices
                .iter()
                .map(|&i| records[i].geometry.expect("members are geometry-bearing"))
                .collect();
            let candidates = indices
                .iter()
                .map(|&i| {
                    let record = &records[i];
                    Candidate {
                        id: record.poi_id.clone(),
                        name: record.name.clone(),
                        address: Address::from_attributes(&record.attributes),
                    }
                })
                .collect();
            LayerIndex {
                layer: layer.to_string(),
                tree: SpatialIndex::build(points),
                candidates,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeoPoint;
    use crate::record::SourceRow;

    fn record(layer: &str, id: &str, geometry: Option<(f64, f64)>) -> PoiRecord {
        PoiRecord {
            poi_id: PoiId::new(&crate::unify::layer_prefix(layer), id),
            name: Some(format!("{} {}", layer, id)),
            layer: layer.to_string(),
            district_id: None,
            district: None,
            neighborhood_id: None,
            neighborhood: None,
            latitude: geometry.map(|(_, y)| y),
            longitude: geometry.map(|(x, _)| x),
            geometry: geometry.map(|(x, y)| GeoPoint::new(x, y)),
            attributes: SourceRow::new(),
            nearest_pois: None,
        }
    }

    #[test]
    fn test_query_records_enriched_per_candidate_layer() {
        let mut records = vec![
            record("galleries", "1", Some((0.0, 0.0))),
            record("galleries", "2", Some((10.0, 0.0))),
            record("long_term_listings", "1", Some((1.0, 0.0))),
        ];
        enrich_nearest(&mut records, "long_term_listings");

        let listing = &records[2];
        let summary = listing.nearest_pois.as_ref().unwrap();
        assert_eq!(summary.len(), 1);
        let nearest = &summary["galleries"];
        assert_eq!(nearest.id.as_str(), "gall-1");
        assert!((nearest.distance - 1.0).abs() < 1e-12);

        // Candidate records stay unenriched.
        assert!(records[0].nearest_pois.is_none());
        assert!(records[1].nearest_pois.is_none());
    }

    #[test]
    fn test_every_candidate_layer_contributes_independently() {
        let mut records = vec![
            record("banks", "1", Some((5.0, 5.0))),
            record("malls", "1", Some((-3.0, 0.0))),
            record("galleries", "1", Some((0.0, 2.0))),
            record("long_term_listings", "9", Some((0.0, 0.0))),
        ];
        enrich_nearest(&mut records, "long_term_listings");

        let summary = records[3].nearest_pois.as_ref().unwrap();
        let layers: Vec<&String> = summary.keys().collect();
        assert_eq!(layers, vec!["banks", "galleries", "malls"]);
        assert!((summary["galleries"].distance - 2.0).abs() < 1e-12);
        assert!((summary["malls"].distance - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_equidistant_tie_breaks_on_smaller_poi_id() {
        let mut records = vec![
            record("galleries", "9", Some((1.0, 0.0))),
            record("galleries", "3", Some((-1.0, 0.0))),
            record("long_term_listings", "1", Some((0.0, 0.0))),
        ];
        enrich_nearest(&mut records, "long_term_listings");

        let summary = records[2].nearest_pois.as_ref().unwrap();
        assert_eq!(summary["galleries"].id.as_str(), "gall-3");
    }

    #[test]
    fn test_query_record_without_geometry_gets_nothing() {
        let mut records = vec![
            record("galleries", "1", Some((0.0, 0.0))),
            record("long_term_listings", "1", None),
        ];
        enrich_nearest(&mut records, "long_term_listings");
        assert!(records[1].nearest_pois.is_none());
    }

    #[test]
    fn test_layer_with_only_null_geometry_contributes_no_entry() {
        let mut records = vec![
            record("banks", "1", None),
            record("galleries", "1", Some((3.0, 4.0))),
            record("long_term_listings", "1", Some((0.0, 0.0))),
        ];
        enrich_nearest(&mut records, "long_term_listings");

        let summary = records[2].nearest_pois.as_ref().unwrap();
        assert!(!summary.contains_key("banks"));
        assert!((summary["galleries"].distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_candidate_layers_yields_empty_summary() {
        let mut records = vec![record("long_term_listings", "1", Some((0.0, 0.0)))];
        enrich_nearest(&mut records, "long_term_listings");
        let summary = records[0].nearest_pois.as_ref().unwrap();
        assert!(summary.is_empty());
    }

    #[test]
    fn test_address_pulled_from_candidate_attributes() {
        let mut gallery = record("galleries", "1", Some((1.0, 1.0)));
        gallery
            .attributes
            .insert("street".to_string(), "Auguststrasse".into());
        let mut records = vec![gallery, record("long_term_listings", "1", Some((0.0, 0.0)))];
        enrich_nearest(&mut records, "long_term_listings");

        let summary = records[1].nearest_pois.as_ref().unwrap();
        let address = &summary["galleries"].address;
        assert_eq!(address.street.as_deref(), Some("Auguststrasse"));
        assert_eq!(address.housenumber, None);
    }
}
