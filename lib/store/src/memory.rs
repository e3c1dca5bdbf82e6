//! In-memory reference implementation of the store contract.
//!
//! Holds registered source tables, the canonical dataset, the exclusion log,
//! the ledger and the spatial index behind one `RwLock`, so `apply_run` is
//! naturally a single unit of work: the batch is checked against current
//! state first and committed only when every check passed.

use crate::store::{IndexStatus, LedgerEntry, PoiStore, RunBatch};
use ahash::AHashSet;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use unipoi_core::{Error, PoiRecord, Result, SourceRow, SpatialIndex};
use unipoi_schema::{Exclusion, TableSchema};

/// A registered source table: its introspectable schema plus its rows.
/// The JSON shape of this struct is the fixture format the demo binary
/// loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTable {
    pub schema: TableSchema,
    #[serde(default)]
    pub rows: Vec<SourceRow>,
}

#[derive(Default)]
struct StoreInner {
    tables: Vec<SourceTable>,
    canonical: Vec<PoiRecord>,
    poi_ids: AHashSet<String>,
    exclusions: Vec<Exclusion>,
    ledger: Vec<LedgerEntry>,
    index: Option<SpatialIndex>,
    /// Canonical length the index was last built over
    indexed_rows: usize,
}

impl StoreInner {
    fn table(&self, name: &str) -> Option<&SourceTable> {
        self.tables.iter().find(|t| t.schema.name == name)
    }

    fn ledger_contains(&self, table: &str) -> bool {
        self.ledger.iter().any(|entry| entry.table == table)
    }
}

/// In-memory store satisfying [`PoiStore`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a source table. Stands in for the out-of-scope
    /// acquisition step that would normally populate the source schema.
    pub fn register_table(&self, table: SourceTable) {
        let mut inner = self.inner.write();
        debug!(table = %table.schema.name, rows = table.rows.len(), "source table registered");
        if let Some(existing) = inner
            .tables
            .iter_mut()
            .find(|t| t.schema.name == table.schema.name)
        {
            *existing = table;
        } else {
            inner.tables.push(table);
        }
    }

    /// Snapshot of the canonical dataset, for inspection and tests.
    pub fn canonical_records(&self) -> Vec<PoiRecord> {
        self.inner.read().canonical.clone()
    }

    /// Snapshot of the current exclusion log.
    pub fn exclusions(&self) -> Vec<Exclusion> {
        self.inner.read().exclusions.clone()
    }
}

impl PoiStore for MemoryStore {
    fn source_tables(&self) -> Result<Vec<String>> {
        Ok(self
            .inner
            .read()
            .tables
            .iter()
            .map(|t| t.schema.name.clone())
            .collect())
    }

    fn table_schema(&self, table: &str) -> Result<TableSchema> {
        self.inner
            .read()
            .table(table)
            .map(|t| t.schema.clone())
            .ok_or_else(|| Error::TableNotFound(table.to_string()))
    }

    fn fetch_rows(&self, table: &str) -> Result<Vec<SourceRow>> {
        self.inner
            .read()
            .table(table)
            .map(|t| t.rows.clone())
            .ok_or_else(|| Error::TableNotFound(table.to_string()))
    }

    fn processed_tables(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.inner.read().ledger.clone())
    }

    fn mark_processed(&self, table: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.ledger_contains(table) {
            inner.ledger.push(LedgerEntry {
                table: table.to_string(),
                processed_at: Utc::now(),
            });
        }
        Ok(())
    }

    fn canonical_count(&self) -> Result<usize> {
        Ok(self.inner.read().canonical.len())
    }

    fn apply_run(&self, batch: RunBatch) -> Result<()> {
        let mut inner = self.inner.write();

        // Check the whole batch before touching anything, so a failure
        // leaves the store exactly as it was.
        let mut incoming: AHashSet<&str> = AHashSet::with_capacity(batch.records.len());
        for record in &batch.records {
            let id = record.poi_id.as_str();
            if inner.poi_ids.contains(id) || !incoming.insert(id) {
                return Err(Error::DuplicatePoiId(id.to_string()));
            }
        }
        drop(incoming);

        inner.exclusions = batch.exclusions;
        for record in batch.records {
            inner.poi_ids.insert(record.poi_id.as_str().to_string());
            inner.canonical.push(record);
        }
        let processed_at = Utc::now();
        for table in batch.processed {
            if !inner.ledger_contains(&table) {
                inner.ledger.push(LedgerEntry {
                    table,
                    processed_at,
                });
            }
        }
        info!(
            canonical = inner.canonical.len(),
            exclusions = inner.exclusions.len(),
            "run batch applied"
        );
        Ok(())
    }

    fn ensure_spatial_index(&self) -> Result<IndexStatus> {
        let mut inner = self.inner.write();
        let status = if inner.index.is_none() {
            IndexStatus::Created
        } else {
            IndexStatus::AlreadyExists
        };
        if inner.index.is_none() || inner.indexed_rows != inner.canonical.len() {
            let points = inner
                .canonical
                .iter()
                .filter_map(|r| r.geometry)
                .collect::<Vec<_>>();
            inner.index = Some(SpatialIndex::build(points));
            inner.indexed_rows = inner.canonical.len();
            debug!(rows = inner.indexed_rows, "spatial index refreshed");
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use unipoi_core::PoiId;
    use unipoi_schema::{ColumnMeta, ExclusionReason};

    fn poi(layer: &str, id: &str) -> PoiRecord {
        PoiRecord {
            poi_id: PoiId::new(&unipoi_core::layer_prefix(layer), id),
            name: None,
            layer: layer.to_string(),
            district_id: None,
            district: None,
            neighborhood_id: None,
            neighborhood: None,
            latitude: None,
            longitude: None,
            geometry: unipoi_core::parse_point("POINT(1.0 2.0)"),
            attributes: SourceRow::new(),
            nearest_pois: None,
        }
    }

    #[test]
    fn test_register_and_introspect() {
        let store = MemoryStore::new();
        store.register_table(SourceTable {
            schema: TableSchema::new("galleries").column_def(ColumnMeta::varchar("id")),
            rows: vec![json!({"id": "1"}).as_object().unwrap().clone()],
        });

        assert_eq!(store.source_tables().unwrap(), vec!["galleries"]);
        assert_eq!(store.table_schema("galleries").unwrap().columns.len(), 1);
        assert_eq!(store.fetch_rows("galleries").unwrap().len(), 1);
        assert!(matches!(
            store.table_schema("missing"),
            Err(Error::TableNotFound(_))
        ));
    }

    #[test]
    fn test_apply_run_appends_and_marks() {
        let store = MemoryStore::new();
        let batch = RunBatch {
            exclusions: Vec::new(),
            records: vec![poi("galleries", "1"), poi("banks", "1")],
            processed: vec!["galleries".to_string(), "banks".to_string()],
        };
        store.apply_run(batch).unwrap();

        assert_eq!(store.canonical_count().unwrap(), 2);
        assert!(store.is_processed("galleries").unwrap());
        assert!(store.is_processed("banks").unwrap());
        assert!(!store.is_processed("malls").unwrap());
    }

    #[test]
    fn test_apply_run_is_atomic_on_duplicate_poi_id() {
        let store = MemoryStore::new();
        store
            .apply_run(RunBatch {
                records: vec![poi("galleries", "1")],
                processed: vec!["galleries".to_string()],
                ..Default::default()
            })
            .unwrap();

        let exclusion = Exclusion::new(
            "malls",
            ExclusionReason::MissingPrimaryKey {
                column: "id".to_string(),
            },
            Utc::now(),
        );
        let err = store
            .apply_run(RunBatch {
                exclusions: vec![exclusion],
                records: vec![poi("banks", "1"), poi("galleries", "1")],
                processed: vec!["banks".to_string()],
            })
            .unwrap_err();

        assert!(matches!(err, Error::DuplicatePoiId(id) if id == "gall-1"));
        // Nothing from the failed batch is visible.
        assert_eq!(store.canonical_count().unwrap(), 1);
        assert!(!store.is_processed("banks").unwrap());
        assert!(store.exclusions().is_empty());
    }

    #[test]
    fn test_duplicate_within_batch_rejected() {
        let store = MemoryStore::new();
        let err = store
            .apply_run(RunBatch {
                records: vec![poi("galleries", "1"), poi("galleries", "1")],
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::DuplicatePoiId(_)));
        assert_eq!(store.canonical_count().unwrap(), 0);
    }

    #[test]
    fn test_exclusion_log_replaced_each_run() {
        let store = MemoryStore::new();
        let reason = ExclusionReason::MissingForeignKey {
            column: "district_id".to_string(),
        };
        store
            .apply_run(RunBatch {
                exclusions: vec![Exclusion::new("malls", reason.clone(), Utc::now())],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.exclusions().len(), 1);

        store.apply_run(RunBatch::default()).unwrap();
        assert!(store.exclusions().is_empty());
    }

    #[test]
    fn test_mark_processed_is_idempotent() {
        let store = MemoryStore::new();
        store.mark_processed("galleries").unwrap();
        store.mark_processed("galleries").unwrap();
        assert_eq!(store.processed_tables().unwrap().len(), 1);
    }

    #[test]
    fn test_ensure_spatial_index_idempotent() {
        let store = MemoryStore::new();
        store
            .apply_run(RunBatch {
                records: vec![poi("galleries", "1")],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(store.ensure_spatial_index().unwrap(), IndexStatus::Created);
        assert_eq!(
            store.ensure_spatial_index().unwrap(),
            IndexStatus::AlreadyExists
        );

        // Growth refreshes content but the index structurally persists.
        store
            .apply_run(RunBatch {
                records: vec![poi("banks", "7")],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            store.ensure_spatial_index().unwrap(),
            IndexStatus::AlreadyExists
        );
    }
}
