//! # unipoi
//!
//! Canonical POI dataset engine: merges independently-maintained
//! point-of-interest source datasets into one canonical, spatially-indexed
//! dataset, enriching records of a configured query category with the
//! nearest record from every other category.
//!
//! A run is a batch with five phases:
//!
//! 1. **Schema gate** - each candidate dataset's introspected schema is
//!    checked against the expected one; violations become exclusion records
//!    and the dataset sits this run out.
//! 2. **Ledger filter** - datasets merged in an earlier run are skipped, so
//!    re-runs are incremental and idempotent.
//! 3. **Unification** - rows of each eligible dataset are projected into the
//!    canonical record shape, with a deterministic `prefix-id` identifier
//!    and all unpromoted columns folded into an attribute bag.
//! 4. **Enrichment** - query-category records get a per-category
//!    nearest-neighbor summary computed over the run's combined record set.
//! 5. **Persistence** - the exclusion log, canonical rows, and ledger marks
//!    are applied to the store as one unit of work, and the spatial index
//!    over canonical geometry is (re)ensured.
//!
//! ## Quick start
//!
//! ```rust
//! use unipoi::prelude::*;
//! use serde_json::json;
//!
//! let store = MemoryStore::new();
//! store.register_table(SourceTable {
//!     schema: TableSchema::new("galleries")
//!         .column_def(ColumnMeta::varchar("id").not_null())
//!         .column_def(ColumnMeta::varchar("district_id").not_null())
//!         .column_def(ColumnMeta::varchar("name"))
//!         .column_def(ColumnMeta::numeric("latitude", 9, 6))
//!         .column_def(ColumnMeta::numeric("longitude", 9, 6))
//!         .column_def(ColumnMeta::varchar("neighborhood"))
//!         .column_def(ColumnMeta::varchar("district"))
//!         .column_def(ColumnMeta::varchar("neighborhood_id"))
//!         .column_def(ColumnMeta::geometry("geometry"))
//!         .with_primary_key("id")
//!         .with_foreign_key("district_id", "districts"),
//!     rows: vec![json!({"id": "1", "geometry": "POINT(13.40 52.52)"})
//!         .as_object()
//!         .unwrap()
//!         .clone()],
//! });
//!
//! let config = RunConfig::new(vec!["galleries".to_string()], "galleries");
//! let report = Pipeline::new(&store, config).run().unwrap();
//! assert_eq!(report.records_added, 1);
//! ```
//!
//! ## Crate structure
//!
//! - `unipoi-schema` - introspection metadata, expected schema, the
//!   conformance checks
//! - `unipoi-core` - canonical records, unification, spatial index,
//!   nearest-neighbor enrichment
//! - `unipoi-store` - the backing-store capability contract and the
//!   in-memory reference store

pub mod pipeline;
pub mod report;

pub use pipeline::Pipeline;
pub use report::RunReport;

// Re-export core types
pub use unipoi_core::{
    Address, Error, GeoPoint, NearestPoi, PoiId, PoiRecord, Result, RunConfig, SourceRow,
    SpatialIndex,
};

// Re-export schema gate types
pub use unipoi_schema::{
    validate_table, ColumnMeta, ColumnType, Exclusion, ExclusionReason, ExpectedColumn,
    ExpectedSchema, KeyRole, TableSchema,
};

// Re-export store capability
pub use unipoi_store::{IndexStatus, LedgerEntry, MemoryStore, PoiStore, RunBatch, SourceTable};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ColumnMeta, ColumnType, Error, ExpectedColumn, ExpectedSchema, GeoPoint, IndexStatus,
        KeyRole, MemoryStore, NearestPoi, Pipeline, PoiId, PoiRecord, PoiStore, Result, RunBatch,
        RunConfig, RunReport, SourceTable, TableSchema,
    };
}
