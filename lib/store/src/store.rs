//! The backing-store capability contract.
//!
//! The engine never talks to a concrete database; it is handed something
//! implementing [`PoiStore`] and asks it for schema metadata, rows, ledger
//! state, and for the atomic application of a finished run. A relational
//! store with a spatial extension satisfies this contract directly; the
//! in-memory [`MemoryStore`](crate::MemoryStore) satisfies it for tests and
//! demos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unipoi_core::{PoiRecord, Result, SourceRow};
use unipoi_schema::{Exclusion, TableSchema};

/// One processed-set ledger entry: a merged dataset and when it was merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub table: String,
    pub processed_at: DateTime<Utc>,
}

/// Everything a run persists, applied as one unit of work.
///
/// The exclusion log is replaced wholesale (it reflects only the current
/// validation pass); canonical records and ledger marks append.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunBatch {
    pub exclusions: Vec<Exclusion>,
    pub records: Vec<PoiRecord>,
    /// Dataset names to mark processed; duplicates of existing marks are
    /// silently ignored
    pub processed: Vec<String>,
}

/// Outcome of spatial index maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    Created,
    AlreadyExists,
}

impl std::fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexStatus::Created => write!(f, "created"),
            IndexStatus::AlreadyExists => write!(f, "already existed"),
        }
    }
}

/// Capability contract the engine requires of a backing store.
pub trait PoiStore {
    /// Names of the source tables the store currently holds.
    fn source_tables(&self) -> Result<Vec<String>>;

    /// Introspected schema metadata for one source table.
    fn table_schema(&self, table: &str) -> Result<TableSchema>;

    /// All rows of one source table.
    fn fetch_rows(&self, table: &str) -> Result<Vec<SourceRow>>;

    /// The processed-set ledger.
    fn processed_tables(&self) -> Result<Vec<LedgerEntry>>;

    /// Whether `table` has already been merged in an earlier run.
    fn is_processed(&self, table: &str) -> Result<bool> {
        Ok(self
            .processed_tables()?
            .iter()
            .any(|entry| entry.table == table))
    }

    /// Idempotently record `table` as merged, outside a batch. Duplicate
    /// marks are silently ignored.
    fn mark_processed(&self, table: &str) -> Result<()>;

    /// Rows currently in the canonical dataset.
    fn canonical_count(&self) -> Result<usize>;

    /// Apply a finished run atomically: replace the exclusion log, append
    /// the canonical records, add the ledger marks. On any failure - a
    /// duplicate poi_id above all - nothing is applied.
    fn apply_run(&self, batch: RunBatch) -> Result<()>;

    /// Make sure a spatial index exists over the canonical geometry.
    /// Re-invokable after every run; refreshing content over newly appended
    /// rows is maintenance, not a structural change.
    fn ensure_spatial_index(&self) -> Result<IndexStatus>;
}
