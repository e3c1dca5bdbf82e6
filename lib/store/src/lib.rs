//! Store capability layer for unipoi.
//!
//! The engine treats its backing store as a capability: introspectable
//! schema metadata, row access, a processed-set ledger, atomic application
//! of a run's writes, and spatial index maintenance. [`PoiStore`] is that
//! contract; [`MemoryStore`] is the in-memory reference implementation used
//! by tests and the demo binary.

pub mod memory;
pub mod store;

pub use memory::{MemoryStore, SourceTable};
pub use store::{IndexStatus, LedgerEntry, PoiStore, RunBatch};
