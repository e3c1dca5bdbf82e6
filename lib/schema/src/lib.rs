//! Schema conformance gate for unipoi.
//!
//! Source datasets arrive from independently-maintained providers and are
//! only merged into the canonical dataset when their declared schema matches
//! the expected one. This crate holds:
//!
//! - [`TableSchema`] / [`ColumnMeta`] - the introspection metadata a backing
//!   store exposes per table
//! - [`ExpectedSchema`] - the declarative expectation a dataset is checked
//!   against, including key roles and numeric precision
//! - [`validate_table`] - the conformance checks, producing one
//!   [`ExclusionReason`] per violation
//!
//! Validation is re-evaluated every run: a dataset excluded today is checked
//! again tomorrow, so fixing the source is enough to get it merged.

pub mod expected;
pub mod meta;
pub mod validate;

pub use expected::{ExpectedColumn, ExpectedSchema, ExpectedSchemaError, KeyRole};
pub use meta::{ColumnMeta, ColumnType, ForeignKeyMeta, TableSchema, TypeDecl};
pub use validate::{validate_table, Exclusion, ExclusionReason};
