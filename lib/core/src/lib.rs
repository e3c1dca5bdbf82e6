//! # unipoi Core
//!
//! Core library for the unipoi canonical POI dataset engine.
//!
//! This crate provides the run-independent building blocks:
//!
//! - [`PoiRecord`] - the canonical record shape, with attribute bag and
//!   per-category nearest-neighbor summaries
//! - [`unify::unify_table`] - projection of validated source rows into
//!   canonical records with deterministic identifiers
//! - [`nearest::enrich_nearest`] - spatial nearest-neighbor enrichment over
//!   a run's in-flight record set
//! - [`SpatialIndex`] - bulk-loaded kd-tree used for the per-layer lookups
//! - [`RunConfig`] - the explicit per-run configuration with fail-fast
//!   validation
//!
//! ## Example
//!
//! ```rust
//! use unipoi_core::{nearest::enrich_nearest, unify::unify_table};
//! use serde_json::json;
//!
//! let galleries = vec![
//!     json!({"id": "1", "geometry": "POINT(13.40 52.52)"}),
//!     json!({"id": "2", "geometry": "POINT(13.47 52.51)"}),
//! ];
//! let listings = vec![json!({"id": "9", "geometry": "POINT(13.41 52.52)"})];
//!
//! let mut records = Vec::new();
//! for (dataset, rows) in [("galleries", galleries), ("long_term_listings", listings)] {
//!     let rows: Vec<_> = rows
//!         .into_iter()
//!         .map(|v| v.as_object().unwrap().clone())
//!         .collect();
//!     records.extend(unify_table(dataset, &rows).unwrap());
//! }
//!
//! enrich_nearest(&mut records, "long_term_listings");
//! let listing = records.iter().find(|r| r.layer == "long_term_listings").unwrap();
//! assert!(listing.nearest_pois.as_ref().unwrap().contains_key("galleries"));
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod index;
pub mod nearest;
pub mod record;
pub mod unify;

pub use config::RunConfig;
pub use error::{Error, Result};
pub use geometry::{parse_point, GeoPoint, SRID};
pub use index::SpatialIndex;
pub use record::{Address, NearestPoi, PoiId, PoiRecord, SourceRow};
pub use unify::{layer_prefix, unify_table, PREFIX_LEN};
