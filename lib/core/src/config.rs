//! Run configuration.
//!
//! Everything a run needs arrives in one explicitly-passed value: the
//! datasets to consider, the query layer, the name patterns that keep
//! structurally-different tables out of the gate, and the expected schema.
//! There is no process-wide state.

use crate::error::{Error, Result};
use crate::unify::layer_prefix;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use unipoi_schema::ExpectedSchema;

/// Configuration for one merge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Explicit inclusion list: the source datasets this run considers.
    pub datasets: Vec<String>,
    /// Layer whose records receive nearest-neighbor enrichment.
    pub query_layer: String,
    /// Case-insensitive substring patterns naming table families that are
    /// never schema-checked or merged (administrative boundaries and the
    /// like).
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub expected: ExpectedSchema,
}

fn default_exclude_patterns() -> Vec<String> {
    vec!["districts".to_string(), "neighborhoods".to_string()]
}

impl RunConfig {
    /// A config with the standard POI expectation and exclusion patterns.
    pub fn new(datasets: Vec<String>, query_layer: &str) -> Self {
        Self {
            datasets,
            query_layer: query_layer.to_string(),
            exclude_patterns: default_exclude_patterns(),
            expected: ExpectedSchema::poi(),
        }
    }

    /// Fail-fast configuration checks, run before any merge work.
    ///
    /// Catches identifier-prefix collisions between configured dataset
    /// names (a correctness precondition of poi_id uniqueness), an unknown
    /// query layer, and an inconsistent expected schema.
    pub fn validate(&self) -> Result<()> {
        let mut prefixes: AHashMap<String, &str> = AHashMap::new();
        for dataset in &self.datasets {
            let prefix = layer_prefix(dataset);
            if let Some(first) = prefixes.insert(prefix.clone(), dataset) {
                if first == dataset.as_str() {
                    return Err(Error::DuplicateDataset(dataset.clone()));
                }
                return Err(Error::PrefixCollision {
                    prefix,
                    first: first.to_string(),
                    second: dataset.clone(),
                });
            }
        }

        if !self.datasets.iter().any(|d| d == &self.query_layer) {
            return Err(Error::UnknownQueryLayer(self.query_layer.clone()));
        }

        self.expected.validate()?;
        Ok(())
    }

    /// Whether `table` matches one of the excluded-name patterns.
    pub fn is_excluded_name(&self, table: &str) -> bool {
        let lowered = table.to_ascii_lowercase();
        self.exclude_patterns
            .iter()
            .any(|p| lowered.contains(&p.to_ascii_lowercase()))
    }
}
