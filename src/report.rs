//! Per-run outcome report.

use serde::{Deserialize, Serialize};
use std::fmt;
use unipoi_schema::Exclusion;
use unipoi_store::IndexStatus;

/// What one run did, per dataset, plus the final counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Datasets merged this run
    pub merged: Vec<String>,
    /// Datasets that passed validation but were already in the ledger
    pub skipped: Vec<String>,
    /// This run's exclusion log (one entry per finding)
    pub excluded: Vec<Exclusion>,
    pub records_added: usize,
    pub index: IndexStatus,
}

impl RunReport {
    /// Excluded dataset names with their reasons, grouped in log order.
    pub fn excluded_datasets(&self) -> Vec<(String, Vec<String>)> {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for exclusion in &self.excluded {
            match grouped.iter_mut().find(|(name, _)| name == &exclusion.table) {
                Some((_, reasons)) => reasons.push(exclusion.reason.to_string()),
                None => grouped.push((
                    exclusion.table.clone(),
                    vec![exclusion.reason.to_string()],
                )),
            }
        }
        grouped
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in &self.merged {
            writeln!(f, "merged: {}", table)?;
        }
        for table in &self.skipped {
            writeln!(f, "skipped (already processed): {}", table)?;
        }
        for (table, reasons) in self.excluded_datasets() {
            writeln!(f, "excluded: {} - {}", table, reasons.join("; "))?;
        }
        writeln!(f, "canonical records added: {}", self.records_added)?;
        write!(f, "spatial index: {}", self.index)
    }
}
