//! The batch run: schema gate, ledger filter, unification, enrichment,
//! atomic persistence, index maintenance.
//!
//! A run is sequential and re-runnable: validation is re-evaluated every
//! time, already-merged datasets are skipped via the ledger, and all writes
//! land in one store batch, so a failed run can simply be retried.

use crate::report::RunReport;
use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use unipoi_core::{nearest::enrich_nearest, unify::unify_table, Result, RunConfig};
use unipoi_schema::{validate_table, Exclusion};
use unipoi_store::{PoiStore, RunBatch};

/// One configured merge run against a backing store.
pub struct Pipeline<'a, S: PoiStore> {
    store: &'a S,
    config: RunConfig,
}

impl<'a, S: PoiStore> Pipeline<'a, S> {
    pub fn new(store: &'a S, config: RunConfig) -> Self {
        Self { store, config }
    }

    /// Execute the run and report what happened per dataset.
    pub fn run(&self) -> Result<RunReport> {
        // Configuration errors abort before the store is touched.
        self.config.validate()?;

        let available: HashSet<String> = self.store.source_tables()?.into_iter().collect();
        let mut candidates = Vec::new();
        for dataset in &self.config.datasets {
            if self.config.is_excluded_name(dataset) {
                debug!(%dataset, "matches an excluded-name pattern, never checked");
                continue;
            }
            if !available.contains(dataset) {
                debug!(%dataset, "not present at the source");
                continue;
            }
            candidates.push(dataset.clone());
        }

        // Schema gate. Every candidate is checked in full; findings become
        // this run's exclusion log.
        let gate_time = Utc::now();
        let mut exclusions: Vec<Exclusion> = Vec::new();
        let mut eligible = Vec::new();
        for table in &candidates {
            let schema = self.store.table_schema(table)?;
            let findings = validate_table(&schema, &self.config.expected);
            if findings.is_empty() {
                eligible.push(table.clone());
            } else {
                warn!(%table, findings = findings.len(), "dataset excluded");
                exclusions.extend(
                    findings
                        .into_iter()
                        .map(|reason| Exclusion::new(table, reason, gate_time)),
                );
            }
        }
        info!(
            candidates = candidates.len(),
            eligible = eligible.len(),
            "schema gate complete"
        );

        // Ledger filter: merging the same dataset twice is a no-op.
        let processed: HashSet<String> = self
            .store
            .processed_tables()?
            .into_iter()
            .map(|entry| entry.table)
            .collect();
        let (merged, skipped): (Vec<String>, Vec<String>) = eligible
            .into_iter()
            .partition(|table| !processed.contains(table));
        for table in &skipped {
            info!(%table, "already processed, skipped");
        }

        // Unify, then enrich over the combined in-flight set - candidates
        // for a query record come from every dataset merged this run.
        let mut records = Vec::new();
        for table in &merged {
            let rows = self.store.fetch_rows(table)?;
            let unified = unify_table(table, &rows)?;
            info!(%table, records = unified.len(), "dataset unified");
            records.extend(unified);
        }
        enrich_nearest(&mut records, &self.config.query_layer);

        let records_added = records.len();
        self.store.apply_run(RunBatch {
            exclusions: exclusions.clone(),
            records,
            processed: merged.clone(),
        })?;
        let index = self.store.ensure_spatial_index()?;
        info!(records_added, index = %index, "run complete");

        Ok(RunReport {
            merged,
            skipped,
            excluded: exclusions,
            records_added,
            index,
        })
    }
}
