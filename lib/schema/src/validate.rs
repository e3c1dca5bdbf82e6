//! Source dataset conformance checks.
//!
//! All checks run independently and every violation is reported - a dataset
//! missing three columns with a wrong type on a fourth produces two findings,
//! not one. The findings are what the run persists as its exclusion log.

use crate::expected::ExpectedSchema;
use crate::meta::{TableSchema, TypeDecl};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One reason a source dataset was excluded from the merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// All required columns absent from the table, aggregated and sorted
    MissingColumns { columns: Vec<String> },
    /// Declared type or numeric precision differs from the expectation
    TypeMismatch {
        column: String,
        expected: TypeDecl,
        actual: TypeDecl,
    },
    /// Column declared nullable where NOT NULL is required
    NullableColumn { column: String },
    /// No uniquely-identifying constraint on the identifier column
    MissingPrimaryKey { column: String },
    /// No referential constraint on the district-linkage column
    MissingForeignKey { column: String },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::MissingColumns { columns } => {
                write!(f, "Missing columns: {}", columns.join(", "))
            }
            ExclusionReason::TypeMismatch {
                column,
                expected,
                actual,
            } => write!(
                f,
                "Column {}: expected data type {}, got {}",
                column, expected, actual
            ),
            ExclusionReason::NullableColumn { column } => {
                write!(f, "Column {} allows NULL, expected NOT NULL", column)
            }
            ExclusionReason::MissingPrimaryKey { column } => {
                write!(f, "Missing PRIMARY KEY on {} column", column)
            }
            ExclusionReason::MissingForeignKey { column } => {
                write!(f, "Missing or incorrect foreign key on {}", column)
            }
        }
    }
}

/// A persisted exclusion record: which dataset, why, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub table: String,
    pub reason: ExclusionReason,
    pub excluded_at: DateTime<Utc>,
}

impl Exclusion {
    pub fn new(table: &str, reason: ExclusionReason, excluded_at: DateTime<Utc>) -> Self {
        Self {
            table: table.to_string(),
            reason,
            excluded_at,
        }
    }
}

/// Check one introspected table against the expectation.
///
/// Returns every violation found; an empty result means the dataset is
/// eligible for the merge. Checks are never short-circuited.
pub fn validate_table(table: &TableSchema, expected: &ExpectedSchema) -> Vec<ExclusionReason> {
    let mut findings = Vec::new();

    // Completeness: one aggregated finding listing all missing names, sorted.
    let mut missing: Vec<String> = expected
        .columns
        .iter()
        .filter(|col| table.column(&col.name).is_none())
        .map(|col| col.name.clone())
        .collect();
    missing.sort();
    if !missing.is_empty() {
        findings.push(ExclusionReason::MissingColumns { columns: missing });
    }

    // Type and nullability, per column actually present.
    for exp in &expected.columns {
        let Some(col) = table.column(&exp.name) else {
            continue;
        };
        if let Some(expected_decl) = exp.type_decl() {
            let type_ok = Some(&col.data_type) == exp.data_type.as_ref();
            let precision_ok = exp.precision.is_none() || col.numeric_precision == exp.precision;
            if !type_ok || !precision_ok {
                findings.push(ExclusionReason::TypeMismatch {
                    column: exp.name.clone(),
                    expected: expected_decl,
                    actual: col.type_decl(),
                });
            }
        }
        if exp.not_null && col.nullable {
            findings.push(ExclusionReason::NullableColumn {
                column: exp.name.clone(),
            });
        }
    }

    // Key constraints.
    if let Some(pk) = expected.primary_key_column() {
        if !table.primary_key_on(pk) {
            findings.push(ExclusionReason::MissingPrimaryKey {
                column: pk.to_string(),
            });
        }
    }
    if let Some(fk) = expected.foreign_key_column() {
        if !table.foreign_key_on(fk) {
            findings.push(ExclusionReason::MissingForeignKey {
                column: fk.to_string(),
            });
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::ColumnMeta;

    /// A table that satisfies every check of the POI expectation.
    fn conforming_table(name: &str) -> TableSchema {
        TableSchema::new(name)
            .column_def(ColumnMeta::varchar("id").not_null())
            .column_def(ColumnMeta::varchar("district_id").not_null())
            .column_def(ColumnMeta::varchar("name"))
            .column_def(ColumnMeta::numeric("latitude", 9, 6))
            .column_def(ColumnMeta::numeric("longitude", 9, 6))
            .column_def(ColumnMeta::varchar("neighborhood"))
            .column_def(ColumnMeta::varchar("district"))
            .column_def(ColumnMeta::varchar("neighborhood_id"))
            .column_def(ColumnMeta::geometry("geometry"))
            .with_primary_key("id")
            .with_foreign_key("district_id", "districts")
    }

    #[test]
    fn test_conforming_table_has_no_findings() {
        let findings = validate_table(&conforming_table("galleries"), &ExpectedSchema::poi());
        assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
    }

    #[test]
    fn test_missing_columns_aggregated_and_sorted() {
        let table = TableSchema::new("bad")
            .column_def(ColumnMeta::varchar("id").not_null())
            .column_def(ColumnMeta::varchar("district_id").not_null())
            .column_def(ColumnMeta::varchar("name"))
            .with_primary_key("id")
            .with_foreign_key("district_id", "districts");

        let findings = validate_table(&table, &ExpectedSchema::poi());
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].to_string(),
            "Missing columns: district, geometry, latitude, longitude, neighborhood, neighborhood_id"
        );
    }

    #[test]
    fn test_precision_mismatch_is_single_finding() {
        let mut table = conforming_table("markets");
        let lat = table
            .columns
            .iter_mut()
            .find(|c| c.name == "latitude")
            .unwrap();
        lat.numeric_precision = Some((10, 2));

        let findings = validate_table(&table, &ExpectedSchema::poi());
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].to_string(),
            "Column latitude: expected data type numeric(9,6), got numeric(10,2)"
        );
    }

    #[test]
    fn test_wrong_type_reported_with_expected_vs_actual() {
        let mut table = conforming_table("markets");
        let lat = table
            .columns
            .iter_mut()
            .find(|c| c.name == "latitude")
            .unwrap();
        *lat = ColumnMeta::varchar("latitude");

        let findings = validate_table(&table, &ExpectedSchema::poi());
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].to_string(),
            "Column latitude: expected data type numeric(9,6), got character varying"
        );
    }

    #[test]
    fn test_nullability_reported_per_column() {
        let mut table = conforming_table("banks");
        for col in table.columns.iter_mut() {
            if col.name == "id" || col.name == "district_id" {
                col.nullable = true;
            }
        }

        let findings = validate_table(&table, &ExpectedSchema::poi());
        let rendered: Vec<String> = findings.iter().map(|r| r.to_string()).collect();
        assert!(rendered.contains(&"Column id allows NULL, expected NOT NULL".to_string()));
        assert!(
            rendered.contains(&"Column district_id allows NULL, expected NOT NULL".to_string())
        );
    }

    #[test]
    fn test_missing_keys_reported() {
        let mut table = conforming_table("malls");
        table.primary_key.clear();
        table.foreign_keys.clear();

        let findings = validate_table(&table, &ExpectedSchema::poi());
        let rendered: Vec<String> = findings.iter().map(|r| r.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "Missing PRIMARY KEY on id column",
                "Missing or incorrect foreign key on district_id",
            ]
        );
    }

    #[test]
    fn test_all_checks_evaluated_not_short_circuited() {
        // Missing columns, wrong precision, nullable id and no keys at once.
        let table = TableSchema::new("broken")
            .column_def(ColumnMeta::varchar("id"))
            .column_def(ColumnMeta::varchar("district_id").not_null())
            .column_def(ColumnMeta::numeric("latitude", 10, 2));

        let findings = validate_table(&table, &ExpectedSchema::poi());
        assert_eq!(findings.len(), 5);
        assert!(matches!(
            findings[0],
            ExclusionReason::MissingColumns { .. }
        ));
    }

    #[test]
    fn test_column_match_is_case_insensitive() {
        let mut table = conforming_table("upper");
        for col in table.columns.iter_mut() {
            col.name = col.name.to_ascii_uppercase();
        }
        table.primary_key = vec!["ID".to_string()];
        table.foreign_keys[0].column = "DISTRICT_ID".to_string();

        let findings = validate_table(&table, &ExpectedSchema::poi());
        assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
    }
}
