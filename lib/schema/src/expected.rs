//! The declarative schema expectation source datasets are checked against.

use crate::meta::{ColumnType, TypeDecl};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Key role an expected column must carry at the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    /// A uniquely-identifying constraint must cover this column
    Primary,
    /// A referential constraint must exist on this column
    Foreign,
}

/// Expectation for a single column.
///
/// A column with no `data_type` is a presence-only expectation: it must
/// exist, but its declared type is not checked (the geometry column works
/// this way - providers declare it with store-specific types).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedColumn {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<ColumnType>,
    /// Required `(precision, scale)` for numeric columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<(u16, u16)>,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyRole>,
}

impl ExpectedColumn {
    pub fn varchar(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: Some(ColumnType::Varchar),
            precision: None,
            not_null: false,
            key: None,
        }
    }

    pub fn numeric(name: &str, precision: u16, scale: u16) -> Self {
        Self {
            name: name.to_string(),
            data_type: Some(ColumnType::Numeric),
            precision: Some((precision, scale)),
            not_null: false,
            key: None,
        }
    }

    /// Presence-only expectation: the column must exist, any type passes
    pub fn presence(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: None,
            precision: None,
            not_null: false,
            key: None,
        }
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    #[must_use]
    pub fn key(mut self, role: KeyRole) -> Self {
        self.key = Some(role);
        self
    }

    /// The expected declaration as it appears in findings
    pub fn type_decl(&self) -> Option<TypeDecl> {
        self.data_type.clone().map(|data_type| TypeDecl {
            data_type,
            precision: self.precision,
        })
    }
}

/// Errors in the expectation itself, caught at configuration time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpectedSchemaError {
    #[error("Expected schema lists column '{0}' more than once")]
    DuplicateColumn(String),

    #[error("Expected schema declares no primary-key column")]
    NoPrimaryKeyColumn,

    #[error("Column '{0}' declares a precision but is not numeric")]
    PrecisionOnNonNumeric(String),
}

/// The full expected schema: an ordered list of column expectations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedSchema {
    pub columns: Vec<ExpectedColumn>,
}

impl ExpectedSchema {
    pub fn new(columns: Vec<ExpectedColumn>) -> Self {
        Self { columns }
    }

    /// The standard POI dataset expectation.
    ///
    /// Identifier and district linkage are typed, keyed and NOT NULL;
    /// coordinates are `numeric(9,6)`; the geometry column is presence-only.
    pub fn poi() -> Self {
        Self::new(vec![
            ExpectedColumn::varchar("id").not_null().key(KeyRole::Primary),
            ExpectedColumn::varchar("district_id")
                .not_null()
                .key(KeyRole::Foreign),
            ExpectedColumn::varchar("name"),
            ExpectedColumn::numeric("latitude", 9, 6),
            ExpectedColumn::numeric("longitude", 9, 6),
            ExpectedColumn::varchar("neighborhood"),
            ExpectedColumn::varchar("district"),
            ExpectedColumn::varchar("neighborhood_id"),
            ExpectedColumn::presence("geometry"),
        ])
    }

    /// Check the expectation is internally consistent.
    ///
    /// Run once at configuration time; a malformed expectation would turn
    /// every dataset away for the wrong reason.
    pub fn validate(&self) -> Result<(), ExpectedSchemaError> {
        let mut seen = AHashSet::new();
        for col in &self.columns {
            if !seen.insert(col.name.to_ascii_lowercase()) {
                return Err(ExpectedSchemaError::DuplicateColumn(col.name.clone()));
            }
            if col.precision.is_some() && col.data_type != Some(ColumnType::Numeric) {
                return Err(ExpectedSchemaError::PrecisionOnNonNumeric(col.name.clone()));
            }
        }
        if self.primary_key_column().is_none() {
            return Err(ExpectedSchemaError::NoPrimaryKeyColumn);
        }
        Ok(())
    }

    /// The column carrying the `Primary` key role, if any
    pub fn primary_key_column(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.key == Some(KeyRole::Primary))
            .map(|c| c.name.as_str())
    }

    /// The column carrying the `Foreign` key role, if any
    pub fn foreign_key_column(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.key == Some(KeyRole::Foreign))
            .map(|c| c.name.as_str())
    }
}

impl Default for ExpectedSchema {
    fn default() -> Self {
        Self::poi()
    }
}
