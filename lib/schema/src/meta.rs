//! Introspection metadata for source tables.
//!
//! These types mirror what a relational store's catalog exposes per table:
//! column names, declared types with numeric precision, nullability, and key
//! constraints. The store capability produces them; the validator consumes
//! them. Column lookups are case-insensitive because providers are not
//! consistent about casing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared column type, as reported by the store's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// `character varying`
    Varchar,
    /// `numeric`, with optional declared precision/scale on the column
    Numeric,
    /// Spatial geometry column
    Geometry,
    /// Any type this system has no expectation about
    Other(String),
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Varchar => write!(f, "character varying"),
            ColumnType::Numeric => write!(f, "numeric"),
            ColumnType::Geometry => write!(f, "geometry"),
            ColumnType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A declared type together with its numeric precision, used in findings
/// so "expected vs actual" reads the way the catalog declares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub data_type: ColumnType,
    pub precision: Option<(u16, u16)>,
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            Some((p, s)) => write!(f, "{}({},{})", self.data_type, p, s),
            None => write!(f, "{}", self.data_type),
        }
    }
}

/// One column as reported by table introspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub data_type: ColumnType,
    /// Declared `(precision, scale)` for numeric columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_precision: Option<(u16, u16)>,
    pub nullable: bool,
}

impl ColumnMeta {
    /// A nullable `character varying` column
    pub fn varchar(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: ColumnType::Varchar,
            numeric_precision: None,
            nullable: true,
        }
    }

    /// A nullable `numeric(precision, scale)` column
    pub fn numeric(name: &str, precision: u16, scale: u16) -> Self {
        Self {
            name: name.to_string(),
            data_type: ColumnType::Numeric,
            numeric_precision: Some((precision, scale)),
            nullable: true,
        }
    }

    /// A nullable geometry column
    pub fn geometry(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: ColumnType::Geometry,
            numeric_precision: None,
            nullable: true,
        }
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Declared type of this column as a displayable declaration
    pub fn type_decl(&self) -> TypeDecl {
        TypeDecl {
            data_type: self.data_type.clone(),
            precision: self.numeric_precision,
        }
    }
}

/// A foreign-key constraint on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyMeta {
    pub column: String,
    /// Referenced table
    pub references: String,
}

/// Introspected schema of one source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnMeta>,
    /// Columns covered by a uniquely-identifying constraint
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyMeta>,
}

impl TableSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn column_def(mut self, column: ColumnMeta) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn with_primary_key(mut self, column: &str) -> Self {
        self.primary_key.push(column.to_string());
        self
    }

    #[must_use]
    pub fn with_foreign_key(mut self, column: &str, references: &str) -> Self {
        self.foreign_keys.push(ForeignKeyMeta {
            column: column.to_string(),
            references: references.to_string(),
        });
        self
    }

    /// Look up a column by name, case-insensitively
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Whether the primary key covers `column` (case-insensitive)
    pub fn primary_key_on(&self, column: &str) -> bool {
        self.primary_key.iter().any(|c| c.eq_ignore_ascii_case(column))
    }

    /// Whether a foreign-key constraint exists on `column` (case-insensitive)
    pub fn foreign_key_on(&self, column: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.column.eq_ignore_ascii_case(column))
    }
}
