use serde::{Deserialize, Serialize};

use crate::dialect::Source;

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// Descriptive fields printed in the SQL header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.project.is_none()
            && self.description.is_none()
            && self.version.is_none()
            && self.license.is_none()
            && self.authors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    pub source: Source,
    pub charset: String,
    pub collate: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// A column and its resolved SQL clause (type, attributes, trailing keywords).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub definition: String,
}

/// Indexes of one table. `primary` columns keep declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique: Vec<Vec<String>>,
}

impl IndexSet {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.unique.is_empty()
    }
}

/// `table`.`column` on the referenced side of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub references: Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub indexes: IndexSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<String>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

// ---------------------------------------------------------------------------
// Schema model
// ---------------------------------------------------------------------------

/// Parser output. Tables and columns keep the order of the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaModel {
    pub database: Database,
    pub tables: Vec<Table>,
}

impl SchemaModel {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

// ---------------------------------------------------------------------------
// Column scanning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    Null,
    NotNull,
}

impl Nullability {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Nullability::Null => "NULL",
            Nullability::NotNull => "NOT NULL",
        }
    }
}

/// A column specification split into its parts, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSpec {
    /// Type text, e.g. `varchar(255)` or `int`. May hold several words.
    pub data_type: String,
    pub numeric: bool,
    /// `+` marker was present (and removed) on a numeric type.
    pub signed: bool,
    pub zerofill: bool,
    pub nullability: Option<Nullability>,
    pub auto_increment: bool,
    pub primary: bool,
    pub unique: bool,
    /// Clause starting at DEFAULT, COMMENT, COLUMN_FORMAT, STORAGE or REFERENCES.
    pub trailing: Option<String>,
}
