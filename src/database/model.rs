//! Introspection records returned by the engine.
//!
//! Every value is built fresh per call; nothing here is cached.

use serde::{Deserialize, Serialize};

/// Schemas reserved by the MySQL server itself.
pub const SYSTEM_SCHEMAS: [&str; 4] = ["information_schema", "mysql", "performance_schema", "sys"];

/// Whether `name` is one of the reserved schemas. Case-insensitive.
pub fn is_system_schema(name: &str) -> bool {
    SYSTEM_SCHEMAS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// A schema (database) in the catalog.
///
/// Exactly one of `is_system` and the counts is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub is_system: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
}

impl Schema {
    pub fn system(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_system: true,
            table_count: None,
            view_count: None,
        }
    }

    pub fn user(name: impl Into<String>, table_count: i64, view_count: i64) -> Self {
        Self {
            name: name.into(),
            is_system: false,
            table_count: Some(table_count),
            view_count: Some(view_count),
        }
    }
}

/// Table type as reported by `information_schema.TABLES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableType {
    #[serde(rename = "BASE TABLE")]
    BaseTable,
    #[serde(rename = "VIEW")]
    View,
}

impl TableType {
    /// `SYSTEM VIEW` (used inside `information_schema`) counts as a view.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "VIEW" | "SYSTEM VIEW" => Self::View,
            _ => Self::BaseTable,
        }
    }
}

/// A table or view. Nested collections are present only on a describe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub table_type: TableType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexes: Option<Vec<Index>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_keys: Option<Vec<ForeignKey>>,
}

/// Column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Raw declared type, e.g. `varchar(255)` or `int unsigned`.
    pub data_type: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub has_index: bool,
    pub is_unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Column key classification (`COLUMNS.COLUMN_KEY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClassification {
    None,
    Primary,
    Unique,
    Multiple,
}

impl KeyClassification {
    pub fn parse(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "PRI" => Self::Primary,
            "UNI" => Self::Unique,
            "MUL" => Self::Multiple,
            _ => Self::None,
        }
    }

    pub fn is_primary_key(self) -> bool {
        self == Self::Primary
    }

    pub fn has_index(self) -> bool {
        matches!(self, Self::Multiple | Self::Unique)
    }

    pub fn is_unique(self) -> bool {
        self == Self::Unique
    }
}

/// `COLUMNS.EXTRA` carries `auto_increment` among other free-text flags.
pub fn is_auto_increment(extra: &str) -> bool {
    extra.to_lowercase().contains("auto_increment")
}

/// An index with its columns in key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    /// Index method, e.g. `BTREE`, `FULLTEXT`, `HASH`, `SPATIAL`.
    pub index_type: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary: bool,
}

/// A foreign key constraint with local and referenced columns paired by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub table_name: String,
    pub columns: Vec<String>,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_rule: Option<String>,
}

/// A view. Definitions are not retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub schema: String,
    pub name: String,
    pub is_updatable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}
