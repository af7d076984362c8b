//! Typed row projections for `information_schema` queries.
//!
//! Each catalog query decodes into exactly one of these structs; column aliases
//! in the SQL match the field names.

use crate::database::model::{Column, KeyClassification, Table, TableType, View, is_auto_increment};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SchemaRow {
    pub schema_name: String,
}

/// Per-schema object counts, split by table type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromRow)]
pub struct ObjectCountRow {
    pub table_count: i64,
    pub view_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TableRow {
    pub table_schema: String,
    pub table_name: String,
    pub table_type: String,
}

impl From<TableRow> for Table {
    fn from(row: TableRow) -> Self {
        Table {
            table_type: TableType::parse(&row.table_type),
            schema: row.table_schema,
            name: row.table_name,
            columns: None,
            indexes: None,
            foreign_keys: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ColumnRow {
    pub column_name: String,
    pub column_type: String,
    pub is_nullable: String,
    pub column_key: String,
    pub column_default: Option<String>,
    pub extra: String,
}

impl From<ColumnRow> for Column {
    fn from(row: ColumnRow) -> Self {
        let key = KeyClassification::parse(&row.column_key);
        Column {
            is_nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
            is_primary_key: key.is_primary_key(),
            is_auto_increment: is_auto_increment(&row.extra),
            has_index: key.has_index(),
            is_unique: key.is_unique(),
            default_value: row.column_default,
            name: row.column_name,
            data_type: row.column_type,
        }
    }
}

/// One key part of an index (`information_schema.STATISTICS`).
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct IndexRow {
    pub index_name: String,
    pub index_type: String,
    pub non_unique: i64,
    /// `NULL` for functional key parts.
    pub column_name: Option<String>,
    pub seq_in_index: i64,
}

/// One column pair of a foreign key (`KEY_COLUMN_USAGE` joined with
/// `REFERENTIAL_CONSTRAINTS`).
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ForeignKeyRow {
    pub constraint_name: String,
    pub table_name: String,
    pub column_name: String,
    pub referenced_table_schema: String,
    pub referenced_table_name: String,
    pub referenced_column_name: String,
    pub update_rule: Option<String>,
    pub delete_rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ViewRow {
    pub table_schema: String,
    pub table_name: String,
    pub is_updatable: String,
}

impl From<ViewRow> for View {
    fn from(row: ViewRow) -> Self {
        View {
            is_updatable: row.is_updatable.eq_ignore_ascii_case("YES"),
            schema: row.table_schema,
            name: row.table_name,
            definition: None,
        }
    }
}
