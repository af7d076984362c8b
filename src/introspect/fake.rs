//! In-memory catalog used by unit tests.

use crate::database::catalog::{
    ColumnRow, ForeignKeyRow, IndexRow, ObjectCountRow, SchemaRow, TableRow, ViewRow,
};
use crate::database::model::TableType;
use crate::database::traits::{CatalogConnector, CatalogSession};
use crate::error::{DatabaseError, DbResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Catalog contents, stored in the order the real catalog would return them.
#[derive(Default)]
pub struct FakeCatalog {
    pub current_schema: Option<String>,
    pub schemas: Vec<String>,
    pub tables: Vec<TableRow>,
    pub columns: HashMap<(String, String), Vec<ColumnRow>>,
    pub indexes: HashMap<(String, String), Vec<IndexRow>>,
    pub foreign_keys: HashMap<String, Vec<ForeignKeyRow>>,
    pub views: Vec<ViewRow>,
    /// Session method that fails with a query error.
    pub fail_on: Option<&'static str>,
    pub refuse_connections: bool,
}

impl FakeCatalog {
    /// `shop.users`, `shop.orders` (FK to users), view `shop.active_users`,
    /// plus the `mysql` system schema. Default schema is `shop`.
    pub fn shop() -> Self {
        let mut catalog = Self {
            current_schema: Some("shop".into()),
            schemas: vec!["mysql".into(), "shop".into(), "analytics".into()],
            ..Self::default()
        };

        catalog.tables = vec![
            table_row("shop", "users", "BASE TABLE"),
            table_row("shop", "orders", "BASE TABLE"),
            table_row("shop", "active_users", "VIEW"),
            table_row("mysql", "user", "BASE TABLE"),
        ];

        catalog.columns.insert(
            key("shop", "users"),
            vec![
                column_row("id", "int", "NO", "PRI", None, "auto_increment"),
                column_row("email", "varchar(255)", "NO", "UNI", None, ""),
                column_row("last_name", "varchar(64)", "YES", "MUL", None, ""),
                column_row("first_name", "varchar(64)", "YES", "", None, ""),
            ],
        );
        catalog.columns.insert(
            key("shop", "orders"),
            vec![
                column_row("id", "bigint", "NO", "PRI", None, "auto_increment"),
                column_row("user_id", "int", "NO", "MUL", None, ""),
                column_row("status", "varchar(16)", "NO", "", Some("pending"), ""),
            ],
        );

        catalog.indexes.insert(
            key("shop", "users"),
            vec![
                index_row("PRIMARY", "BTREE", 0, "id", 1),
                index_row("email", "BTREE", 0, "email", 1),
                index_row("uq_full_name", "BTREE", 0, "last_name", 1),
                index_row("uq_full_name", "BTREE", 0, "first_name", 2),
            ],
        );
        catalog.indexes.insert(
            key("shop", "orders"),
            vec![
                index_row("PRIMARY", "BTREE", 0, "id", 1),
                index_row("fk_orders_user", "BTREE", 1, "user_id", 1),
            ],
        );

        catalog.foreign_keys.insert(
            "shop".into(),
            vec![fk_row("fk_orders_user", "orders", "user_id", "shop", "users", "id")],
        );

        catalog.views = vec![ViewRow {
            table_schema: "shop".into(),
            table_name: "active_users".into(),
            is_updatable: "NO".into(),
        }];

        catalog
    }

    fn check(&self, method: &'static str) -> sqlx::Result<()> {
        match self.fail_on {
            Some(failing) if failing == method => Err(sqlx::Error::Protocol(format!(
                "SELECT command denied for {method}"
            ))),
            _ => Ok(()),
        }
    }
}

pub fn key(schema: &str, table: &str) -> (String, String) {
    (schema.to_string(), table.to_string())
}

pub fn table_row(schema: &str, name: &str, table_type: &str) -> TableRow {
    TableRow {
        table_schema: schema.into(),
        table_name: name.into(),
        table_type: table_type.into(),
    }
}

pub fn column_row(
    name: &str,
    column_type: &str,
    nullable: &str,
    column_key: &str,
    default: Option<&str>,
    extra: &str,
) -> ColumnRow {
    ColumnRow {
        column_name: name.into(),
        column_type: column_type.into(),
        is_nullable: nullable.into(),
        column_key: column_key.into(),
        column_default: default.map(String::from),
        extra: extra.into(),
    }
}

pub fn index_row(name: &str, index_type: &str, non_unique: i64, column: &str, seq: i64) -> IndexRow {
    IndexRow {
        index_name: name.into(),
        index_type: index_type.into(),
        non_unique,
        column_name: Some(column.into()),
        seq_in_index: seq,
    }
}

pub fn fk_row(
    constraint: &str,
    table: &str,
    column: &str,
    referenced_schema: &str,
    referenced_table: &str,
    referenced_column: &str,
) -> ForeignKeyRow {
    ForeignKeyRow {
        constraint_name: constraint.into(),
        table_name: table.into(),
        column_name: column.into(),
        referenced_table_schema: referenced_schema.into(),
        referenced_table_name: referenced_table.into(),
        referenced_column_name: referenced_column.into(),
        update_rule: Some("RESTRICT".into()),
        delete_rule: Some("CASCADE".into()),
    }
}

/// Session bookkeeping shared between the connector and its sessions.
#[derive(Default)]
pub struct SessionStats {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub queries: Mutex<Vec<&'static str>>,
}

impl SessionStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn count(&self, method: &str) -> usize {
        self.queries.lock().iter().filter(|q| **q == method).count()
    }
}

pub struct FakeConnector {
    catalog: Arc<FakeCatalog>,
    pub stats: Arc<SessionStats>,
}

impl FakeConnector {
    pub fn new(catalog: FakeCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            stats: Arc::new(SessionStats::default()),
        }
    }
}

#[async_trait]
impl CatalogConnector for FakeConnector {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn open(&self) -> DbResult<Box<dyn CatalogSession>> {
        if self.catalog.refuse_connections {
            return Err(DatabaseError::connection(
                "localhost:3306/shop",
                sqlx::Error::Protocol("Access denied for user 'app'@'localhost'".into()),
            ));
        }
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            catalog: Arc::clone(&self.catalog),
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct FakeSession {
    catalog: Arc<FakeCatalog>,
    stats: Arc<SessionStats>,
}

impl FakeSession {
    fn record(&self, method: &'static str) -> sqlx::Result<()> {
        self.stats.queries.lock().push(method);
        self.catalog.check(method)
    }
}

#[async_trait]
impl CatalogSession for FakeSession {
    async fn current_schema(&mut self) -> sqlx::Result<Option<String>> {
        self.record("current_schema")?;
        Ok(self.catalog.current_schema.clone())
    }

    async fn schemas(&mut self) -> sqlx::Result<Vec<SchemaRow>> {
        self.record("schemas")?;
        let mut names = self.catalog.schemas.clone();
        names.sort();
        Ok(names
            .into_iter()
            .map(|schema_name| SchemaRow { schema_name })
            .collect())
    }

    async fn schema(&mut self, schema: &str) -> sqlx::Result<Option<SchemaRow>> {
        self.record("schema")?;
        Ok(self
            .catalog
            .schemas
            .iter()
            .find(|s| s.as_str() == schema)
            .map(|s| SchemaRow {
                schema_name: s.clone(),
            }))
    }

    async fn object_counts(&mut self, schema: &str) -> sqlx::Result<ObjectCountRow> {
        self.record("object_counts")?;
        let mut counts = ObjectCountRow::default();
        for table in self.catalog.tables.iter().filter(|t| t.table_schema == schema) {
            match TableType::parse(&table.table_type) {
                TableType::BaseTable => counts.table_count += 1,
                TableType::View => counts.view_count += 1,
            }
        }
        Ok(counts)
    }

    async fn tables(&mut self, schema: &str) -> sqlx::Result<Vec<TableRow>> {
        self.record("tables")?;
        let mut rows: Vec<TableRow> = self
            .catalog
            .tables
            .iter()
            .filter(|t| t.table_schema == schema)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.table_name.cmp(&b.table_name));
        Ok(rows)
    }

    async fn table(&mut self, schema: &str, table: &str) -> sqlx::Result<Option<TableRow>> {
        self.record("table")?;
        Ok(self
            .catalog
            .tables
            .iter()
            .find(|t| t.table_schema == schema && t.table_name == table)
            .cloned())
    }

    async fn columns(&mut self, schema: &str, table: &str) -> sqlx::Result<Vec<ColumnRow>> {
        self.record("columns")?;
        Ok(self
            .catalog
            .columns
            .get(&key(schema, table))
            .cloned()
            .unwrap_or_default())
    }

    async fn index_columns(&mut self, schema: &str, table: &str) -> sqlx::Result<Vec<IndexRow>> {
        self.record("index_columns")?;
        Ok(self
            .catalog
            .indexes
            .get(&key(schema, table))
            .cloned()
            .unwrap_or_default())
    }

    async fn foreign_key_columns(
        &mut self,
        schema: &str,
        table: Option<&str>,
    ) -> sqlx::Result<Vec<ForeignKeyRow>> {
        self.record("foreign_key_columns")?;
        Ok(self
            .catalog
            .foreign_keys
            .get(schema)
            .map(|rows| {
                rows.iter()
                    .filter(|r| table.is_none_or(|t| r.table_name == t))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn views(&mut self, schema: &str) -> sqlx::Result<Vec<ViewRow>> {
        self.record("views")?;
        Ok(self
            .catalog
            .views
            .iter()
            .filter(|v| v.table_schema == schema)
            .cloned()
            .collect())
    }

    async fn close(self: Box<Self>) {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
    }
}
