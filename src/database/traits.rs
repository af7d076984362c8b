//! Catalog access traits.

use crate::database::catalog::{
    ColumnRow, ForeignKeyRow, IndexRow, ObjectCountRow, SchemaRow, TableRow, ViewRow,
};
use crate::error::DbResult;
use async_trait::async_trait;

/// Connection factory for catalog sessions.
///
/// Implementations: [`MySqlConnector`](crate::database::MySqlConnector).
#[async_trait]
pub trait CatalogConnector: Send + Sync {
    /// Returns the connector name (e.g., "mysql").
    fn name(&self) -> &'static str;

    /// Opens a new session on its own connection.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Config`](crate::error::DatabaseError::Config) when no
    /// usable connection string was resolved, and
    /// [`DatabaseError::ConnectionFailed`](crate::error::DatabaseError::ConnectionFailed)
    /// when the driver cannot open a connection.
    async fn open(&self) -> DbResult<Box<dyn CatalogSession>>;
}

/// One open connection to the catalog.
///
/// Every method runs a single read-only query. Errors are returned raw; the
/// engine adds the operation and target.
#[async_trait]
pub trait CatalogSession: Send {
    /// The connection's current default schema (`DATABASE()`), if any.
    async fn current_schema(&mut self) -> sqlx::Result<Option<String>>;

    /// All schemas, ordered by name.
    async fn schemas(&mut self) -> sqlx::Result<Vec<SchemaRow>>;

    /// A single schema by exact name.
    async fn schema(&mut self, schema: &str) -> sqlx::Result<Option<SchemaRow>>;

    /// Base table and view counts for a schema.
    async fn object_counts(&mut self, schema: &str) -> sqlx::Result<ObjectCountRow>;

    /// Tables and views in a schema, ordered by name.
    async fn tables(&mut self, schema: &str) -> sqlx::Result<Vec<TableRow>>;

    /// A single table or view.
    async fn table(&mut self, schema: &str, table: &str) -> sqlx::Result<Option<TableRow>>;

    /// Columns of a table in ordinal order.
    async fn columns(&mut self, schema: &str, table: &str) -> sqlx::Result<Vec<ColumnRow>>;

    /// Index key parts, ordered by index name then position in the index.
    async fn index_columns(&mut self, schema: &str, table: &str) -> sqlx::Result<Vec<IndexRow>>;

    /// Foreign key column pairs, ordered by table, constraint, then position.
    ///
    /// `table = None` covers every table in the schema.
    async fn foreign_key_columns(
        &mut self,
        schema: &str,
        table: Option<&str>,
    ) -> sqlx::Result<Vec<ForeignKeyRow>>;

    /// Views in a schema, ordered by name.
    async fn views(&mut self, schema: &str) -> sqlx::Result<Vec<ViewRow>>;

    /// Closes the underlying connection.
    async fn close(self: Box<Self>);
}
