//! MySQL catalog access using `sqlx`.
//!
//! Text columns go through `CAST(.. AS CHAR)` because MySQL 8 reports several
//! `information_schema` columns with a binary collation; integer columns go
//! through `CAST(.. AS SIGNED)` so they decode as `i64`.

use crate::config::{DatabaseConfig, ServerConfig};
use crate::database::catalog::{
    ColumnRow, ForeignKeyRow, IndexRow, ObjectCountRow, SchemaRow, TableRow, ViewRow,
};
use crate::database::traits::{CatalogConnector, CatalogSession};
use crate::error::{ConfigError, DatabaseError, DbResult};
use async_trait::async_trait;
use sqlx::{Connection, MySqlConnection};
use tracing::{debug, instrument, warn};

const CURRENT_SCHEMA_SQL: &str = "SELECT CAST(DATABASE() AS CHAR) AS current_schema";

const SCHEMAS_SQL: &str = r#"
    SELECT CAST(SCHEMA_NAME AS CHAR) AS schema_name
    FROM information_schema.SCHEMATA
    ORDER BY SCHEMA_NAME
"#;

const SCHEMA_SQL: &str = r#"
    SELECT CAST(SCHEMA_NAME AS CHAR) AS schema_name
    FROM information_schema.SCHEMATA
    WHERE SCHEMA_NAME = ?
"#;

const OBJECT_COUNTS_SQL: &str = r#"
    SELECT
        CAST(COALESCE(SUM(TABLE_TYPE NOT IN ('VIEW', 'SYSTEM VIEW')), 0) AS SIGNED) AS table_count,
        CAST(COALESCE(SUM(TABLE_TYPE IN ('VIEW', 'SYSTEM VIEW')), 0) AS SIGNED) AS view_count
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = ?
"#;

const TABLES_SQL: &str = r#"
    SELECT
        CAST(TABLE_SCHEMA AS CHAR) AS table_schema,
        CAST(TABLE_NAME AS CHAR) AS table_name,
        CAST(TABLE_TYPE AS CHAR) AS table_type
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = ?
    ORDER BY TABLE_NAME
"#;

const TABLE_SQL: &str = r#"
    SELECT
        CAST(TABLE_SCHEMA AS CHAR) AS table_schema,
        CAST(TABLE_NAME AS CHAR) AS table_name,
        CAST(TABLE_TYPE AS CHAR) AS table_type
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
"#;

const COLUMNS_SQL: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR) AS column_name,
        CAST(COLUMN_TYPE AS CHAR) AS column_type,
        CAST(IS_NULLABLE AS CHAR) AS is_nullable,
        CAST(COLUMN_KEY AS CHAR) AS column_key,
        CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
        CAST(EXTRA AS CHAR) AS extra
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

const INDEX_COLUMNS_SQL: &str = r#"
    SELECT
        CAST(INDEX_NAME AS CHAR) AS index_name,
        CAST(INDEX_TYPE AS CHAR) AS index_type,
        CAST(NON_UNIQUE AS SIGNED) AS non_unique,
        CAST(COLUMN_NAME AS CHAR) AS column_name,
        CAST(SEQ_IN_INDEX AS SIGNED) AS seq_in_index
    FROM information_schema.STATISTICS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY INDEX_NAME, SEQ_IN_INDEX
"#;

const FOREIGN_KEY_COLUMNS_SQL: &str = r#"
    SELECT
        CAST(k.CONSTRAINT_NAME AS CHAR) AS constraint_name,
        CAST(k.TABLE_NAME AS CHAR) AS table_name,
        CAST(k.COLUMN_NAME AS CHAR) AS column_name,
        CAST(k.REFERENCED_TABLE_SCHEMA AS CHAR) AS referenced_table_schema,
        CAST(k.REFERENCED_TABLE_NAME AS CHAR) AS referenced_table_name,
        CAST(k.REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column_name,
        CAST(r.UPDATE_RULE AS CHAR) AS update_rule,
        CAST(r.DELETE_RULE AS CHAR) AS delete_rule
    FROM information_schema.KEY_COLUMN_USAGE k
    LEFT JOIN information_schema.REFERENTIAL_CONSTRAINTS r
        ON r.CONSTRAINT_SCHEMA = k.CONSTRAINT_SCHEMA
        AND r.CONSTRAINT_NAME = k.CONSTRAINT_NAME
        AND r.TABLE_NAME = k.TABLE_NAME
    WHERE k.TABLE_SCHEMA = ?
        AND (? IS NULL OR k.TABLE_NAME = ?)
        AND k.REFERENCED_TABLE_NAME IS NOT NULL
    ORDER BY k.TABLE_NAME, k.CONSTRAINT_NAME, k.ORDINAL_POSITION
"#;

const VIEWS_SQL: &str = r#"
    SELECT
        CAST(TABLE_SCHEMA AS CHAR) AS table_schema,
        CAST(TABLE_NAME AS CHAR) AS table_name,
        CAST(IS_UPDATABLE AS CHAR) AS is_updatable
    FROM information_schema.VIEWS
    WHERE TABLE_SCHEMA = ?
    ORDER BY TABLE_NAME
"#;

/// Opens one `MySqlConnection` per session.
pub struct MySqlConnector {
    settings: Result<DatabaseConfig, ConfigError>,
}

impl MySqlConnector {
    /// Create a connector from already-resolved settings.
    ///
    /// A resolution failure is kept and returned from every [`open`](CatalogConnector::open).
    pub fn new(settings: Result<DatabaseConfig, ConfigError>) -> Self {
        if let Err(e) = &settings {
            warn!("MySQL settings unavailable: {}", e);
        }
        Self { settings }
    }

    /// Resolve settings from the environment and the configuration file.
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self::new(config.database_settings())
    }
}

#[async_trait]
impl CatalogConnector for MySqlConnector {
    fn name(&self) -> &'static str {
        "mysql"
    }

    #[instrument(skip(self), fields(db = "mysql"))]
    async fn open(&self) -> DbResult<Box<dyn CatalogSession>> {
        let config = self
            .settings
            .as_ref()
            .map_err(|e| DatabaseError::Config(e.clone()))?;

        let target = config.display_target();
        debug!("Opening connection to {}", target);

        let conn = MySqlConnection::connect_with(&config.connect_options())
            .await
            .map_err(|e| DatabaseError::connection(target, e))?;

        Ok(Box::new(MySqlSession { conn }))
    }
}

/// A catalog session over a single MySQL connection.
pub struct MySqlSession {
    conn: MySqlConnection,
}

#[async_trait]
impl CatalogSession for MySqlSession {
    async fn current_schema(&mut self) -> sqlx::Result<Option<String>> {
        sqlx::query_scalar::<_, Option<String>>(CURRENT_SCHEMA_SQL)
            .fetch_one(&mut self.conn)
            .await
    }

    async fn schemas(&mut self) -> sqlx::Result<Vec<SchemaRow>> {
        sqlx::query_as::<_, SchemaRow>(SCHEMAS_SQL)
            .fetch_all(&mut self.conn)
            .await
    }

    async fn schema(&mut self, schema: &str) -> sqlx::Result<Option<SchemaRow>> {
        sqlx::query_as::<_, SchemaRow>(SCHEMA_SQL)
            .bind(schema)
            .fetch_optional(&mut self.conn)
            .await
    }

    async fn object_counts(&mut self, schema: &str) -> sqlx::Result<ObjectCountRow> {
        sqlx::query_as::<_, ObjectCountRow>(OBJECT_COUNTS_SQL)
            .bind(schema)
            .fetch_one(&mut self.conn)
            .await
    }

    async fn tables(&mut self, schema: &str) -> sqlx::Result<Vec<TableRow>> {
        sqlx::query_as::<_, TableRow>(TABLES_SQL)
            .bind(schema)
            .fetch_all(&mut self.conn)
            .await
    }

    async fn table(&mut self, schema: &str, table: &str) -> sqlx::Result<Option<TableRow>> {
        sqlx::query_as::<_, TableRow>(TABLE_SQL)
            .bind(schema)
            .bind(table)
            .fetch_optional(&mut self.conn)
            .await
    }

    async fn columns(&mut self, schema: &str, table: &str) -> sqlx::Result<Vec<ColumnRow>> {
        sqlx::query_as::<_, ColumnRow>(COLUMNS_SQL)
            .bind(schema)
            .bind(table)
            .fetch_all(&mut self.conn)
            .await
    }

    async fn index_columns(&mut self, schema: &str, table: &str) -> sqlx::Result<Vec<IndexRow>> {
        sqlx::query_as::<_, IndexRow>(INDEX_COLUMNS_SQL)
            .bind(schema)
            .bind(table)
            .fetch_all(&mut self.conn)
            .await
    }

    async fn foreign_key_columns(
        &mut self,
        schema: &str,
        table: Option<&str>,
    ) -> sqlx::Result<Vec<ForeignKeyRow>> {
        sqlx::query_as::<_, ForeignKeyRow>(FOREIGN_KEY_COLUMNS_SQL)
            .bind(schema)
            .bind(table)
            .bind(table)
            .fetch_all(&mut self.conn)
            .await
    }

    async fn views(&mut self, schema: &str) -> sqlx::Result<Vec<ViewRow>> {
        sqlx::query_as::<_, ViewRow>(VIEWS_SQL)
            .bind(schema)
            .fetch_all(&mut self.conn)
            .await
    }

    async fn close(self: Box<Self>) {
        let MySqlSession { conn } = *self;
        if let Err(e) = conn.close().await {
            warn!("Failed to close MySQL connection cleanly: {}", e);
        }
    }
}
