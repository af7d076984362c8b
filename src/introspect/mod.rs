//! Introspection engine.
//!
//! Turns "describe table X in schema Y" style requests into catalog queries and
//! reshapes the flat rows into nested records. Every public operation opens its
//! own session, runs its queries, and closes the session before returning,
//! whether it succeeded or not.
//!
//! Absence is never an error: a missing schema or table comes back as `None`
//! (describe) or an empty vector (list).

#[cfg(test)]
pub(crate) mod fake;

use crate::config::ServerConfig;
use crate::database::catalog::{ForeignKeyRow, IndexRow};
use crate::database::grouping::group_ordered;
use crate::database::model::{Column, ForeignKey, Index, Schema, Table, View, is_system_schema};
use crate::database::traits::{CatalogConnector, CatalogSession};
use crate::database::MySqlConnector;
use crate::error::{DatabaseError, DbResult};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Catalog introspection over a connection factory.
#[derive(Clone)]
pub struct Introspector {
    connector: Arc<dyn CatalogConnector>,
}

impl Introspector {
    pub fn new(connector: Arc<dyn CatalogConnector>) -> Self {
        Self { connector }
    }

    /// MySQL engine with settings resolved once from the environment and the
    /// configuration file. Resolution failures surface on the first call.
    pub fn mysql(config: &ServerConfig) -> Self {
        Self::new(Arc::new(MySqlConnector::from_server_config(config)))
    }

    pub fn connector_name(&self) -> &'static str {
        self.connector.name()
    }

    /// All schemas ordered by name, with counts for user schemas.
    #[instrument(skip(self))]
    pub async fn list_schemas(&self) -> DbResult<Vec<Schema>> {
        let mut session = self.connector.open().await?;
        let result = list_schemas_in(session.as_mut()).await;
        session.close().await;
        result
    }

    /// One schema, or `None` if the catalog has no schema by that name.
    #[instrument(skip(self))]
    pub async fn describe_schema(&self, schema_name: &str) -> DbResult<Option<Schema>> {
        let mut session = self.connector.open().await?;
        let result = describe_schema_in(session.as_mut(), schema_name).await;
        session.close().await;
        result
    }

    /// Tables and views of a schema (default schema when omitted), without children.
    #[instrument(skip(self))]
    pub async fn list_tables(&self, schema_name: Option<&str>) -> DbResult<Vec<Table>> {
        let mut session = self.connector.open().await?;
        let result = list_tables_in(session.as_mut(), schema_name).await;
        session.close().await;
        result
    }

    /// A table with columns, indexes and foreign keys, or `None` if it does not exist.
    #[instrument(skip(self))]
    pub async fn describe_table(
        &self,
        table_name: &str,
        schema_name: Option<&str>,
    ) -> DbResult<Option<Table>> {
        let mut session = self.connector.open().await?;
        let result = describe_table_in(session.as_mut(), table_name, schema_name).await;
        session.close().await;
        result
    }

    /// Columns of a table in declared order.
    #[instrument(skip(self))]
    pub async fn list_columns(
        &self,
        table_name: &str,
        schema_name: Option<&str>,
    ) -> DbResult<Vec<Column>> {
        const OP: &str = "list_columns";
        let mut session = self.connector.open().await?;
        let result = async {
            match resolve_schema(session.as_mut(), schema_name, OP).await? {
                Some(schema) => fetch_columns(session.as_mut(), &schema, table_name, OP).await,
                None => Ok(Vec::new()),
            }
        }
        .await;
        session.close().await;
        result
    }

    /// Indexes of a table, one entry per index name.
    #[instrument(skip(self))]
    pub async fn list_indexes(
        &self,
        table_name: &str,
        schema_name: Option<&str>,
    ) -> DbResult<Vec<Index>> {
        const OP: &str = "list_indexes";
        let mut session = self.connector.open().await?;
        let result = async {
            match resolve_schema(session.as_mut(), schema_name, OP).await? {
                Some(schema) => fetch_indexes(session.as_mut(), &schema, table_name, OP).await,
                None => Ok(Vec::new()),
            }
        }
        .await;
        session.close().await;
        result
    }

    /// Foreign keys of one table, or of every table in the schema when
    /// `table_name` is omitted.
    #[instrument(skip(self))]
    pub async fn list_foreign_keys(
        &self,
        table_name: Option<&str>,
        schema_name: Option<&str>,
    ) -> DbResult<Vec<ForeignKey>> {
        const OP: &str = "list_foreign_keys";
        let table_name = non_blank(table_name);
        let mut session = self.connector.open().await?;
        let result = async {
            match resolve_schema(session.as_mut(), schema_name, OP).await? {
                Some(schema) => {
                    fetch_foreign_keys(session.as_mut(), &schema, table_name, OP).await
                }
                None => Ok(Vec::new()),
            }
        }
        .await;
        session.close().await;
        result
    }

    /// Views of a schema ordered by name. Definitions are not retrieved.
    #[instrument(skip(self))]
    pub async fn list_views(&self, schema_name: Option<&str>) -> DbResult<Vec<View>> {
        const OP: &str = "list_views";
        let mut session = self.connector.open().await?;
        let result = async {
            let Some(schema) = resolve_schema(session.as_mut(), schema_name, OP).await? else {
                return Ok(Vec::new());
            };
            let rows = session
                .views(&schema)
                .await
                .map_err(|e| DatabaseError::query(OP, &schema, e))?;
            debug!(count = rows.len(), "Listed views");
            Ok(rows.into_iter().map(View::from).collect())
        }
        .await;
        session.close().await;
        result
    }
}

async fn list_schemas_in(session: &mut dyn CatalogSession) -> DbResult<Vec<Schema>> {
    const OP: &str = "list_schemas";
    let rows = session
        .schemas()
        .await
        .map_err(|e| DatabaseError::query(OP, "catalog", e))?;

    let mut schemas = Vec::with_capacity(rows.len());
    for row in rows {
        schemas.push(classify_schema(session, row.schema_name, OP).await?);
    }
    debug!(count = schemas.len(), "Listed schemas");
    Ok(schemas)
}

async fn describe_schema_in(
    session: &mut dyn CatalogSession,
    schema_name: &str,
) -> DbResult<Option<Schema>> {
    const OP: &str = "describe_schema";
    let row = session
        .schema(schema_name)
        .await
        .map_err(|e| DatabaseError::query(OP, schema_name, e))?;

    match row {
        Some(row) => Ok(Some(classify_schema(session, row.schema_name, OP).await?)),
        None => {
            debug!("Schema not found");
            Ok(None)
        }
    }
}

/// System schemas carry no counts; user schemas get one scoped count query.
async fn classify_schema(
    session: &mut dyn CatalogSession,
    name: String,
    op: &'static str,
) -> DbResult<Schema> {
    if is_system_schema(&name) {
        return Ok(Schema::system(name));
    }
    let counts = session
        .object_counts(&name)
        .await
        .map_err(|e| DatabaseError::query(op, &name, e))?;
    Ok(Schema::user(name, counts.table_count, counts.view_count))
}

async fn list_tables_in(
    session: &mut dyn CatalogSession,
    schema_name: Option<&str>,
) -> DbResult<Vec<Table>> {
    const OP: &str = "list_tables";
    let Some(schema) = resolve_schema(session, schema_name, OP).await? else {
        return Ok(Vec::new());
    };
    let rows = session
        .tables(&schema)
        .await
        .map_err(|e| DatabaseError::query(OP, &schema, e))?;
    debug!(count = rows.len(), "Listed tables");
    Ok(rows.into_iter().map(Table::from).collect())
}

async fn describe_table_in(
    session: &mut dyn CatalogSession,
    table_name: &str,
    schema_name: Option<&str>,
) -> DbResult<Option<Table>> {
    const OP: &str = "describe_table";
    let Some(schema) = resolve_schema(session, schema_name, OP).await? else {
        return Ok(None);
    };

    let row = session
        .table(&schema, table_name)
        .await
        .map_err(|e| DatabaseError::query(OP, qualified(&schema, table_name), e))?;
    let Some(row) = row else {
        debug!(schema = %schema, "Table not found");
        return Ok(None);
    };

    let columns = fetch_columns(session, &schema, table_name, OP).await?;
    let indexes = fetch_indexes(session, &schema, table_name, OP).await?;
    let foreign_keys = fetch_foreign_keys(session, &schema, Some(table_name), OP).await?;

    Ok(Some(Table {
        columns: Some(columns),
        indexes: Some(indexes),
        foreign_keys: Some(foreign_keys),
        ..Table::from(row)
    }))
}

/// The supplied schema, or the connection's current one queried exactly once.
async fn resolve_schema(
    session: &mut dyn CatalogSession,
    schema_name: Option<&str>,
    op: &'static str,
) -> DbResult<Option<String>> {
    if let Some(schema) = non_blank(schema_name) {
        return Ok(Some(schema.to_string()));
    }

    let current = session
        .current_schema()
        .await
        .map_err(|e| DatabaseError::query(op, "current schema", e))?;

    match &current {
        Some(schema) => debug!(schema = %schema, "Resolved default schema"),
        None => warn!("No schema given and the connection has no default schema"),
    }
    Ok(current)
}

async fn fetch_columns(
    session: &mut dyn CatalogSession,
    schema: &str,
    table: &str,
    op: &'static str,
) -> DbResult<Vec<Column>> {
    let rows = session
        .columns(schema, table)
        .await
        .map_err(|e| DatabaseError::query(op, qualified(schema, table), e))?;
    Ok(rows.into_iter().map(Column::from).collect())
}

async fn fetch_indexes(
    session: &mut dyn CatalogSession,
    schema: &str,
    table: &str,
    op: &'static str,
) -> DbResult<Vec<Index>> {
    let rows = session
        .index_columns(schema, table)
        .await
        .map_err(|e| DatabaseError::query(op, qualified(schema, table), e))?;
    Ok(group_indexes(rows))
}

async fn fetch_foreign_keys(
    session: &mut dyn CatalogSession,
    schema: &str,
    table: Option<&str>,
    op: &'static str,
) -> DbResult<Vec<ForeignKey>> {
    let target = match table {
        Some(table) => qualified(schema, table),
        None => schema.to_string(),
    };
    let rows = session
        .foreign_key_columns(schema, table)
        .await
        .map_err(|e| DatabaseError::query(op, target, e))?;
    Ok(group_foreign_keys(rows))
}

/// Fold one-row-per-key-part index rows into one [`Index`] per index.
///
/// Column order is the row order, which the catalog query sorts by position in
/// the index. Functional key parts have no column name and are skipped.
pub fn group_indexes(rows: Vec<IndexRow>) -> Vec<Index> {
    group_ordered(
        rows,
        |r| (r.index_name.clone(), r.index_type.clone(), r.non_unique),
        |r| r.column_name,
    )
    .into_iter()
    .map(|((name, index_type, non_unique), columns)| Index {
        is_primary: name.eq_ignore_ascii_case("PRIMARY"),
        is_unique: non_unique == 0,
        columns: columns.into_iter().flatten().collect(),
        name,
        index_type,
    })
    .collect()
}

/// Fold one-row-per-column-pair foreign key rows into one [`ForeignKey`] per
/// constraint, keeping local and referenced columns paired by position.
pub fn group_foreign_keys(rows: Vec<ForeignKeyRow>) -> Vec<ForeignKey> {
    group_ordered(
        rows,
        |r| {
            (
                r.table_name.clone(),
                r.constraint_name.clone(),
                r.referenced_table_schema.clone(),
                r.referenced_table_name.clone(),
            )
        },
        |r| r,
    )
    .into_iter()
    .map(
        |((table_name, name, referenced_schema, referenced_table), members)| {
            let update_rule = members.first().and_then(|m| m.update_rule.clone());
            let delete_rule = members.first().and_then(|m| m.delete_rule.clone());
            let (columns, referenced_columns) = members
                .into_iter()
                .map(|m| (m.column_name, m.referenced_column_name))
                .unzip();

            ForeignKey {
                name,
                table_name,
                columns,
                referenced_schema,
                referenced_table,
                referenced_columns,
                update_rule,
                delete_rule,
            }
        },
    )
    .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", schema, table)
}
