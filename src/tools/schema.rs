//! Catalog introspection tools, one per engine operation.

use crate::error::Result;
use crate::introspect::Introspector;
use crate::protocol::{CallToolResult, Tool};
use crate::tools::registry::{ToolHandler, parse_arguments};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::instrument;

const SCHEMA_NAME_HINT: &str =
    "Schema (database) name. Defaults to the connection's current database when omitted.";

fn schema_name_property() -> Value {
    json!({ "type": "string", "description": SCHEMA_NAME_HINT })
}

fn found_or_text<T: Serialize>(value: Option<T>, missing: impl FnOnce() -> String) -> CallToolResult {
    match value {
        Some(value) => CallToolResult::json(&value),
        None => CallToolResult::text(missing()),
    }
}

fn display_name(schema_name: Option<&str>, name: &str) -> String {
    match schema_name {
        Some(schema) if !schema.trim().is_empty() => format!("{}.{}", schema, name),
        _ => name.to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SchemaArgs {
    #[serde(default)]
    pub schema_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DescribeSchemaArgs {
    pub schema_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TableArgs {
    pub table_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForeignKeyArgs {
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
}

pub struct ListSchemasTool {
    introspector: Arc<Introspector>,
}

impl ListSchemasTool {
    pub fn new(introspector: Arc<Introspector>) -> Self {
        Self { introspector }
    }
}

#[async_trait]
impl ToolHandler for ListSchemasTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "list_schemas".into(),
            description: Some(
                "List every schema on the server, ordered by name. \
                User schemas include table and view counts; system schemas are flagged."
                    .into(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    #[instrument(skip(self, _arguments), fields(tool = "list_schemas"))]
    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        let schemas = self.introspector.list_schemas().await?;
        Ok(CallToolResult::json(&schemas))
    }
}

pub struct DescribeSchemaTool {
    introspector: Arc<Introspector>,
}

impl DescribeSchemaTool {
    pub fn new(introspector: Arc<Introspector>) -> Self {
        Self { introspector }
    }
}

#[async_trait]
impl ToolHandler for DescribeSchemaTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "describe_schema".into(),
            description: Some("Describe a single schema by exact name.".into()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "schema_name": { "type": "string", "description": "Schema (database) name" }
                },
                "required": ["schema_name"]
            }),
        }
    }

    #[instrument(skip(self, arguments), fields(tool = "describe_schema"))]
    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: DescribeSchemaArgs = parse_arguments(arguments)?;
        let schema = self.introspector.describe_schema(&args.schema_name).await?;
        Ok(found_or_text(schema, || {
            format!("Schema '{}' not found", args.schema_name)
        }))
    }
}

pub struct ListTablesTool {
    introspector: Arc<Introspector>,
}

impl ListTablesTool {
    pub fn new(introspector: Arc<Introspector>) -> Self {
        Self { introspector }
    }
}

#[async_trait]
impl ToolHandler for ListTablesTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "list_tables".into(),
            description: Some(
                "List tables and views in a schema, ordered by name. \
                Use describe_table for columns, indexes and foreign keys."
                    .into(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "schema_name": schema_name_property()
                }
            }),
        }
    }

    #[instrument(skip(self, arguments), fields(tool = "list_tables"))]
    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: SchemaArgs = parse_arguments(arguments)?;
        let tables = self
            .introspector
            .list_tables(args.schema_name.as_deref())
            .await?;
        Ok(CallToolResult::json(&tables))
    }
}

pub struct DescribeTableTool {
    introspector: Arc<Introspector>,
}

impl DescribeTableTool {
    pub fn new(introspector: Arc<Introspector>) -> Self {
        Self { introspector }
    }
}

#[async_trait]
impl ToolHandler for DescribeTableTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "describe_table".into(),
            description: Some(
                "Describe a table or view with its columns, indexes and foreign keys.".into(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "table_name": { "type": "string", "description": "Table or view name" },
                    "schema_name": schema_name_property()
                },
                "required": ["table_name"]
            }),
        }
    }

    #[instrument(skip(self, arguments), fields(tool = "describe_table"))]
    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: TableArgs = parse_arguments(arguments)?;
        let table = self
            .introspector
            .describe_table(&args.table_name, args.schema_name.as_deref())
            .await?;
        Ok(found_or_text(table, || {
            format!(
                "Table '{}' not found",
                display_name(args.schema_name.as_deref(), &args.table_name)
            )
        }))
    }
}

pub struct ListColumnsTool {
    introspector: Arc<Introspector>,
}

impl ListColumnsTool {
    pub fn new(introspector: Arc<Introspector>) -> Self {
        Self { introspector }
    }
}

#[async_trait]
impl ToolHandler for ListColumnsTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "list_columns".into(),
            description: Some(
                "List the columns of a table in declared order, with type, nullability, \
                key flags and default value."
                    .into(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "table_name": { "type": "string", "description": "Table or view name" },
                    "schema_name": schema_name_property()
                },
                "required": ["table_name"]
            }),
        }
    }

    #[instrument(skip(self, arguments), fields(tool = "list_columns"))]
    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: TableArgs = parse_arguments(arguments)?;
        let columns = self
            .introspector
            .list_columns(&args.table_name, args.schema_name.as_deref())
            .await?;
        Ok(CallToolResult::json(&columns))
    }
}

pub struct ListIndexesTool {
    introspector: Arc<Introspector>,
}

impl ListIndexesTool {
    pub fn new(introspector: Arc<Introspector>) -> Self {
        Self { introspector }
    }
}

#[async_trait]
impl ToolHandler for ListIndexesTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "list_indexes".into(),
            description: Some(
                "List the indexes of a table. Each index lists its columns in key order.".into(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "table_name": { "type": "string", "description": "Table name" },
                    "schema_name": schema_name_property()
                },
                "required": ["table_name"]
            }),
        }
    }

    #[instrument(skip(self, arguments), fields(tool = "list_indexes"))]
    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: TableArgs = parse_arguments(arguments)?;
        let indexes = self
            .introspector
            .list_indexes(&args.table_name, args.schema_name.as_deref())
            .await?;
        Ok(CallToolResult::json(&indexes))
    }
}

pub struct ListForeignKeysTool {
    introspector: Arc<Introspector>,
}

impl ListForeignKeysTool {
    pub fn new(introspector: Arc<Introspector>) -> Self {
        Self { introspector }
    }
}

#[async_trait]
impl ToolHandler for ListForeignKeysTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "list_foreign_keys".into(),
            description: Some(
                "List foreign key constraints of a table, or of every table in the schema \
                when table_name is omitted. Composite keys are returned as one constraint."
                    .into(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "table_name": {
                        "type": "string",
                        "description": "Table name (optional, returns all constraints in the schema if not specified)"
                    },
                    "schema_name": schema_name_property()
                }
            }),
        }
    }

    #[instrument(skip(self, arguments), fields(tool = "list_foreign_keys"))]
    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ForeignKeyArgs = parse_arguments(arguments)?;
        let foreign_keys = self
            .introspector
            .list_foreign_keys(args.table_name.as_deref(), args.schema_name.as_deref())
            .await?;
        Ok(CallToolResult::json(&foreign_keys))
    }
}

pub struct ListViewsTool {
    introspector: Arc<Introspector>,
}

impl ListViewsTool {
    pub fn new(introspector: Arc<Introspector>) -> Self {
        Self { introspector }
    }
}

#[async_trait]
impl ToolHandler for ListViewsTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "list_views".into(),
            description: Some("List the views of a schema, ordered by name.".into()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "schema_name": schema_name_property()
                }
            }),
        }
    }

    #[instrument(skip(self, arguments), fields(tool = "list_views"))]
    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: SchemaArgs = parse_arguments(arguments)?;
        let views = self
            .introspector
            .list_views(args.schema_name.as_deref())
            .await?;
        Ok(CallToolResult::json(&views))
    }
}
