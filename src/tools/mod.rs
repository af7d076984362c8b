//! MCP tool definitions and registry.

pub mod registry;
pub mod schema;

pub use registry::{ToolHandler, ToolRegistry, parse_arguments};
pub use schema::{
    DescribeSchemaTool, DescribeTableTool, ListColumnsTool, ListForeignKeysTool, ListIndexesTool,
    ListSchemasTool, ListTablesTool, ListViewsTool,
};

use crate::introspect::Introspector;
use std::sync::Arc;

/// Create and register all tools.
pub fn create_registry(introspector: Arc<Introspector>) -> ToolRegistry {
    let registry = ToolRegistry::new();

    // Schemas
    registry.register(ListSchemasTool::new(Arc::clone(&introspector)));
    registry.register(DescribeSchemaTool::new(Arc::clone(&introspector)));

    // Tables and their parts
    registry.register(ListTablesTool::new(Arc::clone(&introspector)));
    registry.register(DescribeTableTool::new(Arc::clone(&introspector)));
    registry.register(ListColumnsTool::new(Arc::clone(&introspector)));
    registry.register(ListIndexesTool::new(Arc::clone(&introspector)));
    registry.register(ListForeignKeysTool::new(Arc::clone(&introspector)));

    registry.register(ListViewsTool::new(introspector));

    registry
}
