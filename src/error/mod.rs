//! Error types for the introspection server.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` conversions.

use std::borrow::Cow;
use thiserror::Error;

/// Main error type for the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON-RPC 2.0 and MCP protocol errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Parse error: invalid JSON")]
    ParseError,

    #[error("Invalid request: {0}")]
    InvalidRequest(Cow<'static, str>),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(Cow<'static, str>),

    #[error("Internal error: {0}")]
    InternalError(Cow<'static, str>),
}

impl ProtocolError {
    /// Returns the JSON-RPC 2.0 error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::InternalError(_) => -32603,
        }
    }
}

/// Coarse classification of a [`DatabaseError`] for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable connection string, or the driver refused to open a connection.
    Configuration,
    /// The server was reachable but a catalog query failed.
    Query,
}

/// Database-related errors raised by the introspection engine.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Connection failed for {target}: {source}")]
    ConnectionFailed {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("{operation} failed for {target}: {source}")]
    QueryFailed {
        operation: &'static str,
        target: String,
        #[source]
        source: sqlx::Error,
    },
}

impl DatabaseError {
    pub fn query(operation: &'static str, target: impl Into<String>, source: sqlx::Error) -> Self {
        Self::QueryFailed {
            operation,
            target: target.into(),
            source,
        }
    }

    pub fn connection(target: impl Into<String>, source: sqlx::Error) -> Self {
        Self::ConnectionFailed {
            target: target.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::ConnectionFailed { .. } => ErrorKind::Configuration,
            Self::QueryFailed { .. } => ErrorKind::Query,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

/// Configuration errors.
///
/// Cloneable so a failed resolution can be stored once and handed out on
/// every connection attempt.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error(
        "Missing connection string: set the {env_var} environment variable or '{config_key}' in {config_file}"
    )]
    MissingConnectionString {
        env_var: Cow<'static, str>,
        config_key: Cow<'static, str>,
        config_file: String,
    },

    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(Cow<'static, str>),

    #[error("Missing required field: {0}")]
    MissingField(Cow<'static, str>),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    #[error("Failed to load config file {path}: {message}")]
    File { path: String, message: String },
}

/// Tool execution errors.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Result type alias for McpError.
pub type Result<T> = std::result::Result<T, McpError>;

/// Result type alias for DatabaseError.
pub type DbResult<T> = std::result::Result<T, DatabaseError>;

/// Result type alias for ProtocolError.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
