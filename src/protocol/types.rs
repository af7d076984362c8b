//! Wire types: JSON-RPC 2.0 envelopes and the MCP tools payloads.

use crate::error::ProtocolError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const JSONRPC_VERSION: &str = "2.0";

/// MCP revision this server speaks.
pub const MCP_VERSION: &str = "2024-11-05";

/// Request id, echoed back unchanged on the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    Text(String),
}

/// An inbound call. Without an `id` it is a notification and gets no reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl Request {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Decode `params` into the method's parameter type. Absent params decode
    /// like an empty object, so required fields still surface as invalid params.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        let params = self.params.clone().unwrap_or_else(|| json!({}));
        serde_json::from_value(params).map_err(|e| ProtocolError::InvalidParams(e.to_string().into()))
    }
}

/// One decoded input line.
#[derive(Debug)]
pub enum Inbound {
    Request(Request),
    /// A response object. The server never sends requests, so it is dropped.
    Reply,
    /// Input that is not a usable request, with the error response to send back.
    Malformed(Response),
}

impl Inbound {
    pub fn decode(line: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(line) else {
            return Self::Malformed(Response::failure(None, &ProtocolError::ParseError));
        };

        if value.get("method").is_none()
            && (value.get("result").is_some() || value.get("error").is_some())
        {
            return Self::Reply;
        }

        // keep the id when it is readable so the client can correlate the error
        let id = value
            .get("id")
            .and_then(|id| RequestId::deserialize(id).ok());

        let error = match serde_json::from_value::<Request>(value) {
            Ok(request) if request.jsonrpc == JSONRPC_VERSION => return Self::Request(request),
            Ok(request) => ProtocolError::InvalidRequest(
                format!("Unsupported jsonrpc version '{}'", request.jsonrpc).into(),
            ),
            Err(e) => ProtocolError::InvalidRequest(e.to_string().into()),
        };
        Self::Malformed(Response::failure(id, &error))
    }
}

/// Outbound reply. `id` is serialized as `null` when the request's id is unknown.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    jsonrpc: &'static str,
    pub id: Option<RequestId>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(RpcError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl From<&ProtocolError> for RpcError {
    fn from(error: &ProtocolError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

impl Response {
    pub fn result(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn failure(id: Option<RequestId>, error: &ProtocolError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(error.into()),
        }
    }

    pub fn error(&self) -> Option<&RpcError> {
        match &self.outcome {
            Outcome::Error(error) => Some(error),
            Outcome::Result(_) => None,
        }
    }
}

/// Name and version of either side of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    /// Client capabilities are logged but not acted on.
    #[serde(default)]
    pub capabilities: Value,
    pub client_info: Implementation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Only the tools capability is offered; the tool set never changes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

impl ServerCapabilities {
    pub fn static_tools() -> Self {
        Self {
            tools: ToolsCapability {
                list_changed: false,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListToolsResult {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: None,
        }
    }

    /// A failed call. The client sees it as a tool result, not a JSON-RPC error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: Some(true),
            ..Self::text(message)
        }
    }

    /// Pretty-printed JSON text of `data`.
    pub fn json<T: Serialize>(data: &T) -> Self {
        match serde_json::to_string_pretty(data) {
            Ok(text) => Self::text(text),
            Err(e) => Self::error(format!("Failed to serialize result: {}", e)),
        }
    }
}

/// Results are always rendered as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}
