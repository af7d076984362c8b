//! Method routing and session lifecycle.

use crate::error::{ProtocolError, ProtocolResult};
use crate::protocol::types::*;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

/// The application side of the protocol. Lifecycle methods (`initialized`,
/// `ping`, `shutdown`) are answered by the [`Dispatcher`] itself.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn initialize(&self, params: InitializeParams) -> ProtocolResult<InitializeResult>;

    async fn list_tools(&self) -> ProtocolResult<ListToolsResult>;

    async fn call_tool(&self, params: CallToolParams) -> ProtocolResult<CallToolResult>;
}

/// Where the session stands in the MCP handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingInitialize,
    /// `initialize` answered, waiting for the client's `initialized` notification.
    Initializing,
    Ready,
    /// `shutdown` received; the serve loop stops after replying.
    Closing,
}

/// Routes requests to a [`Handler`] and tracks the session [`Phase`].
pub struct Dispatcher<H> {
    handler: H,
    phase: Phase,
}

impl<H: Handler> Dispatcher<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            phase: Phase::AwaitingInitialize,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Handle one request. Notifications never produce a response, even on failure.
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn dispatch(&mut self, request: Request) -> Option<Response> {
        let outcome = self.route(&request).await;
        if let Err(e) = &outcome {
            warn!("{} failed: {}", request.method, e);
        }

        let id = request.id?;
        Some(match outcome {
            Ok(result) => Response::result(Some(id), result),
            Err(e) => Response::failure(Some(id), &e),
        })
    }

    async fn route(&mut self, request: &Request) -> ProtocolResult<Value> {
        match request.method.as_str() {
            "initialize" => {
                let result = self.handler.initialize(request.params()?).await?;
                self.phase = Phase::Initializing;
                to_value(result)
            }
            "initialized" | "notifications/initialized" => {
                if self.phase == Phase::Initializing {
                    info!("Client initialized");
                    self.phase = Phase::Ready;
                }
                Ok(Value::Null)
            }
            "ping" => Ok(json!({})),
            "shutdown" => {
                info!("Shutdown requested");
                self.phase = Phase::Closing;
                Ok(Value::Null)
            }
            "tools/list" => to_value(self.handler.list_tools().await?),
            "tools/call" => {
                let params: CallToolParams = request.params()?;
                debug!("Calling tool {}", params.name);
                to_value(self.handler.call_tool(params).await?)
            }
            other => Err(ProtocolError::MethodNotFound(other.to_string())),
        }
    }
}

fn to_value<T: Serialize>(result: T) -> ProtocolResult<Value> {
    serde_json::to_value(result).map_err(|e| ProtocolError::InternalError(e.to_string().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Handler for CountingHandler {
        async fn initialize(&self, params: InitializeParams) -> ProtocolResult<InitializeResult> {
            Ok(InitializeResult {
                protocol_version: params.protocol_version,
                capabilities: ServerCapabilities::static_tools(),
                server_info: Implementation {
                    name: "test".into(),
                    version: "1.0".into(),
                },
                instructions: None,
            })
        }

        async fn list_tools(&self) -> ProtocolResult<ListToolsResult> {
            Ok(ListToolsResult { tools: vec![] })
        }

        async fn call_tool(&self, params: CallToolParams) -> ProtocolResult<CallToolResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CallToolResult::text(params.name))
        }
    }

    fn request(line: Value) -> Request {
        match Inbound::decode(&line.to_string()) {
            Inbound::Request(request) => request,
            other => panic!("not a request: {:?}", other),
        }
    }

    fn result(response: Option<Response>) -> Value {
        match response.expect("a response").outcome {
            Outcome::Result(value) => value,
            Outcome::Error(e) => panic!("unexpected error {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_handshake_moves_through_phases() {
        let mut dispatcher = Dispatcher::new(CountingHandler::default());
        assert_eq!(dispatcher.phase(), Phase::AwaitingInitialize);

        let init = dispatcher
            .dispatch(request(json!({
                "jsonrpc": "2.0", "id": 1, "method": "initialize",
                "params": {
                    "protocolVersion": MCP_VERSION,
                    "clientInfo": {"name": "c", "version": "1"}
                }
            })))
            .await;
        let init = result(init);
        assert_eq!(init["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(init["serverInfo"]["name"], "test");
        assert_eq!(dispatcher.phase(), Phase::Initializing);

        let reply = dispatcher
            .dispatch(request(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})))
            .await;
        assert!(reply.is_none());
        assert_eq!(dispatcher.phase(), Phase::Ready);

        let reply = dispatcher
            .dispatch(request(json!({"jsonrpc": "2.0", "id": 2, "method": "shutdown"})))
            .await;
        assert_eq!(result(reply), Value::Null);
        assert_eq!(dispatcher.phase(), Phase::Closing);
    }

    #[tokio::test]
    async fn test_legacy_initialized_spelling() {
        let mut dispatcher = Dispatcher::new(CountingHandler::default());
        dispatcher
            .dispatch(request(json!({
                "jsonrpc": "2.0", "id": 1, "method": "initialize",
                "params": {"protocolVersion": MCP_VERSION, "clientInfo": {"name": "c", "version": "1"}}
            })))
            .await;

        let reply = dispatcher
            .dispatch(request(json!({"jsonrpc": "2.0", "method": "initialized"})))
            .await;
        assert!(reply.is_none());
        assert_eq!(dispatcher.phase(), Phase::Ready);
    }

    #[tokio::test]
    async fn test_initialized_before_initialize_is_ignored() {
        let mut dispatcher = Dispatcher::new(CountingHandler::default());
        dispatcher
            .dispatch(request(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})))
            .await;
        assert_eq!(dispatcher.phase(), Phase::AwaitingInitialize);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut dispatcher = Dispatcher::new(CountingHandler::default());

        let reply = dispatcher
            .dispatch(request(json!({"jsonrpc": "2.0", "id": 7, "method": "resources/list"})))
            .await
            .unwrap();
        assert_eq!(reply.id, Some(RequestId::Number(7)));
        assert_eq!(reply.error().unwrap().code, -32601);

        // an unknown notification fails silently
        let reply = dispatcher
            .dispatch(request(json!({"jsonrpc": "2.0", "method": "notifications/cancelled"})))
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_call_tool_requires_name() {
        let mut dispatcher = Dispatcher::new(CountingHandler::default());

        let reply = dispatcher
            .dispatch(request(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call"})))
            .await
            .unwrap();
        assert_eq!(reply.error().unwrap().code, -32602);

        let reply = dispatcher
            .dispatch(request(json!({
                "jsonrpc": "2.0", "id": 3, "method": "tools/call",
                "params": {"name": "list_schemas"}
            })))
            .await;
        assert_eq!(result(reply)["content"][0]["text"], "list_schemas");
        assert_eq!(dispatcher.handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ping() {
        let mut dispatcher = Dispatcher::new(CountingHandler::default());
        let reply = dispatcher
            .dispatch(request(json!({"jsonrpc": "2.0", "id": "p", "method": "ping"})))
            .await;
        assert_eq!(result(reply), json!({}));
    }
}
