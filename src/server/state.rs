//! Server state management.

use crate::config::ServerConfig;
use crate::introspect::Introspector;
use crate::protocol::Implementation;
use crate::tools::ToolRegistry;
use parking_lot::RwLock;
use std::sync::Arc;

/// Everything the request handler shares across calls.
pub struct ServerState {
    pub config: ServerConfig,
    pub introspector: Arc<Introspector>,
    pub tools: ToolRegistry,
    /// Set by `initialize`; a client that re-initializes replaces it.
    client: RwLock<Option<Implementation>>,
}

impl ServerState {
    pub fn new(config: ServerConfig, introspector: Arc<Introspector>, tools: ToolRegistry) -> Self {
        Self {
            config,
            introspector,
            tools,
            client: RwLock::new(None),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.client.read().is_some()
    }

    pub fn set_initialized(&self, client: Implementation) {
        *self.client.write() = Some(client);
    }

    pub fn client_info(&self) -> Option<Implementation> {
        self.client.read().clone()
    }
}

pub struct ServerStateBuilder {
    config: Option<ServerConfig>,
    introspector: Option<Arc<Introspector>>,
}

impl ServerStateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            introspector: None,
        }
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn introspector(mut self, introspector: Arc<Introspector>) -> Self {
        self.introspector = Some(introspector);
        self
    }

    /// Builds the state. Without an explicit introspector, a MySQL one is
    /// created from the config.
    pub fn build(self) -> Result<ServerState, &'static str> {
        let config = self.config.ok_or("Config is required")?;
        let introspector = self
            .introspector
            .unwrap_or_else(|| Arc::new(Introspector::mysql(&config)));

        let tools = crate::tools::create_registry(Arc::clone(&introspector));

        Ok(ServerState::new(config, introspector, tools))
    }
}

impl Default for ServerStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
