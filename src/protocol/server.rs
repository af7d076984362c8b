//! The serve loop: read a line, dispatch it, write the reply.

use crate::error::Result;
use crate::protocol::handler::{Dispatcher, Handler, Phase};
use crate::protocol::transport::{StdioTransport, Transport};
use crate::protocol::types::Inbound;
use tracing::{debug, info, warn};

pub struct McpServer<H> {
    dispatcher: Dispatcher<H>,
}

impl<H: Handler> McpServer<H> {
    pub fn new(handler: H) -> Self {
        Self {
            dispatcher: Dispatcher::new(handler),
        }
    }

    /// Serve over stdin/stdout.
    pub async fn run(self) -> Result<()> {
        self.serve(&mut StdioTransport::stdio()).await
    }

    /// Serve until end of input or a `shutdown` request. Requests are handled
    /// one at a time, in arrival order.
    pub async fn serve<T: Transport>(mut self, transport: &mut T) -> Result<()> {
        info!("Waiting for requests");

        while let Some(line) = transport.read_line().await? {
            let reply = match Inbound::decode(&line) {
                Inbound::Request(request) => self.dispatcher.dispatch(request).await,
                Inbound::Reply => {
                    warn!("Dropping unsolicited response");
                    None
                }
                Inbound::Malformed(response) => {
                    debug!("Rejecting input: {:?}", response.error());
                    Some(response)
                }
            };

            if let Some(response) = reply {
                transport.write_response(&response).await?;
            }

            if self.dispatcher.phase() == Phase::Closing {
                break;
            }
        }

        info!("Session ended");
        Ok(())
    }
}
