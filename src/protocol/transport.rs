//! Line-delimited JSON-RPC transport.
//!
//! One JSON message per line. Production uses stdin/stdout; tests plug in
//! in-memory buffers.

use crate::error::Result;
use crate::protocol::types::Response;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};
use tracing::trace;

#[async_trait::async_trait]
pub trait Transport: Send {
    /// Next non-blank line, or `None` at end of input.
    async fn read_line(&mut self) -> Result<Option<String>>;

    async fn write_response(&mut self, response: &Response) -> Result<()>;
}

/// Transport over any buffered reader and writer.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// Transport over the process's stdin and stdout.
pub type StdioTransport = LineTransport<BufReader<Stdin>, Stdout>;

impl StdioTransport {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

#[cfg(test)]
impl<R> LineTransport<R, Vec<u8>> {
    /// Everything written so far, one entry per line.
    pub fn written_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.writer)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[async_trait::async_trait]
impl<R, W> Transport for LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                trace!("Received line: {}", trimmed);
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    async fn write_response(&mut self, response: &Response) -> Result<()> {
        let mut json = serde_json::to_string(response)?;
        trace!("Sending line: {}", json);
        json.push('\n');
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::RequestId;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_skips_blank_lines_until_end_of_input() {
        let input: &[u8] = b"\n{\"id\":1}\r\n   \n\t\n{\"id\":2}";
        let mut transport = LineTransport::new(input, Vec::new());

        assert_eq!(transport.read_line().await.unwrap().unwrap(), "{\"id\":1}");
        assert_eq!(transport.read_line().await.unwrap().unwrap(), "{\"id\":2}");
        assert!(transport.read_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_response_written_as_single_line() {
        let input: &[u8] = b"";
        let mut transport = LineTransport::new(input, Vec::new());

        let response = Response::result(
            Some(RequestId::Number(7)),
            json!({"text": "two\nlines"}),
        );
        transport.write_response(&response).await.unwrap();
        transport.write_response(&response).await.unwrap();

        let lines = transport.written_lines();
        assert_eq!(lines.len(), 2);
        let parsed: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["id"], 7);
        assert_eq!(parsed["result"]["text"], "two\nlines");
    }
}
