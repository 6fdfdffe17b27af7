//! Chat completion stream decoder
//!
//! Server-Sent-Events framing: only `data: ` lines carry payload, everything
//! else (blank lines, `event:` lines, comments) is ignored. `data: [DONE]`
//! ends the stream; every other payload is one [`OpenAIChatResponse`] chunk.

use crate::errors::{ClientError, Result};
use crate::protocol::OpenAIChatResponse;
use crate::streaming::lines::LineReader;
use crate::transport::BodyStream;
use std::io::Write;

const DATA_PREFIX: &str = "data: ";
const DONE_MARKER: &str = "[DONE]";

/// Lazy sequence of chat content fragments; finite and not restartable
pub struct ChatStream {
    lines: LineReader,
    finished: bool,
}

impl ChatStream {
    pub fn new(body: BodyStream) -> Self {
        Self {
            lines: LineReader::new(body),
            finished: false,
        }
    }

    /// Next non-empty content fragment, `None` at `[DONE]` or end of body
    pub async fn next_fragment(&mut self) -> Result<Option<String>> {
        while !self.finished {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    self.finished = true;
                    return Err(ClientError::wrap("error reading response stream", err));
                }
            };

            let Some(data) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };
            if data == DONE_MARKER {
                break;
            }

            let chunk: OpenAIChatResponse = serde_json::from_str(data).map_err(|err| {
                self.finished = true;
                ClientError::ProtocolViolation(format!("error parsing stream response: {}", err))
            })?;
            if let Some(fragment) = chunk.fragment() {
                return Ok(Some(fragment.to_string()));
            }
        }

        self.finished = true;
        Ok(None)
    }

    /// Write every fragment to `sink` as soon as it arrives
    pub async fn copy_to<W: Write + ?Sized>(mut self, sink: &mut W) -> Result<()> {
        while let Some(fragment) = self.next_fragment().await? {
            sink.write_all(fragment.as_bytes())
                .and_then(|_| sink.flush())
                .map_err(|e| ClientError::wrap("error writing chat output", e))?;
        }
        Ok(())
    }
}
