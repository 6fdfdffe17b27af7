//! Line framing over a chunked response body
//!
//! Accumulates chunks until a `\n` shows up and hands back one line at a
//! time, so decoders see whole lines no matter how the daemon's writes were
//! split on the wire. A trailing line without a newline is still returned at
//! end of stream.

use crate::errors::{ClientError, Result};
use crate::transport::BodyStream;
use futures_util::StreamExt;

/// Maximum length of a single line (1MB)
pub const MAX_LINE_SIZE: usize = 1_048_576;

/// Lazy sequence of lines read from a body stream
pub struct LineReader {
    body: BodyStream,
    buffer: Vec<u8>,
    max_line_size: usize,
    exhausted: bool,
}

impl LineReader {
    pub fn new(body: BodyStream) -> Self {
        Self::with_capacity(body, MAX_LINE_SIZE)
    }

    /// Create a reader with a custom maximum line length
    pub fn with_capacity(body: BodyStream, max_line_size: usize) -> Self {
        Self {
            body,
            buffer: Vec::with_capacity(4096),
            max_line_size,
            exhausted: false,
        }
    }

    /// Next line without its terminator, `None` once the body is drained
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.buffer.drain(..=pos).collect();
                return Ok(Some(Self::decode(&line[..pos])));
            }

            if self.exhausted {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let line = std::mem::take(&mut self.buffer);
                return Ok(Some(Self::decode(&line)));
            }

            match self.body.next().await {
                Some(Ok(chunk)) => {
                    self.buffer.extend_from_slice(&chunk);
                    if self.buffer.len() > self.max_line_size
                        && !self.buffer.contains(&b'\n')
                    {
                        return Err(ClientError::generic(format!(
                            "line exceeds maximum of {} bytes",
                            self.max_line_size
                        )));
                    }
                }
                Some(Err(err)) => return Err(err),
                None => self.exhausted = true,
            }
        }
    }

    fn decode(line: &[u8]) -> String {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        String::from_utf8_lossy(line).into_owned()
    }
}

#[cfg(test)]
pub(crate) fn body_from_chunks(chunks: &[&str]) -> BodyStream {
    let chunks: Vec<Result<bytes::Bytes>> = chunks
        .iter()
        .map(|c| Ok(bytes::Bytes::from(c.to_string())))
        .collect();
    Box::pin(futures_util::stream::iter(chunks))
}
