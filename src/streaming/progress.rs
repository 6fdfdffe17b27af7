//! Pull/push progress stream decoder
//!
//! The daemon answers a pull or push with one JSON [`ProgressMessage`] per
//! line. `progress` lines are surfaced as they arrive; the stream ends with
//! exactly one `success` or `error` line. Anything else, including a body
//! that ends without a terminal line, fails the call.

use crate::errors::{ClientError, ProgressFailure, Result};
use crate::protocol::{ProgressKind, ProgressMessage};
use crate::streaming::lines::LineReader;
use crate::transport::BodyStream;
use std::borrow::Cow;

/// Which long-running operation a progress stream belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressOperation {
    Pull,
    Push,
}

impl ProgressOperation {
    fn verb(self) -> &'static str {
        match self {
            ProgressOperation::Pull => "pulling",
            ProgressOperation::Push => "pushing",
        }
    }
}

/// Decoded event from a progress stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Progress(String),
    /// Terminal event, nothing follows it
    Success(String),
}

/// Final result of a drained progress stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOutcome {
    pub message: String,
    pub progress_shown: bool,
}

/// Lazy sequence of progress events; finite and not restartable
pub struct ProgressStream {
    lines: LineReader,
    operation: ProgressOperation,
    model: String,
    progress_shown: bool,
    finished: bool,
}

impl ProgressStream {
    pub fn new(body: BodyStream, operation: ProgressOperation, model: &str) -> Self {
        Self {
            lines: LineReader::new(body),
            operation,
            model: model.to_string(),
            progress_shown: false,
            finished: false,
        }
    }

    /// Whether any `progress` event has been yielded so far
    pub fn progress_shown(&self) -> bool {
        self.progress_shown
    }

    /// Next event; `Ok(None)` only after a `Success` has been yielded
    pub async fn next_event(&mut self) -> Result<Option<ProgressEvent>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.finished = true;
                    return Err(ClientError::ProtocolViolation(format!(
                        "unexpected end of stream while {} model {}",
                        self.operation.verb(),
                        self.model
                    )));
                }
                Err(err) => {
                    self.finished = true;
                    return Err(ClientError::wrap("error reading progress stream", err));
                }
            };

            if line.is_empty() {
                continue;
            }

            let message: ProgressMessage = match serde_json::from_str(&unescape_html(&line)) {
                Ok(message) => message,
                Err(err) => {
                    self.finished = true;
                    return Err(ClientError::ProtocolViolation(format!(
                        "error parsing progress message: {}",
                        err
                    )));
                }
            };
            tracing::debug!(kind = %message.kind, text = %message.message, "progress event");

            return match message.progress_kind() {
                ProgressKind::Progress => {
                    self.progress_shown = true;
                    Ok(Some(ProgressEvent::Progress(message.message)))
                }
                ProgressKind::Success => {
                    self.finished = true;
                    Ok(Some(ProgressEvent::Success(message.message)))
                }
                ProgressKind::Error => {
                    self.finished = true;
                    Err(ClientError::generic(format!(
                        "error {} model: {}",
                        self.operation.verb(),
                        message.message
                    )))
                }
                ProgressKind::Other => {
                    self.finished = true;
                    Err(ClientError::ProtocolViolation(format!(
                        "unknown message type: {}",
                        message.kind
                    )))
                }
            };
        }
    }

    /// Drive the stream to its end, reporting each progress message
    pub async fn drain<F>(
        mut self,
        mut on_progress: F,
    ) -> std::result::Result<ProgressOutcome, ProgressFailure>
    where
        F: FnMut(&str),
    {
        loop {
            match self.next_event().await {
                Ok(Some(ProgressEvent::Progress(message))) => on_progress(&message),
                Ok(Some(ProgressEvent::Success(message))) => {
                    return Ok(ProgressOutcome {
                        message,
                        progress_shown: self.progress_shown,
                    })
                }
                // Unreachable in practice: `None` only follows a success
                Ok(None) => {
                    return Err(ProgressFailure::new(
                        ClientError::ProtocolViolation("progress stream already finished".to_string()),
                        self.progress_shown,
                    ))
                }
                Err(err) => return Err(ProgressFailure::new(err, self.progress_shown)),
            }
        }
    }
}

/// Undo HTML entity escaping applied by the daemon to progress lines
pub fn unescape_html(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end))) {
            Some((decoded, end)) => {
                out.push(decoded);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = entity.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
