//! Streaming decoders
//!
//! Line framing plus the two line protocols the daemon streams: NDJSON
//! progress for pull/push and SSE chat completion chunks.

pub mod chat;
pub mod lines;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatStream;
pub use lines::{LineReader, MAX_LINE_SIZE};
pub use progress::{ProgressEvent, ProgressOperation, ProgressOutcome, ProgressStream};
