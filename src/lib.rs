//! Client library for the local model runner daemon
//!
//! Lists, inspects, pulls, pushes, tags and removes models, and streams chat
//! completions, over the daemon's HTTP API.
//!
//! # Architecture
//!
//! - **transport**: injectable `Transport` capability + reqwest binding
//! - **protocol**: routes, URL construction and wire types
//! - **streaming**: NDJSON progress and SSE chat decoders
//! - **models**: the `ModelClient` facade, ID resolution and list shaping

pub mod errors;
pub mod protocol;
pub mod streaming;
pub mod transport;
pub mod models;

// Re-export commonly used types
pub use errors::{ClientError, ErrorKind, ProgressFailure, RemoveFailure, Result};
pub use models::ModelClient;
pub use protocol::{url, Model, Status};
pub use transport::{DaemonRequest, DaemonResponse, ReqwestTransport, Transport};

// Process-level setup and presentation glue
pub mod cli;
pub mod config;
pub mod telemetry;
