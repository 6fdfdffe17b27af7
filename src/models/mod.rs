//! Model operations against the daemon
//!
//! - [`ModelClient`]: the facade every caller goes through
//! - [`resolve`]: name vs. short-ID resolution
//! - [`listing`]: shaping a model list for display

pub mod client;
pub mod listing;
pub mod resolve;

// Re-export key types for convenience
pub use client::ModelClient;
pub use listing::ModelRow;
pub use resolve::{find_model_name, is_qualified_name};
