//! Daemon wire protocol
//!
//! Route constants, URL construction and the serde data model shared by
//! every operation.

pub mod types;

pub use types::{
    ChatChoice, ChatDelta, ChatMessage, Model, ModelConfig, ModelCreateRequest,
    OpenAIChatRequest, OpenAIChatResponse, ProgressKind, ProgressMessage, Status,
    SHORT_ID_END, SHORT_ID_START,
};

/// Prefix under which the daemon serves its experimental endpoints
pub const EXPERIMENTAL_ENDPOINTS_PREFIX: &str = "/exp/vDD4.40";

/// Model management routes
pub const MODELS_PREFIX: &str = "/models";

/// Inference (OpenAI-compatible) routes
pub const INFERENCE_PREFIX: &str = "/engines";

/// Logical host of every daemon URL; the transport decides how to reach it
const DAEMON_ORIGIN: &str = "http://localhost";

/// Build the fully-qualified daemon URL for a route
pub fn url(path: &str) -> String {
    format!("{}{}{}", DAEMON_ORIGIN, EXPERIMENTAL_ENDPOINTS_PREFIX, path)
}

pub(crate) fn model_route(model: &str) -> String {
    format!("{}/{}", MODELS_PREFIX, model)
}

pub(crate) fn create_route() -> String {
    format!("{}/create", MODELS_PREFIX)
}

pub(crate) fn push_route(model: &str) -> String {
    format!("{}/{}/push", MODELS_PREFIX, model)
}

pub(crate) fn tag_route(source: &str, repo: &str, tag: &str) -> String {
    format!("{}/{}/tag?repo={}&tag={}", MODELS_PREFIX, source, repo, tag)
}

pub(crate) fn openai_models_route() -> String {
    format!("{}/v1/models", INFERENCE_PREFIX)
}

pub(crate) fn chat_completions_route() -> String {
    format!("{}/v1/chat/completions", INFERENCE_PREFIX)
}

pub(crate) fn status_route() -> String {
    format!("{}/status", INFERENCE_PREFIX)
}
