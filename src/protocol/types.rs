//! Type definitions for the daemon API
//!
//! Every value here is request/response scoped; nothing is cached or
//! persisted by the client.

use crate::errors::ClientError;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Start of the short ID inside a canonical `sha256:<hex>` model ID
pub const SHORT_ID_START: usize = 7;

/// End (exclusive) of the short ID inside a model ID
pub const SHORT_ID_END: usize = SHORT_ID_START + 12;

/// One model stored by the daemon
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Model {
    /// Content-addressed identifier (e.g. "sha256:<64-hex>")
    #[serde(default)]
    pub id: String,

    /// Human-readable `name:tag` references, first one is canonical
    #[serde(default)]
    pub tags: Vec<String>,

    /// Files making up the model
    #[serde(default)]
    pub files: Vec<String>,

    /// Creation time, Unix epoch seconds
    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub config: ModelConfig,
}

/// Descriptive model metadata as reported by the daemon
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub quantization: String,
    #[serde(default)]
    pub parameters: String,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub size: String,
}

impl Model {
    /// The 12-character short ID, `None` if the ID is too short to carry one
    pub fn short_id(&self) -> Option<&str> {
        self.id.get(SHORT_ID_START..SHORT_ID_END)
    }

    /// Canonical name, the first tag
    pub fn name(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    /// Whether `candidate` identifies this model by short ID, bare digest or full ID
    pub fn matches_id(&self, candidate: &str) -> bool {
        self.short_id() == Some(candidate)
            || self.id.strip_prefix("sha256:").unwrap_or(&self.id) == candidate
            || self.id == candidate
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created, 0).single()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name().unwrap_or("<untagged>"), self.id)
    }
}

/// Body of `POST /models/create`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCreateRequest {
    pub from: String,
}

/// One line of a pull/push progress stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

/// Recognized progress message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    Progress,
    Error,
    Success,
    Other,
}

impl ProgressMessage {
    pub fn progress_kind(&self) -> ProgressKind {
        match self.kind.as_str() {
            "progress" => ProgressKind::Progress,
            "error" => ProgressKind::Error,
            "success" => ProgressKind::Success,
            _ => ProgressKind::Other,
        }
    }
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl OpenAIChatRequest {
    /// Single-turn streaming request carrying one user prompt
    pub fn single_turn(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: true,
        }
    }
}

/// One streamed chat completion chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAIChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: ChatDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl OpenAIChatResponse {
    /// Content fragment of the first choice, if non-empty
    pub fn fragment(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.delta.content.as_str())
            .filter(|content| !content.is_empty())
    }
}

/// Liveness snapshot of the daemon
#[derive(Debug, Default)]
pub struct Status {
    pub running: bool,
    /// Raw body reported by the daemon's status route
    pub status: Vec<u8>,
    pub error: Option<ClientError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    const DIGEST: &str = "deadbeefcafe0123456789abcdef0123456789abcdef0123456789abcdef0123";

    fn model(id: &str, tags: &[&str]) -> Model {
        Model {
            id: id.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_short_id() {
        let m = model(&format!("sha256:{}", DIGEST), &["ai/smollm2:latest"]);
        assert_eq!(m.short_id(), Some("deadbeefcafe"));
    }

    #[test]
    fn test_short_id_malformed() {
        assert_eq!(model("", &[]).short_id(), None);
        assert_eq!(model("sha256:abc", &[]).short_id(), None);
    }

    #[test]
    fn test_matches_id() {
        let full = format!("sha256:{}", DIGEST);
        let m = model(&full, &["repo/name:tag"]);
        assert!(m.matches_id("deadbeefcafe"));
        assert!(m.matches_id(DIGEST));
        assert!(m.matches_id(&full));
        assert!(!m.matches_id("deadbeef"));
    }

    #[test]
    fn test_model_deserialization() {
        let json = r#"{
            "id": "sha256:deadbeefcafe0123456789abcdef",
            "tags": ["ai/smollm2:latest"],
            "files": ["/models/blob"],
            "created": 1742816981,
            "config": {
                "format": "gguf",
                "quantization": "IQ2_XXS/Q4_K_M",
                "parameters": "361.82 M",
                "architecture": "llama",
                "size": "256.35 MiB"
            }
        }"#;
        let m: Model = serde_json::from_str(json).unwrap();
        assert_eq!(m.name(), Some("ai/smollm2:latest"));
        assert_eq!(m.config.architecture, "llama");
        assert_eq!(m.created_at().unwrap().timestamp(), 1742816981);
    }

    #[test]
    fn test_progress_kind() {
        let msg: ProgressMessage =
            serde_json::from_str(r#"{"type":"progress","message":"a"}"#).unwrap();
        assert_eq!(msg.progress_kind(), ProgressKind::Progress);

        let msg: ProgressMessage = serde_json::from_str(r#"{"type":"weird"}"#).unwrap();
        assert_eq!(msg.progress_kind(), ProgressKind::Other);
        assert_eq!(msg.message, "");
    }

    #[test]
    fn test_chat_request_serialization() {
        let req = OpenAIChatRequest::single_turn("ai/smollm2", "Hi");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], "ai/smollm2");
        assert_eq!(value["stream"], true);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "Hi");
    }

    #[test]
    fn test_chat_fragment() {
        let chunk: OpenAIChatResponse =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":"Hi"}}]}"#).unwrap();
        assert_eq!(chunk.fragment(), Some("Hi"));

        let empty: OpenAIChatResponse =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert_eq!(empty.fragment(), None);

        let none: OpenAIChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(none.fragment(), None);
    }

    #[quickcheck]
    fn prop_short_id_is_twelve_chars_and_stable(digest: Vec<u8>) -> bool {
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        let m = model(&format!("sha256:{}", hex), &["a/b:c"]);
        match m.short_id() {
            Some(short) => {
                m.id.len() >= SHORT_ID_END && short.len() == 12 && m.short_id() == Some(short)
            }
            None => m.id.len() < SHORT_ID_END,
        }
    }
}
