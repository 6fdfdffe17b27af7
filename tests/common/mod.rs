//! Scripted transport double shared by the integration tests

use async_trait::async_trait;
use bytes::Bytes;
use model_runner_client::transport::BodyStream;
use model_runner_client::{ClientError, DaemonRequest, DaemonResponse, ModelClient, Transport};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const DIGEST: &str = "deadbeefcafe0123456789abcdef0123456789abcdef0123456789abcdef0123";
pub const OTHER_DIGEST: &str = "0123456789ab0123456789abcdef0123456789abcdef0123456789abcdef4567";

/// One canned answer
pub enum Reply {
    /// Status plus body chunks
    Respond(u16, Vec<String>),
    /// Status plus chunks, then a read failure mid-body
    BrokenBody(u16, Vec<String>),
    /// Transport-level "not reachable"
    Unavailable,
    /// Transport-level failure with the given text
    Fail(String),
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Reply::Respond(200, vec![body.into()])
    }

    pub fn status(code: u16, body: impl Into<String>) -> Self {
        Reply::Respond(code, vec![body.into()])
    }

    pub fn lines(code: u16, lines: &[&str]) -> Self {
        Reply::Respond(code, lines.iter().map(|l| format!("{}\n", l)).collect())
    }
}

/// Transport answering requests from a script, in order
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<DaemonRequest>>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<DaemonRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// "METHOD url" of every request sent so far
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url))
            .collect()
    }
}

fn body(chunks: Vec<String>, fail: bool) -> BodyStream {
    let mut items: Vec<Result<Bytes, ClientError>> =
        chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
    if fail {
        items.push(Err(ClientError::generic("connection reset by peer")));
    }
    Box::pin(futures_util::stream::iter(items))
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: DaemonRequest) -> Result<DaemonResponse, ClientError> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request: script exhausted");

        match reply {
            Reply::Respond(code, chunks) => Ok(DaemonResponse::new(
                StatusCode::from_u16(code).unwrap(),
                body(chunks, false),
            )),
            Reply::BrokenBody(code, chunks) => Ok(DaemonResponse::new(
                StatusCode::from_u16(code).unwrap(),
                body(chunks, true),
            )),
            Reply::Unavailable => Err(ClientError::ServiceUnavailable),
            Reply::Fail(message) => Err(ClientError::generic(message)),
        }
    }
}

pub fn client(replies: Vec<Reply>) -> (ModelClient, ScriptedTransport) {
    let transport = ScriptedTransport::new(replies);
    (ModelClient::with_transport(transport.clone()), transport)
}

/// JSON list with one tagged model and one untagged model
pub fn models_json() -> String {
    serde_json::json!([
        {
            "id": format!("sha256:{}", DIGEST),
            "tags": ["repo/name:tag"],
            "files": [],
            "created": 1742816981,
            "config": {"format": "gguf", "quantization": "Q4_K_M", "parameters": "361.82 M", "architecture": "llama", "size": "256.35 MiB"}
        },
        {
            "id": format!("sha256:{}", OTHER_DIGEST),
            "tags": ["other/model:latest"],
            "files": [],
            "created": 1742816981,
            "config": {}
        }
    ])
    .to_string()
}

pub fn url(path: &str) -> String {
    format!("http://localhost/exp/vDD4.40{}", path)
}
