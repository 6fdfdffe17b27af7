//! Model client facade
//!
//! One method per daemon operation. Every call re-queries the daemon; the
//! client holds nothing but the transport, so clones are cheap and may be
//! used from concurrent tasks.

use crate::config::DaemonConfig;
use crate::errors::{ClientError, ErrorKind, ProgressFailure, RemoveFailure, Result};
use crate::models::resolve::{find_model_name, is_qualified_name};
use crate::protocol::{self, Model, ModelCreateRequest, OpenAIChatRequest, Status};
use crate::streaming::{ChatStream, ProgressOperation, ProgressOutcome, ProgressStream};
use crate::transport::{DaemonRequest, DaemonResponse, ReqwestTransport, Transport};
use reqwest::{Method, StatusCode};
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

/// Client for the model runner daemon
#[derive(Clone)]
pub struct ModelClient {
    transport: Arc<dyn Transport>,
}

impl ModelClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self {
        Self::new(Arc::new(transport))
    }

    /// Client backed by the HTTP transport described in `config`
    pub fn connect(config: &DaemonConfig) -> Result<Self> {
        let transport = ReqwestTransport::with_config(config.port, config.timeout())?;
        Ok(Self::with_transport(transport))
    }

    /// Liveness probe; a daemon that is simply not running is not an error
    pub async fn status(&self) -> Status {
        let probe_route = protocol::MODELS_PREFIX;
        let response = match self.do_request(Method::GET, probe_route, None).await {
            Ok(response) => response,
            Err(err) => {
                let err = handle_query_error(err, probe_route);
                if err.is(ErrorKind::ServiceUnavailable) {
                    return Status::default();
                }
                return Status {
                    running: false,
                    status: Vec::new(),
                    error: Some(err),
                };
            }
        };

        if response.status != StatusCode::OK {
            return Status {
                running: false,
                status: Vec::new(),
                error: Some(ClientError::generic(format!(
                    "unexpected status code: {}",
                    response.status.as_u16()
                ))),
            };
        }
        drop(response);

        let status = match self.do_request(Method::GET, &protocol::status_route(), None).await {
            Ok(response) => match response.bytes().await {
                Ok(body) => body,
                Err(err) => format!("error reading status body: {}", err).into_bytes(),
            },
            Err(err) => format!("error querying status: {}", err).into_bytes(),
        };

        Status {
            running: true,
            status,
            error: None,
        }
    }

    pub async fn list(&self) -> Result<Vec<Model>> {
        let body = self.list_raw(protocol::MODELS_PREFIX, "").await?;
        decode_json(&body)
    }

    /// Model list in the OpenAI schema, as raw JSON text
    pub async fn list_openai(&self) -> Result<String> {
        let body = self.list_raw(&protocol::openai_models_route(), "").await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Inspect a model by name or short ID
    pub async fn inspect(&self, model: &str) -> Result<Model> {
        let model = if model.is_empty() {
            model.to_string()
        } else {
            self.resolve(model).await?
        };
        let body = self.list_raw(&protocol::model_route(&model), &model).await?;
        decode_json(&body)
    }

    /// Inspect a model in the OpenAI schema, as raw JSON text
    pub async fn inspect_openai(&self, model: &str) -> Result<String> {
        let model = self.resolve(model).await?;
        let route = format!("{}/{}", protocol::openai_models_route(), model);
        let body = self.list_raw(&route, &model).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Pull a model, reporting each progress message to `on_progress`
    pub async fn pull<F>(
        &self,
        model: &str,
        on_progress: F,
    ) -> std::result::Result<ProgressOutcome, ProgressFailure>
    where
        F: FnMut(&str),
    {
        let body = serde_json::to_vec(&ModelCreateRequest {
            from: model.to_string(),
        })
        .map_err(|e| ClientError::wrap("error marshaling request", e))?;

        self.stream_progress(ProgressOperation::Pull, &protocol::create_route(), Some(body), model, on_progress)
            .await
    }

    /// Push a model, reporting each progress message to `on_progress`
    pub async fn push<F>(
        &self,
        model: &str,
        on_progress: F,
    ) -> std::result::Result<ProgressOutcome, ProgressFailure>
    where
        F: FnMut(&str),
    {
        self.stream_progress(ProgressOperation::Push, &protocol::push_route(model), None, model, on_progress)
            .await
    }

    /// Tag `source` as `repo:tag`; the daemon must answer 201 Created
    pub async fn tag(&self, source: &str, repo: &str, tag: &str) -> Result<String> {
        let route = protocol::tag_route(source, repo, tag);
        let response = self
            .do_request(Method::POST, &route, None)
            .await
            .map_err(|err| handle_query_error(err, &route))?;

        if response.status != StatusCode::CREATED {
            let status = response.status;
            let body = read_body_lossy(response).await;
            return Err(ClientError::generic(format!(
                "tagging failed with status {}: {}",
                status, body
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ClientError::wrap("failed to read response body", e))
    }

    /// Remove models one by one, stopping at the first failure
    pub async fn remove<S: AsRef<str>>(&self, models: &[S]) -> std::result::Result<String, RemoveFailure> {
        let mut removed = String::new();

        for reference in models {
            let model = match self.resolve(reference.as_ref()).await {
                Ok(model) => model,
                Err(error) => return Err(RemoveFailure { removed, error }),
            };

            let route = protocol::model_route(&model);
            let response = match self.do_request(Method::DELETE, &route, None).await {
                Ok(response) => response,
                Err(err) => {
                    return Err(RemoveFailure {
                        removed,
                        error: handle_query_error(err, &route),
                    })
                }
            };

            if response.status != StatusCode::OK {
                let status = response.status;
                let body = read_body_lossy(response).await;
                return Err(RemoveFailure {
                    removed,
                    error: ClientError::generic(format!(
                        "removing {} failed with status {}: {}",
                        model, status, body
                    )),
                });
            }

            info!(model = %model, "model removed");
            removed.push_str(&format!("Model {} removed successfully\n", model));
        }

        Ok(removed)
    }

    /// Single-turn chat, writing reply fragments to `sink` as they arrive
    pub async fn chat<W: Write + ?Sized>(&self, model: &str, prompt: &str, sink: &mut W) -> Result<()> {
        self.chat_stream(model, prompt).await?.copy_to(sink).await
    }

    /// Single-turn chat as a lazy sequence of reply fragments
    pub async fn chat_stream(&self, model: &str, prompt: &str) -> Result<ChatStream> {
        let body = serde_json::to_vec(&OpenAIChatRequest::single_turn(model, prompt))
            .map_err(|e| ClientError::wrap("error marshaling request", e))?;

        let route = protocol::chat_completions_route();
        let response = self
            .do_request(Method::POST, &route, Some(body))
            .await
            .map_err(|err| handle_query_error(err, &route))?;

        if response.status != StatusCode::OK {
            let status = response.status.as_u16();
            let body = read_body_lossy(response).await;
            return Err(ClientError::generic(format!(
                "error response: status={} body={}",
                status, body
            )));
        }

        Ok(ChatStream::new(response.into_body()))
    }

    async fn stream_progress<F>(
        &self,
        operation: ProgressOperation,
        route: &str,
        body: Option<Vec<u8>>,
        model: &str,
        on_progress: F,
    ) -> std::result::Result<ProgressOutcome, ProgressFailure>
    where
        F: FnMut(&str),
    {
        let response = self
            .do_request(Method::POST, route, body)
            .await
            .map_err(|err| handle_query_error(err, route))?;

        if response.status != StatusCode::OK {
            let status = response.status;
            let body = read_body_lossy(response).await;
            let verb = match operation {
                ProgressOperation::Pull => "pulling",
                ProgressOperation::Push => "pushing",
            };
            return Err(ClientError::generic(format!(
                "{} {} failed with status {}: {}",
                verb, model, status, body
            ))
            .into());
        }

        let outcome = ProgressStream::new(response.into_body(), operation, model)
            .drain(on_progress)
            .await?;
        info!(model = %model, ?operation, "progress stream completed");
        Ok(outcome)
    }

    /// Resolve a name or short ID to a fully-qualified model name
    async fn resolve(&self, reference: &str) -> Result<String> {
        if is_qualified_name(reference) {
            return Ok(reference.to_string());
        }

        match self.model_name_from_id(reference).await {
            Ok(name) => Ok(name),
            Err(err) if err.is(ErrorKind::ServiceUnavailable) => Err(err),
            Err(err) => {
                debug!(reference = %reference, error = %err, "model reference did not resolve");
                Err(ClientError::InvalidReference(reference.to_string()))
            }
        }
    }

    async fn model_name_from_id(&self, id: &str) -> Result<String> {
        let models = self.list().await?;
        find_model_name(&models, id)
            .map(str::to_string)
            .ok_or_else(|| ClientError::generic(format!("model with ID {} not found", id)))
    }

    /// GET a route and return its body; 404 on a named model is `NotFound`
    async fn list_raw(&self, route: &str, model: &str) -> Result<Vec<u8>> {
        let response = self
            .do_request(Method::GET, route, None)
            .await
            .map_err(|err| handle_query_error(err, route))?;

        if response.status != StatusCode::OK {
            if !model.is_empty() && response.status == StatusCode::NOT_FOUND {
                return Err(ClientError::NotFound {
                    model: model.to_string(),
                });
            }
            return Err(ClientError::generic(format!(
                "failed to list models: {}",
                response.status
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| ClientError::wrap("failed to read response body", e))
    }

    /// Send one request; a 503 never reaches the caller as a response
    async fn do_request(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<DaemonResponse> {
        let url = protocol::url(path);
        debug!(%method, %url, "daemon request");

        let mut request = DaemonRequest::new(method, url);
        if let Some(body) = body {
            request = request.with_json_body(body);
        }

        let response = self.transport.send(request).await?;
        if response.status == StatusCode::SERVICE_UNAVAILABLE {
            drop(response);
            return Err(ClientError::ServiceUnavailable);
        }
        Ok(response)
    }
}

/// Pass `ServiceUnavailable` through untouched, add route context to the rest
fn handle_query_error(err: ClientError, path: &str) -> ClientError {
    if err.is(ErrorKind::ServiceUnavailable) {
        return ClientError::ServiceUnavailable;
    }
    ClientError::wrap(format!("error querying {}", path), err)
}

fn decode_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ClientError::wrap("failed to unmarshal response body", e))
}

async fn read_body_lossy(response: DaemonResponse) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(err) => format!("(failed to read response body: {})", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_query_error_keeps_service_unavailable() {
        let err = handle_query_error(ClientError::ServiceUnavailable, "/models");
        assert!(err.is(ErrorKind::ServiceUnavailable));
    }

    #[test]
    fn test_handle_query_error_adds_route() {
        let err = handle_query_error(ClientError::generic("connection reset"), "/models/create");
        assert!(err.is(ErrorKind::Generic));
        assert_eq!(err.to_string(), "error querying /models/create: connection reset");
    }

    #[test]
    fn test_decode_json_error() {
        let err = decode_json::<Vec<Model>>(b"{not json").unwrap_err();
        assert!(err.to_string().starts_with("failed to unmarshal response body"));
    }

    #[test]
    fn test_connect_uses_config() {
        let config = DaemonConfig::default();
        assert!(ModelClient::connect(&config).is_ok());
    }
}
