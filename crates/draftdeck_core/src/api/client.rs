//! Single entry point for DocService calls.
//!
//! # Responsibility
//! - Read the shared token at send time and attach it as a bearer header.
//! - Turn non-2xx responses into `ClientError::Remote` carrying the raw body.
//! - Parse JSON responses; hand everything else back as bytes.

use super::transport::{ApiRequest, DocTransport, Method, RawResponse, RequestBody};
use crate::error::{ClientError, ClientResult};
use crate::logging::{sanitize_for_log, MAX_LOGGED_TEXT_CHARS};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Token slot shared by the session store (writer) and the API client (reader).
#[derive(Clone, Default)]
pub struct SharedToken(Arc<RwLock<Option<String>>>);

impl SharedToken {
    pub fn get(&self) -> Option<String> {
        self.0
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set(&self, token: Option<String>) {
        *self
            .0
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    pub fn is_present(&self) -> bool {
        self.0
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }
}

/// Decoded 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    /// Non-JSON body, e.g. an exported document.
    Bytes(Vec<u8>),
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn DocTransport>,
    token: SharedToken,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn DocTransport>, token: SharedToken) -> Self {
        Self { transport, token }
    }

    pub fn token(&self) -> &SharedToken {
        &self.token
    }

    /// Sends an authenticated (when a token is held) request and decodes the
    /// payload by content type.
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> ClientResult<Payload> {
        let response = self.dispatch(self.build(path, method, body)).await?;
        if !response.is_json() {
            return Ok(Payload::Bytes(response.body));
        }
        serde_json::from_slice(&response.body)
            .map(Payload::Json)
            .map_err(|err| ClientError::Decode(format!("{method} {path}: {err}")))
    }

    /// Like `request`, then deserializes the JSON payload into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> ClientResult<T> {
        match self.request(path, method, body).await? {
            Payload::Json(value) => serde_json::from_value(value)
                .map_err(|err| ClientError::Decode(format!("{method} {path}: {err}"))),
            Payload::Bytes(_) => Err(ClientError::Decode(format!(
                "{method} {path}: expected a JSON response"
            ))),
        }
    }

    /// Sends the request and only checks the status; the body is ignored.
    pub async fn request_unit(
        &self,
        path: &str,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> ClientResult<()> {
        self.dispatch(self.build(path, method, body)).await.map(drop)
    }

    /// Unauthenticated multipart form submission.
    pub async fn submit_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: Vec<(String, String)>,
    ) -> ClientResult<T> {
        let request = ApiRequest {
            method: Method::Post,
            path: path.to_string(),
            bearer: None,
            body: RequestBody::Form(fields),
        };
        let response = self.dispatch(request).await?;
        serde_json::from_slice(&response.body)
            .map_err(|err| ClientError::Decode(format!("POST {path}: {err}")))
    }

    fn build(&self, path: &str, method: Method, body: Option<serde_json::Value>) -> ApiRequest {
        ApiRequest {
            method,
            path: path.to_string(),
            bearer: self.token.get(),
            body: body.map_or(RequestBody::Empty, RequestBody::Json),
        }
    }

    async fn dispatch(&self, request: ApiRequest) -> ClientResult<RawResponse> {
        let started_at = Instant::now();
        let method = request.method;
        let path = request.path.clone();

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "event=api_request module=api status=error method={} path={} duration_ms={} error_code=network error={}",
                    method,
                    path,
                    started_at.elapsed().as_millis(),
                    sanitize_for_log(&err.0, MAX_LOGGED_TEXT_CHARS)
                );
                return Err(ClientError::Network(err.0));
            }
        };

        if !response.is_success() {
            let message = response.body_text();
            warn!(
                "event=api_request module=api status=error method={} path={} duration_ms={} http_status={} body={}",
                method,
                path,
                started_at.elapsed().as_millis(),
                response.status,
                sanitize_for_log(&message, MAX_LOGGED_TEXT_CHARS)
            );
            return Err(ClientError::Remote {
                status: response.status,
                message,
            });
        }

        debug!(
            "event=api_request module=api status=ok method={} path={} duration_ms={} http_status={} bytes={}",
            method,
            path,
            started_at.elapsed().as_millis(),
            response.status,
            response.body.len()
        );
        Ok(response)
    }
}
