//! Raw request/response shapes and the transport trait.

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        })
    }
}

#[derive(Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// Multipart form fields, in submission order.
    Form(Vec<(String, String)>),
}

impl Debug for RequestBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Json(_) => f.write_str("Json(..)"),
            Self::Form(fields) => {
                let names: Vec<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
                f.debug_tuple("Form").field(&names).finish()
            }
        }
    }
}

/// One request as handed to a transport.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the DocService base URL, e.g. `/projects/3`.
    pub path: String,
    /// Bearer token to send, if any.
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl ApiRequest {
    /// Content type the transport must send, `None` when the transport
    /// chooses it (multipart boundary).
    pub fn content_type(&self) -> Option<&'static str> {
        match self.body {
            RequestBody::Form(_) => None,
            RequestBody::Empty | RequestBody::Json(_) => Some(JSON_CONTENT_TYPE),
        }
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.bearer.as_ref().map(|token| format!("Bearer {token}"))
    }

    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl Debug for ApiRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("authenticated", &self.bearer.is_some())
            .field("body", &self.body)
            .finish()
    }
}

/// Undecoded response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|value| value.to_ascii_lowercase().contains(JSON_CONTENT_TYPE))
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Failure before any HTTP status was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for TransportError {}

/// Sends one request to DocService and returns the undecoded response.
///
/// Implementations must not interpret status codes.
#[async_trait]
pub trait DocTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::{ApiRequest, Method, RawResponse, RequestBody};

    #[test]
    fn form_requests_leave_content_type_to_transport() {
        let request = ApiRequest {
            method: Method::Post,
            path: "/auth/login".to_string(),
            bearer: None,
            body: RequestBody::Form(vec![("password".to_string(), "hunter2".to_string())]),
        };
        assert_eq!(request.content_type(), None);
        assert!(!format!("{request:?}").contains("hunter2"));
    }

    #[test]
    fn debug_hides_bearer() {
        let request = ApiRequest {
            method: Method::Get,
            path: "/auth/me".to_string(),
            bearer: Some("tok".to_string()),
            body: RequestBody::Empty,
        };
        assert_eq!(request.content_type(), Some("application/json"));
        assert_eq!(request.authorization_header().as_deref(), Some("Bearer tok"));
        assert!(!format!("{request:?}").contains("tok\""));
    }

    #[test]
    fn json_detection_ignores_charset_suffix() {
        let response = RawResponse {
            status: 200,
            content_type: Some("Application/JSON; charset=utf-8".to_string()),
            body: b"{}".to_vec(),
        };
        assert!(response.is_json());
        assert!(response.is_success());
    }
}
