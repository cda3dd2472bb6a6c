//! Client error taxonomy.
//!
//! # Invariants
//! - `Remote` displays the response body verbatim; it is the user-visible
//!   message and is never parsed.
//! - `Network` and `Remote` are both "remote failures" to callers.
//! - Local validation failures never carry a remote status.

use crate::model::project::{DocType, SectionId};
use crate::model::validation::ValidationError;
use crate::repo::credential_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug)]
pub enum ClientError {
    /// Login or identity resolution failed; the session is gone.
    Auth(String),
    /// Rejected locally before any request.
    Validation(ValidationError),
    /// Non-2xx response. `message` is the raw response body.
    Remote { status: u16, message: String },
    /// Transport failure before a status was received.
    Network(String),
    /// 2xx response whose body did not match the expected shape.
    Decode(String),
    /// Durable token storage failed.
    Storage(RepoError),
    /// Document operation issued with no project open.
    NoOpenProject,
    /// Section id is not part of the open project.
    SectionNotFound(SectionId),
    /// A refine for this section is already outstanding (exclusive policy).
    SectionBusy(SectionId),
    /// Export requested in a format other than the project's own.
    UnsupportedExport {
        doc_type: DocType,
        requested: DocType,
    },
    Io(std::io::Error),
}

impl ClientError {
    /// True for failures that should end the session and show the Auth screen.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Remote { status: 401, .. })
    }

    /// True for anything that came back from (or failed to reach) DocService.
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Network(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth(message) => write!(f, "{message}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Remote { status, message } => {
                if message.is_empty() {
                    write!(f, "Request failed: {status}")
                } else {
                    write!(f, "{message}")
                }
            }
            Self::Network(message) => write!(f, "{message}"),
            Self::Decode(message) => write!(f, "unexpected response from server: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::NoOpenProject => write!(f, "no project is open"),
            Self::SectionNotFound(id) => write!(f, "section {id} is not part of the open project"),
            Self::SectionBusy(id) => write!(f, "section {id} is already being refined"),
            Self::UnsupportedExport {
                doc_type,
                requested,
            } => write!(
                f,
                "a {doc_type} project cannot be exported as {requested}"
            ),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ClientError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ClientError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::ClientError;
    use crate::model::validation::ValidationError;

    #[test]
    fn remote_error_displays_body_verbatim() {
        let err = ClientError::Remote {
            status: 400,
            message: r#"{"detail":"Incorrect email or password"}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"{"detail":"Incorrect email or password"}"#);
        assert!(err.is_remote_failure());
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn empty_remote_body_falls_back_to_status() {
        let err = ClientError::Remote {
            status: 502,
            message: String::new(),
        };
        assert_eq!(err.to_string(), "Request failed: 502");
    }

    #[test]
    fn unauthorized_classification() {
        assert!(ClientError::Auth("expired".to_string()).is_unauthorized());
        assert!(ClientError::Remote {
            status: 401,
            message: String::new()
        }
        .is_unauthorized());
        assert!(!ClientError::Network("refused".to_string()).is_unauthorized());
        assert!(ClientError::from(ValidationError::EmptyPrompt).is_validation());
    }
}
