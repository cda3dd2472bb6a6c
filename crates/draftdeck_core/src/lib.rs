//! Client core for DraftDeck, an AI-assisted document authoring service.
//! This crate owns session, catalog and document state; DocService does the
//! generation, persistence and rendering.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use api::{ApiClient, DocTransport, HttpTransport, Payload, SharedToken};
pub use config::{ClientConfig, ConfigError, SameSectionPolicy};
pub use error::{ClientError, ClientResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::credential::{Credential, Identity};
pub use model::draft::{CreateProjectRequest, DraftSectionSpec, ProjectDraft};
pub use model::project::{DocType, Project, ProjectId, Section, SectionId};
pub use model::validation::ValidationError;
pub use repo::credential_repo::{CredentialRepository, RepoError, SqliteCredentialRepository};
pub use service::activity::{ActivityTracker, OperationKind};
pub use service::catalog::ProjectCatalog;
pub use service::document::{DocumentSession, SectionStatus};
pub use service::export::ExportedDocument;
pub use service::session_store::SessionStore;
pub use service::view::{AuthMode, Screen, ViewController, ViewEvent};
pub use service::workbench::Workbench;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
