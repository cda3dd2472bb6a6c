//! Composition root for one client process.
//!
//! # Responsibility
//! - Wire session, catalog, document and view around one shared `ApiClient`.
//! - Expose user-level actions that update state and navigate in one step.
//! - Turn terminal auth failures on authenticated calls into a full logout.
//!
//! # Invariants
//! - An auth failure only ends the session whose token the failed call
//!   carried; a call issued before a logout or re-login cannot end the
//!   session that replaced it.
//! - Logout clears token, identity, project list and open document, and
//!   lands on the Auth screen; repeating it changes nothing.
//! - Deleting the open project closes it and returns to the Dashboard;
//!   deleting any other project leaves document and screen alone.

use crate::api::{ApiClient, DocTransport, HttpTransport, SharedToken};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::model::credential::Identity;
use crate::model::draft::ProjectDraft;
use crate::model::project::{Project, ProjectId, Section, SectionId};
use crate::repo::credential_repo::{CredentialRepository, SqliteCredentialRepository};
use crate::service::activity::ActivityTracker;
use crate::service::catalog::ProjectCatalog;
use crate::service::document::DocumentSession;
use crate::service::export::ExportedDocument;
use crate::service::session_store::SessionStore;
use crate::service::view::{AuthMode, Screen, ViewController, ViewEvent};
use log::{debug, info, warn};
use std::sync::Arc;

pub struct Workbench {
    session: SessionStore,
    catalog: ProjectCatalog,
    document: DocumentSession,
    view: ViewController,
    activity: ActivityTracker,
}

impl Workbench {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn DocTransport>,
        repo: Arc<dyn CredentialRepository>,
    ) -> Self {
        let activity = ActivityTracker::new();
        let api = ApiClient::new(transport, SharedToken::default());
        Self {
            session: SessionStore::new(api.clone(), repo, activity.clone()),
            catalog: ProjectCatalog::new(api.clone(), activity.clone()),
            document: DocumentSession::new(api, activity.clone(), config.same_section_policy),
            view: ViewController::new(),
            activity,
        }
    }

    /// Workbench over HTTP with the token persisted under `config.data_dir`.
    pub fn connect(config: &ClientConfig) -> ClientResult<Self> {
        let transport =
            HttpTransport::new(config).map_err(|err| ClientError::Network(err.0))?;
        let repo = SqliteCredentialRepository::open(config.token_db_path())
            .map_err(|err| ClientError::Storage(err.into()))?;
        Ok(Self::new(config, Arc::new(transport), Arc::new(repo)))
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn catalog(&self) -> &ProjectCatalog {
        &self.catalog
    }

    pub fn document(&self) -> &DocumentSession {
        &self.document
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    pub fn screen(&self) -> Screen {
        self.view.screen()
    }

    /// Any operation outstanding.
    pub fn is_loading(&self) -> bool {
        self.activity.is_loading()
    }

    /// Resumes a persisted session and loads its projects.
    ///
    /// Any failure leaves the client logged out on the Auth screen; nothing
    /// is reported, since the user did not ask for this step.
    pub async fn start(&self) -> Screen {
        if self.session.restore().await.is_none() {
            return self.screen();
        }
        match self.catalog.list().await {
            Ok(_) => self.view.apply(ViewEvent::Authenticated),
            Err(err) => {
                info!("event=startup module=workbench status=discarded error_kind={}", kind_of(&err));
                self.logout();
                self.screen()
            }
        }
    }

    /// Creates an account and switches the Auth form back to login.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> ClientResult<()> {
        self.session.register(email, password, full_name).await?;
        self.view.set_auth_mode(AuthMode::Login);
        Ok(())
    }

    /// Logs in, loads the project list and opens the Dashboard.
    ///
    /// Any document left open by an earlier session is closed. A failed list
    /// load after a good login still lands on the Dashboard (with an empty
    /// list) and returns the list error, unless the failure is an auth
    /// failure, which logs out again.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Identity> {
        let credential = self.session.login(email, password).await?;
        let identity = credential
            .identity
            .ok_or_else(|| ClientError::Auth("identity was not resolved".to_string()))?;
        self.document.close();
        self.view.apply(ViewEvent::Back);

        let listed = self.catalog.list().await;
        if let Err(err) = &listed {
            if err.is_unauthorized() {
                self.logout();
                return Err(ClientError::Auth(err.to_string()));
            }
        }
        self.view.apply(ViewEvent::Authenticated);
        listed.map(|_| identity)
    }

    pub fn logout(&self) {
        self.session.logout();
        self.catalog.clear();
        self.document.close();
        self.view.apply(ViewEvent::AuthLost);
    }

    pub async fn refresh_projects(&self) -> ClientResult<Vec<Project>> {
        let issued_with = self.session.current_token();
        let result = self.catalog.list().await;
        self.guard(issued_with, result)
    }

    /// Creates the project, opens it in the editor, then generates content.
    ///
    /// If generation fails the created (empty) project stays open and the
    /// generation error is returned. If the document was closed (logout)
    /// while the create call ran, the project is returned without being
    /// opened or generated.
    pub async fn create_project(&self, draft: &ProjectDraft) -> ClientResult<Project> {
        let epoch = self.document.epoch();
        let issued_with = self.session.current_token();
        let created = self.catalog.create(draft).await;
        let created = self.guard(issued_with, created)?;
        if !self.document.load_if_current(created.clone(), epoch) {
            debug!(
                "event=project_create module=workbench status=stale project_id={}",
                created.id
            );
            return Ok(created);
        }
        self.view.apply(ViewEvent::ProjectOpened(created.id));

        let issued_with = self.session.current_token();
        let generated = self.document.generate(created.id).await;
        self.guard(issued_with, generated)
    }

    /// Opens a project in the editor. A response that arrives after the
    /// document was closed is returned without navigating.
    pub async fn open_project(&self, id: ProjectId) -> ClientResult<Project> {
        let issued_with = self.session.current_token();
        let opened = self.document.open(id).await;
        let project = self.guard(issued_with, opened)?;
        if self.document.open_project_id() == Some(id) {
            self.view.apply(ViewEvent::ProjectOpened(id));
        }
        Ok(project)
    }

    pub fn back_to_dashboard(&self) -> Screen {
        self.view.apply(ViewEvent::Back)
    }

    /// Deletes a project. Confirmation is the caller's job.
    pub async fn delete_project(&self, id: ProjectId) -> ClientResult<()> {
        let issued_with = self.session.current_token();
        let deleted = self.catalog.delete(id).await;
        self.guard(issued_with, deleted)?;
        if self.document.open_project_id() == Some(id) {
            self.document.close();
        }
        self.view.apply(ViewEvent::ProjectDeleted(id));
        Ok(())
    }

    pub async fn generate(&self, id: ProjectId) -> ClientResult<Project> {
        let issued_with = self.session.current_token();
        let result = self.document.generate(id).await;
        self.guard(issued_with, result)
    }

    pub async fn refine(&self, section_id: SectionId, prompt: &str) -> ClientResult<Section> {
        let issued_with = self.session.current_token();
        let result = self.document.refine(section_id, prompt).await;
        self.guard(issued_with, result)
    }

    pub async fn feedback(&self, section_id: SectionId, liked: bool) -> ClientResult<()> {
        let issued_with = self.session.current_token();
        let result = self.document.feedback(section_id, liked).await;
        self.guard(issued_with, result)
    }

    pub async fn comment(&self, section_id: SectionId, text: &str) -> ClientResult<()> {
        let issued_with = self.session.current_token();
        let result = self.document.comment(section_id, text).await;
        self.guard(issued_with, result)
    }

    pub fn edit_content(&self, section_id: SectionId, text: impl Into<String>) -> ClientResult<()> {
        self.document.edit_content(section_id, text)
    }

    pub async fn export(&self) -> ClientResult<ExportedDocument> {
        let issued_with = self.session.current_token();
        let result = self.document.export().await;
        self.guard(issued_with, result)
    }

    /// Logs out when an authenticated call comes back unauthorized, but only
    /// if the session that issued it (`issued_with`) is still the current one.
    fn guard<T>(&self, issued_with: Option<String>, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(err) = &result {
            let same_session =
                issued_with.is_some() && issued_with == self.session.current_token();
            if err.is_unauthorized() && !same_session {
                debug!(
                    "event=auth_lost module=workbench status=stale error_kind={}",
                    kind_of(err)
                );
            } else if err.is_unauthorized() {
                warn!("event=auth_lost module=workbench status=error error_kind={}", kind_of(err));
                self.logout();
            }
        }
        result
    }
}

fn kind_of(err: &ClientError) -> &'static str {
    match err {
        ClientError::Auth(_) => "auth",
        ClientError::Validation(_) => "validation",
        ClientError::Remote { .. } => "remote",
        ClientError::Network(_) => "network",
        ClientError::Decode(_) => "decode",
        ClientError::Storage(_) => "storage",
        ClientError::NoOpenProject => "no_open_project",
        ClientError::SectionNotFound(_) => "section_not_found",
        ClientError::SectionBusy(_) => "section_busy",
        ClientError::UnsupportedExport { .. } => "unsupported_export",
        ClientError::Io(_) => "io",
    }
}
