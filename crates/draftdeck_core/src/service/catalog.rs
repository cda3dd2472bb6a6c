//! The signed-in user's project list.
//!
//! # Invariants
//! - The local list only changes after a successful call.
//! - `clear` starts a new epoch; responses to calls issued before it are
//!   returned to their caller but not applied.

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::model::draft::ProjectDraft;
use crate::model::project::{Project, ProjectId};
use crate::service::activity::{ActivityTracker, OperationKind, OperationTarget};
use log::{debug, info};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct CatalogState {
    epoch: u64,
    projects: Vec<Project>,
}

pub struct ProjectCatalog {
    api: ApiClient,
    state: Mutex<CatalogState>,
    activity: ActivityTracker,
}

impl ProjectCatalog {
    pub fn new(api: ApiClient, activity: ActivityTracker) -> Self {
        Self {
            api,
            state: Mutex::new(CatalogState::default()),
            activity,
        }
    }

    /// Fetches the project list and replaces the local copy with it.
    pub async fn list(&self) -> ClientResult<Vec<Project>> {
        let epoch = self.epoch();
        let _busy = self
            .activity
            .begin(OperationKind::ListProjects, OperationTarget::none());

        let projects = self.api.list_projects().await?;
        let mut state = self.lock();
        if state.epoch == epoch {
            state.projects = projects.clone();
        } else {
            debug!("event=catalog_list module=catalog status=stale");
        }
        Ok(projects)
    }

    /// Re-reads the list from the server.
    pub async fn refresh(&self) -> ClientResult<()> {
        self.list().await.map(drop)
    }

    /// Submits the draft and appends the created project.
    ///
    /// Sections are renumbered `1..=N` by row position before sending.
    pub async fn create(&self, draft: &ProjectDraft) -> ClientResult<Project> {
        let request = draft.to_request()?;
        let epoch = self.epoch();
        let _busy = self
            .activity
            .begin(OperationKind::CreateProject, OperationTarget::none());

        let project = self.api.create_project(&request).await?;
        info!(
            "event=project_create module=catalog status=ok project_id={} sections={}",
            project.id,
            project.sections.len()
        );

        let mut state = self.lock();
        if state.epoch == epoch {
            state.projects.push(project.clone());
        }
        Ok(project)
    }

    /// Deletes on the server, then drops the project from the local list.
    ///
    /// An id the server no longer knows comes back as a remote error.
    pub async fn delete(&self, id: ProjectId) -> ClientResult<()> {
        let _busy = self
            .activity
            .begin(OperationKind::DeleteProject, OperationTarget::project(id));

        self.api.delete_project(id).await?;
        self.lock().projects.retain(|project| project.id != id);
        info!("event=project_delete module=catalog status=ok project_id={id}");
        Ok(())
    }

    /// Local snapshot.
    pub fn projects(&self) -> Vec<Project> {
        self.lock().projects.clone()
    }

    pub fn contains(&self, id: ProjectId) -> bool {
        self.lock().projects.iter().any(|project| project.id == id)
    }

    /// Empties the list and invalidates responses still in flight.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.projects.clear();
        state.epoch += 1;
    }

    fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
