//! The open project and every per-section operation against it.
//!
//! # Responsibility
//! - Hold the open project, its local content edits and per-section draft
//!   buffers (refine prompt, comment).
//! - Run generate/refine/feedback/comment/export and fold successful results
//!   back into the open project.
//!
//! # Invariants
//! - Generation replaces the whole project; refinement replaces exactly one
//!   section by id and leaves siblings untouched.
//! - Blank prompts and comments are rejected before any request.
//! - A failed call leaves project, buffers and statuses as they were.
//! - A late result is applied only if the open project still holds the
//!   matching id; otherwise it is returned to the caller and dropped here.
//! - `close` starts a new epoch; a project fetched before it is never loaded.
//! - Concurrent refines of one section race under `SameSectionPolicy::Race`
//!   (the last to complete wins) and are refused under `Exclusive`.

use crate::api::ApiClient;
use crate::config::SameSectionPolicy;
use crate::error::{ClientError, ClientResult};
use crate::model::project::{DocType, Project, ProjectId, Section, SectionId};
use crate::model::validation::{require_text, ValidationError};
use crate::service::activity::{ActivityTracker, OperationKind, OperationTarget};
use crate::service::export::ExportedDocument;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Busy state of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStatus {
    Idle,
    Refining { in_flight: usize },
}

#[derive(Default)]
struct DocumentState {
    epoch: u64,
    project: Option<Project>,
    prompt_drafts: HashMap<SectionId, String>,
    comment_drafts: HashMap<SectionId, String>,
}

impl DocumentState {
    fn require_section(&self, id: SectionId) -> ClientResult<&Project> {
        let project = self.project.as_ref().ok_or(ClientError::NoOpenProject)?;
        if project.section(id).is_none() {
            return Err(ClientError::SectionNotFound(id));
        }
        Ok(project)
    }

    fn open_id(&self) -> Option<ProjectId> {
        self.project.as_ref().map(|project| project.id)
    }
}

pub struct DocumentSession {
    api: ApiClient,
    state: Mutex<DocumentState>,
    activity: ActivityTracker,
    policy: SameSectionPolicy,
}

impl DocumentSession {
    pub fn new(api: ApiClient, activity: ActivityTracker, policy: SameSectionPolicy) -> Self {
        Self {
            api,
            state: Mutex::new(DocumentState::default()),
            activity,
            policy,
        }
    }

    /// Snapshot of the open project.
    pub fn project(&self) -> Option<Project> {
        self.lock().project.clone()
    }

    pub fn open_project_id(&self) -> Option<ProjectId> {
        self.lock().open_id()
    }

    pub fn is_open(&self) -> bool {
        self.lock().project.is_some()
    }

    /// Current epoch; `close` moves it forward.
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    /// Fetches the full project and makes it the open document.
    ///
    /// Unsaved content edits of the previous document are discarded. Draft
    /// buffers survive only for sections that exist in the newly opened one.
    /// A response that arrives after `close` is returned but not loaded.
    pub async fn open(&self, id: ProjectId) -> ClientResult<Project> {
        let epoch = self.epoch();
        let _busy = self
            .activity
            .begin(OperationKind::OpenProject, OperationTarget::project(id));
        let project = self.api.get_project(id).await?;
        if self.load_if_current(project.clone(), epoch) {
            info!("event=project_open module=document status=ok project_id={id}");
        } else {
            debug!("event=project_open module=document status=stale project_id={id}");
        }
        Ok(project)
    }

    /// Makes `project` the open document without a request, provided no
    /// `close` happened since `epoch` was read. Returns whether it loaded.
    pub fn load_if_current(&self, project: Project, epoch: u64) -> bool {
        let mut state = self.lock();
        if state.epoch != epoch {
            return false;
        }
        state
            .prompt_drafts
            .retain(|id, _| project.section(*id).is_some());
        state
            .comment_drafts
            .retain(|id, _| project.section(*id).is_some());
        state.project = Some(project);
        true
    }

    /// Closes the document and drops all draft buffers.
    pub fn close(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        state.project = None;
        state.prompt_drafts.clear();
        state.comment_drafts.clear();
    }

    /// Asks DocService to write every section, then replaces the open
    /// project wholesale with the server's version.
    pub async fn generate(&self, id: ProjectId) -> ClientResult<Project> {
        let _busy = self
            .activity
            .begin(OperationKind::Generate, OperationTarget::project(id));
        let generated = self.api.generate(id).await?;

        let mut state = self.lock();
        if state.open_id() == Some(id) {
            state.project = Some(generated.clone());
            info!("event=project_generate module=document status=ok project_id={id}");
        } else {
            debug!("event=project_generate module=document status=stale project_id={id}");
        }
        Ok(generated)
    }

    /// Rewrites one section following `prompt`.
    pub async fn refine(&self, section_id: SectionId, prompt: &str) -> ClientResult<Section> {
        require_text(prompt, ValidationError::EmptyPrompt)?;
        self.lock().require_section(section_id)?;

        let target = OperationTarget::section(section_id);
        let _busy = match self.policy {
            SameSectionPolicy::Race => self.activity.begin(OperationKind::Refine, target),
            SameSectionPolicy::Exclusive => self
                .activity
                .try_begin_exclusive(OperationKind::Refine, target)
                .ok_or(ClientError::SectionBusy(section_id))?,
        };

        let updated = self.api.refine(section_id, prompt).await?;
        self.apply_section(updated.clone());
        Ok(updated)
    }

    /// Refines using the section's prompt buffer. The buffer is kept.
    pub async fn refine_from_draft(&self, section_id: SectionId) -> ClientResult<Section> {
        let prompt = self.prompt_draft(section_id);
        self.refine(section_id, &prompt).await
    }

    /// Sends a like/dislike signal. Local content is not touched.
    pub async fn feedback(&self, section_id: SectionId, liked: bool) -> ClientResult<()> {
        self.lock().require_section(section_id)?;
        let _busy = self
            .activity
            .begin(OperationKind::Feedback, OperationTarget::section(section_id));
        self.api.feedback(section_id, liked).await?;
        debug!("event=section_feedback module=document status=ok section_id={section_id} liked={liked}");
        Ok(())
    }

    /// Posts a comment. On success the section's comment buffer is emptied,
    /// unless it was edited to something else while the call was running.
    pub async fn comment(&self, section_id: SectionId, text: &str) -> ClientResult<()> {
        require_text(text, ValidationError::EmptyComment)?;
        self.lock().require_section(section_id)?;
        let _busy = self
            .activity
            .begin(OperationKind::Comment, OperationTarget::section(section_id));

        self.api.comment(section_id, text).await?;
        let mut state = self.lock();
        if state.comment_drafts.get(&section_id).map(String::as_str) == Some(text) {
            state.comment_drafts.remove(&section_id);
        }
        drop(state);
        debug!("event=section_comment module=document status=ok section_id={section_id}");
        Ok(())
    }

    /// Comments using the section's comment buffer.
    pub async fn comment_from_draft(&self, section_id: SectionId) -> ClientResult<()> {
        let text = self.comment_draft(section_id);
        self.comment(section_id, &text).await
    }

    /// Local-only content edit. Not sent to the server.
    pub fn edit_content(&self, section_id: SectionId, text: impl Into<String>) -> ClientResult<()> {
        let mut state = self.lock();
        state.require_section(section_id)?;
        if let Some(section) = state
            .project
            .as_mut()
            .and_then(|project| project.section_mut(section_id))
        {
            section.content = Some(text.into());
        }
        Ok(())
    }

    /// Downloads the open project in its own format.
    pub async fn export(&self) -> ClientResult<ExportedDocument> {
        let doc_type = self
            .lock()
            .project
            .as_ref()
            .map(|project| project.doc_type)
            .ok_or(ClientError::NoOpenProject)?;
        self.export_as(doc_type).await
    }

    /// Downloads the open project as `format`, which must be its `doc_type`.
    pub async fn export_as(&self, format: DocType) -> ClientResult<ExportedDocument> {
        let (id, title) = {
            let state = self.lock();
            let project = state.project.as_ref().ok_or(ClientError::NoOpenProject)?;
            if project.doc_type != format {
                return Err(ClientError::UnsupportedExport {
                    doc_type: project.doc_type,
                    requested: format,
                });
            }
            (project.id, project.title.clone())
        };

        let _busy = self
            .activity
            .begin(OperationKind::Export, OperationTarget::project(id));
        let bytes = self.api.export(id, format).await?;
        info!(
            "event=project_export module=document status=ok project_id={id} format={format} bytes={}",
            bytes.len()
        );
        Ok(ExportedDocument::new(&title, format, bytes))
    }

    pub fn section_status(&self, section_id: SectionId) -> SectionStatus {
        match self
            .activity
            .pending_for_section_of(section_id, OperationKind::Refine)
        {
            0 => SectionStatus::Idle,
            in_flight => SectionStatus::Refining { in_flight },
        }
    }

    pub fn set_prompt_draft(&self, section_id: SectionId, text: impl Into<String>) {
        self.lock().prompt_drafts.insert(section_id, text.into());
    }

    pub fn prompt_draft(&self, section_id: SectionId) -> String {
        self.lock()
            .prompt_drafts
            .get(&section_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_comment_draft(&self, section_id: SectionId, text: impl Into<String>) {
        self.lock().comment_drafts.insert(section_id, text.into());
    }

    pub fn comment_draft(&self, section_id: SectionId) -> String {
        self.lock()
            .comment_drafts
            .get(&section_id)
            .cloned()
            .unwrap_or_default()
    }

    fn apply_section(&self, updated: Section) {
        let section_id = updated.id;
        let applied = self
            .lock()
            .project
            .as_mut()
            .is_some_and(|project| project.replace_section(updated));
        if applied {
            info!("event=section_refine module=document status=ok section_id={section_id}");
        } else {
            debug!("event=section_refine module=document status=stale section_id={section_id}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
