//! Outstanding-operation registry.
//!
//! Replaces a single process-wide "loading" flag with one entry per
//! in-flight operation, so callers can ask both "is anything running" and
//! "is this section busy".

use crate::model::project::{ProjectId, SectionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub type OperationId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Register,
    Login,
    Restore,
    ListProjects,
    CreateProject,
    OpenProject,
    DeleteProject,
    Generate,
    Refine,
    Feedback,
    Comment,
    Export,
}

/// What an operation is acting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationTarget {
    pub project_id: Option<ProjectId>,
    pub section_id: Option<SectionId>,
}

impl OperationTarget {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn project(id: ProjectId) -> Self {
        Self {
            project_id: Some(id),
            section_id: None,
        }
    }

    pub fn section(id: SectionId) -> Self {
        Self {
            project_id: None,
            section_id: Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub id: OperationId,
    pub kind: OperationKind,
    pub target: OperationTarget,
}

#[derive(Clone, Default)]
pub struct ActivityTracker {
    pending: Arc<Mutex<HashMap<OperationId, Operation>>>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operation; it stays pending until the guard drops.
    pub fn begin(&self, kind: OperationKind, target: OperationTarget) -> ActivityGuard {
        let operation = Operation {
            id: Uuid::new_v4(),
            kind,
            target,
        };
        self.lock().insert(operation.id, operation);
        ActivityGuard {
            tracker: self.clone(),
            id: operation.id,
        }
    }

    /// Like `begin`, but refuses when an operation of the same kind on the
    /// same target is already pending. Check and insert happen under one lock.
    pub fn try_begin_exclusive(
        &self,
        kind: OperationKind,
        target: OperationTarget,
    ) -> Option<ActivityGuard> {
        let mut pending = self.lock();
        if pending
            .values()
            .any(|op| op.kind == kind && op.target == target)
        {
            return None;
        }
        let operation = Operation {
            id: Uuid::new_v4(),
            kind,
            target,
        };
        pending.insert(operation.id, operation);
        drop(pending);
        Some(ActivityGuard {
            tracker: self.clone(),
            id: operation.id,
        })
    }

    /// Any operation outstanding.
    pub fn is_loading(&self) -> bool {
        !self.lock().is_empty()
    }

    pub fn pending(&self) -> Vec<Operation> {
        self.lock().values().copied().collect()
    }

    pub fn pending_of(&self, kind: OperationKind) -> usize {
        self.lock().values().filter(|op| op.kind == kind).count()
    }

    pub fn pending_for_section_of(&self, id: SectionId, kind: OperationKind) -> usize {
        self.lock()
            .values()
            .filter(|op| op.kind == kind && op.target.section_id == Some(id))
            .count()
    }

    pub fn pending_for_section(&self, id: SectionId) -> usize {
        self.lock()
            .values()
            .filter(|op| op.target.section_id == Some(id))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<OperationId, Operation>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Removes its operation from the tracker when dropped.
pub struct ActivityGuard {
    tracker: ActivityTracker,
    id: OperationId,
}

impl ActivityGuard {
    pub fn id(&self) -> OperationId {
        self.id
    }
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.tracker.lock().remove(&self.id);
    }
}
