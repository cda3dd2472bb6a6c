//! Pre-creation project form.
//!
//! # Responsibility
//! - Hold the editable project form, including its section rows.
//! - Produce the `POST /projects` body with sections renumbered by position.
//!
//! # Invariants
//! - The form always keeps at least one section row.
//! - Submitted `order` values are `1..=N` in row order, whatever the rows held.

use crate::model::project::DocType;
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

const DEFAULT_FIRST_SECTION_TITLE: &str = "Introduction";

/// One section row of the creation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSectionSpec {
    pub title: String,
    pub order: u32,
}

/// Body of `POST /projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateProjectRequest {
    pub title: String,
    pub topic: String,
    pub doc_type: DocType,
    pub sections: Vec<DraftSectionSpec>,
}

/// Editable project form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub topic: String,
    pub doc_type: DocType,
    pub sections: Vec<DraftSectionSpec>,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectDraft {
    /// Blank `docx` form with a single `Introduction` row.
    pub fn new() -> Self {
        Self {
            title: String::new(),
            topic: String::new(),
            doc_type: DocType::Docx,
            sections: vec![DraftSectionSpec {
                title: DEFAULT_FIRST_SECTION_TITLE.to_string(),
                order: 1,
            }],
        }
    }

    /// Builds a form from explicit section titles.
    pub fn with_sections<I, S>(
        title: impl Into<String>,
        topic: impl Into<String>,
        doc_type: DocType,
        section_titles: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sections = section_titles
            .into_iter()
            .enumerate()
            .map(|(index, title)| DraftSectionSpec {
                title: title.into(),
                order: index as u32 + 1,
            })
            .collect();
        Self {
            title: title.into(),
            topic: topic.into(),
            doc_type,
            sections,
        }
    }

    /// Appends a `Section N` row.
    pub fn add_section(&mut self) {
        let next = self.sections.len() as u32 + 1;
        self.sections.push(DraftSectionSpec {
            title: format!("Section {next}"),
            order: next,
        });
    }

    /// Renames the row at `index`. Returns `false` when out of range.
    pub fn update_section_title(&mut self, index: usize, title: impl Into<String>) -> bool {
        match self.sections.get_mut(index) {
            Some(row) => {
                row.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Removes the row at `index` unless it is the last remaining one.
    pub fn remove_section(&mut self, index: usize) -> bool {
        if self.sections.len() <= 1 || index >= self.sections.len() {
            return false;
        }
        self.sections.remove(index);
        true
    }

    /// Validates the form and returns the request body.
    ///
    /// Titles are trimmed. Row `order` values are discarded and replaced by
    /// the 1-based position of each row.
    pub fn to_request(&self) -> Result<CreateProjectRequest, ValidationError> {
        let title = require_text(&self.title, ValidationError::EmptyField("title"))?;
        if self.sections.is_empty() {
            return Err(ValidationError::NoSections);
        }

        let sections = self
            .sections
            .iter()
            .enumerate()
            .map(|(index, row)| DraftSectionSpec {
                title: row.title.trim().to_string(),
                order: index as u32 + 1,
            })
            .collect();

        Ok(CreateProjectRequest {
            title: title.to_string(),
            topic: self.topic.trim().to_string(),
            doc_type: self.doc_type,
            sections,
        })
    }
}
