//! Project and section records as served by DocService.
//!
//! # Invariants
//! - `doc_type` never changes after creation and selects the export format.
//! - Sections keep server order; `order` runs 1..N with no gaps.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Server-assigned project identifier.
pub type ProjectId = i64;
/// Server-assigned section identifier.
pub type SectionId = i64;

/// Output document family of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    /// Word-style outline; each section is a heading.
    Docx,
    /// Slide deck; each section is a slide.
    Pptx,
}

impl DocType {
    /// File extension and export path segment.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pptx => "pptx",
        }
    }
}

impl Display for DocType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DocType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "docx" => Ok(Self::Docx),
            "pptx" => Ok(Self::Pptx),
            other => Err(format!("unknown document type `{other}`; expected docx|pptx")),
        }
    }
}

/// One outline heading or slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    pub order: u32,
    /// `None` until generation has run.
    #[serde(default)]
    pub content: Option<String>,
}

impl Section {
    pub fn has_content(&self) -> bool {
        self.content
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }
}

/// A user's document-generation task.
///
/// Summary listings may omit `sections`; they deserialize as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub topic: String,
    pub doc_type: DocType,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Project {
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn section_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|section| section.id == id)
    }

    /// Swaps in `updated` at the position of the section with the same id.
    ///
    /// Every other section is left as-is. Returns `false` when no section
    /// carries that id.
    pub fn replace_section(&mut self, updated: Section) -> bool {
        match self.section_mut(updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    /// True once every section holds non-blank content.
    pub fn is_fully_generated(&self) -> bool {
        !self.sections.is_empty() && self.sections.iter().all(Section::has_content)
    }
}
