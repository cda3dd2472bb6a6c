//! Local input validation errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected locally; no request is issued and no state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Refinement prompt is empty after trimming.
    EmptyPrompt,
    /// Comment text is empty after trimming.
    EmptyComment,
    /// Project draft has no section rows.
    NoSections,
    /// Named required field is empty after trimming.
    EmptyField(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPrompt => write!(f, "Enter a refinement prompt."),
            Self::EmptyComment => write!(f, "Enter a comment."),
            Self::NoSections => write!(f, "A project needs at least one section."),
            Self::EmptyField(field) => write!(f, "`{field}` must not be empty."),
        }
    }
}

impl Error for ValidationError {}

/// Returns the trimmed view of `value`, or `err` when nothing is left.
pub fn require_text(value: &str, err: ValidationError) -> Result<&str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed)
    }
}
