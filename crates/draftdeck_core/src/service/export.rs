//! Downloaded document files.

use crate::model::project::DocType;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static PATH_HOSTILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]+"#).expect("valid file name regex"));

const FALLBACK_FILE_STEM: &str = "document";

/// Rendered document as returned by DocService.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    /// `{title}.{ext}` with path-hostile characters replaced.
    pub file_name: String,
    pub format: DocType,
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    pub fn new(title: &str, format: DocType, bytes: Vec<u8>) -> Self {
        Self {
            file_name: export_file_name(title, format),
            format,
            bytes,
        }
    }

    /// Writes the document into `dir` and returns the full path.
    pub fn save_into(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Builds the download name for a project title.
pub fn export_file_name(title: &str, format: DocType) -> String {
    let cleaned = PATH_HOSTILE_RE.replace_all(title.trim(), "_");
    let stem = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());
    let stem = if stem.is_empty() {
        FALLBACK_FILE_STEM
    } else {
        stem
    };
    format!("{stem}.{}", format.extension())
}
