//! Export and import documents
//!
//! Exports come in two flavours: a JSON document with a small header, and a
//! Markdown rendering meant for reading. Imports accept the JSON export, a
//! bare array of entries, or a notes file as written by the store.
//!
//! Content is exported exactly as stored. HTML bodies are not converted to
//! Markdown.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::models::{Note, NoteDraft};

/// Version stamped into JSON exports
pub const EXPORT_VERSION: &str = "1.0";

/// Title used for imported entries that carry none
pub const DEFAULT_IMPORT_TITLE: &str = "Imported Note";

/// Full JSON export of the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub notes: Vec<Note>,
}

impl ExportDocument {
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            export_date: Utc::now(),
            version: EXPORT_VERSION.to_string(),
            notes,
        }
    }
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            other => Err(StoreError::Validation(format!(
                "unsupported export format '{}' (expected json or markdown)",
                other
            ))),
        }
    }
}

/// One note to import; ids and timestamps in the source are ignored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl ImportEntry {
    /// Title shown in failure reports
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_IMPORT_TITLE)
    }

    pub(crate) fn to_draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.display_title().to_string(),
            content: self.content.clone(),
            tags: self.tags.clone(),
        }
    }
}

impl From<&Note> for ImportEntry {
    fn from(note: &Note) -> Self {
        Self {
            title: Some(note.title.clone()),
            content: Some(note.content.clone()),
            tags: Some(note.tags.clone()),
        }
    }
}

/// Accepted import shapes, tried in order
///
/// Entries stay raw JSON here so one malformed entry cannot reject the rest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImportDocument {
    /// `{"notes": [...]}`, including full exports
    Export { notes: Vec<Value> },
    /// `[...]`
    List(Vec<Value>),
    /// `{"<id>": {...}}`, the store's own file format
    Keyed(BTreeMap<String, Value>),
}

impl ImportDocument {
    pub fn into_values(self) -> Vec<Value> {
        match self {
            ImportDocument::Export { notes } => notes,
            ImportDocument::List(entries) => entries,
            ImportDocument::Keyed(map) => map.into_values().collect(),
        }
    }

    /// Decode every entry, keeping its position
    ///
    /// Entries that are not note objects come back as failures.
    pub fn into_entries(self) -> (Vec<(usize, ImportEntry)>, Vec<ImportFailure>) {
        let mut entries = Vec::new();
        let mut failures = Vec::new();
        for (index, value) in self.into_values().into_iter().enumerate() {
            let title = value
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_IMPORT_TITLE)
                .to_string();
            match serde_json::from_value::<ImportEntry>(value) {
                Ok(entry) => entries.push((index, entry)),
                Err(e) => failures.push(ImportFailure {
                    index,
                    title,
                    reason: format!("malformed entry: {}", e),
                }),
            }
        }
        (entries, failures)
    }
}

/// Parse import text in any accepted shape
///
/// Only the outer shape is checked here; entries are decoded one by one on import.
pub fn parse_import(text: &str) -> StoreResult<ImportDocument> {
    serde_json::from_str::<ImportDocument>(text)
        .map_err(|e| StoreError::Validation(format!("unrecognized import document: {}", e)))
}

/// An entry that could not be imported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportFailure {
    /// Position of the entry in the import document
    pub index: usize,
    pub title: String,
    #[serde(rename = "message")]
    pub reason: String,
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: Vec<Note>,
    #[serde(rename = "errors")]
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }
}

/// Markdown rendering of a whole export
pub fn render_markdown(notes: &[Note]) -> String {
    let mut out = String::from("# Notepy Export\n\n");
    for note in notes {
        out.push_str(&format!("## {}\n\n", note.title));
        push_metadata(&mut out, note);
        out.push_str(&note.content);
        out.push_str("\n\n---\n\n");
    }
    out
}

/// Markdown rendering of one note
pub fn render_note_markdown(note: &Note) -> String {
    let mut out = format!("# {}\n\n", note.title);
    push_metadata(&mut out, note);
    out.push_str(&note.content);
    out
}

/// File name offered for a single-note markdown download
pub fn markdown_file_name(note: &Note) -> String {
    let stem: String = note
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}.md", stem)
}

fn push_metadata(out: &mut String, note: &Note) {
    out.push_str(&format!("**Created:** {}\n", note.created_at.to_rfc3339()));
    out.push_str(&format!("**Updated:** {}\n", note.updated_at.to_rfc3339()));
    if !note.tags.is_empty() {
        out.push_str(&format!("**Tags:** {}\n", note.tags.join(", ")));
    }
    out.push('\n');
}
