//! On-disk document schema
//!
//! The notes file is one JSON object keyed by note id:
//!
//! ```json
//! {
//!   "0190b6c2-...": {
//!     "title": "Meeting Notes",
//!     "content": "Discuss project timeline",
//!     "tags": ["work", "meeting"],
//!     "created_at": "2024-07-01T09:30:00Z",
//!     "updated_at": "2024-07-01T09:30:00Z"
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Note;

/// One value of the notes document; the id is the key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNote {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The whole notes document as written to disk
pub type NotesDocument = BTreeMap<String, StoredNote>;

impl StoredNote {
    pub fn into_note(self, id: Uuid) -> Note {
        Note {
            id,
            title: self.title,
            content: self.content,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&Note> for StoredNote {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Build the on-disk document from in-memory notes
pub fn to_document<'a>(notes: impl IntoIterator<Item = &'a Note>) -> NotesDocument {
    notes
        .into_iter()
        .map(|note| (note.id.to_string(), StoredNote::from(note)))
        .collect()
}

/// Turn a parsed document back into notes, rejecting keys that are not ids
pub fn from_document(doc: NotesDocument) -> Result<BTreeMap<Uuid, Note>, String> {
    doc.into_iter()
        .map(|(key, stored)| {
            let id = Uuid::parse_str(&key).map_err(|e| format!("invalid note id '{}': {}", key, e))?;
            Ok((id, stored.into_note(id)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_keys_are_ids() {
        let mut note = Note::new("Keyed");
        note.add_tag("x");

        let doc = to_document([&note]);
        let json = serde_json::to_value(&doc).unwrap();
        let value = &json[note.id.to_string()];

        assert_eq!(value["title"], "Keyed");
        assert_eq!(value["tags"][0], "x");
        assert!(value.get("id").is_none());
        assert!(value["created_at"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_from_document_restores_ids() {
        let note = Note::new("Restored");
        let notes = from_document(to_document([&note])).unwrap();
        assert_eq!(notes.get(&note.id), Some(&note));
    }

    #[test]
    fn test_from_document_rejects_bad_keys() {
        let note = Note::new("Bad key");
        let mut doc = NotesDocument::new();
        doc.insert("not-an-id".into(), StoredNote::from(&note));

        let err = from_document(doc).unwrap_err();
        assert!(err.contains("not-an-id"));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"title":"Bare","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}"#;
        let stored: StoredNote = serde_json::from_str(json).unwrap();
        assert!(stored.content.is_empty());
        assert!(stored.tags.is_empty());
    }
}
