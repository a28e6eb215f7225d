//! Data models for Notepy
//!
//! Defines the note record and the inputs used to create, change and query it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A text note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    /// Unique identifier
    pub id: Uuid,
    /// Note title
    pub title: String,
    /// Note body content
    pub content: String,
    /// Tags for organization
    pub tags: Vec<String>,
    /// When this note was created
    pub created_at: DateTime<Utc>,
    /// When this note was last updated
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Create a new note with a fresh time-ordered id
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            content: String::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the note carries `tag` (case-sensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag, returning false if it was already present
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.has_tag(&tag) {
            return false;
        }
        self.tags.push(tag);
        self.touch();
        true
    }

    /// Remove a tag, returning false if it was not present
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        match self.tags.iter().position(|t| t == tag) {
            Some(pos) => {
                self.tags.remove(pos);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Set all tags (replacing existing), dropping duplicates
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = dedup_tags(tags);
        self.touch();
    }

    /// Refresh `updated_at`, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// Case-insensitive substring match against title or content
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.content.to_lowercase().contains(&needle)
    }

    /// Whether the note carries every tag in `required`
    pub fn has_all_tags(&self, required: &[String]) -> bool {
        required.iter().all(|tag| self.has_tag(tag))
    }
}

/// Fields for a note that does not exist yet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    /// Missing titles deserialize as empty and fail validation
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: None,
            tags: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

/// Filter for listing notes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteQuery {
    /// Substring matched case-insensitively against title or content
    pub search: Option<String>,
    /// Tags a note must all carry
    pub tags: Vec<String>,
}

impl NoteQuery {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search: Some(query.into()),
            tags: Vec::new(),
        }
    }

    pub fn tagged<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search: None,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `note` passes both filters; blank search means no search filter
    pub fn matches(&self, note: &Note) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => note.matches_search(q),
            _ => true,
        };
        search_ok && note.has_all_tags(&self.tags)
    }
}

/// A tag and how many notes carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Drop repeated tags, keeping the first occurrence
pub(crate) fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !unique.contains(&tag) {
            unique.push(tag);
        }
    }
    unique
}
