//! Note store
//!
//! The `NoteStore` owns every note and is the only writer of the notes
//! document. Notes live in an in-memory map; each mutation is applied to a
//! copy of that map, the copy is written to disk, and only then does it
//! replace the live map. A failed write therefore leaves the store exactly as
//! it was last persisted.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = NoteStore::open(layout.notes_path(), config.notes)?;
//!
//! let note = store.create(NoteDraft::new("Meeting Notes").with_tags(["work"]))?;
//! let work = store.list(&NoteQuery::tagged(["work"]));
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::NoteLimits;
use crate::error::{StoreError, StoreResult};
use crate::export::{ImportDocument, ImportEntry, ImportFailure, ImportReport};
use crate::models::{Note, NoteDraft, NotePatch, NoteQuery, TagCount};
use crate::storage::JsonPersistence;

/// The note collection and its backing file
#[derive(Debug)]
pub struct NoteStore {
    notes: BTreeMap<Uuid, Note>,
    persistence: JsonPersistence,
    limits: NoteLimits,
}

impl NoteStore {
    /// Open the store at `path`
    ///
    /// A missing file is an empty store; nothing is written until the first
    /// mutation.
    pub fn open(path: impl Into<PathBuf>, limits: NoteLimits) -> StoreResult<Self> {
        let persistence = JsonPersistence::new(path);
        let notes = persistence.load()?;
        tracing::debug!(
            path = %persistence.path().display(),
            count = notes.len(),
            "note store opened"
        );
        Ok(Self {
            notes,
            persistence,
            limits,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.persistence.path()
    }

    pub fn limits(&self) -> &NoteLimits {
        &self.limits
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    // ==================== Note Operations ====================

    /// Create a note from a draft
    pub fn create(&mut self, draft: NoteDraft) -> StoreResult<Note> {
        let note = self.build_note(draft)?;

        let mut staged = self.notes.clone();
        staged.insert(note.id, note.clone());
        self.commit(staged)?;

        tracing::info!(note_id = %note.id, "note created");
        Ok(note)
    }

    /// Get a note by ID
    pub fn get(&self, id: Uuid) -> StoreResult<Note> {
        self.notes
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    /// Notes passing `query`, in creation order
    pub fn list(&self, query: &NoteQuery) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .notes
            .values()
            .filter(|note| query.matches(note))
            .cloned()
            .collect();
        sort_by_creation(&mut notes);
        notes
    }

    /// Apply a partial update
    ///
    /// Every supplied field is validated before any is applied.
    pub fn update(&mut self, id: Uuid, patch: NotePatch) -> StoreResult<Note> {
        if let Some(title) = &patch.title {
            self.limits.check_title(title)?;
        }
        if let Some(content) = &patch.content {
            self.limits.check_content(content)?;
        }
        let tags = patch
            .tags
            .map(|tags| self.limits.normalize_tags(tags))
            .transpose()?;

        let note = self.mutate(id, |note| {
            if let Some(title) = patch.title {
                note.title = title;
            }
            if let Some(content) = patch.content {
                note.content = content;
            }
            if let Some(tags) = tags {
                note.tags = tags;
            }
            note.touch();
            Ok(())
        })?;

        tracing::info!(note_id = %id, "note updated");
        Ok(note)
    }

    /// Delete a note
    pub fn delete(&mut self, id: Uuid) -> StoreResult<()> {
        let mut staged = self.notes.clone();
        if staged.remove(&id).is_none() {
            return Err(StoreError::not_found(id));
        }
        self.commit(staged)?;

        tracing::info!(note_id = %id, "note deleted");
        Ok(())
    }

    // ==================== Tag Operations ====================

    /// Add one tag to a note
    pub fn add_tag(&mut self, id: Uuid, tag: &str) -> StoreResult<Note> {
        self.limits.check_tag(tag)?;
        let max_tags = self.limits.max_tags;

        let note = self.mutate(id, |note| {
            if note.has_tag(tag) {
                return Err(StoreError::DuplicateTag {
                    id,
                    tag: tag.to_string(),
                });
            }
            if note.tags.len() >= max_tags {
                return Err(StoreError::Validation(format!(
                    "a note can have at most {} tags",
                    max_tags
                )));
            }
            note.add_tag(tag);
            Ok(())
        })?;

        tracing::debug!(note_id = %id, tag, "tag added");
        Ok(note)
    }

    /// Remove one tag from a note
    pub fn remove_tag(&mut self, id: Uuid, tag: &str) -> StoreResult<Note> {
        let note = self.mutate(id, |note| {
            if note.remove_tag(tag) {
                Ok(())
            } else {
                Err(StoreError::TagNotFound {
                    id,
                    tag: tag.to_string(),
                })
            }
        })?;

        tracing::debug!(note_id = %id, tag, "tag removed");
        Ok(note)
    }

    /// Distinct tags with how many notes carry each, sorted by name
    pub fn tag_counts(&self) -> Vec<TagCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for note in self.notes.values() {
            for tag in &note.tags {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .map(|(name, count)| TagCount {
                name: name.to_string(),
                count,
            })
            .collect()
    }

    // ==================== Export / Import ====================

    /// Every note, in creation order
    pub fn export_all(&self) -> Vec<Note> {
        self.list(&NoteQuery::default())
    }

    /// Create a fresh note for each valid entry
    ///
    /// Invalid entries are skipped and reported. Valid ones are written with
    /// a single persist; nothing is written when none are valid.
    pub fn import_notes(&mut self, entries: Vec<ImportEntry>) -> StoreResult<ImportReport> {
        self.import_indexed(entries.into_iter().enumerate(), Vec::new())
    }

    /// Import a parsed document; entries that are not note objects are reported too
    pub fn import_document(&mut self, document: ImportDocument) -> StoreResult<ImportReport> {
        let (entries, failures) = document.into_entries();
        self.import_indexed(entries, failures)
    }

    fn import_indexed(
        &mut self,
        entries: impl IntoIterator<Item = (usize, ImportEntry)>,
        failures: Vec<ImportFailure>,
    ) -> StoreResult<ImportReport> {
        let mut report = ImportReport {
            imported: Vec::new(),
            failures,
        };
        for (index, entry) in entries {
            match self.build_note(entry.to_draft()) {
                Ok(note) => report.imported.push(note),
                Err(e) => report.failures.push(ImportFailure {
                    index,
                    title: entry.display_title().to_string(),
                    reason: e.to_string(),
                }),
            }
        }
        report.failures.sort_by_key(|f| f.index);

        if !report.imported.is_empty() {
            let mut staged = self.notes.clone();
            for note in &report.imported {
                staged.insert(note.id, note.clone());
            }
            self.commit(staged)?;
        }

        tracing::info!(
            count = report.imported.len(),
            failed = report.failures.len(),
            "notes imported"
        );
        Ok(report)
    }

    // ==================== Lookup ====================

    /// Resolve a full id or a unique id prefix
    pub fn resolve_id(&self, text: &str) -> StoreResult<Uuid> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::Validation("note id must not be empty".into()));
        }
        if let Ok(id) = Uuid::parse_str(text) {
            return if self.notes.contains_key(&id) {
                Ok(id)
            } else {
                Err(StoreError::not_found(id))
            };
        }

        let prefix = text.to_ascii_lowercase();
        let matches: Vec<Uuid> = self
            .notes
            .keys()
            .filter(|id| id.to_string().starts_with(&prefix))
            .copied()
            .collect();

        match matches.as_slice() {
            [] => Err(StoreError::NotFound(text.to_string())),
            [id] => Ok(*id),
            _ => Err(StoreError::Validation(format!(
                "id prefix '{}' matches {} notes",
                text,
                matches.len()
            ))),
        }
    }

    // ==================== Internals ====================

    /// Validate a draft and turn it into a new note (not yet stored)
    fn build_note(&self, draft: NoteDraft) -> StoreResult<Note> {
        self.limits.check_title(&draft.title)?;
        let content = draft.content.unwrap_or_default();
        self.limits.check_content(&content)?;
        let tags = self.limits.normalize_tags(draft.tags.unwrap_or_default())?;

        let mut note = Note::new(draft.title);
        note.content = content;
        note.tags = tags;
        Ok(note)
    }

    /// Change one note on a staged copy and commit it
    fn mutate<F>(&mut self, id: Uuid, change: F) -> StoreResult<Note>
    where
        F: FnOnce(&mut Note) -> StoreResult<()>,
    {
        let mut staged = self.notes.clone();
        let note = staged.get_mut(&id).ok_or_else(|| StoreError::not_found(id))?;
        change(note)?;
        let note = note.clone();
        self.commit(staged)?;
        Ok(note)
    }

    /// Persist a staged map and make it live
    fn commit(&mut self, staged: BTreeMap<Uuid, Note>) -> StoreResult<()> {
        if let Err(e) = self.persistence.save(staged.values()) {
            tracing::warn!(
                path = %self.persistence.path().display(),
                error = %e,
                "failed to persist notes; keeping previous state"
            );
            return Err(e.into());
        }
        self.notes = staged;
        Ok(())
    }
}

fn sort_by_creation(notes: &mut [Note]) {
    notes.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> NoteStore {
        NoteStore::open(notes_path(temp_dir), NoteLimits::default()).unwrap()
    }

    fn notes_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("notes").join("notes.json")
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(store.is_empty());
        // Nothing is written until the first mutation
        assert!(!notes_path(&temp_dir).exists());
    }

    #[test]
    fn test_create_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);

        let note = store
            .create(
                NoteDraft::new("Test Note")
                    .with_content("This is the body")
                    .with_tags(["idea", "idea", "rust"]),
            )
            .unwrap();

        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(note.tags, vec!["idea", "rust"]);

        let retrieved = store.get(note.id).unwrap();
        assert_eq!(retrieved, note);
        assert!(notes_path(&temp_dir).exists());
    }

    #[test]
    fn test_create_rejects_invalid_drafts() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = NoteStore::open(
            notes_path(&temp_dir),
            NoteLimits {
                max_title_length: 5,
                max_content_length: 5,
                max_tags: 1,
            },
        )
        .unwrap();

        for draft in [
            NoteDraft::new(""),
            NoteDraft::new("toolong"),
            NoteDraft::new("ok").with_content("toolong"),
            NoteDraft::new("ok").with_tags(["a", "b"]),
            NoteDraft::new("ok").with_tags([" "]),
        ] {
            assert!(matches!(
                store.create(draft),
                Err(StoreError::Validation(_))
            ));
        }
        assert!(store.is_empty());
        assert!(!notes_path(&temp_dir).exists());
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(matches!(
            store.get(Uuid::now_v7()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_is_in_creation_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);

        let titles = ["one", "two", "three", "four"];
        for title in titles {
            store.create(NoteDraft::new(title)).unwrap();
        }

        let listed: Vec<String> = store
            .list(&NoteQuery::default())
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(listed, titles);
    }

    #[test]
    fn test_update_changes_only_given_fields() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);

        let note = store
            .create(NoteDraft::new("Title").with_content("Body").with_tags(["a"]))
            .unwrap();

        let updated = store
            .update(
                note.id,
                NotePatch {
                    content: Some("New body".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Title");
        assert_eq!(updated.content, "New body");
        assert_eq!(updated.tags, vec!["a"]);
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at >= note.updated_at);
    }

    #[test]
    fn test_update_validates_before_applying() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);
        let note = store.create(NoteDraft::new("Title")).unwrap();

        let result = store.update(
            note.id,
            NotePatch {
                title: Some("Renamed".into()),
                content: Some("x".repeat(100_001)),
                tags: None,
            },
        );

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(store.get(note.id).unwrap().title, "Title");
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);

        let result = store.update(Uuid::now_v7(), NotePatch::default());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);

        let note = store.create(NoteDraft::new("Doomed")).unwrap();
        store.delete(note.id).unwrap();

        assert!(store.is_empty());
        assert!(matches!(
            store.delete(note.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_tags_add_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);
        let note = store.create(NoteDraft::new("Tagged")).unwrap();

        let note = store.add_tag(note.id, "rust").unwrap();
        assert_eq!(note.tags, vec!["rust"]);

        assert!(matches!(
            store.add_tag(note.id, "rust"),
            Err(StoreError::DuplicateTag { .. })
        ));
        assert!(matches!(
            store.add_tag(note.id, "  "),
            Err(StoreError::Validation(_))
        ));

        let note = store.remove_tag(note.id, "rust").unwrap();
        assert!(note.tags.is_empty());
        assert!(matches!(
            store.remove_tag(note.id, "rust"),
            Err(StoreError::TagNotFound { .. })
        ));
    }

    #[test]
    fn test_add_tag_respects_max_tags() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = NoteStore::open(
            notes_path(&temp_dir),
            NoteLimits {
                max_tags: 1,
                ..NoteLimits::default()
            },
        )
        .unwrap();
        let note = store
            .create(NoteDraft::new("Full").with_tags(["only"]))
            .unwrap();

        assert!(matches!(
            store.add_tag(note.id, "more"),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_tag_counts() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);

        store
            .create(NoteDraft::new("A").with_tags(["shared", "zeta"]))
            .unwrap();
        store
            .create(NoteDraft::new("B").with_tags(["shared", "alpha"]))
            .unwrap();

        let counts = store.tag_counts();
        let names: Vec<&str> = counts.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "shared", "zeta"]);
        assert_eq!(counts[1].count, 2);
    }

    #[test]
    fn test_import_skips_invalid_entries() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);

        let report = store
            .import_notes(vec![
                ImportEntry {
                    title: Some("Good".into()),
                    ..Default::default()
                },
                ImportEntry {
                    title: Some("   ".into()),
                    ..Default::default()
                },
                ImportEntry::default(),
            ])
            .unwrap();

        assert_eq!(report.imported_count(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(store.len(), 2);
        assert!(store
            .list(&NoteQuery::default())
            .iter()
            .any(|n| n.title == crate::export::DEFAULT_IMPORT_TITLE));
    }

    #[test]
    fn test_import_document_keeps_good_entries_beside_malformed_ones() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);

        let document = crate::export::parse_import(
            r#"[{"title":"ok"}, 42, {"title":"x","tags":"notalist"}, {"title":""}, {"title":7}]"#,
        )
        .unwrap();
        let report = store.import_document(document).unwrap();

        assert_eq!(report.imported_count(), 1);
        assert_eq!(report.imported[0].title, "ok");
        let indexes: Vec<usize> = report.failures.iter().map(|f| f.index).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4]);
        assert_eq!(store.len(), 1);

        let reopened = test_store(&temp_dir);
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_import_with_nothing_valid_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);

        let report = store
            .import_notes(vec![ImportEntry {
                title: Some(String::new()),
                ..Default::default()
            }])
            .unwrap();

        assert_eq!(report.imported_count(), 0);
        assert!(!notes_path(&temp_dir).exists());
    }

    #[test]
    fn test_resolve_id() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);
        let note = store.create(NoteDraft::new("Findable")).unwrap();
        let full = note.id.to_string();

        assert_eq!(store.resolve_id(&full).unwrap(), note.id);
        assert_eq!(store.resolve_id(&full[..8]).unwrap(), note.id);
        assert_eq!(
            store.resolve_id(&full[..8].to_uppercase()).unwrap(),
            note.id
        );
        assert!(matches!(
            store.resolve_id("zzzz"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.resolve_id(""),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_resolve_ambiguous_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);
        store.create(NoteDraft::new("One")).unwrap();
        store.create(NoteDraft::new("Two")).unwrap();

        // Ids created back to back share their timestamp prefix
        let shared: String = store
            .export_all()
            .iter()
            .map(|n| n.id.to_string())
            .reduce(|a, b| {
                a.chars()
                    .zip(b.chars())
                    .take_while(|(x, y)| x == y)
                    .map(|(x, _)| x)
                    .collect()
            })
            .unwrap();

        if !shared.is_empty() {
            assert!(matches!(
                store.resolve_id(&shared),
                Err(StoreError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();

        let id = {
            let mut store = test_store(&temp_dir);
            let note = store
                .create(NoteDraft::new("Persistent Note").with_content("Body content"))
                .unwrap();
            store.add_tag(note.id, "kept").unwrap();
            note.id
        };

        let store = test_store(&temp_dir);
        let note = store.get(id).unwrap();
        assert_eq!(note.content, "Body content");
        assert_eq!(note.tags, vec!["kept"]);
    }

    #[test]
    fn test_failed_persist_keeps_previous_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);
        let note = store.create(NoteDraft::new("Before")).unwrap();
        let path = notes_path(&temp_dir);
        let bytes_before = std::fs::read(&path).unwrap();

        // A directory where the temp file goes makes every save fail
        std::fs::create_dir(path.with_extension("tmp")).unwrap();

        let result = store.create(NoteDraft::new("After"));
        assert!(matches!(result, Err(StoreError::Storage(_))));
        assert_eq!(store.len(), 1);
        assert_eq!(store.export_all()[0].id, note.id);
        assert_eq!(std::fs::read(&path).unwrap(), bytes_before);

        assert!(store.add_tag(note.id, "x").is_err());
        assert!(store.get(note.id).unwrap().tags.is_empty());
        assert!(store.delete(note.id).is_err());
        assert_eq!(store.len(), 1);
    }
}
