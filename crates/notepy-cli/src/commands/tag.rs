//! Tag command handlers

use anyhow::{Context, Result};

use notepy_core::NoteStore;

use crate::output::Output;

/// List all tags with usage counts
pub fn list(store: &NoteStore, output: &Output) -> Result<()> {
    output.print_tags(&store.tag_counts())
}

pub fn add(store: &mut NoteStore, id: String, tag: String, output: &Output) -> Result<()> {
    let uuid = store.resolve_id(&id)?;
    let note = store
        .add_tag(uuid, &tag)
        .with_context(|| format!("Failed to add tag '{}'", tag))?;

    output.print_saved_note(
        &format!("Added tag '{}' to {}", tag, &note.id.to_string()[..8]),
        &note,
    )
}

pub fn remove(store: &mut NoteStore, id: String, tag: String, output: &Output) -> Result<()> {
    let uuid = store.resolve_id(&id)?;
    let note = store
        .remove_tag(uuid, &tag)
        .with_context(|| format!("Failed to remove tag '{}'", tag))?;

    output.print_saved_note(
        &format!("Removed tag '{}' from {}", tag, &note.id.to_string()[..8]),
        &note,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit;
    use crate::output::OutputFormat;
    use notepy_core::{NoteDraft, NoteLimits};
    use tempfile::TempDir;

    #[test]
    fn test_add_and_remove_tag() {
        let temp_dir = TempDir::new().unwrap();
        let mut store =
            NoteStore::open(temp_dir.path().join("notes.json"), NoteLimits::default()).unwrap();
        let note = store.create(NoteDraft::new("Tagged")).unwrap();
        let output = Output::new(OutputFormat::Quiet);

        add(&mut store, note.id.to_string(), "work".into(), &output).unwrap();
        assert_eq!(store.get(note.id).unwrap().tags, vec!["work"]);

        let dup = add(&mut store, note.id.to_string(), "work".into(), &output).unwrap_err();
        assert_eq!(exit::exit_code(&dup), exit::INVALID_INPUT);

        remove(&mut store, note.id.to_string(), "work".into(), &output).unwrap();
        assert!(store.get(note.id).unwrap().tags.is_empty());

        let missing = remove(&mut store, note.id.to_string(), "work".into(), &output).unwrap_err();
        assert_eq!(exit::exit_code(&missing), exit::GENERAL);
    }
}
