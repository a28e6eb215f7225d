//! Note command handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use notepy_core::{
    export, ExportDocument, ExportFormat, NoteDraft, NotePatch, NoteQuery, NoteStore, StoreError,
};

use crate::editor::{confirm, edit_text, trim_edited};
use crate::output::{write_json_file, write_text_file, Output};

/// Fields for `notes create`
pub struct CreateArgs {
    pub title: String,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub edit: bool,
}

/// Fields for `notes edit`
pub struct EditArgs {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub edit: bool,
}

/// Where list-style results go
pub struct Destination {
    pub file: Option<PathBuf>,
    pub pretty: bool,
}

/// Create a new note
pub fn create(store: &mut NoteStore, args: CreateArgs, output: &Output) -> Result<()> {
    let content = if args.edit {
        let initial = args.content.unwrap_or_default();
        Some(trim_edited(&edit_text(&initial)?))
    } else {
        args.content
    };

    let mut draft = NoteDraft::new(args.title);
    draft.content = content;
    if !args.tags.is_empty() {
        draft.tags = Some(args.tags);
    }

    let note = store.create(draft).context("Failed to create note")?;

    output.print_saved_note(&format!("Created note: {}", note.id), &note)
}

/// List notes, optionally filtered by tags and a search term
pub fn list(
    store: &NoteStore,
    tags: Vec<String>,
    search: Option<String>,
    destination: Destination,
    output: &Output,
) -> Result<()> {
    let query = NoteQuery { search, tags };
    let notes = store.list(&query);

    match destination.file {
        Some(path) => {
            write_json_file(&path, &notes, destination.pretty)?;
            output.success(&format!("Wrote {} note(s) to {}", notes.len(), path.display()));
            Ok(())
        }
        None => output.print_notes(&notes),
    }
}

/// Show a single note
pub fn show(store: &NoteStore, id: String, destination: Destination, output: &Output) -> Result<()> {
    let uuid = store.resolve_id(&id)?;
    let note = store.get(uuid)?;

    match destination.file {
        Some(path) => {
            write_json_file(&path, &note, destination.pretty)?;
            output.success(&format!("Wrote note {} to {}", note.id, path.display()));
            Ok(())
        }
        None => output.print_note(&note),
    }
}

/// Change title, content or tags of a note
pub fn edit(store: &mut NoteStore, id: String, args: EditArgs, output: &Output) -> Result<()> {
    let uuid = store.resolve_id(&id)?;

    let content = if args.edit {
        let current = store.get(uuid)?;
        let initial = args.content.unwrap_or(current.content);
        Some(trim_edited(&edit_text(&initial)?))
    } else {
        args.content
    };

    let patch = NotePatch {
        title: args.title,
        content,
        tags: (!args.tags.is_empty()).then_some(args.tags),
    };
    if patch.is_empty() {
        return Err(StoreError::Validation(
            "nothing to update; pass --title, --content, --tag or --edit".into(),
        )
        .into());
    }

    let note = store.update(uuid, patch).context("Failed to update note")?;

    output.print_saved_note("Note updated", &note)
}

/// Delete a note
///
/// Asks first unless `force`; without a terminal to ask on, nothing is deleted.
pub fn delete(store: &mut NoteStore, id: String, force: bool, output: &Output) -> Result<()> {
    let uuid = store.resolve_id(&id)?;
    let note = store.get(uuid)?;

    if !force {
        eprintln!("Delete note: {} - {}", &note.id.to_string()[..8], note.title);
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    store.delete(uuid).context("Failed to delete note")?;

    output.success(&format!("Deleted note: {}", uuid));
    Ok(())
}

/// Search titles and content
pub fn search(store: &NoteStore, query: String, destination: Destination, output: &Output) -> Result<()> {
    list(store, Vec::new(), Some(query), destination, output)
}

/// Write every note to `file`
pub fn export(store: &NoteStore, file: &Path, format: ExportFormat, output: &Output) -> Result<()> {
    let notes = store.export_all();
    let count = notes.len();

    match format {
        ExportFormat::Json => write_json_file(file, &ExportDocument::new(notes), true)?,
        ExportFormat::Markdown => write_text_file(file, &export::render_markdown(&notes))?,
    }

    output.success(&format!("Exported {} note(s) to {}", count, file.display()));
    Ok(())
}

/// Create notes from an export document, a list of entries or a persisted notes file
pub fn import(store: &mut NoteStore, file: &Path, output: &Output) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file: {:?}", file))?;
    let document = export::parse_import(&text)?;

    let report = store
        .import_document(document)
        .context("Failed to import notes")?;
    output.print_import_report(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use notepy_core::NoteLimits;
    use tempfile::TempDir;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    fn open_store(temp_dir: &TempDir) -> NoteStore {
        NoteStore::open(temp_dir.path().join("notes.json"), NoteLimits::default()).unwrap()
    }

    fn create_note(store: &mut NoteStore, title: &str, tags: &[&str]) {
        let args = CreateArgs {
            title: title.into(),
            content: Some(format!("{} body", title)),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            edit: false,
        };
        create(store, args, &quiet()).unwrap();
    }

    #[test]
    fn test_create_and_edit_by_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);
        create_note(&mut store, "Draft", &["work"]);

        let id = store.list(&NoteQuery::default())[0].id;
        let prefix = id.to_string()[..8].to_string();
        let args = EditArgs {
            title: Some("Final".into()),
            content: None,
            tags: Vec::new(),
            edit: false,
        };
        edit(&mut store, prefix, args, &quiet()).unwrap();

        let note = store.get(id).unwrap();
        assert_eq!(note.title, "Final");
        assert_eq!(note.tags, vec!["work"]);
    }

    #[test]
    fn test_edit_without_changes_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);
        create_note(&mut store, "Draft", &[]);
        let id = store.list(&NoteQuery::default())[0].id.to_string();

        let args = EditArgs {
            title: None,
            content: None,
            tags: Vec::new(),
            edit: false,
        };
        let err = edit(&mut store, id, args, &quiet()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_forced_delete() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);
        create_note(&mut store, "Doomed", &[]);
        let id = store.list(&NoteQuery::default())[0].id.to_string();

        delete(&mut store, id.clone(), true, &quiet()).unwrap();
        assert!(store.is_empty());
        assert!(delete(&mut store, id, true, &quiet()).is_err());
    }

    #[test]
    fn test_list_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);
        create_note(&mut store, "One", &["a"]);
        create_note(&mut store, "Two", &["b"]);

        let path = temp_dir.path().join("out").join("list.json");
        let destination = Destination {
            file: Some(path.clone()),
            pretty: false,
        };
        list(&store, vec!["a".into()], None, destination, &quiet()).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.as_array().unwrap().len(), 1);
        assert_eq!(written[0]["title"], "One");
    }

    #[test]
    fn test_export_then_import_into_another_store() {
        let source_dir = TempDir::new().unwrap();
        let mut source = open_store(&source_dir);
        create_note(&mut source, "One", &["a"]);
        create_note(&mut source, "Two", &[]);

        let file = source_dir.path().join("export.json");
        export(&source, &file, ExportFormat::Json, &quiet()).unwrap();

        let target_dir = TempDir::new().unwrap();
        let mut target = open_store(&target_dir);
        import(&mut target, &file, &quiet()).unwrap();

        let titles: Vec<String> = target
            .list(&NoteQuery::default())
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn test_markdown_export() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);
        create_note(&mut store, "Meeting Notes", &["work"]);

        let file = temp_dir.path().join("notes.md");
        export(&store, &file, ExportFormat::Markdown, &quiet()).unwrap();
        let text = std::fs::read_to_string(&file).unwrap();
        assert!(text.contains("## Meeting Notes"));
    }

    #[test]
    fn test_import_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);

        let err = import(&mut store, &temp_dir.path().join("absent.json"), &quiet()).unwrap_err();
        assert_eq!(crate::exit::exit_code(&err), crate::exit::FILE_NOT_FOUND);
    }
}
