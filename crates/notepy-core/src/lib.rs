//! Notepy Core Library
//!
//! This crate provides the core functionality for Notepy, a personal
//! note-taking application with a REST API and a command-line interface.
//!
//! # Architecture
//!
//! - **NoteStore**: in-memory map of notes, the only writer of the notes file
//! - **JSON persistence**: the whole store is one document, written atomically
//!   on every mutation
//!
//! Search is a linear scan over the map; there is no index.
//!
//! # Quick Start
//!
//! ```text
//! let layout = ResourceLayout::discover();
//! let config = Config::load_from_path(&layout.config_path())?;
//! let mut store = NoteStore::open(layout.notes_path(), config.notes)?;
//!
//! let note = store.create(NoteDraft::new("Meeting Notes").with_tags(["work"]))?;
//! let found = store.list(&NoteQuery::search("meeting"));
//! ```
//!
//! # Modules
//!
//! - `store`: note lifecycle and queries (main entry point)
//! - `models`: notes and the inputs that create, change and filter them
//! - `storage`: JSON document persistence
//! - `export`: export/import documents and Markdown rendering
//! - `config`: application configuration
//! - `resource`: on-disk layout of config, certificates, notes and logs
//! - `tls`: self-signed certificate bootstrap

pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod resource;
pub mod storage;
pub mod store;
pub mod tls;
mod validate;

pub use config::{Config, LoggingConfig, NoteLimits, ServerConfig};
pub use error::{StoreError, StoreResult};
pub use export::{
    ExportDocument, ExportFormat, ImportDocument, ImportEntry, ImportFailure, ImportReport,
};
pub use models::{Note, NoteDraft, NotePatch, NoteQuery, TagCount};
pub use resource::{ResourceLayout, ResourceStatus};
pub use storage::{StorageError, StorageResult};
pub use store::NoteStore;
pub use tls::{CertificateOptions, CertificateStatus};
