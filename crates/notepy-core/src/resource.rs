//! Resource directory layout
//!
//! Everything Notepy keeps on disk lives under one root:
//!
//! ```text
//! <root>/
//!   config.toml
//!   ssl/server.crt
//!   ssl/server.key
//!   notes/notes.json
//!   logs/
//! ```
//!
//! The root is `$NOTEPY_HOME` when set, otherwise `<local data dir>/notepy`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// Environment variable overriding the resource root
pub const HOME_ENV: &str = "NOTEPY_HOME";

/// Environment variable overriding the config file path
pub const CONFIG_ENV: &str = "NOTEPY_CONFIG";

/// Paths of every resource Notepy uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    root: PathBuf,
}

/// Which parts of the layout exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceStatus {
    pub resource_dir_exists: bool,
    pub ssl_dir_exists: bool,
    pub notes_dir_exists: bool,
    pub logs_dir_exists: bool,
    pub config_file_exists: bool,
    pub ssl_cert_exists: bool,
    pub ssl_key_exists: bool,
    pub resource_dir_path: PathBuf,
}

impl ResourceStatus {
    /// Every directory and file is present
    pub fn is_complete(&self) -> bool {
        self.resource_dir_exists
            && self.ssl_dir_exists
            && self.notes_dir_exists
            && self.logs_dir_exists
            && self.config_file_exists
            && self.ssl_cert_exists
            && self.ssl_key_exists
    }
}

impl ResourceLayout {
    /// Use `$NOTEPY_HOME`, or the platform data directory
    pub fn discover() -> Self {
        let root = match std::env::var(HOME_ENV) {
            Ok(val) if !val.is_empty() => PathBuf::from(val),
            _ => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("notepy"),
        };
        Self { root }
    }

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `--config` wins, then `$NOTEPY_CONFIG`, then `<root>/config.toml`
    pub fn config_path_with(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match std::env::var(CONFIG_ENV) {
            Ok(val) if !val.is_empty() => PathBuf::from(val),
            _ => self.config_path(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn ssl_dir(&self) -> PathBuf {
        self.root.join("ssl")
    }

    pub fn cert_path(&self) -> PathBuf {
        self.ssl_dir().join("server.crt")
    }

    pub fn key_path(&self) -> PathBuf {
        self.ssl_dir().join("server.key")
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.root.join("notes")
    }

    pub fn notes_path(&self) -> PathBuf {
        self.notes_dir().join("notes.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Create every directory in the layout; safe to call repeatedly
    pub fn create_structure(&self) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.ssl_dir(),
            self.notes_dir(),
            self.logs_dir(),
        ] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {:?}", dir))?;
        }
        tracing::info!(root = %self.root.display(), "resource structure ready");
        Ok(())
    }

    pub fn check(&self) -> ResourceStatus {
        ResourceStatus {
            resource_dir_exists: self.root.is_dir(),
            ssl_dir_exists: self.ssl_dir().is_dir(),
            notes_dir_exists: self.notes_dir().is_dir(),
            logs_dir_exists: self.logs_dir().is_dir(),
            config_file_exists: self.config_path().is_file(),
            ssl_cert_exists: self.cert_path().is_file(),
            ssl_key_exists: self.key_path().is_file(),
            resource_dir_path: self.root.clone(),
        }
    }
}
