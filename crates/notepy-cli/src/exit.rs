//! Process exit codes
//!
//! | code | meaning |
//! |---|---|
//! | 0 | success |
//! | 1 | general error, note or tag not found |
//! | 2 | invalid arguments or input |
//! | 3 | file not found |
//! | 4 | permission denied or persistence failure |

use std::io;

use notepy_core::{StorageError, StoreError};

pub const SUCCESS: u8 = 0;
pub const GENERAL: u8 = 1;
pub const INVALID_INPUT: u8 = 2;
pub const FILE_NOT_FOUND: u8 = 3;
pub const STORAGE: u8 = 4;

/// Exit code for the first recognised error in the chain
pub fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(store) = cause.downcast_ref::<StoreError>() {
            return match store {
                StoreError::Validation(_) | StoreError::DuplicateTag { .. } => INVALID_INPUT,
                StoreError::NotFound(_) | StoreError::TagNotFound { .. } => GENERAL,
                StoreError::Storage(storage) => storage_code(storage),
            };
        }
        if let Some(storage) = cause.downcast_ref::<StorageError>() {
            return storage_code(storage);
        }
        if let Some(io) = cause.downcast_ref::<io::Error>() {
            return match io.kind() {
                io::ErrorKind::NotFound => FILE_NOT_FOUND,
                _ => STORAGE,
            };
        }
    }
    GENERAL
}

/// Machine-readable code for `--json` error output
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(store) = cause.downcast_ref::<StoreError>() {
            return store.code();
        }
        if cause.downcast_ref::<StorageError>().is_some() {
            return "IO_ERROR";
        }
        if let Some(io) = cause.downcast_ref::<io::Error>() {
            return match io.kind() {
                io::ErrorKind::NotFound => "FILE_NOT_FOUND",
                _ => "IO_ERROR",
            };
        }
    }
    "ERROR"
}

/// Recovery hint from the first storage error in the chain
pub fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<StorageError>()
            .or_else(|| match cause.downcast_ref::<StoreError>() {
                Some(StoreError::Storage(storage)) => Some(storage),
                _ => None,
            })
            .and_then(StorageError::recovery_suggestion)
    })
}

fn storage_code(err: &StorageError) -> u8 {
    if err.is_not_found() {
        FILE_NOT_FOUND
    } else {
        STORAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;
    use uuid::Uuid;

    #[test]
    fn test_store_errors() {
        let validation = anyhow::Error::new(StoreError::Validation("bad".into()));
        assert_eq!(exit_code(&validation), INVALID_INPUT);
        assert_eq!(error_code(&validation), "VALIDATION_ERROR");

        let duplicate = anyhow::Error::new(StoreError::DuplicateTag {
            id: Uuid::nil(),
            tag: "a".into(),
        });
        assert_eq!(exit_code(&duplicate), INVALID_INPUT);

        let missing = anyhow::Error::new(StoreError::NotFound("abc".into()));
        assert_eq!(exit_code(&missing), GENERAL);
        assert_eq!(error_code(&missing), "NOT_FOUND");
    }

    #[test]
    fn test_context_does_not_hide_the_cause() {
        let err = Err::<(), _>(StoreError::Validation("bad".into()))
            .context("Failed to create note")
            .unwrap_err();
        assert_eq!(exit_code(&err), INVALID_INPUT);
    }

    #[test]
    fn test_io_errors() {
        let missing = std::fs::read_to_string("/definitely/not/here.json")
            .context("Failed to read import file")
            .unwrap_err();
        assert_eq!(exit_code(&missing), FILE_NOT_FOUND);
        assert_eq!(error_code(&missing), "FILE_NOT_FOUND");

        let denied = anyhow::Error::new(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert_eq!(exit_code(&denied), STORAGE);
    }

    #[test]
    fn test_storage_errors() {
        let storage = StoreError::from(StorageError::from_io(
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            PathBuf::from("/notes.json"),
        ));
        let err = anyhow::Error::new(storage);
        assert_eq!(exit_code(&err), STORAGE);
        assert_eq!(error_code(&err), "IO_ERROR");
    }

    #[test]
    fn test_recovery_hint_follows_storage_errors() {
        let storage = StoreError::from(StorageError::NotFound {
            path: PathBuf::from("/srv/notepy/notes"),
        });
        let err = Err::<(), _>(storage)
            .context("Failed to open notes")
            .unwrap_err();
        assert!(recovery_hint(&err).unwrap().contains("bootstrap init"));

        let validation = anyhow::Error::new(StoreError::Validation("bad".into()));
        assert_eq!(recovery_hint(&validation), None);
        assert_eq!(recovery_hint(&anyhow::anyhow!("other")), None);
    }

    #[test]
    fn test_other_errors_are_general() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code(&err), GENERAL);
        assert_eq!(error_code(&err), "ERROR");
    }
}
