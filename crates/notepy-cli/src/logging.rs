//! Tracing setup
//!
//! Logs go to stderr so they never mix with command output. `RUST_LOG`
//! overrides the computed level. When `[logging] log_to_file` is set, a
//! second layer writes daily-rotated files under `<resource dir>/logs`.

use std::path::Path;

use notepy_core::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "notepy.log";

/// What the subscriber should do for this invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub log_to_file: bool,
}

impl LogSettings {
    /// Commands stay quiet unless `-v`; the server follows the configured level
    pub fn resolve(verbose: bool, server: bool, config: Option<&LoggingConfig>) -> Self {
        let configured = config.map(|c| c.level.clone());
        let level = if verbose {
            "debug".to_string()
        } else if server {
            configured.unwrap_or_else(|| "info".to_string())
        } else {
            "warn".to_string()
        };
        Self {
            level,
            log_to_file: config.is_some_and(|c| c.log_to_file),
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "notepy_core={level},notepy_api={level},notepy={level},tower_http={level}",
                level = self.level
            ))
        })
    }
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init(settings: &LogSettings, logs_dir: &Path) -> Option<WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = if settings.log_to_file {
        match std::fs::create_dir_all(logs_dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_NAME);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!(
                    "warning: cannot create log directory {}: {}",
                    logs_dir.display(),
                    e
                );
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::registry()
        .with(settings.filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}
