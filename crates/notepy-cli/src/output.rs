//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use notepy_core::{CertificateStatus, ImportReport, Note, ResourceStatus, TagCount};
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - ids only
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Print a single note in full
    pub fn print_note(&self, note: &Note) -> Result<()> {
        println!("{}", self.render_note(note)?);
        Ok(())
    }

    /// Print a note after a change
    ///
    /// JSON mode prints only the note so stdout stays one document.
    pub fn print_saved_note(&self, message: &str, note: &Note) -> Result<()> {
        println!("{}", self.render_saved_note(message, note)?);
        Ok(())
    }

    fn render_saved_note(&self, message: &str, note: &Note) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(format!("✓ {}\n{}", message, self.render_note(note)?)),
            OutputFormat::Json | OutputFormat::Quiet => self.render_note(note),
        }
    }

    fn render_note(&self, note: &Note) -> Result<String> {
        match self.format {
            OutputFormat::Human => {
                let mut out = String::new();
                writeln!(out, "ID:      {}", note.id)?;
                writeln!(out, "Title:   {}", note.title)?;
                if !note.tags.is_empty() {
                    writeln!(out, "Tags:    {}", note.tags.join(", "))?;
                }
                writeln!(out, "Created: {}", note.created_at.format("%Y-%m-%d %H:%M"))?;
                write!(out, "Updated: {}", note.updated_at.format("%Y-%m-%d %H:%M"))?;
                if !note.content.is_empty() {
                    write!(out, "\n\n{}", note.content)?;
                }
                Ok(out)
            }
            OutputFormat::Json => {
                serde_json::to_string_pretty(note).context("Failed to serialize output")
            }
            OutputFormat::Quiet => Ok(note.id.to_string()),
        }
    }

    /// Print notes as a compact table
    pub fn print_notes(&self, notes: &[Note]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if notes.is_empty() {
                    println!("No notes found.");
                    return Ok(());
                }
                for note in notes {
                    println!("{}", note_row(note));
                }
                println!("\n{} note(s)", notes.len());
            }
            OutputFormat::Json => print_json(notes)?,
            OutputFormat::Quiet => {
                for note in notes {
                    println!("{}", note.id);
                }
            }
        }
        Ok(())
    }

    /// Print distinct tags with usage counts
    pub fn print_tags(&self, tags: &[TagCount]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return Ok(());
                }
                for tag in tags {
                    println!("{} ({})", tag.name, tag.count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => print_json(tags)?,
            OutputFormat::Quiet => {
                for tag in tags {
                    println!("{}", tag.name);
                }
            }
        }
        Ok(())
    }

    pub fn print_import_report(&self, report: &ImportReport) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("✓ Imported {} note(s)", report.imported_count());
                for failure in &report.failures {
                    eprintln!(
                        "  skipped #{} '{}': {}",
                        failure.index, failure.title, failure.reason
                    );
                }
            }
            OutputFormat::Json => print_json(&serde_json::json!({
                "imported_count": report.imported_count(),
                "imported": report.imported,
                "errors": report.failures,
            }))?,
            OutputFormat::Quiet => {
                for note in &report.imported {
                    println!("{}", note.id);
                }
            }
        }
        Ok(())
    }

    /// Print the result of `bootstrap check`
    pub fn print_bootstrap_status(
        &self,
        resources: &ResourceStatus,
        certificate: &CertificateStatus,
        config_error: Option<&str>,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Resource directory: {}", resources.resource_dir_path.display());
                println!();
                println!("Structure:");
                print_check("resource directory", resources.resource_dir_exists);
                print_check("ssl/", resources.ssl_dir_exists);
                print_check("notes/", resources.notes_dir_exists);
                print_check("logs/", resources.logs_dir_exists);
                println!();
                println!("SSL:");
                print_check("certificate", certificate.cert_file_exists);
                print_check("private key", certificate.key_file_exists);
                if certificate.cert_file_exists {
                    print_check("certificate valid", certificate.cert_valid);
                }
                if let Some(expires) = certificate.expires {
                    println!(
                        "  expires {} ({} day(s) remaining)",
                        expires.format("%Y-%m-%d"),
                        certificate.days_remaining
                    );
                }
                println!();
                println!("Configuration:");
                print_check("config.toml", resources.config_file_exists);
                if let Some(err) = config_error {
                    println!("  ✗ {}", err);
                }
                if !resources.is_complete() {
                    println!();
                    println!("Run 'notepy bootstrap init' to create missing resources.");
                }
            }
            OutputFormat::Json => print_json(&serde_json::json!({
                "resources": resources,
                "certificate": certificate,
                "config_valid": config_error.is_none(),
                "config_error": config_error,
            }))?,
            OutputFormat::Quiet => {}
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Write `value` as JSON to `path`, creating parent directories
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;
    write_text_file(path, &text)
}

pub fn write_text_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write file: {:?}", path))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

fn print_check(label: &str, ok: bool) {
    println!("  {} {}", if ok { "✓" } else { "✗" }, label);
}

fn note_row(note: &Note) -> String {
    let id = note.id.to_string();
    format!(
        "{} | {} | {}",
        &id[..8],
        truncate(&note.title, 40),
        truncate(&note.tags.join(", "), 30)
    )
}

/// Truncate to `max_chars` characters, adding "..." if truncated
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
