//! Bootstrap command handlers
//!
//! Prepare the resource directory: folders, default config and a
//! self-signed certificate for the HTTPS server.

use std::path::Path;

use anyhow::{bail, Context, Result};

use notepy_core::{tls, CertificateOptions, Config, ResourceLayout};

use crate::output::Output;

/// Create the layout, write a default config and generate a certificate
///
/// An existing config file is kept unless `force`.
pub fn init(
    layout: &ResourceLayout,
    config_path: &Path,
    options: &CertificateOptions,
    force: bool,
    output: &Output,
) -> Result<()> {
    layout
        .create_structure()
        .context("Failed to create resource directories")?;

    if config_path.exists() && !force {
        output.message(&format!("Keeping existing config: {}", config_path.display()));
    } else {
        Config::default().save_to_path(config_path)?;
        output.message(&format!("Wrote default config: {}", config_path.display()));
    }

    let cert_path = layout.cert_path();
    let key_path = layout.key_path();
    tls::generate_self_signed(&cert_path, &key_path, options)
        .context("Failed to generate SSL certificate")?;
    output.message(&format!(
        "Generated certificate for '{}' valid {} day(s): {}",
        options.common_name,
        options.days_valid,
        cert_path.display()
    ));

    output.success(&format!("Resources ready in {}", layout.root().display()));
    Ok(())
}

/// Report directory, certificate and config status
pub fn check(layout: &ResourceLayout, config_path: &Path, output: &Output) -> Result<()> {
    let mut resources = layout.check();
    resources.config_file_exists = config_path.is_file();
    let certificate = tls::inspect_certificate(&layout.cert_path(), &layout.key_path());

    let config_error = if config_path.exists() {
        Config::load_from_path(config_path)
            .err()
            .map(|e| format!("{:#}", e))
    } else {
        None
    };

    output.print_bootstrap_status(&resources, &certificate, config_error.as_deref())
}

/// Open the resource directory in the system file browser
pub fn open(layout: &ResourceLayout, output: &Output) -> Result<()> {
    let root = layout.root();
    if !root.is_dir() {
        bail!(
            "Resource directory {} does not exist. Run 'notepy bootstrap init' first.",
            root.display()
        );
    }

    open::that(root).with_context(|| format!("Failed to open {}", root.display()))?;
    output.success(&format!("Opened {}", root.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_init_creates_everything() {
        let temp_dir = TempDir::new().unwrap();
        let layout = ResourceLayout::new(temp_dir.path().join("notepy"));
        let config_path = layout.root().join("config.toml");
        let options = CertificateOptions {
            days_valid: 30,
            ..CertificateOptions::default()
        };

        init(&layout, &config_path, &options, false, &quiet()).unwrap();

        let status = layout.check();
        assert!(status.notes_dir_exists);
        assert!(status.ssl_cert_exists);
        assert!(status.ssl_key_exists);
        assert!(config_path.exists());

        let cert = tls::inspect_certificate(&layout.cert_path(), &layout.key_path());
        assert!(cert.cert_valid);
        assert!(cert.days_remaining <= 30);
    }

    #[test]
    fn test_init_keeps_existing_config_unless_forced() {
        let temp_dir = TempDir::new().unwrap();
        let layout = ResourceLayout::new(temp_dir.path());
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[server]\nport = 9000\n").unwrap();
        let options = CertificateOptions::default();

        init(&layout, &config_path, &options, false, &quiet()).unwrap();
        assert!(std::fs::read_to_string(&config_path)
            .unwrap()
            .contains("9000"));

        init(&layout, &config_path, &options, true, &quiet()).unwrap();
        assert!(std::fs::read_to_string(&config_path)
            .unwrap()
            .contains("8443"));
    }

    #[test]
    fn test_open_requires_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let layout = ResourceLayout::new(temp_dir.path().join("missing"));

        let err = open(&layout, &quiet()).unwrap_err();
        assert!(err.to_string().contains("bootstrap init"));
    }
}
