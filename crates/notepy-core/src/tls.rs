//! Self-signed certificate generation and inspection
//!
//! `notepy bootstrap init` writes a certificate/key pair under `<root>/ssl` so
//! the server can speak HTTPS on a local machine without further setup.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, SanType};
use serde::Serialize;

/// Subject fields and lifetime of a generated certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateOptions {
    pub days_valid: u32,
    pub country: String,
    pub state: String,
    pub locality: String,
    pub organization: String,
    pub common_name: String,
}

impl Default for CertificateOptions {
    fn default() -> Self {
        Self {
            days_valid: 365,
            country: "US".to_string(),
            state: "CA".to_string(),
            locality: "San Francisco".to_string(),
            organization: "Notepy".to_string(),
            common_name: "localhost".to_string(),
        }
    }
}

/// What `inspect_certificate` found on disk
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CertificateStatus {
    pub cert_file_exists: bool,
    pub key_file_exists: bool,
    /// Parsed and currently inside its validity window
    pub cert_valid: bool,
    pub expires: Option<DateTime<Utc>>,
    pub days_remaining: i64,
}

/// Generate a self-signed certificate and its private key
///
/// The certificate names `common_name` and 127.0.0.1 as subject alternative
/// names. The key is PKCS#8 PEM and, on Unix, readable by the owner only.
pub fn generate_self_signed(
    cert_path: &Path,
    key_path: &Path,
    options: &CertificateOptions,
) -> Result<()> {
    if options.days_valid == 0 {
        return Err(anyhow!("certificate must be valid for at least one day"));
    }

    let mut params = CertificateParams::new(vec![options.common_name.clone()])
        .with_context(|| format!("Invalid common name: {}", options.common_name))?;
    let loopback = IpAddr::V4(Ipv4Addr::LOCALHOST);
    if options.common_name.parse::<IpAddr>().ok() != Some(loopback) {
        params.subject_alt_names.push(SanType::IpAddress(loopback));
    }

    let mut name = DistinguishedName::new();
    name.push(DnType::CountryName, options.country.clone());
    name.push(DnType::StateOrProvinceName, options.state.clone());
    name.push(DnType::LocalityName, options.locality.clone());
    name.push(DnType::OrganizationName, options.organization.clone());
    name.push(DnType::CommonName, options.common_name.clone());
    params.distinguished_name = name;

    let now = time::OffsetDateTime::now_utc();
    params.not_before = now;
    params.not_after = now + time::Duration::days(i64::from(options.days_valid));

    let key_pair = KeyPair::generate().context("Failed to generate private key")?;
    let cert = params
        .self_signed(&key_pair)
        .context("Failed to sign certificate")?;

    for path in [cert_path, key_path] {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }
    std::fs::write(cert_path, cert.pem())
        .with_context(|| format!("Failed to write certificate: {:?}", cert_path))?;
    std::fs::write(key_path, key_pair.serialize_pem())
        .with_context(|| format!("Failed to write private key: {:?}", key_path))?;
    restrict_to_owner(key_path)?;

    tracing::info!(
        cert = %cert_path.display(),
        days = options.days_valid,
        common_name = %options.common_name,
        "self-signed certificate generated"
    );
    Ok(())
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to set permissions on {:?}", path))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<()> {
    Ok(())
}

/// Report on the certificate and key at the given paths
///
/// Never fails: a certificate that cannot be read or parsed is reported as
/// not valid and logged.
pub fn inspect_certificate(cert_path: &Path, key_path: &Path) -> CertificateStatus {
    let mut status = CertificateStatus {
        cert_file_exists: cert_path.is_file(),
        key_file_exists: key_path.is_file(),
        ..Default::default()
    };
    if !status.cert_file_exists {
        return status;
    }

    match read_validity(cert_path) {
        Ok((not_before, not_after)) => {
            let now = Utc::now();
            status.expires = Some(not_after);
            if not_before <= now && now <= not_after {
                status.cert_valid = true;
                status.days_remaining = (not_after - now).num_days();
            }
        }
        Err(e) => {
            tracing::warn!(cert = %cert_path.display(), error = %e, "failed to parse certificate");
        }
    }
    status
}

fn read_validity(cert_path: &Path) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let bytes = std::fs::read(cert_path)
        .with_context(|| format!("Failed to read certificate: {:?}", cert_path))?;
    let (_, pem) = x509_parser::pem::parse_x509_pem(&bytes)
        .map_err(|e| anyhow!("invalid PEM: {:?}", e))?;
    let cert = pem
        .parse_x509()
        .map_err(|e| anyhow!("invalid certificate: {:?}", e))?;

    let validity = cert.validity();
    let not_before = DateTime::from_timestamp(validity.not_before.timestamp(), 0)
        .ok_or_else(|| anyhow!("certificate start date out of range"))?;
    let not_after = DateTime::from_timestamp(validity.not_after.timestamp(), 0)
        .ok_or_else(|| anyhow!("certificate end date out of range"))?;
    Ok((not_before, not_after))
}
