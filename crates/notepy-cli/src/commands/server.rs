//! `notepy server`

use std::path::PathBuf;

use anyhow::Result;

use notepy_api::{ServeOptions, TlsFiles};
use notepy_core::{Config, NoteStore, ResourceLayout};

/// Command-line overrides for `[server]`
#[derive(Debug, Clone, Default)]
pub struct ServerArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub no_tls: bool,
}

/// Merge flags over config; flags win
pub fn serve_options(config: &Config, layout: &ResourceLayout, args: ServerArgs) -> ServeOptions {
    let explicit_tls = args.cert.is_some() || args.key.is_some();
    let tls = if args.no_tls || !(config.server.ssl_enabled || explicit_tls) {
        None
    } else {
        Some(TlsFiles {
            cert: args.cert.unwrap_or_else(|| layout.cert_path()),
            key: args.key.unwrap_or_else(|| layout.key_path()),
        })
    };

    ServeOptions {
        host: args.host.unwrap_or_else(|| config.server.host.clone()),
        port: args.port.unwrap_or(config.server.port),
        tls,
        max_body_bytes: config.server.max_body_bytes,
    }
}

/// Scheme the server will actually use; missing TLS files fall back to http
fn scheme(options: &ServeOptions) -> &'static str {
    if options.tls.as_ref().is_some_and(TlsFiles::exist) {
        "https"
    } else {
        "http"
    }
}

pub async fn run(store: NoteStore, config: &Config, layout: &ResourceLayout, args: ServerArgs) -> Result<()> {
    let options = serve_options(config, layout, args);
    println!(
        "Notepy API on {}://{}:{} (Ctrl-C to stop)",
        scheme(&options),
        options.host,
        options.port
    );
    notepy_api::serve(store, options).await
}
