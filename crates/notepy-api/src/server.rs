//! Server startup over HTTP or HTTPS

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use notepy_core::NoteStore;

use crate::{create_router, AppState};

/// Grace period for in-flight requests after Ctrl-C
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Certificate and key for HTTPS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsFiles {
    pub fn exist(&self) -> bool {
        self.cert.is_file() && self.key.is_file()
    }
}

/// How to run the server
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    /// `None` serves plain HTTP
    pub tls: Option<TlsFiles>,
    pub max_body_bytes: usize,
}

/// Run the API until Ctrl-C
///
/// When TLS files are configured but missing, logs a warning and serves
/// plain HTTP instead.
pub async fn serve(store: NoteStore, options: ServeOptions) -> Result<()> {
    let addr = resolve(&options.host, options.port).await?;
    let app = create_router(AppState::new(store), options.max_body_bytes);

    let tls = match options.tls {
        Some(files) if files.exist() => Some(files),
        Some(files) => {
            tracing::warn!(
                cert = %files.cert.display(),
                key = %files.key.display(),
                "TLS certificate or key missing; serving plain HTTP (run `notepy bootstrap init`)"
            );
            None
        }
        None => None,
    };

    match tls {
        Some(files) => {
            let config = RustlsConfig::from_pem_file(&files.cert, &files.key)
                .await
                .with_context(|| format!("Failed to load TLS material from {:?}", files.cert))?;

            let handle = axum_server::Handle::new();
            let shutdown = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
            });

            tracing::info!(%addr, "serving https");
            axum_server::bind_rustls(addr, config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;

            tracing::info!(%addr, "serving http");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("HTTP server failed")?;
        }
    }

    tracing::info!("server stopped");
    Ok(())
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Failed to resolve {}:{}", host, port))?
        .next()
        .with_context(|| format!("No address found for {}:{}", host, port))
}

async fn shutdown_signal() {
    shutdown_on(tokio::signal::ctrl_c()).await
}

/// Resolve once `signal` fires; a signal that fails to install never resolves
async fn shutdown_on(signal: impl std::future::Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
