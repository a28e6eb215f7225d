//! Notepy HTTP API
//!
//! A thin JSON adapter over [`NoteStore`]. Every handler takes the single
//! store lock, performs one store operation and replies with the envelope in
//! [`response`].
//!
//! | Method | Path | Action |
//! |---|---|---|
//! | GET | `/api/notes?search=&tags=a,b` | list / filter |
//! | POST | `/api/notes` | create |
//! | GET, PUT, DELETE | `/api/notes/:id` | get, update, delete |
//! | POST | `/api/notes/:id/tags` | add tag |
//! | DELETE | `/api/notes/:id/tags/:tag` | remove tag |
//! | GET | `/api/notes/:id/export?format=` | single-note export |
//! | GET | `/api/tags` | tags with counts |
//! | GET | `/api/export?format=json\|markdown` | full export |
//! | POST | `/api/import` | bulk import |
//! | GET | `/api/status` | version and counts |

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use notepy_core::NoteStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use server::{serve, ServeOptions, TlsFiles};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<NoteStore>>,
}

impl AppState {
    pub fn new(store: NoteStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store for one operation
    pub fn store(&self) -> Result<MutexGuard<'_, NoteStore>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::Internal("note store lock poisoned".into()))
    }
}

/// Build the router with its middleware stack
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/api/notes",
            get(handlers::list_notes).post(handlers::create_note),
        )
        .route(
            "/api/notes/:id",
            get(handlers::get_note)
                .put(handlers::update_note)
                .delete(handlers::delete_note),
        )
        .route("/api/notes/:id/tags", post(handlers::add_tag))
        .route("/api/notes/:id/tags/:tag", delete(handlers::remove_tag))
        .route("/api/notes/:id/export", get(handlers::export_note))
        .route("/api/tags", get(handlers::list_tags))
        .route("/api/export", get(handlers::export_notes))
        .route("/api/import", post(handlers::import_notes))
        .route("/api/status", get(handlers::status))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}
