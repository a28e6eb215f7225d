//! Route handlers
//!
//! Each handler parses its input, makes one store call under the lock and
//! wraps the result in the envelope.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notepy_core::export::{markdown_file_name, render_markdown, render_note_markdown};
use notepy_core::{
    ExportDocument, ExportFormat, ImportDocument, ImportReport, Note, NoteDraft, NotePatch,
    NoteQuery, TagCount,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    /// Comma-separated; a note must carry all of them
    pub tags: Option<String>,
}

impl ListParams {
    fn into_query(self) -> NoteQuery {
        let tags = self
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        NoteQuery {
            search: self.search,
            tags,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

impl ExportParams {
    fn format(&self) -> ApiResult<ExportFormat> {
        match self.format.as_deref() {
            None | Some("") => Ok(ExportFormat::Json),
            Some(text) => text
                .parse()
                .map_err(|e: notepy_core::StoreError| ApiError::BadRequest(e.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddTagRequest {
    pub tag: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedNote {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported_count: usize,
    #[serde(flatten)]
    pub report: ImportReport,
}

#[derive(Debug, Serialize)]
pub struct StatusInfo {
    pub version: &'static str,
    pub notes: usize,
    pub tags: usize,
    pub storage_path: String,
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(raw.to_string()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn markdown_download(body: String, file_name: &str) -> Response {
    (
        [
            (CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

// ==================== Notes ====================

pub async fn list_notes(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<Note>>> {
    let query = query_params(params)?.into_query();
    let store = state.store()?;
    Ok(ApiResponse::ok(store.list(&query)))
}

pub async fn create_note(
    State(state): State<AppState>,
    body: Result<Json<NoteDraft>, JsonRejection>,
) -> ApiResult<Response> {
    let draft = json_body(body)?;
    let note = state.store()?.create(draft)?;
    Ok(ApiResponse::created(note))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Note>> {
    let id = parse_id(&id)?;
    let note = state.store()?.get(id)?;
    Ok(ApiResponse::ok(note))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<NotePatch>, JsonRejection>,
) -> ApiResult<ApiResponse<Note>> {
    let id = parse_id(&id)?;
    let patch = json_body(body)?;
    let note = state.store()?.update(id, patch)?;
    Ok(ApiResponse::ok(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<DeletedNote>> {
    let id = parse_id(&id)?;
    state.store()?.delete(id)?;
    Ok(ApiResponse::ok(DeletedNote { id }))
}

// ==================== Tags ====================

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<TagCount>>> {
    let store = state.store()?;
    Ok(ApiResponse::ok(store.tag_counts()))
}

pub async fn add_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<AddTagRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Note>> {
    let id = parse_id(&id)?;
    let request = json_body(body)?;
    let note = state.store()?.add_tag(id, &request.tag)?;
    Ok(ApiResponse::ok(note))
}

pub async fn remove_tag(
    State(state): State<AppState>,
    Path((id, tag)): Path<(String, String)>,
) -> ApiResult<ApiResponse<Note>> {
    let id = parse_id(&id)?;
    let note = state.store()?.remove_tag(id, &tag)?;
    Ok(ApiResponse::ok(note))
}

// ==================== Export / Import ====================

pub async fn export_notes(
    State(state): State<AppState>,
    params: Result<Query<ExportParams>, QueryRejection>,
) -> ApiResult<Response> {
    let format = query_params(params)?.format()?;
    let notes = state.store()?.export_all();
    Ok(match format {
        ExportFormat::Json => ApiResponse::ok(ExportDocument::new(notes)).into_response(),
        ExportFormat::Markdown => markdown_download(render_markdown(&notes), "notepy_export.md"),
    })
}

pub async fn export_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<ExportParams>, QueryRejection>,
) -> ApiResult<Response> {
    let id = parse_id(&id)?;
    let format = query_params(params)?.format()?;
    let note = state.store()?.get(id)?;
    Ok(match format {
        ExportFormat::Json => ApiResponse::ok(note).into_response(),
        ExportFormat::Markdown => {
            markdown_download(render_note_markdown(&note), &markdown_file_name(&note))
        }
    })
}

pub async fn import_notes(
    State(state): State<AppState>,
    body: Result<Json<ImportDocument>, JsonRejection>,
) -> ApiResult<ApiResponse<ImportSummary>> {
    let document = json_body(body)?;
    let report = state.store()?.import_document(document)?;
    Ok(ApiResponse::ok(ImportSummary {
        imported_count: report.imported_count(),
        report,
    }))
}

// ==================== Status ====================

pub async fn status(State(state): State<AppState>) -> ApiResult<ApiResponse<StatusInfo>> {
    let store = state.store()?;
    Ok(ApiResponse::ok(StatusInfo {
        version: env!("CARGO_PKG_VERSION"),
        notes: store.len(),
        tags: store.tag_counts().len(),
        storage_path: store.path().display().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_split_tags() {
        let params = ListParams {
            search: Some("meeting".into()),
            tags: Some("work, meeting,,".into()),
        };
        let query = params.into_query();
        assert_eq!(query.tags, vec!["work", "meeting"]);
        assert_eq!(query.search.as_deref(), Some("meeting"));
    }

    #[test]
    fn test_list_params_empty() {
        let query = ListParams::default().into_query();
        assert!(query.tags.is_empty());
        assert!(query.search.is_none());
    }

    #[test]
    fn test_export_params_format() {
        let default = ExportParams::default();
        assert_eq!(default.format().unwrap(), ExportFormat::Json);

        let md = ExportParams {
            format: Some("markdown".into()),
        };
        assert_eq!(md.format().unwrap(), ExportFormat::Markdown);

        let bad = ExportParams {
            format: Some("pdf".into()),
        };
        assert_eq!(bad.format().unwrap_err().code(), "BAD_REQUEST");
    }

    #[test]
    fn test_parse_id_rejects_garbage_as_not_found() {
        assert_eq!(parse_id("nope").unwrap_err().code(), "NOT_FOUND");
        assert!(parse_id(&Uuid::nil().to_string()).is_ok());
    }
}
