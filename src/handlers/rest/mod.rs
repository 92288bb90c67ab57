use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{
        BulkDeleteRequest, BulkDeleteResponse, CountResponse, CreateNoteRequest, NoteResponse,
        SearchQuery, UpdateNoteRequest,
    },
    models::Note,
    repository::StoreError,
    service::NoteService,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        create_note,
        update_note,
        delete_note,
        get_one_note,
        get_all_notes,
        search_notes,
        count_notes,
        bulk_delete_notes
    ),
    components(schemas(
        NoteResponse,
        CreateNoteRequest,
        UpdateNoteRequest,
        BulkDeleteRequest,
        BulkDeleteResponse,
        CountResponse
    )),
    tags(
        (name = "notes", description = "Notes management API")
    )
)]
pub struct ApiDoc;

fn error_response(e: &StoreError, action: &str) -> Response {
    match e {
        StoreError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()).into_response(),
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "Note not found").into_response(),
        StoreError::Storage(_) => {
            tracing::error!("failed to {action}: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to {action}")).into_response()
        }
    }
}

fn to_responses(notes: &[Note]) -> Vec<NoteResponse> {
    notes.iter().map(NoteResponse::from).collect()
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteResponse),
        (status = 400, description = "Invalid title or content"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    Json(payload): Json<CreateNoteRequest>,
) -> Response {
    match service.create_note(payload).await {
        Ok(note) => (StatusCode::CREATED, Json(NoteResponse::from(&note))).into_response(),
        Err(e) => error_response(&e, "create note"),
    }
}

#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = NoteResponse),
        (status = 400, description = "Invalid title"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Response {
    match service.update_note(id, payload).await {
        Ok(note) => (StatusCode::OK, Json(NoteResponse::from(&note))).into_response(),
        Err(e) => error_response(&e, "update note"),
    }
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 204, description = "Note deleted, or did not exist"),
        (status = 400, description = "Invalid note ID"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(State(service): State<Arc<NoteService>>, Path(id): Path<i64>) -> Response {
    match service.delete_note(id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e, "delete note"),
    }
}

#[utoipa::path(
    get,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = NoteResponse),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_one_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<i64>,
) -> Response {
    match service.get_note(id).await {
        Ok(Some(note)) => (StatusCode::OK, Json(NoteResponse::from(&note))).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Note not found").into_response(),
        Err(e) => error_response(&e, "get note"),
    }
}

#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "List of all notes", body = Vec<NoteResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_all_notes(State(service): State<Arc<NoteService>>) -> Response {
    match service.list_notes().await {
        Ok(notes) => (StatusCode::OK, Json(to_responses(&notes))).into_response(),
        Err(e) => error_response(&e, "get all notes"),
    }
}

#[utoipa::path(
    get,
    path = "/notes/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Notes whose title or content contains the query", body = Vec<NoteResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn search_notes(
    State(service): State<Arc<NoteService>>,
    Query(params): Query<SearchQuery>,
) -> Response {
    match service.search_notes(params.query).await {
        Ok(notes) => (StatusCode::OK, Json(to_responses(&notes))).into_response(),
        Err(e) => error_response(&e, "search notes"),
    }
}

#[utoipa::path(
    get,
    path = "/notes/count",
    responses(
        (status = 200, description = "Total number of notes", body = CountResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn count_notes(State(service): State<Arc<NoteService>>) -> Response {
    match service.count_notes().await {
        Ok(count) => (StatusCode::OK, Json(CountResponse { count })).into_response(),
        Err(e) => error_response(&e, "count notes"),
    }
}

#[utoipa::path(
    post,
    path = "/notes/bulk-delete",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Listed notes deleted, unknown IDs ignored", body = BulkDeleteResponse),
        (status = 400, description = "Malformed note ID"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn bulk_delete_notes(
    State(service): State<Arc<NoteService>>,
    Json(payload): Json<BulkDeleteRequest>,
) -> Response {
    match service.bulk_delete(payload.ids).await {
        Ok(deleted) => (StatusCode::OK, Json(BulkDeleteResponse { deleted })).into_response(),
        Err(e) => error_response(&e, "bulk delete notes"),
    }
}
