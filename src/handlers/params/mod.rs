//! Action-style endpoint driven by plain string parameters.
//!
//! `GET /app?action=...` reads from the query string, `POST /app` from the
//! query string plus an optional url-encoded form body (form values win).
//! Responses are `text/plain`, except the XML export.

use axum::{
    Form,
    extract::{Query, State, rejection::FormRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;

use std::{collections::HashMap, fmt::Write as _, sync::Arc};

use crate::{
    dto::{CreateNoteRequest, UpdateNoteRequest},
    handlers::export,
    models::Note,
    repository::StoreError,
    service::NoteService,
};

type Params = HashMap<String, String>;

const USAGE: &str = "Notes Store\n\
    ?action=list\n\
    ?action=get&id=1\n\
    ?action=search&query=text\n\
    ?action=stats\n\
    ?action=export_xml\n";

#[debug_handler]
pub async fn handle_get(
    State(service): State<Arc<NoteService>>,
    Query(params): Query<Params>,
) -> Response {
    match params.get("action").map(String::as_str) {
        Some("list") => list(&service).await,
        Some("get") => get(&service, &params).await,
        Some("search") => search(&service, &params).await,
        Some("stats") => stats(&service).await,
        Some("export_xml") => export_xml(&service).await,
        _ => (StatusCode::OK, USAGE).into_response(),
    }
}

#[debug_handler]
pub async fn handle_post(
    State(service): State<Arc<NoteService>>,
    Query(mut params): Query<Params>,
    form: Result<Form<Params>, FormRejection>,
) -> Response {
    match form {
        Ok(Form(form)) => params.extend(form),
        // No form body: the query string alone carries the parameters.
        Err(FormRejection::InvalidFormContentType(_)) => {}
        Err(rejection) => return rejection.into_response(),
    }

    match params.get("action").map(String::as_str) {
        Some("create") => create(&service, &params).await,
        Some("update") => update(&service, &params).await,
        Some("delete") => delete(&service, &params).await,
        Some("bulk_delete") => bulk_delete(&service, &params).await,
        _ => error(StatusCode::BAD_REQUEST, "Unknown POST action"),
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, format!("Error: {message}")).into_response()
}

/// Renders a store failure; storage details only go to the log.
fn store_error(e: &StoreError, action: &str) -> Response {
    match e {
        StoreError::InvalidArgument(msg) => error(StatusCode::BAD_REQUEST, msg),
        StoreError::NotFound(id) => error(
            StatusCode::NOT_FOUND,
            &format!("Note with ID {id} not found."),
        ),
        StoreError::Storage(_) => {
            tracing::error!("{action} failed: {e}");
            error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Could not {action} due to a system error."),
            )
        }
    }
}

fn parse_id(params: &Params) -> Option<i64> {
    params.get("id")?.trim().parse().ok()
}

fn invalid_id() -> Response {
    error(StatusCode::BAD_REQUEST, "Invalid ID.")
}

fn summary_lines(notes: &[Note], with_date: bool) -> String {
    let mut out = String::new();
    for n in notes {
        if with_date {
            let _ = writeln!(
                out,
                "ID: {}, Title: {}, Date: {}",
                n.id(),
                n.title(),
                n.created_at().to_rfc3339()
            );
        } else {
            let _ = writeln!(out, "ID: {}, Title: {}", n.id(), n.title());
        }
    }
    out
}

async fn list(service: &NoteService) -> Response {
    match service.list_notes().await {
        Ok(notes) => (StatusCode::OK, summary_lines(&notes, true)).into_response(),
        Err(e) => store_error(&e, "list notes"),
    }
}

async fn get(service: &NoteService, params: &Params) -> Response {
    let Some(id) = parse_id(params) else {
        return invalid_id();
    };

    match service.get_note(id).await {
        Ok(Some(note)) => (
            StatusCode::OK,
            format!(
                "Title: {}\nContent: {}\nCreated: {}\n",
                note.title(),
                note.content(),
                note.created_at().to_rfc3339()
            ),
        )
            .into_response(),
        Ok(None) => error(StatusCode::NOT_FOUND, "Note not found."),
        Err(e) => store_error(&e, "get note"),
    }
}

async fn search(service: &NoteService, params: &Params) -> Response {
    match service.search_notes(params.get("query").cloned()).await {
        Ok(notes) => (StatusCode::OK, summary_lines(&notes, false)).into_response(),
        Err(e) => store_error(&e, "search notes"),
    }
}

async fn stats(service: &NoteService) -> Response {
    match service.count_notes().await {
        Ok(count) => (StatusCode::OK, format!("Total notes: {count}\n")).into_response(),
        Err(e) => store_error(&e, "count notes"),
    }
}

async fn export_xml(service: &NoteService) -> Response {
    let notes = match service.list_notes().await {
        Ok(notes) => notes,
        Err(e) => return store_error(&e, "export notes"),
    };

    match export::notes_to_xml(&notes) {
        Ok(xml) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            xml,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize notes to XML: {e}");
            error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not export notes due to a system error.",
            )
        }
    }
}

async fn create(service: &NoteService, params: &Params) -> Response {
    let request = CreateNoteRequest {
        title: params.get("title").cloned(),
        content: params.get("content").cloned(),
    };

    match service.create_note(request).await {
        Ok(note) => (
            StatusCode::OK,
            format!("Success: Note created with ID {}\n", note.id()),
        )
            .into_response(),
        Err(e) => store_error(&e, "create note"),
    }
}

async fn update(service: &NoteService, params: &Params) -> Response {
    let Some(id) = parse_id(params) else {
        return invalid_id();
    };
    let request = UpdateNoteRequest {
        title: params.get("title").cloned(),
        content: params.get("content").cloned(),
    };

    match service.update_note(id, request).await {
        Ok(_) => (StatusCode::OK, format!("Success: Note {id} updated\n")).into_response(),
        Err(e) => store_error(&e, "update note"),
    }
}

async fn delete(service: &NoteService, params: &Params) -> Response {
    let Some(id) = parse_id(params) else {
        return invalid_id();
    };

    match service.delete_note(id).await {
        Ok(_) => (StatusCode::OK, format!("Success: Note {id} deleted\n")).into_response(),
        Err(e) => store_error(&e, "delete note"),
    }
}

async fn bulk_delete(service: &NoteService, params: &Params) -> Response {
    let ids: Vec<String> = match params.get("ids") {
        Some(raw) if !raw.trim().is_empty() => raw.split(',').map(str::to_string).collect(),
        _ => return error(StatusCode::BAD_REQUEST, "IDs parameter cannot be empty."),
    };

    match service.bulk_delete(ids).await {
        Ok(_) => (StatusCode::OK, "Success: Notes deleted.\n").into_response(),
        Err(e) => store_error(&e, "delete notes"),
    }
}
