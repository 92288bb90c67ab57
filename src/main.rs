mod config;
mod dto;
mod handlers;
mod models;
mod repository;
mod service;

#[cfg(test)]
mod test_utils;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get, post},
};

use std::sync::Arc;

use handlers::{params, rest};
use repository::Repository;

use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use service::NoteService;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to locate or load config: {e}");
    });
    tracing::info!("Successfully loaded notes store config");

    // Repository creation and migration
    let repo = Repository::new(&cfg.database_path, &cfg.pool).unwrap_or_else(|e| {
        tracing::error!("Failed to open database: {e}");
        panic!("failed to open database: {e}");
    });

    repo.migrate().unwrap_or_else(|e| {
        tracing::error!("Failed to migrate database: {e}");
        panic!("failed to migrate database: {e}");
    });

    // Service creation
    let service = Arc::new(NoteService::new(Arc::new(repo)));

    let router = app(service);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .unwrap_or_else(|e| panic!("failed to bind port {}: {e}", cfg.port));

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Notes store starting, listening on {}", addr),
        Err(e) => tracing::warn!("Listening on an unknown address: {e}"),
    }

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to start HTTP server: {e}");
    }
}

fn app(service: Arc<NoteService>) -> Router {
    // REST router config
    let rest_router = Router::new()
        .route("/", get(root))
        .route(
            "/notes",
            post(rest::create_note).get(rest::get_all_notes),
        )
        .route("/notes/search", get(rest::search_notes))
        .route("/notes/count", get(rest::count_notes))
        .route("/notes/bulk-delete", post(rest::bulk_delete_notes))
        .route(
            "/notes/{id}",
            get(rest::get_one_note)
                .put(rest::update_note)
                .delete(rest::delete_note),
        )
        .merge(
            SwaggerUi::new("/swagger-ui")
                .config(utoipa_swagger_ui::Config::new([
                    "/rest/api-doc/openapi.json",
                ]))
                .url("/api-doc/openapi.json", rest::ApiDoc::openapi()),
        )
        .with_state(service.clone());

    // Parameter-driven text router config
    let params_router = Router::new()
        .route("/", get(params::handle_get).post(params::handle_post))
        .with_state(service);

    Router::new()
        .route("/", any(root))
        .nest("/rest", rest_router)
        .nest("/app", params_router)
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Response {
    (StatusCode::OK, "Notes store is up").into_response()
}
