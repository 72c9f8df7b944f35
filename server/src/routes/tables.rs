//! Table endpoint routes.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tabula_engine::{Command, CommandOutcome, EngineSnapshot, View};

use crate::error::Result;
use crate::handlers::{
    handle_command, handle_export, handle_restore, handle_snapshot, handle_view, ExportQuery,
};
use crate::registry::{TableDefinition, TableSummary};
use crate::AppState;

/// Create table routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tables", get(list_handler).post(create_handler))
        .route("/tables/{name}", get(view_handler).delete(delete_handler))
        .route("/tables/{name}/commands", post(command_handler))
        .route("/tables/{name}/export", get(export_handler))
        .route(
            "/tables/{name}/snapshot",
            get(snapshot_handler).put(restore_handler),
        )
}

/// GET /tables - List tables.
async fn list_handler(State(state): State<AppState>) -> Json<Vec<TableSummary>> {
    Json(state.registry.list().await)
}

/// POST /tables - Create a table.
async fn create_handler(
    State(state): State<AppState>,
    Json(definition): Json<TableDefinition>,
) -> Result<(StatusCode, Json<TableSummary>)> {
    let summary = state.registry.create(definition)?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /tables/{name} - Current view.
async fn view_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<View>> {
    let view = handle_view(&state.registry, &name).await?;
    Ok(Json(view))
}

/// DELETE /tables/{name} - Drop a table.
async fn delete_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode> {
    state.registry.remove(&name)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /tables/{name}/commands - Apply one command.
async fn command_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(command): Json<Command>,
) -> Result<Json<CommandOutcome>> {
    let outcome = handle_command(&state.registry, &name, command).await?;
    Ok(Json(outcome))
}

/// GET /tables/{name}/export - Download the filtered view.
async fn export_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let payload = handle_export(&state.registry, &name, query).await?;
    let disposition = format!("attachment; filename=\"{}\"", payload.filename);

    Ok((
        [
            (header::CONTENT_TYPE, payload.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload.content,
    )
        .into_response())
}

/// GET /tables/{name}/snapshot - Full table state.
async fn snapshot_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<EngineSnapshot>> {
    let snapshot = handle_snapshot(&state.registry, &name).await?;
    Ok(Json(snapshot))
}

/// PUT /tables/{name}/snapshot - Replace table state.
async fn restore_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(snapshot): Json<EngineSnapshot>,
) -> Result<Json<View>> {
    let view = handle_restore(&state.registry, &name, snapshot).await?;
    Ok(Json(view))
}
