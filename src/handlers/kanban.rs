// src/handlers/kanban.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::kanban::{KanbanColumn, MoveLeadPayload, MoveOutcome},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BoardQuery {
    /// Inclui a coluna de perdidos
    #[serde(default)]
    pub show_lost: bool,
}

// GET /api/kanban
#[utoipa::path(
    get,
    path = "/api/kanban",
    tag = "Kanban",
    params(BoardQuery),
    responses(
        (status = 200, description = "Colunas na ordem do funil", body = Vec<KanbanColumn>)
    )
)]
pub async fn get_board(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<BoardQuery>,
) -> impl IntoResponse {
    let i18n = &app_state.i18n_store;
    let board = app_state.kanban_service
        .board(query.show_lost, |status| i18n.translate(locale.lang(), &status.label_key()))
        .await;

    Json(board)
}

// PUT /api/kanban/leads/{id}/status
#[utoipa::path(
    put,
    path = "/api/kanban/leads/{id}/status",
    tag = "Kanban",
    request_body = MoveLeadPayload,
    params(
        ("id" = Uuid, Path, description = "ID do Lead")
    ),
    responses(
        (status = 200, description = "Card movido (ou já estava na coluna)", body = MoveOutcome),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn move_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {

    let outcome = app_state.kanban_service
        .move_lead(id, payload.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(outcome)))
}

// POST /api/kanban/leads/{id}/lost
#[utoipa::path(
    post,
    path = "/api/kanban/leads/{id}/lost",
    tag = "Kanban",
    params(
        ("id" = Uuid, Path, description = "ID do Lead")
    ),
    responses(
        (status = 200, description = "Lead movido para perdidos", body = MoveOutcome),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn mark_lost(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    let outcome = app_state.kanban_service
        .mark_lost(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(outcome)))
}
