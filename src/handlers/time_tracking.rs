// src/handlers/time_tracking.rs

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
    common::{error::ApiError, format::format_duration},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        stats::DateFilter,
        time_tracking::{
            ActiveActivity, ActivityFilter, HistoryItem, StartTrackingPayload, TimeTrackingEntry,
        },
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    #[serde(default)]
    #[param(inline)]
    pub date_filter: DateFilter,
    #[serde(default)]
    #[param(inline)]
    pub activity: ActivityFilter,
}

// GET /api/time-tracking/current
#[utoipa::path(
    get,
    path = "/api/time-tracking/current",
    tag = "Time Tracking",
    responses(
        (status = 200, description = "Atividade em andamento (null se nenhuma)", body = Option<ActiveActivity>)
    )
)]
pub async fn get_current(State(app_state): State<AppState>) -> impl IntoResponse {
    let store = &app_state.time_tracking_store;
    let now = store.now();

    let current = store.current().await.map(|entry| {
        let elapsed = entry.elapsed_seconds(now);
        ActiveActivity {
            entry,
            elapsed_seconds: elapsed,
            elapsed_label: format_duration(elapsed),
        }
    });

    Json(current)
}

// POST /api/time-tracking/start
#[utoipa::path(
    post,
    path = "/api/time-tracking/start",
    tag = "Time Tracking",
    request_body = StartTrackingPayload,
    responses(
        (status = 201, description = "Atividade iniciada", body = TimeTrackingEntry),
        (status = 409, description = "Já existe uma atividade em andamento")
    )
)]
pub async fn start_activity(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<StartTrackingPayload>,
) -> Result<impl IntoResponse, ApiError> {

    let entry = app_state.time_tracking_store
        .start(payload.activity_type, payload.notes)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// POST /api/time-tracking/stop
#[utoipa::path(
    post,
    path = "/api/time-tracking/stop",
    tag = "Time Tracking",
    responses(
        (status = 200, description = "Atividade encerrada", body = TimeTrackingEntry),
        (status = 409, description = "Nenhuma atividade em andamento")
    )
)]
pub async fn stop_activity(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {

    let entry = app_state.time_tracking_store
        .stop()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entry)))
}

// GET /api/time-tracking/history
#[utoipa::path(
    get,
    path = "/api/time-tracking/history",
    tag = "Time Tracking",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Histórico, mais recentes primeiro", body = Vec<HistoryItem>)
    )
)]
pub async fn get_history(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let store = &app_state.time_tracking_store;
    let entries = store
        .history(query.date_filter, query.activity.activity_type())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let now = store.now();
    let items: Vec<HistoryItem> = entries
        .into_iter()
        .map(|entry| HistoryItem {
            activity_label: app_state
                .i18n_store
                .translate(locale.lang(), &entry.activity_type.label_key()),
            duration_label: format_duration(entry.tracked_seconds(now)),
            entry,
        })
        .collect();

    Ok((StatusCode::OK, Json(items)))
}

// DELETE /api/time-tracking/{id}
#[utoipa::path(
    delete,
    path = "/api/time-tracking/{id}",
    tag = "Time Tracking",
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    responses(
        (status = 204, description = "Registro removido"),
        (status = 404, description = "Registro não encontrado")
    )
)]
pub async fn delete_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    app_state.time_tracking_store
        .delete(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
