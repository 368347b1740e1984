// src/handlers/stats.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::stats::{DailyStats, DateFilter},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    #[serde(default)]
    #[param(inline)]
    pub filter: DateFilter,
}

// GET /api/stats/daily
#[utoipa::path(
    get,
    path = "/api/stats/daily",
    tag = "Stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Metas diárias do período", body = DailyStats),
        (status = 503, description = "Serviço de dados indisponível")
    )
)]
pub async fn get_daily_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let stats = app_state.stats_service
        .daily_stats(query.filter)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stats)))
}
