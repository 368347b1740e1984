// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    config::AppState,
    middleware::i18n::Locale,
    models::dashboard::{DashboardSummary, MonthlyChartEntry, StatusChartEntry},
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards do topo", body = DashboardSummary)
    )
)]
pub async fn get_summary(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.dashboard_service.get_summary().await)
}

// GET /api/dashboard/status-chart
#[utoipa::path(
    get,
    path = "/api/dashboard/status-chart",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Leads por status", body = Vec<StatusChartEntry>)
    )
)]
pub async fn get_status_chart(
    State(app_state): State<AppState>,
    locale: Locale,
) -> impl IntoResponse {
    let i18n = &app_state.i18n_store;
    let chart = app_state.dashboard_service
        .get_status_chart(|status| i18n.translate(locale.lang(), &status.label_key()))
        .await;

    Json(chart)
}

// GET /api/dashboard/monthly-chart
#[utoipa::path(
    get,
    path = "/api/dashboard/monthly-chart",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Leads e convertidos por mês do último contato", body = Vec<MonthlyChartEntry>)
    )
)]
pub async fn get_monthly_chart(
    State(app_state): State<AppState>,
    locale: Locale,
) -> impl IntoResponse {
    let i18n = &app_state.i18n_store;
    let chart = app_state.dashboard_service
        .get_monthly_chart(|month| i18n.translate(locale.lang(), &format!("month.{month}")))
        .await;

    Json(chart)
}
