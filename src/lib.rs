// src/lib.rs

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc};

/// Monta todas as rotas da API sobre o estado já inicializado.
pub fn router(app_state: AppState) -> Router {
    let lead_routes = Router::new()
        .route("/"
               ,get(handlers::leads::list_leads)
               .post(handlers::leads::create_lead)
        )
        .route("/{id}"
               ,patch(handlers::leads::update_lead)
               .delete(handlers::leads::delete_lead)
        )
        // Backup
        .route("/export", get(handlers::leads::export_leads))
        .route("/import", post(handlers::leads::import_leads));

    let kanban_routes = Router::new()
        .route("/", get(handlers::kanban::get_board))
        .route("/leads/{id}/status", put(handlers::kanban::move_lead))
        .route("/leads/{id}/lost", post(handlers::kanban::mark_lost));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/status-chart", get(handlers::dashboard::get_status_chart))
        .route("/monthly-chart", get(handlers::dashboard::get_monthly_chart));

    let time_tracking_routes = Router::new()
        .route("/current", get(handlers::time_tracking::get_current))
        .route("/start", post(handlers::time_tracking::start_activity))
        .route("/stop", post(handlers::time_tracking::stop_activity))
        .route("/history", get(handlers::time_tracking::get_history))
        .route("/{id}", delete(handlers::time_tracking::delete_entry));

    let stats_routes = Router::new()
        .route("/daily", get(handlers::stats::get_daily_stats));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/leads", lead_routes)
        .nest("/api/kanban", kanban_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/time-tracking", time_tracking_routes)
        .nest("/api/stats", stats_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
