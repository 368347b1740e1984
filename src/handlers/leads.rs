// src/handlers/leads.rs

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        backup::{ImportParams, ImportReport},
        lead::{Lead, LeadPatch, NewLead},
    },
    services::backup_service::{backup_file_name, parse_import},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLeadsQuery {
    /// Busca de novo no serviço de dados antes de responder
    #[serde(default)]
    pub refresh: bool,
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(ListLeadsQuery),
    responses(
        (status = 200, description = "Leads em cache, mais recentes primeiro", body = Vec<Lead>),
        (status = 503, description = "Serviço de dados indisponível")
    )
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ListLeadsQuery>,
) -> Result<impl IntoResponse, ApiError> {

    if query.refresh {
        app_state.lead_store
            .refresh()
            .await
            .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;
    }

    Ok((StatusCode::OK, Json(app_state.lead_store.snapshot().await)))
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = NewLead,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<NewLead>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state.lead_store
        .add(payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// PATCH /api/leads/{id}
#[utoipa::path(
    patch,
    path = "/api/leads/{id}",
    tag = "Leads",
    request_body = LeadPatch,
    params(
        ("id" = Uuid, Path, description = "ID do Lead")
    ),
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeadPatch>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state.lead_store
        .update(id, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

// DELETE /api/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(
        ("id" = Uuid, Path, description = "ID do Lead")
    ),
    responses(
        (status = 204, description = "Lead removido"),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    app_state.lead_store
        .delete(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/leads/export
#[utoipa::path(
    get,
    path = "/api/leads/export",
    tag = "Backup",
    responses(
        (status = 200, description = "Arquivo JSON com todos os leads", body = Vec<Lead>)
    )
)]
pub async fn export_leads(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Response, ApiError> {

    let body = app_state.backup_service
        .export()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let today = app_state.calendar.today(app_state.clock.now());
    let disposition = format!("attachment; filename=\"{}\"", backup_file_name(today));

    // Headers para o navegador baixar o arquivo
    let headers = [
        (header::CONTENT_TYPE, "application/json"),
        (header::CONTENT_DISPOSITION, disposition.as_str()),
    ];

    Ok((headers, body).into_response())
}

// POST /api/leads/import
#[utoipa::path(
    post,
    path = "/api/leads/import",
    tag = "Backup",
    params(ImportParams),
    request_body(content = Vec<Lead>, description = "Arquivo gerado pela exportação"),
    responses(
        (status = 200, description = "Resumo da importação", body = ImportReport),
        (status = 400, description = "Arquivo inválido")
    )
)]
pub async fn import_leads(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {

    let entries = parse_import(&body)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state.backup_service
        .import(entries, params.policy)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}
