// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erro de domínio. Os stores registram (tracing) no ponto da falha e devolvem este tipo;
// a camada HTTP converte para `ApiError` com a mensagem no idioma do cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Lead não encontrado: {0}")]
    LeadNotFound(Uuid),

    #[error("Atividade não encontrada: {0}")]
    ActivityNotFound(Uuid),

    #[error("Já existe uma atividade em andamento")]
    ActivityAlreadyRunning,

    #[error("Nenhuma atividade em andamento")]
    NoActiveActivity,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Coluna desconhecida '{column}' na tabela '{table}'")]
    UnknownColumn { table: &'static str, column: String },

    #[error("Registro inválido vindo do serviço de dados: {0}")]
    MappingError(String),

    #[error("Arquivo de importação inválido: {0}")]
    InvalidImportFile(String),

    #[error("Serviço de dados indisponível: {0}")]
    DataServiceUnavailable(String),

    // Variante para erros de banco de dados (backend Postgres)
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Erros de transporte do backend REST (PostgREST / Supabase)
    #[error("Erro HTTP no serviço de dados: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Erro de JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Código estável enviado ao cliente e usado como chave no catálogo de mensagens.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::LeadNotFound(_) => "lead_not_found",
            AppError::ActivityNotFound(_) => "activity_not_found",
            AppError::ActivityAlreadyRunning => "activity_already_running",
            AppError::NoActiveActivity => "no_active_activity",
            AppError::UniqueConstraintViolation(_) => "unique_violation",
            AppError::InvalidImportFile(_) => "invalid_import_file",
            AppError::DataServiceUnavailable(_)
            | AppError::DatabaseError(_)
            | AppError::HttpError(_) => "data_service_unavailable",
            AppError::UnknownColumn { .. }
            | AppError::MappingError(_)
            | AppError::JsonError(_)
            | AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidImportFile(_) => StatusCode::BAD_REQUEST,
            AppError::LeadNotFound(_) | AppError::ActivityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ActivityAlreadyRunning
            | AppError::NoActiveActivity
            | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::DataServiceUnavailable(_)
            | AppError::DatabaseError(_)
            | AppError::HttpError(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Traduz o erro para a resposta HTTP no idioma pedido pelo cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let code = self.code();
        let message = i18n.translate(locale.lang(), &format!("error.{code}"));

        // Detalhes por campo só existem para erros de validação
        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            i18n.translate(locale.lang(), &format!("validation.{key}"))
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(details)
            }
            _ => None,
        };

        ApiError { status, code, message, details }
    }
}

// O que de fato vai para o cliente
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({
                "error": self.code,
                "message": self.message,
                "details": details,
            }),
            None => json!({
                "error": self.code,
                "message": self.message,
            }),
        };
        (self.status, Json(body)).into_response()
    }
}
