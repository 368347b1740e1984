// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,

        // --- Backup ---
        handlers::leads::export_leads,
        handlers::leads::import_leads,

        // --- Kanban ---
        handlers::kanban::get_board,
        handlers::kanban::move_lead,
        handlers::kanban::mark_lost,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_status_chart,
        handlers::dashboard::get_monthly_chart,

        // --- Time Tracking ---
        handlers::time_tracking::get_current,
        handlers::time_tracking::start_activity,
        handlers::time_tracking::stop_activity,
        handlers::time_tracking::get_history,
        handlers::time_tracking::delete_entry,

        // --- Stats ---
        handlers::stats::get_daily_stats,
    ),
    components(
        schemas(
            // --- Leads ---
            models::lead::LeadStatus,
            models::lead::ProjectType,
            models::lead::LeadQualityTag,
            models::lead::Lead,
            models::lead::NewLead,
            models::lead::LeadPatch,

            // --- Backup ---
            models::backup::ImportPolicy,
            models::backup::ImportReport,

            // --- Kanban ---
            models::kanban::KanbanColumn,
            models::kanban::MoveLeadPayload,
            models::kanban::MoveOutcome,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::StatusChartEntry,
            models::dashboard::MonthlyChartEntry,

            // --- Time Tracking ---
            models::time_tracking::ActivityType,
            models::time_tracking::ActivityFilter,
            models::time_tracking::TimeTrackingEntry,
            models::time_tracking::StartTrackingPayload,
            models::time_tracking::ActiveActivity,
            models::time_tracking::HistoryItem,

            // --- Stats ---
            models::stats::DateFilter,
            models::stats::Period,
            models::stats::DailyStats,
        )
    ),
    tags(
        (name = "Leads", description = "Cadastro e edição de Leads"),
        (name = "Backup", description = "Exportação e importação de Leads em JSON"),
        (name = "Kanban", description = "Funil de vendas em colunas"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais"),
        (name = "Time Tracking", description = "Cronômetro de atividades comerciais"),
        (name = "Stats", description = "Metas diárias, produtividade e sequência")
    )
)]
pub struct ApiDoc;
