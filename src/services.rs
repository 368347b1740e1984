pub mod backup_service;
pub mod dashboard_service;
pub mod kanban_service;
pub mod lead_store;
pub mod stats_service;
pub mod time_tracking_store;

pub use backup_service::BackupService;
pub use dashboard_service::DashboardService;
pub use kanban_service::KanbanService;
pub use lead_store::{LeadEvent, LeadStore};
pub use stats_service::StatsService;
pub use time_tracking_store::TimeTrackingStore;
