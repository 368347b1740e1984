pub mod backup;
pub mod dashboard;
pub mod kanban;
pub mod lead;
pub mod stats;
pub mod time_tracking;
