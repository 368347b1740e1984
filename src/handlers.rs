pub mod dashboard;
pub mod kanban;
pub mod leads;
pub mod stats;
pub mod time_tracking;
