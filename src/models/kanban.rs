// src/models/kanban.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::lead::{Lead, LeadStatus};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KanbanColumn {
    pub status: LeadStatus,
    pub label: String,
    pub count: usize,
    pub leads: Vec<Lead>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MoveLeadPayload {
    pub status: LeadStatus,
}

/// Resultado de soltar um card. `moved = false` quando o status já era o de destino.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MoveOutcome {
    pub moved: bool,
    pub lead: Lead,
}
