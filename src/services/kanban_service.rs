// src/services/kanban_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        kanban::{KanbanColumn, MoveOutcome},
        lead::{Lead, LeadPatch, LeadStatus},
    },
    services::lead_store::LeadStore,
};

/// Agrupa os leads em colunas na ordem do funil. A coluna "perdido" só aparece
/// quando pedida.
pub fn build_board<F>(leads: &[Lead], show_lost: bool, label: F) -> Vec<KanbanColumn>
where
    F: Fn(LeadStatus) -> String,
{
    LeadStatus::ALL
        .into_iter()
        .filter(|status| show_lost || *status != LeadStatus::Lost)
        .map(|status| {
            let leads: Vec<Lead> = leads.iter().filter(|l| l.status == status).cloned().collect();
            KanbanColumn {
                status,
                label: label(status),
                count: leads.len(),
                leads,
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct KanbanService {
    leads: LeadStore,
}

impl KanbanService {
    pub fn new(leads: LeadStore) -> Self {
        Self { leads }
    }

    pub async fn board<F>(&self, show_lost: bool, label: F) -> Vec<KanbanColumn>
    where
        F: Fn(LeadStatus) -> String,
    {
        build_board(&self.leads.snapshot().await, show_lost, label)
    }

    /// Soltar um card numa coluna. Mesmo status: nada a fazer, nenhuma chamada remota.
    pub async fn move_lead(&self, id: Uuid, status: LeadStatus) -> Result<MoveOutcome, AppError> {
        let lead = self.leads.get(id).await.ok_or(AppError::LeadNotFound(id))?;

        if lead.status == status {
            return Ok(MoveOutcome { moved: false, lead });
        }

        let lead = self
            .leads
            .update(id, LeadPatch::status(status))
            .await
            .inspect_err(|e| tracing::error!("Erro ao atualizar status: {e}"))?;

        Ok(MoveOutcome { moved: true, lead })
    }

    pub async fn mark_lost(&self, id: Uuid) -> Result<MoveOutcome, AppError> {
        self.move_lead(id, LeadStatus::Lost).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        common::clock::{FixedClock, LocalCalendar},
        db::MemoryDataService,
        models::lead::{NewLead, ProjectType},
    };
    use chrono::{TimeZone, Utc};

    fn services() -> (KanbanService, LeadStore, Arc<MemoryDataService>) {
        let data = Arc::new(MemoryDataService::new());
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap()));
        let store = LeadStore::new(
            data.clone(),
            clock,
            LocalCalendar::new(chrono_tz::America::Sao_Paulo),
        );
        (KanbanService::new(store.clone()), store, data)
    }

    fn lead(name: &str, status: LeadStatus) -> NewLead {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "whatsapp": "1",
            "projectType": ProjectType::Site,
            "status": status,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn board_hides_lost_column_unless_requested() {
        let (kanban, store, _) = services();
        store.add(lead("A", LeadStatus::Lost)).await.unwrap();
        store.add(lead("B", LeadStatus::Closed)).await.unwrap();

        let board = kanban.board(false, |s| s.as_str().to_string()).await;
        assert_eq!(board.len(), 5);
        assert!(board.iter().all(|c| c.status != LeadStatus::Lost));

        let board = kanban.board(true, |s| s.as_str().to_string()).await;
        assert_eq!(board.len(), 6);
        assert_eq!(board[5].count, 1);
        assert_eq!(board[4].leads[0].name, "B");
    }

    #[tokio::test]
    async fn drop_changes_only_the_status() {
        let (kanban, store, _) = services();
        let before = store.add(lead("A", LeadStatus::FirstContact)).await.unwrap();

        let outcome = kanban.move_lead(before.id, LeadStatus::Negotiating).await.unwrap();
        assert!(outcome.moved);

        let after = outcome.lead;
        assert_eq!(after.status, LeadStatus::Negotiating);
        assert_eq!(Lead { status: before.status, ..after.clone() }, before);
    }

    #[tokio::test]
    async fn drop_on_same_status_makes_no_remote_call() {
        let (kanban, store, data) = services();
        let lead = store.add(lead("A", LeadStatus::Lost)).await.unwrap();
        data.set_offline(true);

        let outcome = kanban.mark_lost(lead.id).await.unwrap();
        assert!(!outcome.moved);
    }
}
