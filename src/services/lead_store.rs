// src/services/lead_store.rs

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::{
    common::{
        clock::{Clock, LocalCalendar},
        error::AppError,
    },
    db::{lead_record, DataService, Query, Table},
    models::lead::{Lead, LeadPatch, NewLead},
};

/// Notificações de mudança na coleção de leads.
#[derive(Debug, Clone, PartialEq)]
pub enum LeadEvent {
    Loaded { count: usize },
    Added(Uuid),
    Updated(Uuid),
    Deleted(Uuid),
}

/// Fachada CRUD da tabela `leads` com cache local. O cache só muda depois que o
/// serviço de dados confirma a operação.
#[derive(Clone)]
pub struct LeadStore {
    data: Arc<dyn DataService>,
    clock: Arc<dyn Clock>,
    calendar: LocalCalendar,
    cache: Arc<RwLock<Vec<Lead>>>,
    events: broadcast::Sender<LeadEvent>,
}

impl LeadStore {
    pub fn new(data: Arc<dyn DataService>, clock: Arc<dyn Clock>, calendar: LocalCalendar) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            data,
            clock,
            calendar,
            cache: Arc::new(RwLock::new(Vec::new())),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LeadEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: LeadEvent) {
        // Sem assinantes não é erro
        let _ = self.events.send(event);
    }

    /// Busca todos os leads (mais recentes primeiro) e substitui o cache.
    pub async fn refresh(&self) -> Result<usize, AppError> {
        let query = Query::new().order_by("createdat", false);
        let rows = self
            .data
            .select(Table::Leads, &query)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar leads: {e}"))?;

        let mut leads = Vec::with_capacity(rows.len());
        for row in rows {
            match lead_record::lead_from_row(row) {
                Ok(lead) => leads.push(lead),
                Err(e) => tracing::warn!("Lead ignorado ao carregar: {e}"),
            }
        }

        let count = leads.len();
        *self.cache.write().await = leads;
        tracing::info!("📋 {} leads carregados", count);
        self.notify(LeadEvent::Loaded { count });
        Ok(count)
    }

    pub async fn snapshot(&self) -> Vec<Lead> {
        self.cache.read().await.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<Lead> {
        self.cache.read().await.iter().find(|l| l.id == id).cloned()
    }

    pub async fn add(&self, lead: NewLead) -> Result<Lead, AppError> {
        lead.check_data()?;

        let now = self.clock.now();
        let row = lead_record::from_new(&lead, self.calendar.today(now), now)?;
        let created = self.insert(row, "adicionar").await?;

        self.place(created.clone()).await;
        self.notify(LeadEvent::Added(created.id));
        Ok(created)
    }

    /// Insere um lead preservando id e datas (restauração de backup).
    pub async fn restore(&self, lead: Lead) -> Result<Lead, AppError> {
        NewLead::from(&lead).check_data()?;

        let row = lead_record::from_lead(&lead)?;
        let restored = self.insert(row, "restaurar").await?;

        self.place(restored.clone()).await;
        self.notify(LeadEvent::Added(restored.id));
        Ok(restored)
    }

    // Mantém o cache na mesma ordem do `refresh`: mais recentes primeiro
    async fn place(&self, lead: Lead) {
        let mut cache = self.cache.write().await;
        let pos = cache
            .iter()
            .position(|l| l.created_at <= lead.created_at)
            .unwrap_or(cache.len());
        cache.insert(pos, lead);
    }

    async fn insert(&self, row: crate::db::Row, action: &str) -> Result<Lead, AppError> {
        let inserted = self
            .data
            .insert(Table::Leads, row)
            .await
            .inspect_err(|e| tracing::error!("Erro ao {action} lead: {e}"))?;

        lead_record::lead_from_row(inserted)
            .inspect_err(|e| tracing::error!("Erro ao {action} lead: {e}"))
    }

    /// Atualização parcial. Só os campos presentes vão para o serviço de dados.
    pub async fn update(&self, id: Uuid, patch: LeadPatch) -> Result<Lead, AppError> {
        patch.check_data()?;

        if self.get(id).await.is_none() {
            tracing::warn!("Tentativa de atualizar lead inexistente: {}", id);
            return Err(AppError::LeadNotFound(id));
        }

        let now = self.clock.now();
        let row = lead_record::patch_to_row(&patch, now)?;
        let affected = self
            .data
            .update(Table::Leads, id, row)
            .await
            .inspect_err(|e| tracing::error!("Erro ao atualizar lead: {e}"))?;

        if affected == 0 {
            tracing::warn!("Lead {} não existe mais no serviço de dados", id);
            return Err(AppError::LeadNotFound(id));
        }

        let updated = {
            let mut cache = self.cache.write().await;
            let lead = cache
                .iter_mut()
                .find(|l| l.id == id)
                .ok_or(AppError::LeadNotFound(id))?;
            patch.apply_to(lead);
            lead.updated_at = now;
            lead.clone()
        };

        self.notify(LeadEvent::Updated(id));
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let affected = self
            .data
            .delete(Table::Leads, id)
            .await
            .inspect_err(|e| tracing::error!("Erro ao deletar lead: {e}"))?;

        let removed = {
            let mut cache = self.cache.write().await;
            let before = cache.len();
            cache.retain(|l| l.id != id);
            before != cache.len()
        };

        if affected == 0 && !removed {
            return Err(AppError::LeadNotFound(id));
        }

        self.notify(LeadEvent::Deleted(id));
        Ok(())
    }
}
