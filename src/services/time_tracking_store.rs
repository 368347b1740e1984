// src/services/time_tracking_store.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::{
    common::{
        clock::{Clock, LocalCalendar},
        error::AppError,
    },
    db::{from_row, to_row, DataService, Query, Row, Table},
    models::{
        stats::DateFilter,
        time_tracking::{ActivityType, NewTimeTrackingEntry, TimeTrackingEntry},
    },
};

/// Cronômetro de atividades. Garante no máximo uma atividade em aberto e mantém um
/// contador de "última atualização" que sobe a cada start/stop/delete.
#[derive(Clone)]
pub struct TimeTrackingStore {
    data: Arc<dyn DataService>,
    clock: Arc<dyn Clock>,
    calendar: LocalCalendar,
    active: Arc<RwLock<Option<TimeTrackingEntry>>>,
    last_update: Arc<watch::Sender<u64>>,
}

impl TimeTrackingStore {
    pub fn new(data: Arc<dyn DataService>, clock: Arc<dyn Clock>, calendar: LocalCalendar) -> Self {
        let (last_update, _) = watch::channel(0);
        Self {
            data,
            clock,
            calendar,
            active: Arc::new(RwLock::new(None)),
            last_update: Arc::new(last_update),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.last_update.subscribe()
    }

    pub fn last_update(&self) -> u64 {
        *self.last_update.borrow()
    }

    fn bump(&self) {
        self.last_update.send_modify(|n| *n += 1);
    }

    fn entry_from_row(row: Row) -> Result<TimeTrackingEntry, AppError> {
        from_row(row)
    }

    /// Lê do serviço de dados a atividade em aberto (se houver) e ajusta o estado local.
    pub async fn check_active(&self) -> Result<Option<TimeTrackingEntry>, AppError> {
        let query = Query::new().is_null("end_time").order_by("start_time", false);
        let rows = self
            .data
            .select(Table::TimeTracking, &query)
            .await
            .inspect_err(|e| tracing::error!("Erro ao verificar atividade ativa: {e}"))?;

        if rows.len() > 1 {
            tracing::warn!(
                "⚠️ {} atividades em aberto encontradas; usando a mais recente",
                rows.len()
            );
        }

        let active = rows
            .into_iter()
            .next()
            .map(Self::entry_from_row)
            .transpose()
            .inspect_err(|e| tracing::error!("Erro ao verificar atividade ativa: {e}"))?;

        *self.active.write().await = active.clone();
        Ok(active)
    }

    pub async fn current(&self) -> Option<TimeTrackingEntry> {
        self.active.read().await.clone()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn start(
        &self,
        activity_type: ActivityType,
        notes: Option<String>,
    ) -> Result<TimeTrackingEntry, AppError> {
        if let Some(active) = self.active.read().await.as_ref() {
            tracing::warn!(
                "Já existe uma atividade em andamento ({}), ignorando novo início",
                active.id
            );
            return Err(AppError::ActivityAlreadyRunning);
        }

        let entry = NewTimeTrackingEntry {
            activity_type,
            start_time: self.clock.now(),
            notes: notes.filter(|n| !n.trim().is_empty()),
        };

        let inserted = match self.data.insert(Table::TimeTracking, to_row(&entry)?).await {
            Ok(row) => row,
            // O índice parcial barrou: outra instância já tem atividade em aberto.
            // Adota essa atividade para que ela possa ser parada por aqui.
            Err(AppError::UniqueConstraintViolation(_)) => {
                tracing::warn!("Serviço de dados recusou segunda atividade em aberto");
                if let Ok(Some(open)) = self.check_active().await {
                    tracing::info!("⏱️ Atividade aberta por outra instância adotada: {}", open.id);
                    self.bump();
                }
                return Err(AppError::ActivityAlreadyRunning);
            }
            Err(e) => {
                tracing::error!("Erro ao iniciar atividade: {e}");
                return Err(e);
            }
        };

        let entry = Self::entry_from_row(inserted)
            .inspect_err(|e| tracing::error!("Erro ao iniciar atividade: {e}"))?;

        *self.active.write().await = Some(entry.clone());
        self.bump();
        tracing::info!("▶️ Atividade iniciada: {}", entry.activity_type.as_str());
        Ok(entry)
    }

    pub async fn stop(&self) -> Result<TimeTrackingEntry, AppError> {
        let active = match self.current().await {
            Some(active) => active,
            // Nada em andamento aqui; confere se outra instância deixou uma aberta
            None => match self.check_active().await? {
                Some(open) => open,
                None => {
                    tracing::warn!("Nenhuma atividade em andamento para parar");
                    return Err(AppError::NoActiveActivity);
                }
            },
        };

        let end_time = self.clock.now();
        let duration = active.elapsed_seconds(end_time);

        let patch = to_row(&json!({
            "end_time": end_time,
            "duration": duration,
            "updated_at": end_time,
        }))?;

        let affected = self
            .data
            .update(Table::TimeTracking, active.id, patch)
            .await
            .inspect_err(|e| tracing::error!("Erro ao parar atividade: {e}"))?;

        if affected == 0 {
            // Removida por fora; o estado local não vale mais
            tracing::warn!("Atividade {} não existe mais no serviço de dados", active.id);
            *self.active.write().await = None;
            self.bump();
            return Err(AppError::ActivityNotFound(active.id));
        }

        let stopped = TimeTrackingEntry {
            end_time: Some(end_time),
            duration: Some(duration),
            updated_at: Some(end_time),
            ..active
        };

        *self.active.write().await = None;
        self.bump();
        tracing::info!(
            "⏹️ Atividade encerrada: {} ({}s)",
            stopped.activity_type.as_str(),
            duration
        );
        Ok(stopped)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let affected = self
            .data
            .delete(Table::TimeTracking, id)
            .await
            .inspect_err(|e| tracing::error!("Erro ao deletar atividade: {e}"))?;

        if affected == 0 {
            return Err(AppError::ActivityNotFound(id));
        }

        let mut active = self.active.write().await;
        if active.as_ref().is_some_and(|a| a.id == id) {
            *active = None;
        }
        drop(active);

        self.bump();
        Ok(())
    }

    /// Histórico, mais recentes primeiro.
    pub async fn history(
        &self,
        date_filter: DateFilter,
        activity: Option<ActivityType>,
    ) -> Result<Vec<TimeTrackingEntry>, AppError> {
        let mut query = Query::new().order_by("start_time", false);
        if let Some(period) = date_filter.resolve(&self.calendar, self.clock.now()) {
            query = query.between("start_time", period.start, period.end);
        }
        if let Some(activity) = activity {
            query = query.eq("activity_type", activity.as_str());
        }

        let rows = self
            .data
            .select(Table::TimeTracking, &query)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar histórico: {e}"))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match Self::entry_from_row(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Registro de atividade ignorado: {e}"),
            }
        }
        Ok(entries)
    }
}
