// src/models/time_tracking.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Prospecting,
    Meeting,
    Proposal,
    FollowUp,
    Other,
}

impl ActivityType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Prospecting => "prospecting",
            ActivityType::Meeting => "meeting",
            ActivityType::Proposal => "proposal",
            ActivityType::FollowUp => "follow_up",
            ActivityType::Other => "other",
        }
    }

    pub fn label_key(self) -> String {
        format!("activity.{}", self.as_str())
    }
}

/// Filtro do histórico: um tipo de atividade ou todos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityFilter {
    #[default]
    All,
    Prospecting,
    Meeting,
    Proposal,
    FollowUp,
    Other,
}

impl ActivityFilter {
    pub fn activity_type(self) -> Option<ActivityType> {
        match self {
            ActivityFilter::All => None,
            ActivityFilter::Prospecting => Some(ActivityType::Prospecting),
            ActivityFilter::Meeting => Some(ActivityType::Meeting),
            ActivityFilter::Proposal => Some(ActivityType::Proposal),
            ActivityFilter::FollowUp => Some(ActivityType::FollowUp),
            ActivityFilter::Other => Some(ActivityType::Other),
        }
    }
}

// Linha da tabela `time_tracking`. Aqui os nomes externos e internos coincidem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimeTrackingEntry {
    pub id: Uuid,
    pub activity_type: ActivityType,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Segundos inteiros; presente depois que a atividade é encerrada.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TimeTrackingEntry {
    /// Tempo decorrido ao vivo (now - start), nunca negativo.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start_time).num_seconds().max(0)
    }

    /// Quanto esta entrada soma no total: a duração gravada; sem ela, end - start;
    /// e se ainda estiver rodando, now - start.
    pub fn tracked_seconds(&self, now: DateTime<Utc>) -> i64 {
        match (self.duration, self.end_time) {
            (Some(duration), _) if duration > 0 => duration,
            (_, Some(end)) => (end - self.start_time).num_seconds().max(0),
            (_, None) => self.elapsed_seconds(now),
        }
    }
}

/// Linha enviada ao serviço de dados quando o cronômetro começa.
#[derive(Debug, Clone, Serialize)]
pub struct NewTimeTrackingEntry {
    pub activity_type: ActivityType,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartTrackingPayload {
    #[schema(example = "prospecting")]
    pub activity_type: ActivityType,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Atividade em andamento com o tempo decorrido calculado no momento da consulta.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveActivity {
    pub entry: TimeTrackingEntry,
    pub elapsed_seconds: i64,
    #[schema(example = "1h 2m 3s")]
    pub elapsed_label: String,
}

/// Item do histórico, já com rótulos para exibição.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub entry: TimeTrackingEntry,
    #[schema(example = "Prospecção")]
    pub activity_label: String,
    #[schema(example = "30m")]
    pub duration_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(duration: Option<i64>, end: Option<i64>) -> TimeTrackingEntry {
        let start = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        TimeTrackingEntry {
            id: Uuid::new_v4(),
            activity_type: ActivityType::Prospecting,
            start_time: start,
            end_time: end.map(|secs| start + Duration::seconds(secs)),
            duration,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn tracked_seconds_prefers_stored_duration() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 13, 0, 0).unwrap();
        assert_eq!(entry(Some(600), Some(600)).tracked_seconds(now), 600);
        // Sem duração gravada mas com fim: end - start
        assert_eq!(entry(None, Some(900)).tracked_seconds(now), 900);
        // Rodando: now - start
        assert_eq!(entry(None, None).tracked_seconds(now), 3600);
    }

    #[test]
    fn activity_type_uses_snake_case() {
        let json = serde_json::to_value(ActivityType::FollowUp).unwrap();
        assert_eq!(json, "follow_up");
    }
}
