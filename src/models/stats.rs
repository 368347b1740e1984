// src/models/stats.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::clock::LocalCalendar;

/// Meta fixa de novos leads por dia.
pub const DAILY_GOAL: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    #[default]
    Today,
    Yesterday,
    #[serde(rename = "last7days")]
    Last7Days,
    #[serde(rename = "last30days")]
    Last30Days,
    All,
}

/// Intervalo fechado [start, end] em UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Do primeiro ao último milissegundo de um dia local.
    pub fn day(calendar: &LocalCalendar, date: NaiveDate) -> Self {
        Self {
            start: calendar.start_of_day(date),
            end: calendar.end_of_day(date),
        }
    }
}

impl DateFilter {
    /// Converte o filtro em limites de dia no fuso local. `All` não tem limites.
    pub fn resolve(self, calendar: &LocalCalendar, now: DateTime<Utc>) -> Option<Period> {
        let today = calendar.today(now);
        let span = |days_back: i64| Period {
            start: calendar.start_of_day(today - Duration::days(days_back)),
            end: calendar.end_of_day(today),
        };

        match self {
            DateFilter::Today => Some(span(0)),
            DateFilter::Yesterday => Some(Period::day(calendar, today - Duration::days(1))),
            DateFilter::Last7Days => Some(span(7)),
            DateFilter::Last30Days => Some(span(30)),
            DateFilter::All => None,
        }
    }
}

// Card de metas diárias. Os nomes dos campos são os que o front-end já consome.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyStats {
    #[serde(rename = "prospeccoesHoje")]
    pub leads_in_period: u32,
    #[serde(rename = "tempoTotalHoje")]
    pub total_minutes: i64,
    #[serde(rename = "metaDiaria")]
    pub daily_goal: u32,
    /// Só calculado para o filtro `today`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    #[serde(rename = "produtividade")]
    #[schema(value_type = f64, example = 10.0)]
    pub productivity: Decimal,
    #[serde(rename = "progresso")]
    pub progress: u32,
    #[serde(rename = "tempoFormatado")]
    #[schema(example = "1h 5m")]
    pub formatted_time: String,
    #[serde(rename = "metaAtingida")]
    pub goal_reached: bool,
    #[serde(rename = "recompensaAtiva")]
    pub reward_active: bool,
    pub filter: DateFilter,
    pub period: Period,
}
