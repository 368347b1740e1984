// src/services/stats_service.rs
//
// Metas diárias: contagem de leads no período, tempo de prospecção, produtividade,
// sequência de dias batendo a meta e o sinal de recompensa.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::{
    common::{
        clock::{Clock, LocalCalendar},
        error::AppError,
        format::format_minutes,
    },
    db::{from_row, DataService, Query, Table},
    models::{
        stats::{DailyStats, DateFilter, Period, DAILY_GOAL},
        time_tracking::{ActivityType, TimeTrackingEntry},
    },
};

/// Quanto tempo a recompensa fica ativa depois de bater a meta.
pub const REWARD_WINDOW_SECONDS: i64 = 3;

// --- FUNÇÕES PURAS ---

/// Dias consecutivos (do mais recente para trás) com contagem >= meta.
pub fn compute_streak<I>(daily_counts: I, goal: u32) -> u32
where
    I: IntoIterator<Item = u32>,
{
    daily_counts.into_iter().take_while(|count| *count >= goal).count() as u32
}

pub fn total_tracked_seconds(entries: &[TimeTrackingEntry], now: DateTime<Utc>) -> i64 {
    entries.iter().map(|e| e.tracked_seconds(now)).sum()
}

/// Leads por hora, com uma casa decimal. Sem tempo registrado, 0.
pub fn productivity(leads: u32, minutes: i64) -> Decimal {
    if minutes <= 0 {
        return Decimal::ZERO;
    }
    let mut rate = (Decimal::from(leads) * Decimal::from(60) / Decimal::from(minutes))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    rate.rescale(1);
    rate
}

/// Percentual da meta, limitado a 100.
pub fn goal_progress(leads: u32, goal: u32) -> u32 {
    if goal == 0 {
        return 0;
    }
    (leads.saturating_mul(100) / goal).min(100)
}

// --- RECOMPENSA ---

#[derive(Debug, Default)]
struct RewardState {
    last_count: Option<u32>,
    active_until: Option<DateTime<Utc>>,
}

/// Acende quando a contagem cruza de baixo da meta para a meta (a primeira leitura
/// conta como vinda de zero) e apaga sozinho depois da janela.
#[derive(Debug, Default)]
pub struct RewardSignal {
    states: Mutex<HashMap<DateFilter, RewardState>>,
}

impl RewardSignal {
    pub fn observe(&self, filter: DateFilter, count: u32, goal: u32, now: DateTime<Utc>) -> bool {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let state = states.entry(filter).or_default();

        let previous = state.last_count.unwrap_or(0);
        if previous < goal && count >= goal {
            state.active_until = Some(now + Duration::seconds(REWARD_WINDOW_SECONDS));
        }
        state.last_count = Some(count);

        state.active_until.is_some_and(|until| now < until)
    }
}

// --- SERVIÇO ---

#[derive(Clone)]
pub struct StatsService {
    data: Arc<dyn DataService>,
    clock: Arc<dyn Clock>,
    calendar: LocalCalendar,
    streak_lookback_days: u32,
    reward: Arc<RewardSignal>,
}

impl StatsService {
    pub fn new(
        data: Arc<dyn DataService>,
        clock: Arc<dyn Clock>,
        calendar: LocalCalendar,
        streak_lookback_days: u32,
    ) -> Self {
        Self {
            data,
            clock,
            calendar,
            streak_lookback_days,
            reward: Arc::new(RewardSignal::default()),
        }
    }

    pub async fn daily_stats(&self, filter: DateFilter) -> Result<DailyStats, AppError> {
        let now = self.clock.now();
        // `all` mostra o dia de hoje, mas sem sequência
        let period = filter
            .resolve(&self.calendar, now)
            .unwrap_or_else(|| Period::day(&self.calendar, self.calendar.today(now)));

        let leads = self
            .count_leads(period)
            .await
            .inspect_err(|e| tracing::error!("Erro ao calcular estatísticas: {e}"))?;

        let entries = self
            .prospecting_entries(period)
            .await
            .inspect_err(|e| tracing::error!("Erro ao calcular estatísticas: {e}"))?;
        let minutes = total_tracked_seconds(&entries, now) / 60;

        // Falha na sequência não derruba o card: contagem e tempo seguem valendo
        let streak = match filter {
            DateFilter::Today => Some(self.streak(now).await.unwrap_or_else(|e| {
                tracing::error!("Erro ao calcular streak: {e}");
                0
            })),
            _ => None,
        };

        Ok(DailyStats {
            leads_in_period: leads,
            total_minutes: minutes,
            daily_goal: DAILY_GOAL,
            streak,
            productivity: productivity(leads, minutes),
            progress: goal_progress(leads, DAILY_GOAL),
            formatted_time: format_minutes(minutes),
            goal_reached: leads >= DAILY_GOAL,
            reward_active: self.reward.observe(filter, leads, DAILY_GOAL, now),
            filter,
            period,
        })
    }

    async fn count_leads(&self, period: Period) -> Result<u32, AppError> {
        let query = Query::new().between("createdat", period.start, period.end);
        let count = self.data.count(Table::Leads, &query).await?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn prospecting_entries(&self, period: Period) -> Result<Vec<TimeTrackingEntry>, AppError> {
        let query = Query::new()
            .eq("activity_type", ActivityType::Prospecting.as_str())
            .between("start_time", period.start, period.end);
        let rows = self.data.select(Table::TimeTracking, &query).await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match from_row::<TimeTrackingEntry>(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Registro de atividade ignorado nas estatísticas: {e}"),
            }
        }
        Ok(entries)
    }

    /// Sequência a partir de ontem. Uma única consulta cobre toda a janela de busca;
    /// as contagens são agrupadas por dia local.
    pub async fn streak(&self, now: DateTime<Utc>) -> Result<u32, AppError> {
        let lookback = i64::from(self.streak_lookback_days);
        if lookback == 0 {
            return Ok(0);
        }

        let today = self.calendar.today(now);
        let yesterday = today - Duration::days(1);
        let earliest = today - Duration::days(lookback);

        let query = Query::new()
            .only(&["createdat"])
            .between(
                "createdat",
                self.calendar.start_of_day(earliest),
                self.calendar.end_of_day(yesterday),
            );
        let rows = self.data.select(Table::Leads, &query).await?;

        let mut per_day: HashMap<NaiveDate, u32> = HashMap::new();
        for created_at in rows.iter().filter_map(|row| parse_timestamp(row.get("createdat"))) {
            *per_day.entry(self.calendar.local_date(created_at)).or_default() += 1;
        }

        let daily_counts =
            (1..=lookback).map(|back| per_day.get(&(today - Duration::days(back))).copied().unwrap_or(0));
        let streak = compute_streak(daily_counts, DAILY_GOAL);

        if i64::from(streak) == lookback {
            tracing::warn!(
                "Sequência atingiu o limite de {} dias (STREAK_LOOKBACK_DAYS)",
                lookback
            );
        }
        Ok(streak)
    }
}

fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
