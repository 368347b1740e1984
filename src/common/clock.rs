// src/common/clock.rs

use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Fonte de "agora". Os stores e as estatísticas nunca chamam `Utc::now()` direto,
/// assim os testes conseguem fixar o relógio.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Relógio manual, usado em testes e demonstrações.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Limites de dia no fuso local configurado (APP_TIMEZONE).
#[derive(Debug, Clone, Copy)]
pub struct LocalCalendar {
    tz: Tz,
}

impl LocalCalendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Data local de um instante.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local_date(now)
    }

    /// Primeiro instante do dia local. Se a meia-noite não existir (início do horário de
    /// verão), vale o primeiro horário válido daquele dia.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let mut time = NaiveTime::MIN;
        for _ in 0..4 {
            if let Some(start) = self.tz.from_local_datetime(&date.and_time(time)).earliest() {
                return start.with_timezone(&Utc);
            }
            time += Duration::minutes(30);
        }
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
    }

    /// Último milissegundo do dia local (23:59:59.999).
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        match date.succ_opt() {
            Some(next) => self.start_of_day(next) - Duration::milliseconds(1),
            None => self.start_of_day(date) + Duration::hours(24) - Duration::milliseconds(1),
        }
    }
}
