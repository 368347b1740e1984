// src/services/dashboard_service.rs

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::{
    models::{
        dashboard::{DashboardSummary, MonthlyChartEntry, StatusChartEntry},
        lead::{Lead, LeadStatus},
    },
    services::lead_store::LeadStore,
};

pub fn summary(leads: &[Lead]) -> DashboardSummary {
    let closed: Vec<&Lead> = leads.iter().filter(|l| l.status == LeadStatus::Closed).collect();

    DashboardSummary {
        total_leads: leads.len(),
        active_leads: leads
            .iter()
            .filter(|l| !matches!(l.status, LeadStatus::Closed | LeadStatus::Lost))
            .count(),
        closed_leads: closed.len(),
        total_value: closed.iter().map(|l| l.budget).sum::<Decimal>(),
    }
}

fn percentage(count: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", count as f64 / total as f64 * 100.0)
}

pub fn status_chart<F>(leads: &[Lead], label: F) -> Vec<StatusChartEntry>
where
    F: Fn(LeadStatus) -> String,
{
    LeadStatus::ALL
        .into_iter()
        .map(|status| {
            let value = leads.iter().filter(|l| l.status == status).count();
            StatusChartEntry {
                status,
                label: label(status),
                value,
                percentage: percentage(value, leads.len()),
            }
        })
        .collect()
}

/// Agrupado pelo mês do último contato, em ordem cronológica.
/// `month_label` recebe o número do mês (1..=12).
pub fn monthly_chart<F>(leads: &[Lead], month_label: F) -> Vec<MonthlyChartEntry>
where
    F: Fn(u32) -> String,
{
    let mut months: BTreeMap<(i32, u32), (usize, usize)> = BTreeMap::new();
    for lead in leads {
        let key = (lead.last_contact.year(), lead.last_contact.month());
        let entry = months.entry(key).or_default();
        entry.0 += 1;
        if lead.status == LeadStatus::Closed {
            entry.1 += 1;
        }
    }

    months
        .into_iter()
        .map(|((year, month), (total, converted))| MonthlyChartEntry {
            month: format!("{year:04}-{month:02}"),
            label: month_label(month),
            leads: total,
            converted,
        })
        .collect()
}

#[derive(Clone)]
pub struct DashboardService {
    leads: LeadStore,
}

impl DashboardService {
    pub fn new(leads: LeadStore) -> Self {
        Self { leads }
    }

    pub async fn get_summary(&self) -> DashboardSummary {
        summary(&self.leads.snapshot().await)
    }

    pub async fn get_status_chart<F>(&self, label: F) -> Vec<StatusChartEntry>
    where
        F: Fn(LeadStatus) -> String,
    {
        status_chart(&self.leads.snapshot().await, label)
    }

    pub async fn get_monthly_chart<F>(&self, month_label: F) -> Vec<MonthlyChartEntry>
    where
        F: Fn(u32) -> String,
    {
        monthly_chart(&self.leads.snapshot().await, month_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::ProjectType;
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn lead(status: LeadStatus, budget: i64, last_contact: (i32, u32, u32)) -> Lead {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        Lead {
            id: Uuid::new_v4(),
            name: "Lead".into(),
            whatsapp: "1".into(),
            instagram: String::new(),
            website: String::new(),
            origin: String::new(),
            project_type: ProjectType::Site,
            budget: Decimal::from(budget),
            status,
            last_contact: NaiveDate::from_ymd_opt(last_contact.0, last_contact.1, last_contact.2)
                .unwrap(),
            notes: String::new(),
            needs: String::new(),
            observations: String::new(),
            ideas: String::new(),
            tags: Default::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn summary_counts_active_and_closed_value() {
        let leads = vec![
            lead(LeadStatus::Closed, 1000, (2026, 10, 1)),
            lead(LeadStatus::Closed, 500, (2026, 10, 2)),
            lead(LeadStatus::Lost, 9000, (2026, 10, 3)),
            lead(LeadStatus::Negotiating, 700, (2026, 10, 4)),
        ];
        let s = summary(&leads);

        assert_eq!(s.total_leads, 4);
        assert_eq!(s.active_leads, 1);
        assert_eq!(s.closed_leads, 2);
        assert_eq!(s.total_value, Decimal::from(1500));
    }

    #[test]
    fn status_chart_percentages() {
        let leads = vec![
            lead(LeadStatus::Closed, 0, (2026, 10, 1)),
            lead(LeadStatus::Lost, 0, (2026, 10, 1)),
            lead(LeadStatus::Lost, 0, (2026, 10, 1)),
        ];
        let chart = status_chart(&leads, |s| s.as_str().into());

        assert_eq!(chart.len(), 6);
        assert_eq!(chart[4].percentage, "33.3%");
        assert_eq!(chart[5].percentage, "66.7%");
        assert_eq!(chart[0].percentage, "0.0%");
        assert_eq!(status_chart(&[], |s| s.as_str().into())[0].percentage, "0%");
    }

    #[test]
    fn monthly_chart_is_chronological() {
        let leads = vec![
            lead(LeadStatus::Closed, 0, (2026, 10, 5)),
            lead(LeadStatus::FirstContact, 0, (2025, 12, 20)),
            lead(LeadStatus::NotContacted, 0, (2026, 10, 6)),
        ];
        let chart = monthly_chart(&leads, |m| m.to_string());

        assert_eq!(chart.len(), 2);
        assert_eq!(chart[0].month, "2025-12");
        assert_eq!(chart[1].month, "2026-10");
        assert_eq!(chart[1].leads, 2);
        assert_eq!(chart[1].converted, 1);
        assert_eq!(chart[1].label, "10");
    }
}
