// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::lead::LeadStatus;

// 1. Cards do topo
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_leads: usize,
    pub active_leads: usize, // nem fechado nem perdido
    pub closed_leads: usize,
    #[schema(value_type = f64)]
    pub total_value: Decimal, // soma dos orçamentos fechados
}

// 2. Pizza por status
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChartEntry {
    pub status: LeadStatus,
    pub label: String,
    pub value: usize,
    #[schema(example = "33.3%")]
    pub percentage: String,
}

// 3. Área por mês (mês do último contato)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyChartEntry {
    #[schema(example = "2026-10")]
    pub month: String,
    #[schema(example = "out")]
    pub label: String,
    pub leads: usize,
    pub converted: usize,
}
