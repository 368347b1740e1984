// src/db/lead_record.rs
//
// Único ponto de tradução entre a tabela `leads` (colunas e valores em português)
// e o modelo interno `Lead`.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{from_row, to_row, Row},
    models::lead::{Lead, LeadPatch, LeadQualityTag, LeadStatus, NewLead, ProjectType},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub nome: String,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub origem: Option<String>,
    pub tipoprojeto: String,
    #[serde(default)]
    pub orcamento: Option<Decimal>,
    pub status: String,
    #[serde(deserialize_with = "lenient_date")]
    pub ultimocontato: NaiveDate,
    #[serde(default)]
    pub anotacoes: Option<String>,
    #[serde(default)]
    pub necessidades: Option<String>,
    #[serde(default)]
    pub observacoes: Option<String>,
    #[serde(default)]
    pub ideias: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub createdat: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updatedat: Option<DateTime<Utc>>,
}

// A coluna pode chegar como "2026-10-18" ou como timestamp completo.
fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let date = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

// --- VALORES ---

pub fn status_to_external(status: LeadStatus) -> &'static str {
    match status {
        LeadStatus::NotContacted => "nao_contatado",
        LeadStatus::FirstContact => "primeiro_contato",
        LeadStatus::ProposalSent => "proposta_enviada",
        LeadStatus::Negotiating => "em_negociacao",
        LeadStatus::Closed => "fechado",
        LeadStatus::Lost => "perdido",
    }
}

pub fn status_from_external(value: &str) -> Result<LeadStatus, AppError> {
    LeadStatus::ALL
        .into_iter()
        .find(|s| status_to_external(*s) == value)
        .ok_or_else(|| AppError::MappingError(format!("status desconhecido: '{value}'")))
}

pub fn tag_to_external(tag: LeadQualityTag) -> &'static str {
    match tag {
        LeadQualityTag::Hot => "quente",
        LeadQualityTag::Warm => "morno",
        LeadQualityTag::Cold => "frio",
        LeadQualityTag::HighPriority => "prioridade_alta",
        LeadQualityTag::MediumPriority => "prioridade_media",
        LeadQualityTag::LowPriority => "prioridade_baixa",
        LeadQualityTag::DecisionMaker => "decisor",
        LeadQualityTag::Influencer => "influenciador",
    }
}

pub fn tag_from_external(value: &str) -> Option<LeadQualityTag> {
    use LeadQualityTag::*;
    [Hot, Warm, Cold, HighPriority, MediumPriority, LowPriority, DecisionMaker, Influencer]
        .into_iter()
        .find(|t| tag_to_external(*t) == value)
}

fn project_type_from_external(value: &str) -> Result<ProjectType, AppError> {
    match value {
        "site" => Ok(ProjectType::Site),
        "landing_page" => Ok(ProjectType::LandingPage),
        "criativos" => Ok(ProjectType::Criativos),
        other => Err(AppError::MappingError(format!("tipo de projeto desconhecido: '{other}'"))),
    }
}

fn tags_to_external(tags: &BTreeSet<LeadQualityTag>) -> Vec<String> {
    tags.iter().map(|t| tag_to_external(*t).to_string()).collect()
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

// --- LINHAS ---

/// Linha de inserção para um lead novo. O id fica a cargo do serviço de dados.
pub fn from_new(lead: &NewLead, today: NaiveDate, now: DateTime<Utc>) -> Result<Row, AppError> {
    let record = LeadRecord {
        id: None,
        nome: lead.name.clone(),
        whatsapp: text(&lead.whatsapp),
        instagram: text(&lead.instagram),
        website: text(&lead.website),
        origem: text(&lead.origin),
        tipoprojeto: lead.project_type.as_str().to_string(),
        orcamento: Some(lead.budget),
        status: status_to_external(lead.status).to_string(),
        ultimocontato: lead.last_contact.unwrap_or(today),
        anotacoes: text(&lead.notes),
        necessidades: text(&lead.needs),
        observacoes: text(&lead.observations),
        ideias: text(&lead.ideas),
        tags: Some(tags_to_external(&lead.tags)),
        createdat: Some(now),
        updatedat: Some(now),
    };
    to_row(&record)
}

/// Linha completa, preservando id e datas (restauração de backup).
pub fn from_lead(lead: &Lead) -> Result<Row, AppError> {
    let mut row = from_new(&NewLead::from(lead), lead.last_contact, lead.created_at)?;
    row.insert("id".into(), serde_json::json!(lead.id));
    row.insert("updatedat".into(), serde_json::to_value(lead.updated_at)?);
    Ok(row)
}

pub fn lead_from_row(row: Row) -> Result<Lead, AppError> {
    let record: LeadRecord = from_row(row)?;

    let id = record
        .id
        .ok_or_else(|| AppError::MappingError("lead sem id".into()))?;
    let created_at = record
        .createdat
        .ok_or_else(|| AppError::MappingError(format!("lead {id} sem createdat")))?;

    let mut tags = BTreeSet::new();
    for raw in record.tags.unwrap_or_default() {
        match tag_from_external(&raw) {
            Some(tag) => {
                tags.insert(tag);
            }
            None => tracing::warn!("Tag desconhecida '{}' ignorada no lead {}", raw, id),
        }
    }

    Ok(Lead {
        id,
        name: record.nome,
        whatsapp: record.whatsapp.unwrap_or_default(),
        instagram: record.instagram.unwrap_or_default(),
        website: record.website.unwrap_or_default(),
        origin: record.origem.unwrap_or_default(),
        project_type: project_type_from_external(&record.tipoprojeto)?,
        budget: record.orcamento.unwrap_or_default(),
        status: status_from_external(&record.status)?,
        last_contact: record.ultimocontato,
        notes: record.anotacoes.unwrap_or_default(),
        needs: record.necessidades.unwrap_or_default(),
        observations: record.observacoes.unwrap_or_default(),
        ideas: record.ideias.unwrap_or_default(),
        tags,
        created_at,
        updated_at: record.updatedat.unwrap_or(created_at),
    })
}

/// Só as colunas presentes na edição, mais `updatedat`.
pub fn patch_to_row(patch: &LeadPatch, updated_at: DateTime<Utc>) -> Result<Row, AppError> {
    let mut row = Row::new();
    let mut put = |column: &str, value: serde_json::Value| {
        row.insert(column.to_string(), value);
    };

    if let Some(v) = &patch.name {
        put("nome", v.as_str().into());
    }
    if let Some(v) = &patch.whatsapp {
        put("whatsapp", v.as_str().into());
    }
    if let Some(v) = &patch.instagram {
        put("instagram", v.as_str().into());
    }
    if let Some(v) = &patch.website {
        put("website", v.as_str().into());
    }
    if let Some(v) = &patch.origin {
        put("origem", v.as_str().into());
    }
    if let Some(v) = patch.project_type {
        put("tipoprojeto", v.as_str().into());
    }
    if let Some(v) = patch.budget {
        put("orcamento", serde_json::to_value(v)?);
    }
    if let Some(v) = patch.status {
        put("status", status_to_external(v).into());
    }
    if let Some(v) = patch.last_contact {
        put("ultimocontato", v.to_string().into());
    }
    if let Some(v) = &patch.notes {
        put("anotacoes", v.as_str().into());
    }
    if let Some(v) = &patch.needs {
        put("necessidades", v.as_str().into());
    }
    if let Some(v) = &patch.observations {
        put("observacoes", v.as_str().into());
    }
    if let Some(v) = &patch.ideas {
        put("ideias", v.as_str().into());
    }
    if let Some(v) = &patch.tags {
        put("tags", serde_json::to_value(tags_to_external(v))?);
    }
    put("updatedat", serde_json::to_value(updated_at)?);

    Ok(row)
}
