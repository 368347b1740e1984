// src/models/backup.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::lead::{Lead, NewLead};

/// O que fazer quando um lead importado tem um id que já existe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImportPolicy {
    #[default]
    Skip,
    Overwrite,
    Duplicate,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImportParams {
    #[serde(default)]
    pub policy: ImportPolicy,
}

/// Um item do arquivo de backup. Aceita o formato exportado e também entradas sem id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedLead {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: NewLead,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportedLead {
    /// Com id e data de criação o lead é restaurado como estava; sem eles, devolve os
    /// campos para ser criado como novo.
    pub fn into_restorable(self) -> Result<Lead, NewLead> {
        let (Some(id), Some(created_at)) = (self.id, self.created_at) else {
            return Err(self.fields);
        };
        let fields = self.fields;

        Ok(Lead {
            id,
            name: fields.name,
            whatsapp: fields.whatsapp,
            instagram: fields.instagram,
            website: fields.website,
            origin: fields.origin,
            project_type: fields.project_type,
            budget: fields.budget,
            status: fields.status,
            last_contact: fields.last_contact.unwrap_or_else(|| created_at.date_naive()),
            notes: fields.notes,
            needs: fields.needs,
            observations: fields.observations,
            ideas: fields.ideas,
            tags: fields.tags,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}
