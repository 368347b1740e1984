// src/models/lead.rs

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

// --- ENUMS ---

/// Etapa do funil. Qualquer etapa pode ir para qualquer outra.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    NotContacted,
    FirstContact,
    ProposalSent,
    Negotiating,
    Closed,
    Lost,
}

impl LeadStatus {
    /// Ordem das colunas no Kanban e nos gráficos.
    pub const ALL: [LeadStatus; 6] = [
        LeadStatus::NotContacted,
        LeadStatus::FirstContact,
        LeadStatus::ProposalSent,
        LeadStatus::Negotiating,
        LeadStatus::Closed,
        LeadStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::NotContacted => "not_contacted",
            LeadStatus::FirstContact => "first_contact",
            LeadStatus::ProposalSent => "proposal_sent",
            LeadStatus::Negotiating => "negotiating",
            LeadStatus::Closed => "closed",
            LeadStatus::Lost => "lost",
        }
    }

    /// Chave do rótulo no catálogo de i18n.
    pub fn label_key(self) -> String {
        format!("status.{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Site,
    LandingPage,
    Criativos,
}

impl ProjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectType::Site => "site",
            ProjectType::LandingPage => "landing_page",
            ProjectType::Criativos => "criativos",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadQualityTag {
    Hot,
    Warm,
    Cold,
    HighPriority,
    MediumPriority,
    LowPriority,
    DecisionMaker,
    Influencer,
}

// --- LEAD ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,

    #[schema(example = "Padaria do João")]
    pub name: String,
    #[schema(example = "+55 11 99999-8888")]
    pub whatsapp: String,
    #[schema(example = "@padariadojoao")]
    pub instagram: String,
    pub website: String,
    #[schema(example = "instagram")]
    pub origin: String,

    pub project_type: ProjectType,

    #[schema(value_type = f64, example = 1500.0)]
    pub budget: Decimal,

    pub status: LeadStatus,

    #[schema(value_type = String, format = Date, example = "2026-10-18")]
    pub last_contact: NaiveDate,

    pub notes: String,
    pub needs: String,
    pub observations: String,
    pub ideas: String,

    #[schema(value_type = Vec<LeadQualityTag>)]
    pub tags: BTreeSet<LeadQualityTag>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- PAYLOADS (formulário de criação e edição) ---

/// Formulário "Novo Lead". Status começa em `not_contacted` e o último contato em hoje.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Padaria do João")]
    pub name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "+55 11 99999-8888")]
    pub whatsapp: String,

    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub origin: String,

    pub project_type: ProjectType,

    #[serde(default)]
    #[validate(custom(function = "validate_budget"))]
    #[schema(value_type = f64, example = 1500.0)]
    pub budget: Decimal,

    #[serde(default)]
    pub status: LeadStatus,

    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date)]
    pub last_contact: Option<NaiveDate>,

    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub needs: String,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub ideas: String,

    #[serde(default)]
    #[schema(value_type = Vec<LeadQualityTag>)]
    pub tags: BTreeSet<LeadQualityTag>,
}

impl NewLead {
    /// Regras que valem para qualquer gravação, inclusive restauração de backup.
    /// Campos obrigatórios do formulário são checados no handler (`validate`).
    pub fn check_data(&self) -> Result<(), ValidationErrors> {
        check_budget(Some(&self.budget))
    }
}

impl From<&Lead> for NewLead {
    fn from(lead: &Lead) -> Self {
        Self {
            name: lead.name.clone(),
            whatsapp: lead.whatsapp.clone(),
            instagram: lead.instagram.clone(),
            website: lead.website.clone(),
            origin: lead.origin.clone(),
            project_type: lead.project_type,
            budget: lead.budget,
            status: lead.status,
            last_contact: Some(lead.last_contact),
            notes: lead.notes.clone(),
            needs: lead.needs.clone(),
            observations: lead.observations.clone(),
            ideas: lead.ideas.clone(),
            tags: lead.tags.clone(),
        }
    }
}

/// Edição parcial: só os campos presentes são enviados ao serviço de dados.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "required"))]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<ProjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_budget"))]
    #[schema(value_type = Option<f64>)]
    pub budget: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub last_contact: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<LeadQualityTag>>)]
    pub tags: Option<BTreeSet<LeadQualityTag>>,
}

impl LeadPatch {
    /// O que o Kanban envia ao soltar um card numa coluna.
    pub fn status(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Todos os campos editáveis de um lead (usado na importação com sobrescrita).
    pub fn full(lead: &NewLead) -> Self {
        Self {
            name: Some(lead.name.clone()),
            whatsapp: Some(lead.whatsapp.clone()),
            instagram: Some(lead.instagram.clone()),
            website: Some(lead.website.clone()),
            origin: Some(lead.origin.clone()),
            project_type: Some(lead.project_type),
            budget: Some(lead.budget),
            status: Some(lead.status),
            last_contact: lead.last_contact,
            notes: Some(lead.notes.clone()),
            needs: Some(lead.needs.clone()),
            observations: Some(lead.observations.clone()),
            ideas: Some(lead.ideas.clone()),
            tags: Some(lead.tags.clone()),
        }
    }

    pub fn check_data(&self) -> Result<(), ValidationErrors> {
        check_budget(self.budget.as_ref())
    }

    /// Aplica a edição sobre o lead em cache. `updated_at` fica a cargo de quem chama.
    pub fn apply_to(&self, lead: &mut Lead) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        set(&mut lead.name, &self.name);
        set(&mut lead.whatsapp, &self.whatsapp);
        set(&mut lead.instagram, &self.instagram);
        set(&mut lead.website, &self.website);
        set(&mut lead.origin, &self.origin);
        set(&mut lead.project_type, &self.project_type);
        set(&mut lead.budget, &self.budget);
        set(&mut lead.status, &self.status);
        set(&mut lead.last_contact, &self.last_contact);
        set(&mut lead.notes, &self.notes);
        set(&mut lead.needs, &self.needs);
        set(&mut lead.observations, &self.observations);
        set(&mut lead.ideas, &self.ideas);
        set(&mut lead.tags, &self.tags);
    }
}

pub fn validate_budget(budget: &Decimal) -> Result<(), ValidationError> {
    if budget.is_sign_negative() && !budget.is_zero() {
        let mut err = ValidationError::new("negative_budget");
        err.message = Some("negative_budget".into());
        return Err(err);
    }
    Ok(())
}

fn check_budget(budget: Option<&Decimal>) -> Result<(), ValidationErrors> {
    match budget.map(validate_budget) {
        Some(Err(err)) => {
            let mut errors = ValidationErrors::new();
            errors.add("budget", err);
            Err(errors)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_lead() -> NewLead {
        serde_json::from_value(serde_json::json!({
            "name": "Padaria do João",
            "whatsapp": "11999998888",
            "projectType": "landing_page",
            "budget": 1500.0
        }))
        .unwrap()
    }

    #[test]
    fn new_lead_defaults() {
        let lead = new_lead();
        assert_eq!(lead.status, LeadStatus::NotContacted);
        assert!(lead.tags.is_empty());
        assert!(lead.last_contact.is_none());
        assert!(lead.validate().is_ok());
    }

    #[test]
    fn negative_budget_is_rejected() {
        let mut lead = new_lead();
        lead.budget = Decimal::new(-1, 2);
        let errors = lead.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("budget"));

        let patch = LeadPatch {
            budget: Some(Decimal::new(-10, 0)),
            ..LeadPatch::default()
        };
        assert!(patch.validate().is_err());
        assert!(patch.check_data().is_err());
    }

    #[test]
    fn data_check_ignores_form_only_rules() {
        let mut lead = new_lead();
        lead.whatsapp.clear();
        lead.name.clear();

        assert!(lead.validate().is_err());
        assert!(lead.check_data().is_ok());

        lead.budget = Decimal::new(-1, 0);
        let errors = lead.check_data().unwrap_err();
        assert!(errors.field_errors().contains_key("budget"));
    }

    #[test]
    fn tags_behave_as_a_set() {
        let lead: NewLead = serde_json::from_value(serde_json::json!({
            "name": "A",
            "whatsapp": "1",
            "projectType": "site",
            "tags": ["hot", "decision_maker", "hot"]
        }))
        .unwrap();
        assert_eq!(lead.tags.len(), 2);
    }

    #[test]
    fn status_patch_touches_only_status() {
        let patch = LeadPatch::status(LeadStatus::Closed);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "closed" }));
    }
}
