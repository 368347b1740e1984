// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "pt";

// Catálogo embutido. Chaves: "error.<código>", "validation.<código>",
// "status.<status>", "activity.<tipo>", "month.<1..12>".
const PT: &[(&str, &str)] = &[
    ("error.validation_failed", "Um ou mais campos são inválidos."),
    ("error.lead_not_found", "Lead não encontrado."),
    ("error.activity_not_found", "Atividade não encontrada."),
    ("error.activity_already_running", "Já existe uma atividade em andamento."),
    ("error.no_active_activity", "Nenhuma atividade em andamento."),
    ("error.unique_violation", "Registro duplicado."),
    ("error.invalid_import_file", "Arquivo de importação inválido."),
    ("error.data_service_unavailable", "Serviço de dados indisponível. Tente novamente."),
    ("error.internal_error", "Ocorreu um erro inesperado."),
    ("validation.required", "Campo obrigatório."),
    ("validation.negative_budget", "O orçamento não pode ser negativo."),
    ("status.not_contacted", "Não Contatado"),
    ("status.first_contact", "Primeiro Contato"),
    ("status.proposal_sent", "Proposta Enviada"),
    ("status.negotiating", "Em Negociação"),
    ("status.closed", "Fechado"),
    ("status.lost", "Perdido"),
    ("activity.prospecting", "Prospecção"),
    ("activity.meeting", "Reunião"),
    ("activity.proposal", "Proposta"),
    ("activity.follow_up", "Follow-up"),
    ("activity.other", "Outra"),
    ("month.1", "jan"),
    ("month.2", "fev"),
    ("month.3", "mar"),
    ("month.4", "abr"),
    ("month.5", "mai"),
    ("month.6", "jun"),
    ("month.7", "jul"),
    ("month.8", "ago"),
    ("month.9", "set"),
    ("month.10", "out"),
    ("month.11", "nov"),
    ("month.12", "dez"),
];

const EN: &[(&str, &str)] = &[
    ("error.validation_failed", "One or more fields are invalid."),
    ("error.lead_not_found", "Lead not found."),
    ("error.activity_not_found", "Activity not found."),
    ("error.activity_already_running", "An activity is already running."),
    ("error.no_active_activity", "No activity is running."),
    ("error.unique_violation", "Duplicate record."),
    ("error.invalid_import_file", "Invalid import file."),
    ("error.data_service_unavailable", "Data service unavailable. Please try again."),
    ("error.internal_error", "An unexpected error occurred."),
    ("validation.required", "This field is required."),
    ("validation.negative_budget", "Budget cannot be negative."),
    ("status.not_contacted", "Not contacted"),
    ("status.first_contact", "First contact"),
    ("status.proposal_sent", "Proposal sent"),
    ("status.negotiating", "Negotiating"),
    ("status.closed", "Closed"),
    ("status.lost", "Lost"),
    ("activity.prospecting", "Prospecting"),
    ("activity.meeting", "Meeting"),
    ("activity.proposal", "Proposal"),
    ("activity.follow_up", "Follow-up"),
    ("activity.other", "Other"),
    ("month.1", "Jan"),
    ("month.2", "Feb"),
    ("month.3", "Mar"),
    ("month.4", "Apr"),
    ("month.5", "May"),
    ("month.6", "Jun"),
    ("month.7", "Jul"),
    ("month.8", "Aug"),
    ("month.9", "Sep"),
    ("month.10", "Oct"),
    ("month.11", "Nov"),
    ("month.12", "Dec"),
];

/// Mensagens e rótulos por idioma. Idioma desconhecido cai no padrão (pt);
/// chave desconhecida volta como a própria chave.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("pt", PT.iter().copied().collect());
        catalogs.insert("en", EN.iter().copied().collect());
        Self { catalogs }
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.catalogs.contains_key(lang)
    }

    pub fn translate(&self, lang: &str, key: &str) -> String {
        let lookup = |lang: &str| self.catalogs.get(lang).and_then(|c| c.get(key)).copied();

        lookup(lang)
            .or_else(|| lookup(DEFAULT_LANG))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}
