// src/services/backup_service.rs

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    models::{
        backup::{ImportPolicy, ImportReport, ImportedLead},
        lead::LeadPatch,
    },
    services::lead_store::LeadStore,
};

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("leads-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Lê o arquivo de backup: um array JSON de leads.
pub fn parse_import(bytes: &[u8]) -> Result<Vec<ImportedLead>, AppError> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::warn!("Arquivo de importação rejeitado: {e}");
        AppError::InvalidImportFile(e.to_string())
    })
}

enum Outcome {
    Created,
    Updated,
}

#[derive(Clone)]
pub struct BackupService {
    leads: LeadStore,
}

impl BackupService {
    pub fn new(leads: LeadStore) -> Self {
        Self { leads }
    }

    pub async fn export(&self) -> Result<String, AppError> {
        let leads = self.leads.snapshot().await;
        Ok(serde_json::to_string_pretty(&leads)?)
    }

    pub async fn import(
        &self,
        entries: Vec<ImportedLead>,
        policy: ImportPolicy,
    ) -> Result<ImportReport, AppError> {
        let mut report = ImportReport::default();

        for entry in entries {
            let existing = match entry.id {
                Some(id) => self.leads.get(id).await,
                None => None,
            };

            let outcome = match (existing, policy) {
                (Some(_), ImportPolicy::Skip) => {
                    report.skipped += 1;
                    continue;
                }
                (Some(current), ImportPolicy::Overwrite) => self
                    .leads
                    .update(current.id, LeadPatch::full(&entry.fields))
                    .await
                    .map(|_| Outcome::Updated),
                (None, ImportPolicy::Skip | ImportPolicy::Overwrite) => {
                    let created = match entry.into_restorable() {
                        Ok(lead) => self.leads.restore(lead).await,
                        Err(fields) => self.leads.add(fields).await,
                    };
                    created.map(|_| Outcome::Created)
                }
                (_, ImportPolicy::Duplicate) => {
                    self.leads.add(entry.fields).await.map(|_| Outcome::Created)
                }
            };

            match outcome {
                Ok(Outcome::Created) => report.created += 1,
                Ok(Outcome::Updated) => report.updated += 1,
                Err(e) => {
                    tracing::warn!("Lead não importado: {e}");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "📥 Importação concluída: {} criados, {} atualizados, {} ignorados, {} com falha",
            report.created,
            report.updated,
            report.skipped,
            report.failed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        common::clock::{FixedClock, LocalCalendar},
        db::{DataService, MemoryDataService, Table},
        models::lead::{LeadQualityTag, LeadStatus, NewLead},
    };
    use chrono::{TimeZone, Utc};

    fn store_at(day: u32) -> LeadStore {
        LeadStore::new(
            Arc::new(MemoryDataService::new()),
            Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, day, 15, 0, 0).unwrap())),
            LocalCalendar::new(chrono_tz::America::Sao_Paulo),
        )
    }

    fn new_lead(name: &str) -> NewLead {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "whatsapp": "11999998888",
            "projectType": "criativos",
            "budget": 800.5,
            "status": "proposal_sent",
            "lastContact": "2026-10-01",
            "tags": ["warm", "influencer"],
        }))
        .unwrap()
    }

    #[test]
    fn file_name_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(backup_file_name(date), "leads-backup-2026-10-18.json");
    }

    #[test]
    fn malformed_file_is_rejected() {
        assert!(matches!(parse_import(b"{\"nope\": 1}"), Err(AppError::InvalidImportFile(_))));
    }

    #[tokio::test]
    async fn export_then_import_reproduces_the_collection() {
        let source = store_at(10);
        source.add(new_lead("Padaria")).await.unwrap();
        source.add(new_lead("Oficina")).await.unwrap();
        let file = BackupService::new(source.clone()).export().await.unwrap();

        let target = store_at(18);
        let report = BackupService::new(target.clone())
            .import(parse_import(file.as_bytes()).unwrap(), ImportPolicy::Skip)
            .await
            .unwrap();
        assert_eq!(report.created, 2);

        let mut expected = source.snapshot().await;
        let mut restored = target.snapshot().await;
        expected.sort_by_key(|l| l.id);
        restored.sort_by_key(|l| l.id);
        assert_eq!(restored, expected);
        assert!(restored[0].tags.contains(&LeadQualityTag::Influencer));
    }

    #[tokio::test]
    async fn leads_with_null_whatsapp_survive_a_round_trip() {
        let data = Arc::new(MemoryDataService::new());
        let row = serde_json::json!({
            "nome": "Sem WhatsApp",
            "whatsapp": null,
            "tipoprojeto": "site",
            "status": "nao_contatado",
            "ultimocontato": "2026-10-01",
            "createdat": "2026-10-01T12:00:00Z",
        });
        data.insert(Table::Leads, row.as_object().unwrap().clone()).await.unwrap();

        let source = LeadStore::new(
            data,
            Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap())),
            LocalCalendar::new(chrono_tz::America::Sao_Paulo),
        );
        assert_eq!(source.refresh().await.unwrap(), 1);
        let file = BackupService::new(source.clone()).export().await.unwrap();

        let target = store_at(18);
        let report = BackupService::new(target.clone())
            .import(parse_import(file.as_bytes()).unwrap(), ImportPolicy::Skip)
            .await
            .unwrap();

        assert_eq!(report, ImportReport { created: 1, updated: 0, skipped: 0, failed: 0 });
        assert_eq!(target.snapshot().await, source.snapshot().await);

        // Sobrescrever com o mesmo arquivo também passa
        let overwrite = BackupService::new(target.clone())
            .import(parse_import(file.as_bytes()).unwrap(), ImportPolicy::Overwrite)
            .await
            .unwrap();
        assert_eq!(overwrite.updated, 1);
    }

    #[tokio::test]
    async fn existing_ids_follow_the_policy() {
        let store = store_at(18);
        let lead = store.add(new_lead("Padaria")).await.unwrap();
        let backup = BackupService::new(store.clone());

        let mut changed = serde_json::to_value(&lead).unwrap();
        changed["status"] = "closed".into();
        let file = serde_json::to_vec(&vec![changed]).unwrap();

        let skip = backup.import(parse_import(&file).unwrap(), ImportPolicy::Skip).await.unwrap();
        assert_eq!(skip.skipped, 1);
        assert_eq!(store.get(lead.id).await.unwrap().status, LeadStatus::ProposalSent);

        let overwrite = backup
            .import(parse_import(&file).unwrap(), ImportPolicy::Overwrite)
            .await
            .unwrap();
        assert_eq!(overwrite.updated, 1);
        assert_eq!(store.get(lead.id).await.unwrap().status, LeadStatus::Closed);

        let duplicate = backup
            .import(parse_import(&file).unwrap(), ImportPolicy::Duplicate)
            .await
            .unwrap();
        assert_eq!(duplicate.created, 1);
        assert_eq!(store.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn invalid_entries_are_counted_as_failed() {
        let store = store_at(18);
        let file = br#"[
            {"name": "Negativo", "whatsapp": "1", "projectType": "site", "budget": -10},
            {"name": "Ok", "whatsapp": "1", "projectType": "site"}
        ]"#;

        let report = BackupService::new(store)
            .import(parse_import(file).unwrap(), ImportPolicy::Skip)
            .await
            .unwrap();
        assert_eq!(report, ImportReport { created: 1, updated: 0, skipped: 0, failed: 1 });
    }
}
