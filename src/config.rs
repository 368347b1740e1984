// src/config.rs

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context};
use chrono_tz::Tz;
use sqlx::postgres::PgPoolOptions;
use url::Url;

use crate::{
    common::{
        clock::{Clock, LocalCalendar, SystemClock},
        i18n::I18nStore,
    },
    db::{DataService, MemoryDataService, PgDataService, RestDataService},
    services::{
        BackupService, DashboardService, KanbanService, LeadStore, StatsService,
        TimeTrackingStore,
    },
};

/// Onde ficam as tabelas `leads` e `time_tracking`.
#[derive(Debug, Clone, PartialEq)]
pub enum DataBackend {
    Postgres { database_url: String, max_connections: u32 },
    Rest { base_url: Url, api_key: String },
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend: DataBackend,
    pub timezone: Tz,
    pub streak_lookback_days: u32,
    pub bind_addr: SocketAddr,
}

impl Settings {
    /// Lê as variáveis de ambiente (o `.env` já deve ter sido carregado).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| var(key).ok_or_else(|| anyhow!("{key} deve ser definida"));

        let backend = match var("DATA_BACKEND").as_deref().unwrap_or("postgres") {
            "postgres" => DataBackend::Postgres {
                database_url: required("DATABASE_URL")?,
                max_connections: var("DATABASE_MAX_CONNECTIONS")
                    .map(|v| v.parse::<u32>())
                    .transpose()
                    .context("DATABASE_MAX_CONNECTIONS inválido")?
                    .unwrap_or(5),
            },
            "rest" => DataBackend::Rest {
                base_url: Url::parse(&required("SUPABASE_URL")?)
                    .context("SUPABASE_URL inválida")?,
                api_key: required("SUPABASE_KEY")?,
            },
            "memory" => DataBackend::Memory,
            other => bail!("DATA_BACKEND desconhecido: '{other}' (use postgres, rest ou memory)"),
        };

        let timezone = var("APP_TIMEZONE")
            .as_deref()
            .unwrap_or("America/Sao_Paulo")
            .parse::<Tz>()
            .map_err(|e| anyhow!("APP_TIMEZONE inválido: {e}"))?;

        let streak_lookback_days = var("STREAK_LOOKBACK_DAYS")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("STREAK_LOOKBACK_DAYS inválido")?
            .unwrap_or(365);

        let bind_addr = var("BIND_ADDR")
            .as_deref()
            .unwrap_or("0.0.0.0:3000")
            .parse::<SocketAddr>()
            .context("BIND_ADDR inválido")?;

        Ok(Self {
            backend,
            timezone,
            streak_lookback_days,
            bind_addr,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub clock: Arc<dyn Clock>,
    pub calendar: LocalCalendar,
    pub i18n_store: Arc<I18nStore>,
    pub lead_store: LeadStore,
    pub time_tracking_store: TimeTrackingStore,
    pub stats_service: StatsService,
    pub kanban_service: KanbanService,
    pub dashboard_service: DashboardService,
    pub backup_service: BackupService,
}

impl AppState {
    /// Conecta ao backend configurado e monta o gráfico de dependências.
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let data: Arc<dyn DataService> = match &settings.backend {
            DataBackend::Postgres { database_url, max_connections } => {
                let pool = PgPoolOptions::new()
                    .max_connections(*max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgDataService::new(pool))
            }
            DataBackend::Rest { base_url, api_key } => {
                tracing::info!("🌐 Usando serviço de dados hospedado em {}", base_url);
                Arc::new(RestDataService::new(base_url.clone(), api_key))
            }
            DataBackend::Memory => {
                tracing::warn!("⚠️ Usando serviço de dados em memória: nada será persistido");
                Arc::new(MemoryDataService::new())
            }
        };

        Ok(Self::build(settings, data, Arc::new(SystemClock)))
    }

    /// Monta o estado sobre um serviço de dados e um relógio já prontos (usado nos testes).
    pub fn build(settings: Settings, data: Arc<dyn DataService>, clock: Arc<dyn Clock>) -> Self {
        let calendar = LocalCalendar::new(settings.timezone);

        let lead_store = LeadStore::new(data.clone(), clock.clone(), calendar);
        let time_tracking_store = TimeTrackingStore::new(data.clone(), clock.clone(), calendar);
        let stats_service =
            StatsService::new(data, clock.clone(), calendar, settings.streak_lookback_days);

        Self {
            settings: Arc::new(settings),
            clock,
            calendar,
            i18n_store: Arc::new(I18nStore::new()),
            kanban_service: KanbanService::new(lead_store.clone()),
            dashboard_service: DashboardService::new(lead_store.clone()),
            backup_service: BackupService::new(lead_store.clone()),
            lead_store,
            time_tracking_store,
            stats_service,
        }
    }

    /// Carga inicial dos caches. Falhas ficam no log; o servidor sobe mesmo assim.
    pub async fn load(&self) {
        if self.lead_store.refresh().await.is_err() {
            tracing::warn!("Cache de leads começa vazio");
        }
        if let Ok(Some(active)) = self.time_tracking_store.check_active().await {
            tracing::info!("⏱️ Atividade em andamento retomada: {}", active.activity_type.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_for_memory_backend() {
        let settings = Settings::from_lookup(lookup(&[("DATA_BACKEND", "memory")])).unwrap();

        assert_eq!(settings.backend, DataBackend::Memory);
        assert_eq!(settings.timezone, chrono_tz::America::Sao_Paulo);
        assert_eq!(settings.streak_lookback_days, 365);
        assert_eq!(settings.bind_addr.port(), 3000);
    }

    #[test]
    fn postgres_requires_database_url() {
        assert!(Settings::from_lookup(lookup(&[])).is_err());

        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://crm@localhost/crm"),
            ("DATABASE_MAX_CONNECTIONS", "10"),
        ]))
        .unwrap();
        assert!(matches!(
            settings.backend,
            DataBackend::Postgres { max_connections: 10, .. }
        ));
    }

    #[test]
    fn rest_backend_and_bad_values() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATA_BACKEND", "rest"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", "anon"),
            ("APP_TIMEZONE", "Europe/Lisbon"),
        ]))
        .unwrap();
        assert!(matches!(settings.backend, DataBackend::Rest { .. }));
        assert_eq!(settings.timezone, chrono_tz::Europe::Lisbon);

        assert!(Settings::from_lookup(lookup(&[("DATA_BACKEND", "sqlite")])).is_err());
        assert!(Settings::from_lookup(lookup(&[
            ("DATA_BACKEND", "memory"),
            ("APP_TIMEZONE", "Marte/Olympus"),
        ]))
        .is_err());
    }
}
