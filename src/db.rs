// src/db.rs
//
// Camada de acesso ao serviço de dados externo. As tabelas são tratadas como linhas JSON
// com os nomes de coluna externos; a tradução para o modelo interno fica nos stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;

pub mod lead_record;
pub mod memory;
pub mod postgres;
pub mod rest;

pub use memory::MemoryDataService;
pub use postgres::PgDataService;
pub use rest::RestDataService;

/// Uma linha, como o serviço de dados devolve: `{ "coluna": valor }`.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Leads,
    TimeTracking,
}

const LEAD_COLUMNS: &[&str] = &[
    "id",
    "nome",
    "whatsapp",
    "instagram",
    "website",
    "origem",
    "tipoprojeto",
    "orcamento",
    "status",
    "ultimocontato",
    "anotacoes",
    "necessidades",
    "observacoes",
    "ideias",
    "tags",
    "createdat",
    "updatedat",
];

const TIME_TRACKING_COLUMNS: &[&str] = &[
    "id",
    "activity_type",
    "start_time",
    "end_time",
    "duration",
    "notes",
    "created_at",
    "updated_at",
];

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Leads => "leads",
            Table::TimeTracking => "time_tracking",
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Leads => LEAD_COLUMNS,
            Table::TimeTracking => TIME_TRACKING_COLUMNS,
        }
    }

    /// Os backends montam SQL/URLs com nomes de coluna; só aceitamos os conhecidos.
    pub fn check_column(self, column: &str) -> Result<&'static str, AppError> {
        self.columns()
            .iter()
            .copied()
            .find(|c| *c == column)
            .ok_or_else(|| AppError::UnknownColumn {
                table: self.name(),
                column: column.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    Gte(&'static str, DateTime<Utc>),
    Lte(&'static str, DateTime<Utc>),
    IsNull(&'static str),
}

impl Filter {
    pub fn column(&self) -> &'static str {
        match self {
            Filter::Eq(c, _) | Filter::Gte(c, _) | Filter::Lte(c, _) | Filter::IsNull(c) => c,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

/// Filtros combinados com AND, mais uma ordenação opcional. `columns` vazio = todas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub columns: Vec<&'static str>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Devolve só estas colunas em cada linha.
    pub fn only(mut self, columns: &[&'static str]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column, value.into()));
        self
    }

    pub fn gte(mut self, column: &'static str, at: DateTime<Utc>) -> Self {
        self.filters.push(Filter::Gte(column, at));
        self
    }

    pub fn lte(mut self, column: &'static str, at: DateTime<Utc>) -> Self {
        self.filters.push(Filter::Lte(column, at));
        self
    }

    /// Atalho para `gte` + `lte` na mesma coluna.
    pub fn between(self, column: &'static str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.gte(column, start).lte(column, end)
    }

    pub fn is_null(mut self, column: &'static str) -> Self {
        self.filters.push(Filter::IsNull(column));
        self
    }

    pub fn order_by(mut self, column: &'static str, ascending: bool) -> Self {
        self.order = Some(Order { column, ascending });
        self
    }

    /// Valida todas as colunas citadas contra a tabela.
    pub fn check(&self, table: Table) -> Result<(), AppError> {
        for column in &self.columns {
            table.check_column(column)?;
        }
        for filter in &self.filters {
            table.check_column(filter.column())?;
        }
        if let Some(order) = &self.order {
            table.check_column(order.column)?;
        }
        Ok(())
    }
}

/// O serviço de dados relacional: CRUD e filtros de intervalo sobre as duas tabelas.
#[async_trait]
pub trait DataService: Send + Sync {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, AppError>;

    async fn count(&self, table: Table, query: &Query) -> Result<usize, AppError> {
        Ok(self.select(table, query).await?.len())
    }

    /// Insere e devolve a linha como ficou gravada (id e defaults do servidor).
    async fn insert(&self, table: Table, row: Row) -> Result<Row, AppError>;

    /// Atualização parcial por id. Devolve quantas linhas foram afetadas.
    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<u64, AppError>;

    async fn delete(&self, table: Table, id: Uuid) -> Result<u64, AppError>;
}

pub fn to_row<T: Serialize>(value: &T) -> Result<Row, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        other => Err(AppError::MappingError(format!("esperado objeto, recebido {other}"))),
    }
}

pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| AppError::MappingError(e.to_string()))
}
