// src/db/memory.rs

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DataService, Filter, Query, Row, Table},
};

/// Tabelas em memória. Usado nos testes e em demonstrações locais (DATA_BACKEND=memory).
/// `set_offline(true)` faz toda chamada falhar como falha de transporte.
#[derive(Debug, Default)]
pub struct MemoryDataService {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    offline: AtomicBool,
}

impl MemoryDataService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Todas as linhas de uma tabela, sem filtros (inspeção em testes).
    pub async fn rows(&self, table: Table) -> Vec<Row> {
        self.tables.read().await.get(&table).cloned().unwrap_or_default()
    }

    fn ensure_online(&self) -> Result<(), AppError> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(AppError::DataServiceUnavailable("serviço de dados offline".into()));
        }
        Ok(())
    }
}

fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn row_id(row: &Row) -> Option<Uuid> {
    row.get("id").and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())
}

fn matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, expected) => row.get(*column) == Some(expected),
        Filter::Gte(column, at) => timestamp(row.get(*column)).is_some_and(|t| t >= *at),
        Filter::Lte(column, at) => timestamp(row.get(*column)).is_some_and(|t| t <= *at),
        Filter::IsNull(column) => row.get(*column).is_none_or(Value::is_null),
    }
}

// Nulos por último na ordem crescente, como no Postgres.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (timestamp(Some(a)), timestamp(Some(b))) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => a.to_string().cmp(&b.to_string()),
            },
        },
    }
}

fn has_open_entry(rows: &[Row], except: Option<Uuid>) -> bool {
    rows.iter()
        .filter(|r| except.is_none() || row_id(r) != except)
        .any(|r| r.get("end_time").is_none_or(Value::is_null))
}

#[async_trait]
impl DataService for MemoryDataService {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, AppError> {
        self.ensure_online()?;
        query.check(table)?;

        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(order.column), b.get(order.column));
                if order.ascending { ord } else { ord.reverse() }
            });
        }

        if !query.columns.is_empty() {
            for row in &mut rows {
                row.retain(|column, _| query.columns.contains(&column.as_str()));
            }
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, mut row: Row) -> Result<Row, AppError> {
        self.ensure_online()?;
        for column in row.keys() {
            table.check_column(column)?;
        }

        let id = match row_id(&row) {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                row.insert("id".into(), Value::String(id.to_string()));
                id
            }
        };

        if table == Table::TimeTracking {
            let now = Value::String(Utc::now().to_rfc3339());
            row.entry("created_at").or_insert_with(|| now.clone());
            row.entry("updated_at").or_insert(now);
        }

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();

        if rows.iter().any(|r| row_id(r) == Some(id)) {
            return Err(AppError::UniqueConstraintViolation(format!("id {id} já existe")));
        }
        // Mesmo índice parcial do schema Postgres: uma única atividade em aberto
        if table == Table::TimeTracking
            && row.get("end_time").is_none_or(Value::is_null)
            && has_open_entry(rows, None)
        {
            return Err(AppError::UniqueConstraintViolation(
                "já existe uma atividade em aberto".into(),
            ));
        }

        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<u64, AppError> {
        self.ensure_online()?;
        for column in patch.keys() {
            table.check_column(column)?;
        }

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(0);
        };

        if table == Table::TimeTracking
            && patch.get("end_time").is_some_and(Value::is_null)
            && has_open_entry(rows, Some(id))
        {
            return Err(AppError::UniqueConstraintViolation(
                "já existe uma atividade em aberto".into(),
            ));
        }

        let mut affected = 0;
        for row in rows.iter_mut().filter(|r| row_id(r) == Some(id)) {
            for (column, value) in &patch {
                row.insert(column.clone(), value.clone());
            }
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<u64, AppError> {
        self.ensure_online()?;

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        Ok((before - rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::to_row;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn entry(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Row {
        to_row(&json!({
            "activity_type": "prospecting",
            "start_time": start,
            "end_time": end,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn range_filters_and_ordering() {
        let data = MemoryDataService::new();
        let base = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        for h in [0, 2, 1] {
            let start = base + Duration::hours(h);
            data.insert(Table::TimeTracking, entry(start, Some(start + Duration::minutes(10))))
                .await
                .unwrap();
        }

        let query = Query::new()
            .between("start_time", base + Duration::minutes(30), base + Duration::hours(3))
            .order_by("start_time", false);
        let rows = data.select(Table::TimeTracking, &query).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(timestamp(rows[0].get("start_time")), Some(base + Duration::hours(2)));
    }

    #[tokio::test]
    async fn only_one_open_entry_is_accepted() {
        let data = MemoryDataService::new();
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();

        data.insert(Table::TimeTracking, entry(now, None)).await.unwrap();
        let err = data.insert(Table::TimeTracking, entry(now, None)).await.unwrap_err();
        assert!(matches!(err, AppError::UniqueConstraintViolation(_)));

        let open = Query::new().is_null("end_time");
        assert_eq!(data.count(Table::TimeTracking, &open).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn offline_service_fails_every_call() {
        let data = MemoryDataService::new();
        data.set_offline(true);

        let err = data.select(Table::Leads, &Query::new()).await.unwrap_err();
        assert!(matches!(err, AppError::DataServiceUnavailable(_)));
        assert!(data.delete(Table::Leads, Uuid::new_v4()).await.is_err());
    }
}
