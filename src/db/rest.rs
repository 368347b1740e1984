// src/db/rest.rs
//
// Cliente do serviço hospedado (PostgREST / Supabase): `{SUPABASE_URL}/rest/v1/{tabela}`,
// autenticado com a chave do projeto.

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DataService, Filter, Query, Row, Table},
};

/// Tamanho da página nas leituras. O PostgREST corta respostas maiores que `max-rows`
/// (1000 no Supabase) sem erro, então lemos em páginas até vir uma incompleta.
pub const PAGE_SIZE: usize = 1000;

#[derive(Clone)]
pub struct RestDataService {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RestDataService {
    pub fn new(base_url: Url, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self, table: Table) -> Result<Url, AppError> {
        let raw = format!(
            "{}/rest/v1/{}",
            self.base_url.as_str().trim_end_matches('/'),
            table.name()
        );
        Url::parse(&raw).map_err(|e| AppError::DataServiceUnavailable(format!("URL inválida: {e}")))
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "application/json")
    }

    // Escritas pedem a linha de volta para sabermos o que foi gravado/afetado
    fn write(&self, builder: RequestBuilder) -> RequestBuilder {
        self.request(builder).header("Prefer", "return=representation")
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::CONFLICT => AppError::UniqueConstraintViolation(body),
            _ => AppError::DataServiceUnavailable(format!("{status}: {body}")),
        })
    }

    async fn rows(response: reqwest::Response) -> Result<Vec<Row>, AppError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Vec<Row>>().await?)
    }
}

/// Total do cabeçalho `Content-Range` (`0-24/3573`, `*/0`). `*` no total = desconhecido.
pub(crate) fn parse_content_range(value: &str) -> Option<usize> {
    value.rsplit_once('/').and_then(|(_, total)| total.trim().parse().ok())
}

fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Filtros no formato de query string do PostgREST: `coluna=op.valor`.
pub(crate) fn filter_params(table: Table, query: &Query) -> Result<Vec<(String, String)>, AppError> {
    query.check(table)?;

    let select = if query.columns.is_empty() {
        "*".to_string()
    } else {
        query.columns.join(",")
    };
    let mut params = vec![("select".to_string(), select)];
    for filter in &query.filters {
        let (column, value) = match filter {
            Filter::Eq(c, v) => (c, format!("eq.{}", filter_value(v))),
            Filter::Gte(c, at) => (c, format!("gte.{}", at.to_rfc3339_opts(SecondsFormat::Millis, true))),
            Filter::Lte(c, at) => (c, format!("lte.{}", at.to_rfc3339_opts(SecondsFormat::Millis, true))),
            Filter::IsNull(c) => (c, "is.null".to_string()),
        };
        params.push((column.to_string(), value));
    }

    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    Ok(params)
}

fn id_param(id: Uuid) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

#[async_trait]
impl DataService for RestDataService {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, AppError> {
        let mut params = filter_params(table, query)?;
        // Paginação precisa de ordem estável
        if query.order.is_none() {
            params.push(("order".to_string(), "id.asc".to_string()));
        }
        let url = self.table_url(table)?;

        let mut rows = Vec::new();
        loop {
            let page = [("limit", PAGE_SIZE.to_string()), ("offset", rows.len().to_string())];
            let response = self
                .request(self.client.get(url.clone()))
                .query(&params)
                .query(&page)
                .send()
                .await?;

            let batch = Self::rows(response).await?;
            let last_page = batch.len() < PAGE_SIZE;
            rows.extend(batch);
            if last_page {
                return Ok(rows);
            }
        }
    }

    // Só o total, sem baixar as linhas
    async fn count(&self, table: Table, query: &Query) -> Result<usize, AppError> {
        let params = filter_params(table, query)?;
        let response = self
            .request(self.client.head(self.table_url(table)?))
            .query(&params)
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        response
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| AppError::MappingError("resposta sem Content-Range com total".into()))
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, AppError> {
        for column in row.keys() {
            table.check_column(column)?;
        }

        let response = self
            .write(self.client.post(self.table_url(table)?))
            .json(&[&row])
            .send()
            .await?;

        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::MappingError("inserção sem retorno".into()))
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<u64, AppError> {
        for column in patch.keys() {
            table.check_column(column)?;
        }

        let response = self
            .write(self.client.patch(self.table_url(table)?))
            .query(&id_param(id))
            .json(&patch)
            .send()
            .await?;

        Ok(Self::rows(response).await?.len() as u64)
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<u64, AppError> {
        let response = self
            .write(self.client.delete(self.table_url(table)?))
            .query(&id_param(id))
            .send()
            .await?;

        Ok(Self::rows(response).await?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn filters_use_postgrest_operators() {
        let start = Utc.with_ymd_and_hms(2026, 10, 18, 3, 0, 0).unwrap();
        let query = Query::new()
            .eq("activity_type", "prospecting")
            .gte("start_time", start)
            .is_null("end_time")
            .order_by("start_time", false);

        let params = filter_params(Table::TimeTracking, &query).unwrap();
        let pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("select", "*"),
                ("activity_type", "eq.prospecting"),
                ("start_time", "gte.2026-10-18T03:00:00.000Z"),
                ("end_time", "is.null"),
                ("order", "start_time.desc"),
            ]
        );
    }

    #[test]
    fn projection_goes_into_select() {
        let query = Query::new().only(&["createdat"]);
        let params = filter_params(Table::Leads, &query).unwrap();
        assert_eq!(params[0], ("select".to_string(), "createdat".to_string()));
    }

    #[test]
    fn content_range_total() {
        assert_eq!(parse_content_range("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
        assert_eq!(parse_content_range("lixo"), None);
    }

    #[test]
    fn table_url_tolerates_trailing_slash() {
        let service = RestDataService::new(Url::parse("https://abc.supabase.co/").unwrap(), "key");
        assert_eq!(
            service.table_url(Table::Leads).unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/leads"
        );
    }
}
