// src/db/postgres.rs

use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DataService, Filter, Query, Row, Table},
};

// Acesso direto ao Postgres. As linhas vão e voltam como jsonb (`to_jsonb` e
// `jsonb_populate_record`), assim o mesmo `Row` serve aos três backends.
#[derive(Clone)]
pub struct PgDataService {
    pool: PgPool,
}

impl PgDataService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    table: Table,
    query: &'a Query,
) -> Result<(), AppError> {
    query.check(table)?;

    for (i, filter) in query.filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match filter {
            Filter::Eq(column, value) => {
                builder.push(format!("to_jsonb(t.{column}) = "));
                builder.push_bind(Json(value));
            }
            Filter::Gte(column, at) => {
                builder.push(format!("t.{column} >= "));
                builder.push_bind(*at);
            }
            Filter::Lte(column, at) => {
                builder.push(format!("t.{column} <= "));
                builder.push_bind(*at);
            }
            Filter::IsNull(column) => {
                builder.push(format!("t.{column} IS NULL"));
            }
        }
    }
    Ok(())
}

pub(crate) fn select_sql<'a>(
    table: Table,
    query: &'a Query,
) -> Result<QueryBuilder<'a, Postgres>, AppError> {
    query.check(table)?;
    let projection = if query.columns.is_empty() {
        "to_jsonb(t)".to_string()
    } else {
        let pairs: Vec<String> = query.columns.iter().map(|c| format!("'{c}', t.{c}")).collect();
        format!("jsonb_build_object({})", pairs.join(", "))
    };

    let mut builder =
        QueryBuilder::new(format!("SELECT {projection} FROM {} t", table.name()));
    push_filters(&mut builder, table, query)?;

    if let Some(order) = &query.order {
        let direction = if order.ascending { "ASC" } else { "DESC" };
        builder.push(format!(" ORDER BY t.{} {direction}", order.column));
    }
    Ok(builder)
}

pub(crate) fn count_sql<'a>(
    table: Table,
    query: &'a Query,
) -> Result<QueryBuilder<'a, Postgres>, AppError> {
    let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {} t", table.name()));
    push_filters(&mut builder, table, query)?;
    Ok(builder)
}

fn checked_columns(table: Table, row: &Row) -> Result<Vec<&'static str>, AppError> {
    row.keys().map(|c| table.check_column(c)).collect()
}

pub(crate) fn insert_sql(table: Table, row: &Row) -> Result<String, AppError> {
    let columns = checked_columns(table, row)?.join(", ");
    let name = table.name();
    Ok(format!(
        "INSERT INTO {name} AS t ({columns}) \
         SELECT {columns} FROM jsonb_populate_record(NULL::{name}, $1) \
         RETURNING to_jsonb(t)"
    ))
}

pub(crate) fn update_sql(table: Table, patch: &Row) -> Result<String, AppError> {
    let assignments = checked_columns(table, patch)?
        .into_iter()
        .map(|c| format!("{c} = r.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let name = table.name();
    Ok(format!(
        "UPDATE {name} AS t SET {assignments} \
         FROM jsonb_populate_record(NULL::{name}, $1) AS r \
         WHERE t.id = $2"
    ))
}

// Chave duplicada (inclusive o índice de "uma atividade em aberto") vira erro de domínio
fn map_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(
                db_err.constraint().unwrap_or("desconhecida").to_string(),
            );
        }
    }
    e.into()
}

#[async_trait]
impl DataService for PgDataService {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, AppError> {
        let mut builder = select_sql(table, query)?;
        let rows = builder
            .build_query_scalar::<Json<Row>>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(|Json(row)| row).collect())
    }

    async fn count(&self, table: Table, query: &Query) -> Result<usize, AppError> {
        let mut builder = count_sql(table, query)?;
        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(count.max(0) as usize)
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, AppError> {
        let sql = insert_sql(table, &row)?;
        let Json(inserted) = sqlx::query_scalar::<_, Json<Row>>(&sql)
            .bind(Json(&row))
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(inserted)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<u64, AppError> {
        if patch.is_empty() {
            let query = Query::new().eq("id", id.to_string());
            return Ok(self.count(table, &query).await? as u64);
        }

        let sql = update_sql(table, &patch)?;
        let result = sqlx::query(&sql)
            .bind(Json(&patch))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<u64, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table.name());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
