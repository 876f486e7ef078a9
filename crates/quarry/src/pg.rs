//! Postgres execution bridge.
//!
//! Rewrites the composer's named placeholders into the `$1`-style positional
//! form `tokio-postgres` speaks, adapts [`Value`] to the target column types,
//! and decodes result rows back into driver-independent [`Row`]s.

use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures_core::Stream;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::GenericClient;

use crate::bind::rewrite_placeholders;
use crate::connection::{Connection, StreamingConnection};
use crate::error::{QueryError, QueryResult};
use crate::row::Row;
use crate::stream::RowStream;
use crate::value::Value;

/// Rewrite `:name` placeholders to `$k` by order of first appearance and
/// collect the values in that order.
///
/// Repeated names reuse their `$k`, so a name registered once may appear in
/// the text any number of times. Values are paired by name, not by
/// registration position; a placeholder with no registered value fails with
/// [`QueryError::MissingBind`].
pub(crate) fn positional(
    statement: &str,
    values: &[(String, Value)],
) -> QueryResult<(String, Vec<Value>)> {
    let mut ordered: Vec<Value> = Vec::new();
    let mut assigned: Vec<(String, usize)> = Vec::new();
    let mut missing: Option<String> = None;
    let sql = rewrite_placeholders(statement, |name| {
        if missing.is_some() {
            return None;
        }
        if let Some((_, index)) = assigned.iter().find(|(n, _)| n == name) {
            return Some(format!("${index}"));
        }
        match values.iter().find(|(n, _)| n == name) {
            Some((_, value)) => {
                ordered.push(value.clone());
                let index = ordered.len();
                assigned.push((name.to_string(), index));
                Some(format!("${index}"))
            }
            None => {
                missing = Some(name.to_string());
                None
            }
        }
    });
    if let Some(name) = missing {
        return Err(QueryError::MissingBind(name));
    }
    Ok((sql, ordered))
}

fn log_sql(sql: &str, params: &[Value]) {
    #[cfg(feature = "tracing")]
    tracing::debug!(target: "quarry.sql", sql = %sql, params = ?params, "executing statement");
    #[cfg(not(feature = "tracing"))]
    let _ = (sql, params);
}

type ToSqlError = Box<dyn std::error::Error + Sync + Send>;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut bytes::BytesMut) -> Result<IsNull, ToSqlError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::Int(n) => {
                if *ty == Type::INT2 {
                    (*n as i16).to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    (*n as i32).to_sql(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*n as f32).to_sql(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*n as f64).to_sql(ty, out)
                } else {
                    n.to_sql(ty, out)
                }
            }
            Value::Float(f) => {
                if *ty == Type::FLOAT4 {
                    (*f as f32).to_sql(ty, out)
                } else {
                    f.to_sql(ty, out)
                }
            }
            Value::Text(s) => {
                if *ty == Type::UUID {
                    s.parse::<uuid::Uuid>()
                        .map_err(ToSqlError::from)?
                        .to_sql(ty, out)
                } else if *ty == Type::TIMESTAMPTZ {
                    DateTime::parse_from_rfc3339(s)
                        .map_err(ToSqlError::from)?
                        .with_timezone(&Utc)
                        .to_sql(ty, out)
                } else if *ty == Type::TIMESTAMP {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                        .map_err(ToSqlError::from)?
                        .to_sql(ty, out)
                } else if *ty == Type::DATE {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .map_err(ToSqlError::from)?
                        .to_sql(ty, out)
                } else if *ty == Type::JSON || *ty == Type::JSONB {
                    serde_json::from_str::<serde_json::Value>(s)
                        .map_err(ToSqlError::from)?
                        .to_sql(ty, out)
                } else {
                    s.to_sql(ty, out)
                }
            }
            Value::Bytes(b) => b.to_sql(ty, out),
            Value::List(_) => Err(
                "list values expand to one placeholder per element at composition time \
                 and cannot be sent as a single parameter"
                    .into(),
            ),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Decode a driver row into the driver-independent form by column type.
pub(crate) fn convert_row(row: &tokio_postgres::Row) -> QueryResult<Row> {
    let columns: std::sync::Arc<[String]> = row
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect::<Vec<_>>()
        .into();
    let mut values = Vec::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value = if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(i)?.map(Value::Bool)
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(i)?.map(|v| Value::Int(v as i64))
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(i)?.map(|v| Value::Int(v as i64))
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(i)?.map(Value::Int)
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(i)?.map(|v| Value::Float(v as f64))
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(i)?.map(Value::Float)
        } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME {
            row.try_get::<_, Option<String>>(i)?.map(Value::Text)
        } else if *ty == Type::BYTEA {
            row.try_get::<_, Option<Vec<u8>>>(i)?.map(Value::Bytes)
        } else if *ty == Type::UUID {
            row.try_get::<_, Option<uuid::Uuid>>(i)?
                .map(|v| Value::Text(v.to_string()))
        } else if *ty == Type::TIMESTAMPTZ {
            row.try_get::<_, Option<DateTime<Utc>>>(i)?
                .map(|v| Value::Text(v.to_rfc3339()))
        } else if *ty == Type::TIMESTAMP {
            row.try_get::<_, Option<NaiveDateTime>>(i)?
                .map(|v| Value::Text(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
        } else if *ty == Type::DATE {
            row.try_get::<_, Option<NaiveDate>>(i)?
                .map(|v| Value::Text(v.to_string()))
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            row.try_get::<_, Option<serde_json::Value>>(i)?
                .map(|v| Value::Text(v.to_string()))
        } else {
            return Err(QueryError::decode(
                column.name(),
                format!("unsupported column type {ty}"),
            ));
        };
        values.push(value.unwrap_or(Value::Null));
    }
    Ok(Row::new(columns, values))
}

struct PgRowStream {
    inner: Pin<Box<tokio_postgres::RowStream>>,
}

impl Stream for PgRowStream {
    type Item = QueryResult<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => Poll::Ready(Some(convert_row(&row))),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e.into()))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

async fn pg_execute<C: GenericClient + Sync>(
    client: &C,
    statement: &str,
    values: &[(String, Value)],
) -> QueryResult<u64> {
    let (sql, ordered) = positional(statement, values)?;
    log_sql(&sql, &ordered);
    Ok(client.execute_raw(sql.as_str(), ordered.iter()).await?)
}

async fn pg_query<C: GenericClient + Sync>(
    client: &C,
    statement: &str,
    values: &[(String, Value)],
) -> QueryResult<Vec<Row>> {
    let (sql, ordered) = positional(statement, values)?;
    log_sql(&sql, &ordered);
    let params: Vec<&(dyn ToSql + Sync)> =
        ordered.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
    let rows = client.query(sql.as_str(), &params).await?;
    rows.iter().map(convert_row).collect()
}

async fn pg_last_insert_id<C: GenericClient + Sync>(
    client: &C,
    sequence: Option<&str>,
) -> QueryResult<String> {
    let row = match sequence {
        Some(name) => {
            client
                .query_one("SELECT currval($1::text::regclass)", &[&name])
                .await?
        }
        None => client.query_one("SELECT lastval()", &[]).await?,
    };
    let id: i64 = row.try_get(0)?;
    Ok(id.to_string())
}

async fn pg_stream<C: GenericClient + Sync>(
    client: &C,
    statement: &str,
    values: &[(String, Value)],
) -> QueryResult<RowStream> {
    let (sql, ordered) = positional(statement, values)?;
    log_sql(&sql, &ordered);
    let rows = client.query_raw(sql.as_str(), ordered).await?;
    Ok(RowStream::new(PgRowStream {
        inner: Box::pin(rows),
    }))
}

impl Connection for tokio_postgres::Client {
    async fn execute(&self, statement: &str, values: &[(String, Value)]) -> QueryResult<u64> {
        pg_execute(self, statement, values).await
    }

    async fn query(&self, statement: &str, values: &[(String, Value)]) -> QueryResult<Vec<Row>> {
        pg_query(self, statement, values).await
    }

    async fn last_insert_id(&self, sequence: Option<&str>) -> QueryResult<String> {
        pg_last_insert_id(self, sequence).await
    }
}

impl StreamingConnection for tokio_postgres::Client {
    async fn stream(&self, statement: &str, values: &[(String, Value)]) -> QueryResult<RowStream> {
        pg_stream(self, statement, values).await
    }
}

impl Connection for tokio_postgres::Transaction<'_> {
    async fn execute(&self, statement: &str, values: &[(String, Value)]) -> QueryResult<u64> {
        pg_execute(self, statement, values).await
    }

    async fn query(&self, statement: &str, values: &[(String, Value)]) -> QueryResult<Vec<Row>> {
        pg_query(self, statement, values).await
    }

    async fn last_insert_id(&self, sequence: Option<&str>) -> QueryResult<String> {
        pg_last_insert_id(self, sequence).await
    }
}

impl StreamingConnection for tokio_postgres::Transaction<'_> {
    async fn stream(&self, statement: &str, values: &[(String, Value)]) -> QueryResult<RowStream> {
        pg_stream(self, statement, values).await
    }
}
