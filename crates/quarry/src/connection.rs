//! Database connection abstraction.
//!
//! A [`Connection`] only has to execute and query; every fetch shape is
//! derived from `query()` in provided methods, so drivers override them only
//! when they can do better natively.

use std::future::Future;

use crate::error::QueryResult;
use crate::row::Row;
use crate::stream::{key_pair_of, KeyPairStream, KeyedRowStream, RowStream, ValueStream};
use crate::value::Value;

/// Executes rendered statements with their named bind values.
pub trait Connection: Send + Sync {
    /// Execute a statement, returning the affected-row count.
    fn execute(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<u64>> + Send;

    /// Execute a statement, returning all result rows.
    fn query(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<Vec<Row>>> + Send;

    /// The identity value generated by the last insert, in its text form.
    /// `sequence` selects a specific sequence where the backend needs one.
    fn last_insert_id(
        &self,
        sequence: Option<&str>,
    ) -> impl Future<Output = QueryResult<String>> + Send;

    /// Fetch all rows.
    fn fetch_all(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<Vec<Row>>> + Send {
        async move { self.query(statement, values).await }
    }

    /// Fetch the first row, if any.
    fn fetch_one(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<Option<Row>>> + Send {
        async move {
            let mut rows = self.query(statement, values).await?;
            Ok(if rows.is_empty() {
                None
            } else {
                Some(rows.swap_remove(0))
            })
        }
    }

    /// Execute and return the affected-row count.
    fn fetch_affected(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<u64>> + Send {
        async move { self.execute(statement, values).await }
    }

    /// Fetch the column at `index` from every row. A missing index reads as
    /// `Value::Null`, matching SQL's treatment of absent data.
    fn fetch_column(
        &self,
        statement: &str,
        values: &[(String, Value)],
        index: usize,
    ) -> impl Future<Output = QueryResult<Vec<Value>>> + Send {
        async move {
            let rows = self.query(statement, values).await?;
            Ok(rows
                .iter()
                .map(|row| row.get(index).cloned().unwrap_or(Value::Null))
                .collect())
        }
    }

    /// Fetch a single scalar at `index` from the first row.
    fn fetch_value(
        &self,
        statement: &str,
        values: &[(String, Value)],
        index: usize,
    ) -> impl Future<Output = QueryResult<Option<Value>>> + Send {
        async move {
            let row = self.fetch_one(statement, values).await?;
            Ok(row.and_then(|r| r.get(index).cloned()))
        }
    }

    /// Fetch (first column as text key, second column value) pairs, in row
    /// order.
    fn fetch_key_pair(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<Vec<(String, Value)>>> + Send {
        async move {
            let rows = self.query(statement, values).await?;
            rows.into_iter().map(key_pair_of).collect()
        }
    }

    /// Fetch rows keyed by their first column, one entry per row, in row
    /// order.
    fn fetch_unique(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<Vec<(String, Row)>>> + Send {
        async move {
            let rows = self.query(statement, values).await?;
            rows.into_iter().map(Row::split_key).collect()
        }
    }

    /// Fetch rows grouped by their first column, keys in first-seen order.
    /// Grouped rows keep all their columns.
    fn fetch_group(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<Vec<(String, Vec<Row>)>>> + Send {
        async move {
            let rows = self.query(statement, values).await?;
            let mut groups: Vec<(String, Vec<Row>)> = Vec::new();
            for row in rows {
                let key = row.key_text()?;
                match groups.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, bucket)) => bucket.push(row),
                    None => groups.push((key, vec![row])),
                }
            }
            Ok(groups)
        }
    }
}

/// A [`Connection`] that can also produce rows lazily.
pub trait StreamingConnection: Connection {
    /// Stream all result rows.
    fn stream(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<RowStream>> + Send;

    /// Stream the column at `index` from every row.
    fn yield_column(
        &self,
        statement: &str,
        values: &[(String, Value)],
        index: usize,
    ) -> impl Future<Output = QueryResult<ValueStream>> + Send {
        async move {
            let rows = self.stream(statement, values).await?;
            Ok(ValueStream::new(rows, index))
        }
    }

    /// Stream (first column as text key, second column value) pairs.
    fn yield_key_pair(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<KeyPairStream>> + Send {
        async move {
            let rows = self.stream(statement, values).await?;
            Ok(KeyPairStream::new(rows))
        }
    }

    /// Stream rows keyed by their first column.
    fn yield_unique(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<KeyedRowStream>> + Send {
        async move {
            let rows = self.stream(statement, values).await?;
            Ok(KeyedRowStream::new(rows))
        }
    }
}

impl<C: Connection> Connection for &C {
    fn execute(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<u64>> + Send {
        (**self).execute(statement, values)
    }

    fn query(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<Vec<Row>>> + Send {
        (**self).query(statement, values)
    }

    fn last_insert_id(
        &self,
        sequence: Option<&str>,
    ) -> impl Future<Output = QueryResult<String>> + Send {
        (**self).last_insert_id(sequence)
    }
}

impl<C: StreamingConnection> StreamingConnection for &C {
    fn stream(
        &self,
        statement: &str,
        values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<RowStream>> + Send {
        (**self).stream(statement, values)
    }
}
