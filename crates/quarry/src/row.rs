//! Driver-independent rows and row mapping.

use crate::error::{QueryError, QueryResult};
use crate::value::Value;
use std::sync::Arc;

/// One result row: shared column names plus owned values.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row from shared column names and values.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Create a row from column/value pairs. Convenient for tests and mocks.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    /// Column names, in result order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a positional index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of a named column.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == name)?;
        self.values.get(idx)
    }

    /// Value of a named column, or a decode error naming the column.
    pub fn try_get(&self, name: &str) -> QueryResult<&Value> {
        self.get_named(name)
            .ok_or_else(|| QueryError::decode(name, "column not present in row"))
    }

    /// The first column rendered as a text key, for key-pair and unique
    /// result shapes.
    pub fn key_text(&self) -> QueryResult<String> {
        match self.values.first() {
            Some(value) => Ok(value.to_string()),
            None => Err(QueryError::decode("0", "row has no columns")),
        }
    }

    /// Split off the first column as a text key, leaving the remaining
    /// columns as the row.
    pub fn split_key(self) -> QueryResult<(String, Row)> {
        if self.values.is_empty() {
            return Err(QueryError::decode("0", "row has no columns"));
        }
        let key = self.values[0].to_string();
        let columns: Arc<[String]> = self.columns[1..].to_vec().into();
        let values = self.values[1..].to_vec();
        Ok((key, Row { columns, values }))
    }

    /// Consume the row, keeping only the values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Map a [`Row`] into a typed result.
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> QueryResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> QueryResult<Self> {
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_and_named_access() {
        let row = Row::from_pairs([("id", 1i64), ("age", 30i64)]);
        assert_eq!(row.get(0), Some(&Value::Int(1)));
        assert_eq!(row.get_named("age"), Some(&Value::Int(30)));
        assert!(row.try_get("missing").is_err());
    }

    #[test]
    fn test_split_key_drops_first_column() {
        let row = Row::from_pairs([("id", Value::Int(7)), ("name", Value::from("ann"))]);
        let (key, rest) = row.split_key().unwrap();
        assert_eq!(key, "7");
        assert_eq!(rest.columns(), &["name".to_string()]);
        assert_eq!(rest.get(0), Some(&Value::Text("ann".to_string())));
    }

    #[test]
    fn test_empty_row_has_no_key() {
        let row = Row::new(Vec::<String>::new().into(), Vec::new());
        assert!(row.key_text().is_err());
    }
}
