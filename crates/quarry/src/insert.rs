//! INSERT statement composer.

use crate::bind::Binder;
use crate::clause::{Flags, ModifyColumns, Returning, With};
use crate::connection::Connection;
use crate::error::{QueryError, QueryResult};
use crate::query::Query;
use crate::value::Value;

/// Composes an INSERT statement with single-row and bulk-row forms.
#[derive(Clone, Debug, Default)]
pub struct Insert {
    binder: Binder,
    with: With,
    flags: Flags,
    table: String,
    columns: ModifyColumns,
    returning: Returning,
}

impl Insert {
    /// Create an empty INSERT composer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target table.
    pub fn into(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set a column to a bound value.
    pub fn column(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.columns.column(&mut self.binder, column, value.into());
        self
    }

    /// Set several columns to bound values, in iteration order.
    pub fn columns<I, S, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        for (column, value) in pairs {
            self.columns
                .column(&mut self.binder, column.as_ref(), value.into());
        }
        self
    }

    /// Set a column to a verbatim SQL expression (e.g. `NOW()`).
    pub fn raw(mut self, column: &str, expr: impl Into<String>) -> Self {
        self.columns.raw(column, expr);
        self
    }

    /// Set a column to a value serialized as JSON text.
    pub fn column_json(
        mut self,
        column: &str,
        value: &impl serde::Serialize,
    ) -> QueryResult<Self> {
        let text = serde_json::to_string(value)
            .map_err(|e| QueryError::Serialization(e.to_string()))?;
        self.columns
            .column(&mut self.binder, column, Value::Text(text));
        Ok(self)
    }

    /// Finalize the current row; subsequent column calls start a new one.
    pub fn add_row(mut self) -> Self {
        self.columns.add_row();
        self
    }

    /// Append a RETURNING expression.
    pub fn returning<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for expr in exprs {
            self.returning.add(expr);
        }
        self
    }

    /// Add a CTE with a raw SQL body.
    pub fn with(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.with.with(name, body);
        self
    }

    /// Add a CTE whose body is a SELECT composer; its placeholders are
    /// re-allocated into this composer's registry.
    pub fn with_select(mut self, name: impl Into<String>, select: &crate::Select) -> Self {
        let body = self
            .binder
            .absorb(&select.get_statement(), Query::bind_values(select));
        self.with.with(name, body);
        self
    }

    /// Switch the WITH keyword to `WITH RECURSIVE`.
    pub fn recursive(mut self, enable: bool) -> Self {
        self.with.recursive(enable);
        self
    }

    /// Enable or disable an arbitrary keyword flag.
    pub fn set_flag(mut self, flag: &str, enable: bool) -> Self {
        self.flags.set(flag, enable);
        self
    }

    /// Reset all per-statement clause state, keeping the bind registry.
    pub fn reset(mut self) -> Self {
        self.table.clear();
        self.columns.reset();
        self.returning.reset();
        self.flags.reset();
        self.with.reset();
        self
    }

    /// Reset the column/value assignments.
    pub fn reset_columns(mut self) -> Self {
        self.columns.reset();
        self
    }

    /// Reset the RETURNING clause.
    pub fn reset_returning(mut self) -> Self {
        self.returning.reset();
        self
    }

    /// Reset keyword flags.
    pub fn reset_flags(mut self) -> Self {
        self.flags.reset();
        self
    }

    /// Reset the WITH clause.
    pub fn reset_with(mut self) -> Self {
        self.with.reset();
        self
    }

    /// Bind a value under an explicit placeholder name.
    pub fn bind_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.binder.bind_value(name, value);
        self
    }

    /// All bound name/value pairs in registration order.
    pub fn bind_values(&self) -> &[(String, Value)] {
        self.binder.values()
    }

    /// Render the complete statement.
    pub fn get_statement(&self) -> String {
        format!(
            "{}INSERT{} INTO {} {}{}",
            self.with.build(),
            self.flags.build(),
            self.table,
            self.columns.build(),
            self.returning.build(),
        )
    }

    /// Fetch the identity value generated by the last executed insert, in
    /// its text form.
    pub async fn last_insert_id(
        &self,
        conn: &impl Connection,
        sequence: Option<&str>,
    ) -> QueryResult<String> {
        conn.last_insert_id(sequence).await
    }
}

impl Query for Insert {
    fn statement(&self) -> String {
        self.get_statement()
    }

    fn bind_values(&self) -> &[(String, Value)] {
        self.binder.values()
    }
}
