//! DELETE statement composer.

use crate::bind::Binder;
use crate::clause::{Conditions, Flags, Returning, With};
use crate::query::Query;
use crate::value::Value;

/// Composes a DELETE statement: target, WHERE, RETURNING.
#[derive(Clone, Debug)]
pub struct Delete {
    binder: Binder,
    with: With,
    flags: Flags,
    table: String,
    where_clause: Conditions,
    returning: Returning,
}

impl Default for Delete {
    fn default() -> Self {
        Self::new()
    }
}

impl Delete {
    /// Create an empty DELETE composer.
    pub fn new() -> Self {
        Self {
            binder: Binder::new(),
            with: With::default(),
            flags: Flags::default(),
            table: String::new(),
            where_clause: Conditions::new("WHERE"),
            returning: Returning::default(),
        }
    }

    /// Set the target table.
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Add an AND-connected WHERE condition; `?` slots bind `values` inline.
    pub fn where_(mut self, condition: &str, values: Vec<Value>) -> Self {
        self.where_clause.and(&mut self.binder, condition, values);
        self
    }

    /// Alias for [`Delete::where_`].
    pub fn and_where(self, condition: &str, values: Vec<Value>) -> Self {
        self.where_(condition, values)
    }

    /// Add an OR-connected WHERE condition.
    pub fn or_where(mut self, condition: &str, values: Vec<Value>) -> Self {
        self.where_clause.or(&mut self.binder, condition, values);
        self
    }

    /// Concatenate onto the last WHERE condition without a connective.
    pub fn cat_where(mut self, expr: &str, values: Vec<Value>) -> Self {
        self.where_clause.cat(&mut self.binder, expr, values);
        self
    }

    /// Add an AND-connected parenthesized WHERE group.
    pub fn where_group(mut self, f: impl FnOnce(&mut Conditions, &mut Binder)) -> Self {
        self.where_clause.and_group(&mut self.binder, f);
        self
    }

    /// Add an OR-connected parenthesized WHERE group.
    pub fn or_where_group(mut self, f: impl FnOnce(&mut Conditions, &mut Binder)) -> Self {
        self.where_clause.or_group(&mut self.binder, f);
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
        self.where_clause.reset();
        self.returning.reset();
        self.flags.reset();
        self.with.reset();
        self
    }

    /// Reset the WHERE clause.
    pub fn reset_where(mut self) -> Self {
        self.where_clause.reset();
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
            "{}DELETE{} FROM {}{}{}",
            self.with.build(),
            self.flags.build(),
            self.table,
            self.where_clause.build(),
            self.returning.build(),
        )
    }
}

impl Query for Delete {
    fn statement(&self) -> String {
        self.get_statement()
    }

    fn bind_values(&self) -> &[(String, Value)] {
        self.binder.values()
    }
}
