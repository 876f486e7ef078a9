//! FROM clause with join accumulation.

use crate::bind::Binder;
use crate::value::Value;

/// Accumulates comma-separated FROM entries; joins attach to the most recent
/// entry. Join types arrive pre-normalized from the composer.
#[derive(Clone, Debug, Default)]
pub struct FromClause {
    entries: Vec<String>,
    // Joins issued before the first table; drained into it on `table()`.
    pending: String,
}

impl FromClause {
    /// Start a new comma-separated FROM entry. Joins issued before this
    /// first entry attach to it, so rendered order stays grammatical no
    /// matter the call order.
    pub fn table(&mut self, reference: impl Into<String>) {
        let mut entry = reference.into();
        if self.entries.is_empty() && !self.pending.is_empty() {
            entry.push_str(&self.pending);
            self.pending.clear();
        }
        self.entries.push(entry);
    }

    /// Attach a join to the most recent entry. A non-empty condition is
    /// prefixed with `ON ` unless it already starts with `ON ` or `USING `.
    /// Joins issued before any table are held until one arrives.
    pub fn join(
        &mut self,
        binder: &mut Binder,
        join_type: &str,
        reference: &str,
        condition: &str,
        values: Vec<Value>,
    ) {
        let mut fragment = format!(" {join_type} {reference}");
        if !condition.is_empty() {
            let merged = binder.merge_template(condition, values);
            let head = merged.trim_start().to_uppercase();
            if head.starts_with("ON ") || head.starts_with("USING ") {
                fragment.push(' ');
            } else {
                fragment.push_str(" ON ");
            }
            fragment.push_str(merged.trim_start());
        }
        match self.entries.last_mut() {
            Some(entry) => entry.push_str(&fragment),
            None => self.pending.push_str(&fragment),
        }
    }

    /// Append a raw fragment to the last join, for join syntax the module
    /// does not model directly.
    pub fn cat_join(&mut self, binder: &mut Binder, expr: &str, values: Vec<Value>) {
        let merged = binder.merge_template(expr, values);
        match self.entries.last_mut() {
            Some(entry) => entry.push_str(&merged),
            None => self.pending.push_str(&merged),
        }
    }

    /// Whether no table references or joins have been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.pending.is_empty()
    }

    /// Render the FROM fragment, empty string if unused. Held joins with
    /// no table to attach to render bare after the keyword.
    pub fn build(&self) -> String {
        if self.entries.is_empty() {
            if self.pending.is_empty() {
                String::new()
            } else {
                format!(" FROM{}", self.pending)
            }
        } else {
            format!(" FROM {}", self.entries.join(", "))
        }
    }

    /// Discard all accumulated entries and held joins.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.pending.clear();
    }
}
