//! Column-modification clause for INSERT and UPDATE.

use crate::bind::Binder;
use crate::value::Value;

/// Accumulates column/value-expression pairs, with bulk row support.
///
/// The master column order is the first-seen union across rows; cells a row
/// never set render as `NULL`. Re-setting a column within a row replaces its
/// value expression in place.
#[derive(Clone, Debug, Default)]
pub struct ModifyColumns {
    columns: Vec<String>,
    rows: Vec<Vec<(String, String)>>,
    current: Vec<(String, String)>,
}

impl ModifyColumns {
    /// Bind `value` inline and set it as the expression for `column`.
    pub fn column(&mut self, binder: &mut Binder, column: &str, value: Value) {
        let token = binder.inline(value);
        self.set_expr(column, token);
    }

    /// Set a verbatim SQL expression for `column` (e.g. `NOW()`).
    pub fn raw(&mut self, column: &str, expr: impl Into<String>) {
        self.set_expr(column, expr.into());
    }

    fn set_expr(&mut self, column: &str, expr: String) {
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
        match self.current.iter_mut().find(|(c, _)| c == column) {
            Some(cell) => cell.1 = expr,
            None => self.current.push((column.to_string(), expr)),
        }
    }

    /// Finalize the current row so the next column calls start a new one.
    pub fn add_row(&mut self) {
        if !self.current.is_empty() {
            self.rows.push(std::mem::take(&mut self.current));
        }
    }

    /// Whether no columns have been set.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn all_rows(&self) -> Vec<&Vec<(String, String)>> {
        let mut rows: Vec<&Vec<(String, String)>> = self.rows.iter().collect();
        if !self.current.is_empty() {
            rows.push(&self.current);
        }
        rows
    }

    fn cell<'a>(row: &'a [(String, String)], column: &str) -> Option<&'a str> {
        row.iter()
            .find(|(c, _)| c == column)
            .map(|(_, expr)| expr.as_str())
    }

    /// Render the INSERT form: `(c1, c2) VALUES (e1, e2), (e3, NULL)`.
    /// No leading space; the INSERT render supplies ` INTO <table> `.
    pub fn build(&self) -> String {
        if self.columns.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = self
            .all_rows()
            .into_iter()
            .map(|row| {
                let cells: Vec<&str> = self
                    .columns
                    .iter()
                    .map(|column| Self::cell(row, column).unwrap_or("NULL"))
                    .collect();
                format!("({})", cells.join(", "))
            })
            .collect();
        format!("({}) VALUES {}", self.columns.join(", "), rendered.join(", "))
    }

    /// Render the UPDATE form: ` SET c1 = e1, c2 = e2`. The latest expression
    /// per column wins.
    pub fn build_assignments(&self) -> String {
        if self.columns.is_empty() {
            return String::new();
        }
        let mut parts: Vec<String> = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let expr = Self::cell(&self.current, column).or_else(|| {
                self.rows
                    .iter()
                    .rev()
                    .find_map(|row| Self::cell(row, column))
            });
            if let Some(expr) = expr {
                parts.push(format!("{column} = {expr}"));
            }
        }
        format!(" SET {}", parts.join(", "))
    }

    /// Discard all accumulated columns and rows.
    pub fn reset(&mut self) {
        self.columns.clear();
        self.rows.clear();
        self.current.clear();
    }
}
