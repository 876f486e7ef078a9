//! GROUP BY clause.

/// Accumulates GROUP BY expressions.
#[derive(Clone, Debug, Default)]
pub struct GroupBy {
    entries: Vec<String>,
}

impl GroupBy {
    /// Append one grouping expression.
    pub fn add(&mut self, expr: impl Into<String>) {
        self.entries.push(expr.into());
    }

    /// Whether no expressions have been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the fragment, empty string if unused.
    pub fn build(&self) -> String {
        if self.entries.is_empty() {
            String::new()
        } else {
            format!(" GROUP BY {}", self.entries.join(", "))
        }
    }

    /// Discard all accumulated expressions.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
