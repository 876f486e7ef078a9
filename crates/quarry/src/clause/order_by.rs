//! ORDER BY clause.

/// Accumulates ORDER BY expressions.
#[derive(Clone, Debug, Default)]
pub struct OrderBy {
    entries: Vec<String>,
}

impl OrderBy {
    /// Append one ordering expression (direction included by the caller).
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
            format!(" ORDER BY {}", self.entries.join(", "))
        }
    }

    /// Discard all accumulated expressions.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
