//! SELECT projection clause.

/// Accumulates SELECT column expressions; renders ` *` while empty.
#[derive(Clone, Debug, Default)]
pub struct SelectColumns {
    entries: Vec<String>,
}

impl SelectColumns {
    /// Append one column expression.
    pub fn add(&mut self, expr: impl Into<String>) {
        self.entries.push(expr.into());
    }

    /// Whether no columns have been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the projection fragment.
    pub fn build(&self) -> String {
        if self.entries.is_empty() {
            " *".to_string()
        } else {
            format!(" {}", self.entries.join(", "))
        }
    }

    /// Discard all accumulated columns.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
