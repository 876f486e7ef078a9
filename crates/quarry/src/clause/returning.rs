//! RETURNING clause.

/// Accumulates the RETURNING projection for dialects that support it.
#[derive(Clone, Debug, Default)]
pub struct Returning {
    entries: Vec<String>,
}

impl Returning {
    /// Append one returned expression.
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
            format!(" RETURNING {}", self.entries.join(", "))
        }
    }

    /// Discard all accumulated expressions.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build() {
        let mut returning = Returning::default();
        returning.add("id");
        returning.add("created_at");
        assert_eq!(returning.build(), " RETURNING id, created_at");
    }

    #[test]
    fn test_empty() {
        assert_eq!(Returning::default().build(), "");
    }
}
