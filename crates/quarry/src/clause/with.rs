//! Common table expression (WITH) clause.

/// One CTE definition: name, optional column list, raw body text.
#[derive(Clone, Debug)]
struct CteDefinition {
    name: String,
    columns: Vec<String>,
    body: String,
}

/// Accumulates CTE definitions preceding the statement keyword.
///
/// Bodies are raw SQL text; embedding a sub-composer is done composer-side
/// through [`Binder::absorb`](crate::Binder::absorb) so placeholder names
/// cannot collide.
#[derive(Clone, Debug, Default)]
pub struct With {
    ctes: Vec<CteDefinition>,
    recursive: bool,
}

impl With {
    /// Add a CTE with a raw SQL body.
    pub fn with(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.ctes.push(CteDefinition {
            name: name.into(),
            columns: Vec::new(),
            body: body.into(),
        });
    }

    /// Add a CTE with an explicit column list.
    pub fn with_columns<I, S>(&mut self, name: impl Into<String>, columns: I, body: impl Into<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ctes.push(CteDefinition {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            body: body.into(),
        });
    }

    /// Switch the keyword to `WITH RECURSIVE`.
    pub fn recursive(&mut self, enable: bool) {
        self.recursive = enable;
    }

    /// Whether no CTEs have been added.
    pub fn is_empty(&self) -> bool {
        self.ctes.is_empty()
    }

    /// Render the clause with a trailing space (it precedes the statement
    /// keyword), empty string if unused.
    pub fn build(&self) -> String {
        if self.ctes.is_empty() {
            return String::new();
        }
        let keyword = if self.recursive {
            "WITH RECURSIVE"
        } else {
            "WITH"
        };
        let defs: Vec<String> = self
            .ctes
            .iter()
            .map(|cte| {
                if cte.columns.is_empty() {
                    format!("{} AS ({})", cte.name, cte.body)
                } else {
                    format!("{} ({}) AS ({})", cte.name, cte.columns.join(", "), cte.body)
                }
            })
            .collect();
        format!("{keyword} {} ", defs.join(", "))
    }

    /// Discard all CTEs and the recursive flag.
    pub fn reset(&mut self) {
        self.ctes.clear();
        self.recursive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_cte() {
        let mut with = With::default();
        with.with("active", "SELECT id FROM users WHERE live");
        assert_eq!(with.build(), "WITH active AS (SELECT id FROM users WHERE live) ");
    }

    #[test]
    fn test_columns_and_recursive() {
        let mut with = With::default();
        with.with_columns("tree", ["id", "parent"], "SELECT id, parent FROM nodes");
        with.recursive(true);
        assert_eq!(
            with.build(),
            "WITH RECURSIVE tree (id, parent) AS (SELECT id, parent FROM nodes) "
        );
    }

    #[test]
    fn test_multiple_ctes_in_order() {
        let mut with = With::default();
        with.with("a", "SELECT 1");
        with.with("b", "SELECT 2");
        assert_eq!(with.build(), "WITH a AS (SELECT 1), b AS (SELECT 2) ");
    }

    #[test]
    fn test_empty() {
        assert_eq!(With::default().build(), "");
    }
}
