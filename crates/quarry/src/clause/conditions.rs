//! Boolean condition clause, shared by WHERE and HAVING.

use crate::bind::Binder;
use crate::value::Value;

/// Accumulates AND/OR-connected conditions under a configurable keyword.
///
/// Entries keep their connective prefix (`AND ...` / `OR ...`) except for the
/// first, and insertion order is preserved exactly: it governs SQL operator
/// precedence in the rendered fragment.
#[derive(Clone, Debug)]
pub struct Conditions {
    keyword: &'static str,
    entries: Vec<String>,
}

impl Conditions {
    /// Create an empty clause rendering under `keyword` (`WHERE`, `HAVING`).
    pub fn new(keyword: &'static str) -> Self {
        Self {
            keyword,
            entries: Vec::new(),
        }
    }

    /// Append an AND-connected condition, merging `values` into the template
    /// through the shared registry.
    pub fn and(&mut self, binder: &mut Binder, condition: &str, values: Vec<Value>) {
        let merged = binder.merge_template(condition, values);
        self.push_entry("AND", merged);
    }

    /// Append an OR-connected condition.
    pub fn or(&mut self, binder: &mut Binder, condition: &str, values: Vec<Value>) {
        let merged = binder.merge_template(condition, values);
        self.push_entry("OR", merged);
    }

    /// Concatenate onto the most recent condition without a connective.
    pub fn cat(&mut self, binder: &mut Binder, expr: &str, values: Vec<Value>) {
        let merged = binder.merge_template(expr, values);
        match self.entries.last_mut() {
            Some(entry) => entry.push_str(&merged),
            None => self.entries.push(merged),
        }
    }

    /// Append an AND-connected parenthesized group built by `f`.
    pub fn and_group(&mut self, binder: &mut Binder, f: impl FnOnce(&mut Conditions, &mut Binder)) {
        if let Some(group) = self.nested(binder, f) {
            self.push_entry("AND", group);
        }
    }

    /// Append an OR-connected parenthesized group built by `f`.
    pub fn or_group(&mut self, binder: &mut Binder, f: impl FnOnce(&mut Conditions, &mut Binder)) {
        if let Some(group) = self.nested(binder, f) {
            self.push_entry("OR", group);
        }
    }

    fn nested(
        &self,
        binder: &mut Binder,
        f: impl FnOnce(&mut Conditions, &mut Binder),
    ) -> Option<String> {
        let mut nested = Conditions::new(self.keyword);
        f(&mut nested, binder);
        if nested.entries.is_empty() {
            None
        } else {
            Some(format!("({})", nested.body()))
        }
    }

    fn push_entry(&mut self, connective: &str, expr: String) {
        if self.entries.is_empty() {
            self.entries.push(expr);
        } else {
            self.entries.push(format!("{connective} {expr}"));
        }
    }

    fn body(&self) -> String {
        self.entries.join(" ")
    }

    /// Whether no conditions have been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the clause fragment, empty string if unused.
    pub fn build(&self) -> String {
        if self.entries.is_empty() {
            String::new()
        } else {
            format!(" {} {}", self.keyword, self.body())
        }
    }

    /// Discard all accumulated conditions.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_or_chain() {
        let mut bind = Binder::new();
        let mut wh = Conditions::new("WHERE");
        wh.and(&mut bind, "a = ?", values![1]);
        wh.and(&mut bind, "b = ?", values![2]);
        wh.or(&mut bind, "c = ?", values![3]);
        assert_eq!(wh.build(), " WHERE a = :p1 AND b = :p2 OR c = :p3");
    }

    #[test]
    fn test_empty_builds_nothing() {
        let wh = Conditions::new("WHERE");
        assert_eq!(wh.build(), "");
    }

    #[test]
    fn test_cat_extends_last_entry() {
        let mut bind = Binder::new();
        let mut wh = Conditions::new("WHERE");
        wh.and(&mut bind, "a BETWEEN ?", values![1]);
        wh.cat(&mut bind, " AND ?", values![9]);
        assert_eq!(wh.build(), " WHERE a BETWEEN :p1 AND :p2");
    }

    #[test]
    fn test_group_parenthesizes_in_order() {
        let mut bind = Binder::new();
        let mut wh = Conditions::new("WHERE");
        wh.and(&mut bind, "a = ?", values![1]);
        wh.or_group(&mut bind, |g, b| {
            g.and(b, "b = ?", values![2]);
            g.and(b, "c = ?", values![3]);
        });
        assert_eq!(wh.build(), " WHERE a = :p1 OR (b = :p2 AND c = :p3)");
    }

    #[test]
    fn test_empty_group_is_dropped() {
        let mut bind = Binder::new();
        let mut wh = Conditions::new("HAVING");
        wh.and_group(&mut bind, |_, _| {});
        assert_eq!(wh.build(), "");
    }

    #[test]
    fn test_having_keyword() {
        let mut bind = Binder::new();
        let mut having = Conditions::new("HAVING");
        having.and(&mut bind, "COUNT(*) > ?", values![5]);
        assert_eq!(having.build(), " HAVING COUNT(*) > :p1");
    }
}
