//! The bind registry.
//!
//! A [`Binder`] owns the mapping from placeholder name to bound [`Value`] for
//! one composer. Names are `p1`, `p2`, ... from a per-registry counter, so
//! collisions are impossible within a registry; composers never share one, so
//! they are impossible across composers too. Registration order is preserved
//! because positional-style drivers want values in the order their
//! placeholders were allocated.
//!
//! There is no lifecycle lock: binding after a statement has been rendered and
//! read is permitted, and it is the caller's responsibility not to mutate a
//! composer between extracting its statement and executing it.

use crate::value::Value;

/// Per-statement store of placeholder name to literal value pairs.
#[derive(Clone, Debug, Default)]
pub struct Binder {
    values: Vec<(String, Value)>,
    counter: usize,
}

impl Binder {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next placeholder name, store `value` under it, and return
    /// the bare name (without the `:` sigil).
    pub fn value(&mut self, value: impl Into<Value>) -> String {
        self.counter += 1;
        let name = format!("p{}", self.counter);
        self.values.push((name.clone(), value.into()));
        name
    }

    /// Bind `value` and return the SQL token to splice into a fragment:
    /// `:pN` for a scalar, `(:pN, :pM, ...)` for a [`Value::List`] with each
    /// element bound separately in order.
    pub fn inline(&mut self, value: impl Into<Value>) -> String {
        match value.into() {
            Value::List(items) => {
                let tokens: Vec<String> = items
                    .into_iter()
                    .map(|item| format!(":{}", self.value(item)))
                    .collect();
                format!("({})", tokens.join(", "))
            }
            value => format!(":{}", self.value(value)),
        }
    }

    /// Merge inline-bound values into a condition template.
    ///
    /// Each `?` in `template` is replaced by the inline token of the next
    /// value. Values left over once the `?`s are exhausted have their tokens
    /// appended to the end of the fragment, which covers the trailing-operator
    /// idiom (`"price > "` plus one value renders `price > :pN`). A `?` with
    /// no value left stays literal.
    pub fn merge_template(&mut self, template: &str, values: Vec<Value>) -> String {
        let mut out = String::with_capacity(template.len() + 8);
        let mut values = values.into_iter();
        for ch in template.chars() {
            if ch == '?' {
                if let Some(value) = values.next() {
                    out.push_str(&self.inline(value));
                    continue;
                }
            }
            out.push(ch);
        }
        let rest: Vec<String> = values.map(|value| self.inline(value)).collect();
        if !rest.is_empty() {
            out.push_str(&rest.join(", "));
        }
        out
    }

    /// Bind `value` under an explicit name.
    ///
    /// Re-binding an existing name replaces the value in place without
    /// changing its position in registration order.
    pub fn bind_value(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    /// Bind a batch of named values via [`Binder::bind_value`].
    pub fn bind_values<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (name, value) in pairs {
            self.bind_value(name.as_ref(), value);
        }
    }

    /// All bound name/value pairs in registration order.
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }

    /// Whether nothing has been bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Clear all bindings and restart the name counter.
    pub fn reset(&mut self) {
        self.values.clear();
        self.counter = 0;
    }

    /// Embed an independently built statement into this registry's scope.
    ///
    /// Every placeholder token in `statement` that names an entry in `values`
    /// is rewritten to a freshly allocated name here (consistently per
    /// distinct name, in order of first appearance) and the sub-statement's
    /// value is registered under the new name. Tokens with no entry in
    /// `values`, `::` type casts, and quoted literals are left untouched.
    pub fn absorb(&mut self, statement: &str, values: &[(String, Value)]) -> String {
        let mut renames: Vec<(String, String)> = Vec::new();
        rewrite_placeholders(statement, |name| {
            if let Some((_, new)) = renames.iter().find(|(old, _)| old == name) {
                return Some(format!(":{new}"));
            }
            let value = values.iter().find(|(n, _)| n == name)?.1.clone();
            let new = self.value(value);
            renames.push((name.to_string(), new.clone()));
            Some(format!(":{new}"))
        })
    }
}

/// Walk `statement` and hand every `:name` placeholder token to `replace`.
///
/// A `Some` return substitutes the token, `None` leaves it as written.
/// Single-quoted literals (with `''` escapes) are copied verbatim and `::`
/// type casts are skipped, so a cast target is never mistaken for a
/// placeholder.
pub(crate) fn rewrite_placeholders(
    statement: &str,
    mut replace: impl FnMut(&str) -> Option<String>,
) -> String {
    let chars: Vec<char> = statement.chars().collect();
    let mut out = String::with_capacity(statement.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            out.push(c);
            i += 1;
            while i < chars.len() {
                let q = chars[i];
                out.push(q);
                i += 1;
                if q == '\'' {
                    if i < chars.len() && chars[i] == '\'' {
                        out.push('\'');
                        i += 1;
                    } else {
                        break;
                    }
                }
            }
        } else if c == ':' {
            if i + 1 < chars.len() && chars[i + 1] == ':' {
                out.push_str("::");
                i += 2;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    out.push(chars[i]);
                    i += 1;
                }
            } else {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_')
                {
                    end += 1;
                }
                if end > start {
                    let name: String = chars[start..end].iter().collect();
                    match replace(&name) {
                        Some(token) => out.push_str(&token),
                        None => {
                            out.push(':');
                            out.push_str(&name);
                        }
                    }
                    i = end;
                } else {
                    out.push(':');
                    i += 1;
                }
            }
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_names_in_order() {
        let mut bind = Binder::new();
        let a = bind.value(1i64);
        let b = bind.value("x");
        assert_eq!(a, "p1");
        assert_eq!(b, "p2");
        assert_eq!(
            bind.values(),
            &[
                ("p1".to_string(), Value::Int(1)),
                ("p2".to_string(), Value::Text("x".to_string()))
            ]
        );
    }

    #[test]
    fn test_inline_scalar_and_list() {
        let mut bind = Binder::new();
        assert_eq!(bind.inline(5i64), ":p1");
        assert_eq!(bind.inline(vec![1i64, 2, 3]), "(:p2, :p3, :p4)");
        assert_eq!(bind.values().len(), 4);
    }

    #[test]
    fn test_merge_template_placeholders() {
        let mut bind = Binder::new();
        let merged = bind.merge_template("a = ? AND b = ?", values![1, 2]);
        assert_eq!(merged, "a = :p1 AND b = :p2");
    }

    #[test]
    fn test_merge_template_trailing_append() {
        let mut bind = Binder::new();
        let merged = bind.merge_template("price > ", values![10]);
        assert_eq!(merged, "price > :p1");
    }

    #[test]
    fn test_merge_template_surplus_question_mark_stays() {
        let mut bind = Binder::new();
        let merged = bind.merge_template("a = ? AND b = ?", values![1]);
        assert_eq!(merged, "a = :p1 AND b = ?");
    }

    #[test]
    fn test_bind_value_replaces_in_place() {
        let mut bind = Binder::new();
        bind.value(1i64);
        bind.bind_value("p1", 9i64);
        bind.bind_value("extra", "x");
        assert_eq!(
            bind.values(),
            &[
                ("p1".to_string(), Value::Int(9)),
                ("extra".to_string(), Value::Text("x".to_string()))
            ]
        );
    }

    #[test]
    fn test_reset_restarts_counter() {
        let mut bind = Binder::new();
        bind.value(1i64);
        bind.reset();
        assert!(bind.is_empty());
        assert_eq!(bind.value(2i64), "p1");
    }

    #[test]
    fn test_absorb_renames_consistently() {
        let mut outer = Binder::new();
        outer.value("outer");
        let sub = vec![
            ("p1".to_string(), Value::Int(10)),
            ("p2".to_string(), Value::Int(20)),
        ];
        let rewritten = outer.absorb("x = :p1 AND y = :p2 AND x2 = :p1", &sub);
        assert_eq!(rewritten, "x = :p2 AND y = :p3 AND x2 = :p2");
        assert_eq!(
            outer.values(),
            &[
                ("p1".to_string(), Value::Text("outer".to_string())),
                ("p2".to_string(), Value::Int(10)),
                ("p3".to_string(), Value::Int(20)),
            ]
        );
    }

    #[test]
    fn test_absorb_skips_casts_and_literals() {
        let mut outer = Binder::new();
        let sub = vec![("p1".to_string(), Value::Int(1))];
        let rewritten = outer.absorb("a::text = :p1 AND b = ':p1'", &sub);
        assert_eq!(rewritten, "a::text = :p1 AND b = ':p1'");
        // quoted token untouched; the real placeholder keeps its name because
        // p1 is the first allocation in the empty outer registry
        assert_eq!(outer.values().len(), 1);
    }

    #[test]
    fn test_absorb_leaves_unknown_names() {
        let mut outer = Binder::new();
        let rewritten = outer.absorb("a = :custom", &[]);
        assert_eq!(rewritten, "a = :custom");
        assert!(outer.is_empty());
    }
}
