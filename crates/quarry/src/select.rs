//! SELECT statement composer.

use crate::bind::Binder;
use crate::clause::{Conditions, Flags, FromClause, GroupBy, Limit, OrderBy, SelectColumns, With};
use crate::connection::Connection;
use crate::error::QueryResult;
use crate::query::Query;
use crate::value::Value;

/// Composes a SELECT statement from chained clause calls.
///
/// Clauses render in fixed grammatical order regardless of call order:
/// WITH, SELECT, flags, early-limit hint, columns, FROM, WHERE, GROUP BY,
/// HAVING, ORDER BY, LIMIT/OFFSET, FOR UPDATE. With an alias set the whole
/// body wraps as a derived-table expression: `(<body>) AS <alias>`.
#[derive(Clone, Debug)]
pub struct Select {
    binder: Binder,
    with: With,
    flags: Flags,
    columns: SelectColumns,
    from: FromClause,
    where_clause: Conditions,
    group_by: GroupBy,
    having: Conditions,
    order_by: OrderBy,
    limit: Limit,
    alias: Option<String>,
    unions: Vec<String>,
    for_update: bool,
}

impl Default for Select {
    fn default() -> Self {
        Self::new()
    }
}

impl Select {
    /// Create an empty SELECT composer.
    pub fn new() -> Self {
        Self {
            binder: Binder::new(),
            with: With::default(),
            flags: Flags::default(),
            columns: SelectColumns::default(),
            from: FromClause::default(),
            where_clause: Conditions::new("WHERE"),
            group_by: GroupBy::default(),
            having: Conditions::new("HAVING"),
            order_by: OrderBy::default(),
            limit: Limit::default(),
            alias: None,
            unions: Vec::new(),
            for_update: false,
        }
    }

    // ==================== Projection ====================

    /// Append SELECT column expressions.
    pub fn columns<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for expr in exprs {
            self.columns.add(expr);
        }
        self
    }

    /// Append one SELECT column expression.
    pub fn column(mut self, expr: impl Into<String>) -> Self {
        self.columns.add(expr);
        self
    }

    // ==================== FROM / JOIN ====================

    /// Add a FROM table reference.
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from.table(table);
        self
    }

    /// Add a derived table built by another composer.
    ///
    /// The sub-select's placeholders are re-allocated into this composer's
    /// registry; the sub-select should carry its own alias to be valid SQL
    /// (not validated here).
    pub fn from_select(mut self, select: &Select) -> Self {
        let body = self
            .binder
            .absorb(&select.get_statement(), select.bind_values());
        self.from.table(body);
        self
    }

    /// Add a join of the given type.
    ///
    /// The type token is upper-cased, trimmed, and suffixed with ` JOIN`
    /// unless it already ends with it, so `"left"`, `"LEFT"` and
    /// `"LEFT JOIN"` are interchangeable.
    pub fn join(
        mut self,
        join_type: &str,
        reference: &str,
        condition: &str,
        values: Vec<Value>,
    ) -> Self {
        let join_type = normalize_join(join_type);
        self.from
            .join(&mut self.binder, &join_type, reference, condition, values);
        self
    }

    /// Add a LEFT JOIN.
    pub fn left_join(self, reference: &str, condition: &str, values: Vec<Value>) -> Self {
        self.join("LEFT", reference, condition, values)
    }

    /// Add an INNER JOIN.
    pub fn inner_join(self, reference: &str, condition: &str, values: Vec<Value>) -> Self {
        self.join("INNER", reference, condition, values)
    }

    /// Add a RIGHT JOIN.
    pub fn right_join(self, reference: &str, condition: &str, values: Vec<Value>) -> Self {
        self.join("RIGHT", reference, condition, values)
    }

    /// Add a FULL JOIN.
    pub fn full_join(self, reference: &str, condition: &str, values: Vec<Value>) -> Self {
        self.join("FULL", reference, condition, values)
    }

    /// Add a CROSS JOIN (no condition).
    pub fn cross_join(self, reference: &str) -> Self {
        self.join("CROSS", reference, "", Vec::new())
    }

    /// Join against a derived table built by another composer.
    pub fn join_select(
        mut self,
        join_type: &str,
        select: &Select,
        condition: &str,
        values: Vec<Value>,
    ) -> Self {
        let reference = self
            .binder
            .absorb(&select.get_statement(), select.bind_values());
        let join_type = normalize_join(join_type);
        self.from
            .join(&mut self.binder, &join_type, &reference, condition, values);
        self
    }

    /// Append a raw fragment to the last join, without type normalization.
    pub fn cat_join(mut self, expr: &str, values: Vec<Value>) -> Self {
        self.from.cat_join(&mut self.binder, expr, values);
        self
    }

    // ==================== WHERE ====================

    /// Add an AND-connected WHERE condition; `?` slots bind `values` inline.
    pub fn where_(mut self, condition: &str, values: Vec<Value>) -> Self {
        self.where_clause.and(&mut self.binder, condition, values);
        self
    }

    /// Alias for [`Select::where_`].
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

    // ==================== GROUP BY / HAVING ====================

    /// Append GROUP BY expressions.
    pub fn group_by<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for expr in exprs {
            self.group_by.add(expr);
        }
        self
    }

    /// Add an AND-connected HAVING condition.
    pub fn having(mut self, condition: &str, values: Vec<Value>) -> Self {
        self.having.and(&mut self.binder, condition, values);
        self
    }

    /// Alias for [`Select::having`].
    pub fn and_having(self, condition: &str, values: Vec<Value>) -> Self {
        self.having(condition, values)
    }

    /// Add an OR-connected HAVING condition.
    pub fn or_having(mut self, condition: &str, values: Vec<Value>) -> Self {
        self.having.or(&mut self.binder, condition, values);
        self
    }

    /// Concatenate onto the last HAVING condition without a connective.
    pub fn cat_having(mut self, expr: &str, values: Vec<Value>) -> Self {
        self.having.cat(&mut self.binder, expr, values);
        self
    }

    /// Add an AND-connected parenthesized HAVING group.
    pub fn having_group(mut self, f: impl FnOnce(&mut Conditions, &mut Binder)) -> Self {
        self.having.and_group(&mut self.binder, f);
        self
    }

    /// Add an OR-connected parenthesized HAVING group.
    pub fn or_having_group(mut self, f: impl FnOnce(&mut Conditions, &mut Binder)) -> Self {
        self.having.or_group(&mut self.binder, f);
        self
    }

    // ==================== ORDER / LIMIT ====================

    /// Append ORDER BY expressions.
    pub fn order_by<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for expr in exprs {
            self.order_by.add(expr);
        }
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit.limit(limit);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, offset: u64) -> Self {
        self.limit.offset(offset);
        self
    }

    /// Set the 1-based page.
    pub fn page(mut self, page: u64) -> Self {
        self.limit.page(page);
        self
    }

    /// Set the page size used by [`Select::page`].
    pub fn per_page(mut self, per_page: u64) -> Self {
        self.limit.per_page(per_page);
        self
    }

    // ==================== Flags / locking / alias ====================

    /// Enable or disable DISTINCT.
    pub fn distinct(mut self, enable: bool) -> Self {
        self.flags.set("DISTINCT", enable);
        self
    }

    /// Enable or disable an arbitrary keyword flag.
    pub fn set_flag(mut self, flag: &str, enable: bool) -> Self {
        self.flags.set(flag, enable);
        self
    }

    /// Enable or disable the trailing FOR UPDATE locking suffix.
    pub fn for_update(mut self, enable: bool) -> Self {
        self.for_update = enable;
        self
    }

    /// Set the derived-table alias; the rendered body wraps as
    /// `(<body>) AS <alias>`.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Clear the derived-table alias.
    pub fn reset_alias(mut self) -> Self {
        self.alias = None;
        self
    }

    // ==================== WITH ====================

    /// Add a CTE with a raw SQL body.
    pub fn with(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.with.with(name, body);
        self
    }

    /// Add a CTE with an explicit column list and a raw SQL body.
    pub fn with_columns<I, S>(
        mut self,
        name: impl Into<String>,
        columns: I,
        body: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with.with_columns(name, columns, body);
        self
    }

    /// Add a CTE whose body is another composer; its placeholders are
    /// re-allocated into this composer's registry.
    pub fn with_select(mut self, name: impl Into<String>, select: &Select) -> Self {
        let body = self
            .binder
            .absorb(&select.get_statement(), select.bind_values());
        self.with.with(name, body);
        self
    }

    /// Like [`Select::with_select`] with an explicit column list.
    pub fn with_columns_select<I, S>(
        mut self,
        name: impl Into<String>,
        columns: I,
        select: &Select,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let body = self
            .binder
            .absorb(&select.get_statement(), select.bind_values());
        self.with.with_columns(name, columns, body);
        self
    }

    /// Switch the WITH keyword to `WITH RECURSIVE`.
    pub fn recursive(mut self, enable: bool) -> Self {
        self.with.recursive(enable);
        self
    }

    // ==================== Union chaining ====================

    /// Finalize the current statement as a UNION segment and start a blank
    /// one. The bind registry, completed segments, and the FOR UPDATE flag
    /// survive; all other clause state resets.
    pub fn union(mut self) -> Self {
        let segment = self.current_statement(" UNION ");
        self.unions.push(segment);
        self.reset()
    }

    /// Like [`Select::union`] with a ` UNION ALL ` separator.
    pub fn union_all(mut self) -> Self {
        let segment = self.current_statement(" UNION ALL ");
        self.unions.push(segment);
        self.reset()
    }

    // ==================== Cloning boundaries ====================

    /// Return a structural copy that starts fully clean: every clause reset,
    /// a fresh empty bind registry, no union segments, no locking flag.
    /// The clone and this composer never share mutable state.
    pub fn sub_select(&self) -> Select {
        let mut clone = self.clone().reset();
        clone.binder.reset();
        clone.unions.clear();
        clone.for_update = false;
        clone
    }

    // ==================== Reset family ====================

    /// Reset all per-statement clause state, keeping the bind registry,
    /// union segments, and the locking flag.
    pub fn reset(mut self) -> Self {
        self.columns.reset();
        self.from.reset();
        self.where_clause.reset();
        self.group_by.reset();
        self.having.reset();
        self.order_by.reset();
        self.limit.reset();
        self.flags.reset();
        self.with.reset();
        self.alias = None;
        self
    }

    /// Reset the projection.
    pub fn reset_columns(mut self) -> Self {
        self.columns.reset();
        self
    }

    /// Reset FROM and joins.
    pub fn reset_from(mut self) -> Self {
        self.from.reset();
        self
    }

    /// Reset the WHERE clause.
    pub fn reset_where(mut self) -> Self {
        self.where_clause.reset();
        self
    }

    /// Reset the GROUP BY clause.
    pub fn reset_group_by(mut self) -> Self {
        self.group_by.reset();
        self
    }

    /// Reset the HAVING clause.
    pub fn reset_having(mut self) -> Self {
        self.having.reset();
        self
    }

    /// Reset the ORDER BY clause.
    pub fn reset_order_by(mut self) -> Self {
        self.order_by.reset();
        self
    }

    /// Reset LIMIT/OFFSET/paging.
    pub fn reset_limit(mut self) -> Self {
        self.limit.reset();
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

    // ==================== Binding & rendering ====================

    /// Bind a value under an explicit placeholder name.
    pub fn bind_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.binder.bind_value(name, value);
        self
    }

    /// All bound name/value pairs in registration order.
    pub fn bind_values(&self) -> &[(String, Value)] {
        self.binder.values()
    }

    /// Render the complete statement: all finalized union segments followed
    /// by the in-progress one.
    pub fn get_statement(&self) -> String {
        format!("{}{}", self.unions.concat(), self.current_statement(""))
    }

    fn current_statement(&self, suffix: &str) -> String {
        let mut stm = format!(
            "{}SELECT{}{}{}{}{}{}{}{}{}{}",
            self.with.build(),
            self.flags.build(),
            self.limit.build_early(),
            self.columns.build(),
            self.from.build(),
            self.where_clause.build(),
            self.group_by.build(),
            self.having.build(),
            self.order_by.build(),
            self.limit.build(),
            if self.for_update { " FOR UPDATE" } else { "" },
        );
        if let Some(alias) = &self.alias {
            stm = format!("({stm}) AS {alias}");
        }
        stm.push_str(suffix);
        stm
    }

    // ==================== Derived queries ====================

    /// Count the rows this query would return without its LIMIT.
    ///
    /// Renders a structural copy with the projection replaced by
    /// `COUNT(<column>)` and the limit cleared, and fetches the scalar
    /// through `conn`. The copy shares nothing with later mutations here.
    pub async fn fetch_unlimited_count(
        &self,
        conn: &impl Connection,
        column: &str,
    ) -> QueryResult<i64> {
        let probe = self
            .clone()
            .reset_columns()
            .reset_limit()
            .column(format!("COUNT({column})"));
        let value = conn
            .fetch_value(&probe.get_statement(), probe.bind_values(), 0)
            .await?;
        Ok(match value {
            Some(Value::Int(n)) => n,
            Some(Value::Float(f)) => f as i64,
            Some(Value::Text(s)) => s.parse().unwrap_or(0),
            _ => 0,
        })
    }
}

impl Query for Select {
    fn statement(&self) -> String {
        self.get_statement()
    }

    fn bind_values(&self) -> &[(String, Value)] {
        self.binder.values()
    }
}

fn normalize_join(join_type: &str) -> String {
    let mut join_type = join_type.trim().to_uppercase();
    if !join_type.ends_with("JOIN") {
        join_type.push_str(" JOIN");
    }
    join_type
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select;

    #[test]
    fn test_bare_select() {
        assert_eq!(select().get_statement(), "SELECT *");
    }

    #[test]
    fn test_clause_order_fixed_regardless_of_call_order() {
        let sel = select()
            .limit(10)
            .order_by(["id"])
            .having("COUNT(*) > ?", values![2])
            .group_by(["dept"])
            .where_("age > ?", values![18])
            .from("users")
            .columns(["dept", "COUNT(*)"])
            .distinct(true);
        assert_eq!(
            sel.get_statement(),
            "SELECT DISTINCT dept, COUNT(*) FROM users WHERE age > :p2 \
             GROUP BY dept HAVING COUNT(*) > :p1 ORDER BY id LIMIT 10"
        );
    }

    #[test]
    fn test_statement_idempotent() {
        let sel = select().from("t").where_("a = ?", values![1]);
        let first = sel.get_statement();
        let binds = sel.bind_values().to_vec();
        assert_eq!(sel.get_statement(), first);
        assert_eq!(sel.bind_values(), &binds[..]);
    }

    #[test]
    fn test_join_normalization() {
        let a = select()
            .from("t1")
            .join("left", "t2", "t2.id = t1.id", values![]);
        let b = select()
            .from("t1")
            .join("LEFT JOIN", "t2", "t2.id = t1.id", values![]);
        assert_eq!(a.get_statement(), "SELECT * FROM t1 LEFT JOIN t2 ON t2.id = t1.id");
        assert_eq!(a.get_statement(), b.get_statement());
    }

    #[test]
    fn test_join_shorthands() {
        let sel = select()
            .from("t1")
            .inner_join("t2", "t2.a = t1.a", values![])
            .cross_join("t3");
        assert_eq!(
            sel.get_statement(),
            "SELECT * FROM t1 INNER JOIN t2 ON t2.a = t1.a CROSS JOIN t3"
        );
    }

    #[test]
    fn test_alias_wraps_statement() {
        let sel = select().column("id").from("t").alias("sub");
        assert_eq!(sel.get_statement(), "(SELECT id FROM t) AS sub");
        assert_eq!(
            sel.reset_alias().get_statement(),
            "SELECT id FROM t"
        );
    }

    #[test]
    fn test_union_keeps_binds_and_segments() {
        let sel = select()
            .column("a")
            .from("t")
            .where_("x = ?", values![1])
            .union()
            .column("b")
            .from("u")
            .where_("y = ?", values![2]);
        assert_eq!(
            sel.get_statement(),
            "SELECT a FROM t WHERE x = :p1 UNION SELECT b FROM u WHERE y = :p2"
        );
        assert_eq!(
            sel.bind_values(),
            &[
                ("p1".to_string(), Value::Int(1)),
                ("p2".to_string(), Value::Int(2)),
            ]
        );
    }

    #[test]
    fn test_union_all_separator() {
        let sel = select().column("a").from("t").union_all().column("b").from("u");
        assert_eq!(sel.get_statement(), "SELECT a FROM t UNION ALL SELECT b FROM u");
    }

    #[test]
    fn test_sub_select_isolation() {
        let outer = select().from("t").where_("a = ?", values![1]);
        let before = outer.get_statement();

        let sub = outer.sub_select();
        assert_eq!(sub.get_statement(), "SELECT *");
        assert!(sub.bind_values().is_empty());

        let sub = sub.from("u").where_("b = ?", values![2]);
        assert_eq!(outer.get_statement(), before);
        assert_eq!(sub.get_statement(), "SELECT * FROM u WHERE b = :p1");
    }

    #[test]
    fn test_from_select_absorbs_binds() {
        let sub = select()
            .column("id")
            .from("orders")
            .where_("total > ?", values![100])
            .alias("big");
        let outer = select().from_select(&sub).where_("id > ?", values![5]);
        assert_eq!(
            outer.get_statement(),
            "SELECT * FROM (SELECT id FROM orders WHERE total > :p1) AS big WHERE id > :p2"
        );
        assert_eq!(
            outer.bind_values(),
            &[
                ("p1".to_string(), Value::Int(100)),
                ("p2".to_string(), Value::Int(5)),
            ]
        );
    }

    #[test]
    fn test_with_select_embeds_cte() {
        let cte = select().column("id").from("users").where_("live = ?", values![true]);
        let sel = select().with_select("active", &cte).from("active");
        assert_eq!(
            sel.get_statement(),
            "WITH active AS (SELECT id FROM users WHERE live = :p1) SELECT * FROM active"
        );
        assert_eq!(sel.bind_values().len(), 1);
    }

    #[test]
    fn test_for_update_suffix() {
        let sel = select().from("t").for_update(true);
        assert_eq!(sel.get_statement(), "SELECT * FROM t FOR UPDATE");
    }

    #[test]
    fn test_where_group_precedence() {
        let sel = select()
            .from("t")
            .where_("a = ?", values![1])
            .or_where_group(|g, b| {
                g.and(b, "b = ?", values![2]);
                g.and(b, "c = ?", values![3]);
            });
        assert_eq!(
            sel.get_statement(),
            "SELECT * FROM t WHERE a = :p1 OR (b = :p2 AND c = :p3)"
        );
    }

    #[test]
    fn test_reset_family_scoped() {
        let sel = select()
            .column("a")
            .from("t")
            .where_("x = ?", values![1])
            .order_by(["a"])
            .reset_where();
        assert_eq!(sel.get_statement(), "SELECT a FROM t ORDER BY a");
        // the bind registry is untouched by clause resets
        assert_eq!(sel.bind_values().len(), 1);
    }

    #[test]
    fn test_in_list_inline_group() {
        let sel = select().from("t").where_("id IN ?", values![vec![1i64, 2, 3]]);
        assert_eq!(
            sel.get_statement(),
            "SELECT * FROM t WHERE id IN (:p1, :p2, :p3)"
        );
        assert_eq!(sel.bind_values().len(), 3);
    }

    #[test]
    fn test_page_window() {
        let sel = select().from("t").per_page(25).page(2);
        assert_eq!(sel.get_statement(), "SELECT * FROM t LIMIT 25 OFFSET 25");
    }
}
