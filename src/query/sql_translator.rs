//! SQL Translator
//!
//! Renders a [`SelectQuery`] to SQL text plus an ordered parameter list.
//! Parameters are pushed in the exact order their placeholders appear:
//! WHERE clauses first (left to right, depth first), then ORDER BY.
//!
//! # SQL Generated (Postgres)
//!
//! ```sql
//! CAST("users"."name" AS TEXT) ILIKE $1                                        -- raw contains
//! REGEXP_REPLACE(CAST("users"."name" AS TEXT), '[^a-zA-Z0-9]', '', 'g') ILIKE $2 -- normalized contains
//! EXISTS (SELECT 1 FROM "users" AS "user_rel" WHERE "user_rel"."id" = "posts"."user_id" AND (...)) -- related column
//! GREATEST((CASE WHEN ... THEN 100 ELSE 0 END + ...), (...)) DESC                 -- relevance
//! ```

use super::{
    Dialect, Direction, OrderClause, OrderExpr, Predicate, Projection, ScoreExpression, SelectQuery,
    TextExpr,
};
use crate::schema::ColumnRef;

/// SQL query translator
pub struct SqlTranslator;

/// SQL query with parameterized placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    /// Full statement text
    pub sql: String,
    /// The parameter values in placeholder order
    pub params: Vec<SqlParam>,
}

/// SQL parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Integer(i64),
    Numeric(f64),
    Boolean(bool),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Integer(value)
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        SqlParam::Integer(i64::from(value))
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        SqlParam::Numeric(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        SqlParam::Boolean(value)
    }
}

impl SqlParam {
    fn literal(&self) -> String {
        match self {
            SqlParam::Text(s) => format!("'{}'", s.replace('\'', "''")),
            SqlParam::Integer(n) => n.to_string(),
            SqlParam::Numeric(n) => n.to_string(),
            SqlParam::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

/// Accumulates parameters and hands out placeholders.
struct Writer {
    dialect: Dialect,
    params: Vec<SqlParam>,
    inline: bool,
}

impl Writer {
    fn bind(&mut self, param: SqlParam) -> String {
        if self.inline {
            return param.literal();
        }
        self.params.push(param);
        self.dialect.placeholder(self.params.len())
    }

    fn column(&self, column: &ColumnRef) -> String {
        format!(
            "{}.{}",
            self.dialect.quote_ident(&column.table),
            self.dialect.quote_ident(&column.column)
        )
    }

    fn cast_text(&self, column: &ColumnRef) -> String {
        // MySQL has no TEXT cast target
        let target = match self.dialect {
            Dialect::MySql => "CHAR",
            Dialect::Postgres | Dialect::Sqlite => "TEXT",
        };
        format!("CAST({} AS {})", self.column(column), target)
    }

    fn text(&self, expr: &TextExpr) -> String {
        match expr {
            TextExpr::Cast(column) => self.cast_text(column),
            TextExpr::Stripped(column) => format!(
                "REGEXP_REPLACE({}, '[^a-zA-Z0-9]', '', 'g')",
                self.cast_text(column)
            ),
        }
    }

    fn like_operator(&self) -> &'static str {
        match self.dialect {
            Dialect::Postgres => "ILIKE",
            Dialect::Sqlite | Dialect::MySql => "LIKE",
        }
    }
}

impl SqlTranslator {
    /// Translate to a parameterized statement.
    pub fn translate(query: &SelectQuery) -> SqlQuery {
        let mut writer = Writer {
            dialect: query.dialect(),
            params: Vec::new(),
            inline: false,
        };
        let sql = Self::translate_select(query, &mut writer);
        SqlQuery {
            sql,
            params: writer.params,
        }
    }

    /// Translate with values inlined as literals.
    ///
    /// Warning: Only use for debugging and logging, never for execution (SQL injection risk)
    pub fn translate_inline(query: &SelectQuery) -> String {
        let mut writer = Writer {
            dialect: query.dialect(),
            params: Vec::new(),
            inline: true,
        };
        Self::translate_select(query, &mut writer)
    }

    /// Translate a standalone predicate, numbering placeholders from `$1`.
    pub fn translate_predicate(predicate: &Predicate, dialect: Dialect) -> SqlQuery {
        let mut writer = Writer {
            dialect,
            params: Vec::new(),
            inline: false,
        };
        let sql = Self::translate_node(predicate, &mut writer);
        SqlQuery {
            sql,
            params: writer.params,
        }
    }

    fn translate_select(query: &SelectQuery, w: &mut Writer) -> String {
        let table = w.dialect.quote_ident(query.table());
        let projection = match query.projection() {
            Projection::All => format!("{}.*", table),
            Projection::Text(column) => format!("{} AS value", w.cast_text(column)),
        };

        let mut sql = format!("SELECT {} FROM {}", projection, table);

        if !query.filters().is_empty() {
            let parts: Vec<String> = query
                .filters()
                .iter()
                .map(|f| Self::translate_node(f, w))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&parts.join(" AND "));
        }

        if !query.order_clauses().is_empty() {
            let parts: Vec<String> = query
                .order_clauses()
                .iter()
                .map(|clause| Self::translate_order(clause, w))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&parts.join(", "));
        }

        if let Some(limit) = query.limit_value() {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        sql
    }

    fn translate_node(node: &Predicate, w: &mut Writer) -> String {
        match node {
            Predicate::ILike { target, pattern } => {
                let text = w.text(target);
                let placeholder = w.bind(SqlParam::Text(pattern.clone()));
                format!("{} {} {}", text, w.like_operator(), placeholder)
            }
            Predicate::Eq { column, value } => {
                let column = w.column(column);
                let placeholder = w.bind(value.clone());
                format!("{} = {}", column, placeholder)
            }
            Predicate::And(nodes) => Self::join_group(nodes, " AND ", w),
            Predicate::Or(nodes) => Self::join_group(nodes, " OR ", w),
            Predicate::Not(inner) => format!("NOT ({})", Self::translate_node(inner, w)),
            Predicate::Exists {
                table,
                alias,
                related_key,
                parent_key,
                filter,
            } => {
                let join = format!("{} = {}", w.column(related_key), w.column(parent_key));
                let inner = Self::translate_node(filter, w);
                format!(
                    "EXISTS (SELECT 1 FROM {} AS {} WHERE {} AND ({}))",
                    w.dialect.quote_ident(table),
                    w.dialect.quote_ident(alias),
                    join,
                    inner
                )
            }
        }
    }

    fn join_group(nodes: &[Predicate], separator: &str, w: &mut Writer) -> String {
        let parts: Vec<String> = nodes.iter().map(|n| Self::translate_node(n, w)).collect();
        match parts.len() {
            // Empty AND is vacuously true, empty OR is false
            0 if separator == " AND " => "1=1".to_string(),
            0 => "1=0".to_string(),
            1 => parts[0].clone(),
            _ => format!("({})", parts.join(separator)),
        }
    }

    fn translate_order(clause: &OrderClause, w: &mut Writer) -> String {
        let expr = match &clause.expr {
            OrderExpr::Column(column) => w.column(column),
            OrderExpr::GreatestScore(scores) => {
                let parts: Vec<String> = scores.iter().map(|s| Self::translate_score(s, w)).collect();
                format!("GREATEST({})", parts.join(", "))
            }
        };
        let direction = match clause.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        format!("{} {}", expr, direction)
    }

    fn translate_score(score: &ScoreExpression, w: &mut Writer) -> String {
        if score.branches.is_empty() {
            return "0".to_string();
        }
        let parts: Vec<String> = score
            .branches
            .iter()
            .map(|branch| {
                let text = w.text(&branch.target);
                let placeholder = w.bind(SqlParam::Text(branch.pattern.clone()));
                format!(
                    "CASE WHEN {} {} {} THEN {} ELSE 0 END",
                    text,
                    w.like_operator(),
                    placeholder,
                    branch.weight
                )
            })
            .collect();
        format!("({})", parts.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ScoreBranch;

    fn name() -> ColumnRef {
        ColumnRef::new("users", "name")
    }

    #[test]
    fn test_plain_select() {
        let sql = SelectQuery::new("users", Dialect::Postgres).to_sql();
        assert_eq!(sql.sql, r#"SELECT "users".* FROM "users""#);
        assert!(sql.params.is_empty());
    }

    #[test]
    fn test_raw_ilike() {
        let query = SelectQuery::new("users", Dialect::Postgres)
            .filter(Predicate::ilike(TextExpr::Cast(name()), "%Jane%"));
        let sql = query.to_sql();
        assert_eq!(
            sql.sql,
            r#"SELECT "users".* FROM "users" WHERE CAST("users"."name" AS TEXT) ILIKE $1"#
        );
        assert_eq!(sql.params, vec![SqlParam::Text("%Jane%".to_string())]);
    }

    #[test]
    fn test_stripped_ilike() {
        let predicate = Predicate::ilike(TextExpr::Stripped(name()), "%JaneDoe%");
        let sql = SqlTranslator::translate_predicate(&predicate, Dialect::Postgres);
        assert_eq!(
            sql.sql,
            r#"REGEXP_REPLACE(CAST("users"."name" AS TEXT), '[^a-zA-Z0-9]', '', 'g') ILIKE $1"#
        );
    }

    #[test]
    fn test_placeholders_number_across_where_and_order() {
        let score = ScoreExpression {
            column: name(),
            branches: vec![ScoreBranch {
                target: TextExpr::Cast(name()),
                pattern: "%b%".into(),
                weight: 100,
            }],
        };
        let query = SelectQuery::new("users", Dialect::Postgres)
            .where_eq("id", 7)
            .filter(Predicate::ilike(TextExpr::Cast(name()), "%a%"))
            .order_by_expr(OrderExpr::GreatestScore(vec![score]), Direction::Desc);

        let sql = query.to_sql();
        assert_eq!(
            sql.sql,
            concat!(
                r#"SELECT "users".* FROM "users" WHERE "users"."id" = $1 AND CAST("users"."name" AS TEXT) ILIKE $2"#,
                r#" ORDER BY GREATEST((CASE WHEN CAST("users"."name" AS TEXT) ILIKE $3 THEN 100 ELSE 0 END)) DESC"#
            )
        );
        assert_eq!(
            sql.params,
            vec![
                SqlParam::Integer(7),
                SqlParam::Text("%a%".into()),
                SqlParam::Text("%b%".into()),
            ]
        );
    }

    #[test]
    fn test_or_group() {
        let predicate = Predicate::ilike(TextExpr::Cast(name()), "%a%")
            .or(Predicate::ilike(TextExpr::Stripped(name()), "%a%"));
        let sql = SqlTranslator::translate_predicate(&predicate, Dialect::Postgres);
        assert!(sql.sql.starts_with('('));
        assert!(sql.sql.contains(" OR "));
        assert!(sql.sql.contains("$2"));
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn test_exists_subquery() {
        let predicate = Predicate::Exists {
            table: "users".into(),
            alias: "user_rel".into(),
            related_key: ColumnRef::new("user_rel", "id"),
            parent_key: ColumnRef::new("posts", "user_id"),
            filter: Box::new(Predicate::ilike(
                TextExpr::Cast(ColumnRef::new("user_rel", "name")),
                "%Jane%",
            )),
        };
        let sql = SqlTranslator::translate_predicate(&predicate, Dialect::Postgres);
        assert_eq!(
            sql.sql,
            r#"EXISTS (SELECT 1 FROM "users" AS "user_rel" WHERE "user_rel"."id" = "posts"."user_id" AND (CAST("user_rel"."name" AS TEXT) ILIKE $1))"#
        );
    }

    #[test]
    fn test_not() {
        let predicate = Predicate::Eq {
            column: name(),
            value: "x".into(),
        }
        .negate();
        let sql = SqlTranslator::translate_predicate(&predicate, Dialect::Postgres);
        assert_eq!(sql.sql, r#"NOT ("users"."name" = $1)"#);
    }

    #[test]
    fn test_empty_groups() {
        let sql = SqlTranslator::translate_predicate(&Predicate::Or(vec![]), Dialect::Postgres);
        assert_eq!(sql.sql, "1=0");
        let sql = SqlTranslator::translate_predicate(&Predicate::And(vec![]), Dialect::Postgres);
        assert_eq!(sql.sql, "1=1");
    }

    #[test]
    fn test_sqlite_placeholders_and_like() {
        let query = SelectQuery::new("users", Dialect::Sqlite)
            .where_eq("id", 1)
            .filter(Predicate::ilike(TextExpr::Cast(name()), "%a%"));
        let sql = query.to_sql();
        assert_eq!(
            sql.sql,
            r#"SELECT "users".* FROM "users" WHERE "users"."id" = ? AND CAST("users"."name" AS TEXT) LIKE ?"#
        );
    }

    #[test]
    fn test_inline_escapes_quotes() {
        let query = SelectQuery::new("users", Dialect::Postgres).where_eq("name", "O'Brien");
        let sql = SqlTranslator::translate_inline(&query);
        assert_eq!(
            sql,
            r#"SELECT "users".* FROM "users" WHERE "users"."name" = 'O''Brien'"#
        );
    }

    #[test]
    fn test_text_projection_and_limit() {
        let query = SelectQuery::new("users", Dialect::Postgres)
            .select_text("name")
            .limit(5);
        assert_eq!(
            query.to_sql().sql,
            r#"SELECT CAST("users"."name" AS TEXT) AS value FROM "users" LIMIT 5"#
        );
    }

    #[test]
    fn test_mysql_quoting_and_cast() {
        let query = SelectQuery::new("users", Dialect::MySql)
            .select_text("name")
            .where_eq("id", 1);
        assert_eq!(
            query.to_sql().sql,
            "SELECT CAST(`users`.`name` AS CHAR) AS value FROM `users` WHERE `users`.`id` = ?"
        );
    }
}
