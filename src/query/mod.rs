// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query handle and expression AST.
//!
//! [`SelectQuery`] is the handle searches are attached to. It is a consuming
//! builder: every method takes `self` and returns it, so filters and ordering
//! can be chained before and after a search.
//!
//! ```text
//! SelectQuery { table, dialect, filters (AND), order_by, limit }
//!     ↓
//! SqlTranslator → SQL text + positional parameters
//! ```
//!
//! # Example
//!
//! ```rust
//! use pg_search::query::{Dialect, Direction, SelectQuery};
//!
//! let sql = SelectQuery::new("users", Dialect::Postgres)
//!     .where_eq("active", true)
//!     .order_by("name", Direction::Asc)
//!     .limit(10)
//!     .to_sql();
//!
//! assert_eq!(
//!     sql.sql,
//!     r#"SELECT "users".* FROM "users" WHERE "users"."active" = $1 ORDER BY "users"."name" ASC LIMIT 10"#
//! );
//! ```

mod sql_translator;

pub use sql_translator::{SqlParam, SqlQuery, SqlTranslator};

use crate::schema::ColumnRef;

/// SQL dialect of the backend a query will run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
    MySql,
}

impl Dialect {
    /// Detect the dialect from a connection URL.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Some(Dialect::Postgres)
        } else if url.starts_with("sqlite:") {
            Some(Dialect::Sqlite)
        } else if url.starts_with("mysql:") || url.starts_with("mariadb:") {
            Some(Dialect::MySql)
        } else {
            None
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
        }
    }

    /// Placeholder for the `n`th (1-based) bound parameter.
    #[must_use]
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", n),
            Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    /// Quote an identifier, doubling any embedded quote character.
    #[must_use]
    pub fn quote_ident(&self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            Dialect::Postgres | Dialect::Sqlite => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }
}

/// Text view of a column used in pattern comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextExpr {
    /// `CAST(col AS TEXT)`
    Cast(ColumnRef),
    /// Column text with every non-alphanumeric character removed.
    Stripped(ColumnRef),
}

impl TextExpr {
    #[must_use]
    pub fn column(&self) -> &ColumnRef {
        match self {
            TextExpr::Cast(column) | TextExpr::Stripped(column) => column,
        }
    }
}

/// Boolean filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive pattern match: `target ILIKE pattern`
    ILike { target: TextExpr, pattern: String },
    /// Equality against a bound value
    Eq { column: ColumnRef, value: SqlParam },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    /// A row in `table` linked by `related_key = parent_key` satisfies `filter`.
    ///
    /// The sub-query reads `table` under `alias`, so `related_key` and the
    /// columns in `filter` are qualified with the alias. This keeps the outer
    /// table visible when a relation points back at it.
    Exists {
        table: String,
        alias: String,
        related_key: ColumnRef,
        parent_key: ColumnRef,
        filter: Box<Predicate>,
    },
}

impl Predicate {
    pub fn ilike(target: TextExpr, pattern: impl Into<String>) -> Self {
        Predicate::ILike {
            target,
            pattern: pattern.into(),
        }
    }

    /// Combine with OR, flattening nested ORs.
    #[must_use]
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Or(mut nodes) => {
                nodes.push(other);
                Predicate::Or(nodes)
            }
            node => Predicate::Or(vec![node, other]),
        }
    }

    /// Combine with AND, flattening nested ANDs.
    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut nodes) => {
                nodes.push(other);
                Predicate::And(nodes)
            }
            node => Predicate::And(vec![node, other]),
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Number of bound parameters this predicate renders.
    #[must_use]
    pub fn param_count(&self) -> usize {
        match self {
            Predicate::ILike { .. } | Predicate::Eq { .. } => 1,
            Predicate::And(nodes) | Predicate::Or(nodes) => nodes.iter().map(Predicate::param_count).sum(),
            Predicate::Not(inner) => inner.param_count(),
            Predicate::Exists { filter, .. } => filter.param_count(),
        }
    }
}

/// One `CASE WHEN target ILIKE pattern THEN weight ELSE 0 END` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBranch {
    pub target: TextExpr,
    pub pattern: String,
    pub weight: u32,
}

/// Additive relevance score for a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreExpression {
    pub column: ColumnRef,
    pub branches: Vec<ScoreBranch>,
}

impl ScoreExpression {
    /// Highest score this expression can produce.
    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.branches.iter().map(|b| b.weight).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderExpr {
    Column(ColumnRef),
    /// `GREATEST(score_1, score_2, ...)`
    GreatestScore(Vec<ScoreExpression>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub expr: OrderExpr,
    pub direction: Direction,
}

/// What the SELECT list returns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    /// `table.*`
    #[default]
    All,
    /// A single column cast to text, aliased `value`.
    Text(ColumnRef),
}

/// A single-table SELECT with AND-combined filters.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: String,
    dialect: Dialect,
    projection: Projection,
    filters: Vec<Predicate>,
    order_by: Vec<OrderClause>,
    limit: Option<u64>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            table: table.into(),
            dialect,
            projection: Projection::All,
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    #[must_use]
    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    #[must_use]
    pub fn order_clauses(&self) -> &[OrderClause] {
        &self.order_by
    }

    #[must_use]
    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    /// AND a predicate into the WHERE clause.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// `table.column = value`
    #[must_use]
    pub fn where_eq(self, column: &str, value: impl Into<SqlParam>) -> Self {
        let column = ColumnRef::new(self.table.as_str(), column);
        self.filter(Predicate::Eq {
            column,
            value: value.into(),
        })
    }

    #[must_use]
    pub fn order_by(self, column: &str, direction: Direction) -> Self {
        let column = ColumnRef::new(self.table.as_str(), column);
        self.order_by_expr(OrderExpr::Column(column), direction)
    }

    /// Append an ORDER BY clause after any existing ones.
    #[must_use]
    pub fn order_by_expr(mut self, expr: OrderExpr, direction: Direction) -> Self {
        self.order_by.push(OrderClause { expr, direction });
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Return one column as text instead of `table.*`.
    #[must_use]
    pub fn select_text(mut self, column: &str) -> Self {
        self.projection = Projection::Text(ColumnRef::new(self.table.as_str(), column));
        self
    }

    /// Render with positional placeholders.
    #[must_use]
    pub fn to_sql(&self) -> SqlQuery {
        SqlTranslator::translate(self)
    }
}
