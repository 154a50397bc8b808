//! Search entry point.
//!
//! ```text
//! apply(query, term, columns, options)
//!       │
//!       ├─→ blank term / no columns / not Postgres? → return query unchanged
//!       │
//!       ├─→ resolve options (caller > process defaults > built-ins)
//!       ├─→ NormalizedTerm (once)
//!       ├─→ resolve every column (schema errors propagate)
//!       │
//!       ├─→ WHERE (col1 condition OR col2 condition OR EXISTS(...))
//!       └─→ ORDER BY GREATEST(score1, score2) DESC   (order_by_best_match)
//! ```

use tracing::debug;

use super::column_spec::ColumnSpec;
use super::engine::{IlikeEngine, MatchEngine};
use super::resolver::ResolvedColumn;
use super::scorer::best_match_order;
use super::tokenizer::NormalizedTerm;
use crate::config::{self, EngineKind, SearchConfig, SearchOptions};
use crate::error::SearchError;
use crate::metrics;
use crate::query::{Dialect, Predicate, SelectQuery};
use crate::schema::SchemaResolver;

/// Why a search left the query untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Passthrough {
    BlankTerm,
    NoColumns,
    UnsupportedBackend(Dialect),
}

impl Passthrough {
    fn reason(&self) -> &'static str {
        match self {
            Passthrough::BlankTerm => "blank_term",
            Passthrough::NoColumns => "no_columns",
            Passthrough::UnsupportedBackend(_) => "unsupported_backend",
        }
    }

    /// Check the pass-through conditions, returning the trimmed term otherwise.
    fn check<'t, S: AsRef<str>>(
        query: &SelectQuery,
        term: Option<&'t str>,
        columns: &[S],
    ) -> Result<&'t str, Passthrough> {
        let term = term.map(str::trim).unwrap_or("");
        if term.is_empty() {
            return Err(Passthrough::BlankTerm);
        }
        if columns.is_empty() {
            return Err(Passthrough::NoColumns);
        }
        if query.dialect() != Dialect::Postgres {
            return Err(Passthrough::UnsupportedBackend(query.dialect()));
        }
        Ok(term)
    }
}

/// Attaches searches to queries with an explicit config and engine.
///
/// # Example
///
/// ```rust
/// use pg_search::config::{SearchConfig, SearchOptions};
/// use pg_search::query::{Dialect, SelectQuery};
/// use pg_search::schema::{SchemaRegistry, TableSchema};
/// use pg_search::search::Searcher;
///
/// let schema = SchemaRegistry::new();
/// schema.register(TableSchema::new("users").columns(["id", "name", "phone"]));
///
/// let searcher = Searcher::new(SearchConfig::default());
/// let query = searcher
///     .apply(
///         SelectQuery::new("users", Dialect::Postgres),
///         &schema,
///         Some("123-456"),
///         &["name", "phone"],
///         &SearchOptions::default(),
///     )
///     .unwrap();
///
/// assert_eq!(query.filters().len(), 1);
/// assert_eq!(query.order_clauses().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Searcher<E = IlikeEngine> {
    config: SearchConfig,
    engine: E,
}

impl Searcher<IlikeEngine> {
    /// Searcher using the engine `config.engine` names.
    pub fn new(config: SearchConfig) -> Self {
        let engine = match config.engine {
            EngineKind::Ilike => IlikeEngine,
        };
        Self { config, engine }
    }

    /// Searcher over the process-wide defaults.
    pub fn from_defaults() -> Self {
        Self::new(config::defaults().clone())
    }
}

impl<E: MatchEngine> Searcher<E> {
    /// Swap the matching engine.
    pub fn with_engine<F: MatchEngine>(self, engine: F) -> Searcher<F> {
        Searcher {
            config: self.config,
            engine,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Attach a search to `query`.
    ///
    /// Returns the query unchanged for a blank term, an empty column list or
    /// a non-Postgres query. Malformed column entries fail with
    /// [`SearchError::Configuration`]; unknown names fail with the schema's
    /// [`SearchError::Resolution`].
    pub fn apply<R, S>(
        &self,
        query: SelectQuery,
        schema: &R,
        term: Option<&str>,
        columns: &[S],
        options: &SearchOptions,
    ) -> Result<SelectQuery, SearchError>
    where
        R: SchemaResolver + ?Sized,
        S: AsRef<str>,
    {
        let term = match Passthrough::check(&query, term, columns) {
            Ok(term) => term,
            Err(passthrough @ Passthrough::UnsupportedBackend(dialect)) => {
                debug!(table = %query.table(), dialect = dialect.name(), "Search skipped, backend not supported");
                metrics::record_search_passthrough(passthrough.reason());
                return Ok(query);
            }
            Err(passthrough) => {
                debug!(table = %query.table(), reason = passthrough.reason(), "Search skipped");
                metrics::record_search_passthrough(passthrough.reason());
                return Ok(query);
            }
        };

        let options = self.config.resolve(options);
        let term = NormalizedTerm::new(term, &options);

        let resolved = ColumnSpec::parse_all(columns)?
            .iter()
            .map(|spec| ResolvedColumn::resolve(schema, query.table(), spec))
            .collect::<Result<Vec<_>, _>>()?;

        let mut conditions: Vec<Predicate> = resolved
            .iter()
            .map(|column| column.condition(&self.engine, &term, &options))
            .collect();
        let filter = match conditions.len() {
            1 => conditions.remove(0),
            _ => Predicate::Or(conditions),
        };

        let local = resolved.iter().filter(|c| c.local().is_some()).count();
        metrics::record_search_columns(local, resolved.len() - local);
        let tokens = term.match_tokens(&options).len();
        metrics::record_search_tokens(tokens);

        let mut query = query.filter(filter);
        let order = best_match_order(&self.engine, &resolved, &term, &options);
        let ordered = order.is_some();
        if let Some(clause) = order {
            query = query.order_by_expr(clause.expr, clause.direction);
        }

        debug!(
            table = %query.table(),
            columns = resolved.len(),
            related = resolved.len() - local,
            tokens,
            ordered,
            "Search attached"
        );
        metrics::record_search_applied();

        Ok(query)
    }
}

impl Default for Searcher<IlikeEngine> {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

/// Attach a search using the process-wide defaults.
///
/// # Example
///
/// ```rust
/// use pg_search::config::SearchOptions;
/// use pg_search::query::{Dialect, SelectQuery};
/// use pg_search::schema::{SchemaRegistry, TableSchema};
/// use pg_search::search::apply_search;
///
/// let schema = SchemaRegistry::new();
/// schema.register(TableSchema::new("users").columns(["id", "name"]));
///
/// let query = SelectQuery::new("users", Dialect::Postgres);
/// let unchanged = apply_search(query.clone(), &schema, Some("   "), &["name"], &SearchOptions::default()).unwrap();
/// assert_eq!(unchanged, query);
/// ```
pub fn apply_search<R, S>(
    query: SelectQuery,
    schema: &R,
    term: Option<&str>,
    columns: &[S],
    options: &SearchOptions,
) -> Result<SelectQuery, SearchError>
where
    R: SchemaResolver + ?Sized,
    S: AsRef<str>,
{
    Searcher::from_defaults().apply(query, schema, term, columns, options)
}

/// Convenience alias for [`apply_search`]; a no-op for a blank term.
pub fn pg_search<R, S>(
    query: SelectQuery,
    schema: &R,
    term: Option<&str>,
    columns: &[S],
    options: &SearchOptions,
) -> Result<SelectQuery, SearchError>
where
    R: SchemaResolver + ?Sized,
    S: AsRef<str>,
{
    match term.map(str::trim) {
        Some(term) if !term.is_empty() => apply_search(query, schema, Some(term), columns, options),
        _ => Ok(query),
    }
}

/// Method form of [`apply_search`] for chaining.
///
/// ```rust
/// use pg_search::config::SearchOptions;
/// use pg_search::query::{Dialect, Direction, SelectQuery};
/// use pg_search::schema::{SchemaRegistry, TableSchema};
/// use pg_search::search::PgSearchExt;
///
/// let schema = SchemaRegistry::new();
/// schema.register(TableSchema::new("users").columns(["id", "name"]));
///
/// let query = SelectQuery::new("users", Dialect::Postgres)
///     .pg_search(&schema, Some("Jane"), &["name"], &SearchOptions::default())
///     .unwrap()
///     .order_by("id", Direction::Asc);
///
/// assert_eq!(query.order_clauses().len(), 2);
/// ```
pub trait PgSearchExt: Sized {
    fn pg_search<R, S>(
        self,
        schema: &R,
        term: Option<&str>,
        columns: &[S],
        options: &SearchOptions,
    ) -> Result<Self, SearchError>
    where
        R: SchemaResolver + ?Sized,
        S: AsRef<str>;
}

impl PgSearchExt for SelectQuery {
    fn pg_search<R, S>(
        self,
        schema: &R,
        term: Option<&str>,
        columns: &[S],
        options: &SearchOptions,
    ) -> Result<Self, SearchError>
    where
        R: SchemaResolver + ?Sized,
        S: AsRef<str>,
    {
        apply_search(self, schema, term, columns, options)
    }
}
