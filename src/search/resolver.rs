//! Column resolution adapter.
//!
//! Turns a [`ColumnSpec`] into something a predicate can be attached to:
//! a qualified column on the queried table, or a column behind a one-hop
//! relationship that is matched through an `EXISTS` sub-query.

use super::column_spec::ColumnSpec;
use super::engine::{MatchCondition, MatchEngine};
use super::tokenizer::NormalizedTerm;
use crate::config::ResolvedOptions;
use crate::error::SearchError;
use crate::query::Predicate;
use crate::schema::{ColumnRef, Relation, SchemaResolver};

/// A [`ColumnSpec`] after schema resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedColumn {
    Local(ColumnRef),
    Related { relation: Relation, column: ColumnRef },
}

impl ResolvedColumn {
    /// Resolve `spec` against `table`. Schema errors are returned unchanged.
    pub fn resolve<S: SchemaResolver + ?Sized>(
        schema: &S,
        table: &str,
        spec: &ColumnSpec,
    ) -> Result<Self, SearchError> {
        match spec {
            ColumnSpec::Local(column) => Ok(ResolvedColumn::Local(schema.resolve_column(table, column)?)),
            ColumnSpec::Related { relation, column } => {
                let relation = schema.resolve_relation(table, relation)?;
                let column = schema.resolve_column(&relation.related_table, column)?;
                Ok(ResolvedColumn::Related { relation, column })
            }
        }
    }

    /// The column on the queried table, if this is a local column.
    #[must_use]
    pub fn local(&self) -> Option<&ColumnRef> {
        match self {
            ResolvedColumn::Local(column) => Some(column),
            ResolvedColumn::Related { .. } => None,
        }
    }

    /// Match condition for this column, wrapped in `EXISTS` when related.
    pub fn condition<E: MatchEngine + ?Sized>(
        &self,
        engine: &E,
        term: &NormalizedTerm,
        options: &ResolvedOptions,
    ) -> MatchCondition {
        match self {
            ResolvedColumn::Local(column) => engine.column_condition(column, term, options),
            ResolvedColumn::Related { relation, column } => {
                let alias = relation.alias();
                Predicate::Exists {
                    table: relation.related_table.clone(),
                    related_key: relation.related_key.requalify(&alias),
                    parent_key: relation.parent_key.clone(),
                    filter: Box::new(engine.column_condition(&column.requalify(&alias), term, options)),
                    alias,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolutionKind;
    use crate::query::{Dialect, SqlTranslator};
    use crate::schema::{SchemaRegistry, TableSchema};
    use crate::search::engine::IlikeEngine;

    fn registry() -> SchemaRegistry {
        let registry = SchemaRegistry::new();
        registry.register(TableSchema::new("users").columns(["id", "name"]));
        registry.register(
            TableSchema::new("posts")
                .columns(["id", "title", "user_id"])
                .belongs_to("user", "users", "user_id", "id"),
        );
        registry
    }

    #[test]
    fn test_resolve_local() {
        let resolved = ResolvedColumn::resolve(&registry(), "posts", &ColumnSpec::local("title")).unwrap();
        assert_eq!(resolved.local(), Some(&ColumnRef::new("posts", "title")));
    }

    #[test]
    fn test_resolve_related() {
        let resolved =
            ResolvedColumn::resolve(&registry(), "posts", &ColumnSpec::related("user", "name")).unwrap();
        match &resolved {
            ResolvedColumn::Related { relation, column } => {
                assert_eq!(relation.related_table, "users");
                assert_eq!(column, &ColumnRef::new("users", "name"));
            }
            _ => panic!("Expected Related column"),
        }
        assert!(resolved.local().is_none());
    }

    #[test]
    fn test_related_column_checked_on_related_table() {
        let err = ResolvedColumn::resolve(&registry(), "posts", &ColumnSpec::related("user", "title"))
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::Resolution {
                kind: ResolutionKind::Column,
                table: "users".into(),
                name: "title".into(),
            }
        );
    }

    #[test]
    fn test_related_condition_is_exists() {
        let opts = ResolvedOptions::default();
        let term = NormalizedTerm::new("Jane", &opts);
        let resolved =
            ResolvedColumn::resolve(&registry(), "posts", &ColumnSpec::related("user", "name")).unwrap();

        let condition = resolved.condition(&IlikeEngine, &term, &opts);
        let sql = SqlTranslator::translate_predicate(&condition, Dialect::Postgres);
        assert!(sql.sql.starts_with(
            r#"EXISTS (SELECT 1 FROM "users" AS "user_rel" WHERE "user_rel"."id" = "posts"."user_id" AND ("#
        ));
        assert!(!sql.sql.contains(r#""users"."name""#));
        assert_eq!(sql.params.len(), condition.param_count());
    }

    #[test]
    fn test_self_referential_relation_stays_correlated() {
        let registry = SchemaRegistry::new();
        registry.register(
            TableSchema::new("users")
                .columns(["id", "name", "manager_id"])
                .belongs_to("manager", "users", "manager_id", "id"),
        );
        let opts = ResolvedOptions::default();
        let term = NormalizedTerm::new("Jane", &opts);
        let resolved =
            ResolvedColumn::resolve(&registry, "users", &ColumnSpec::related("manager", "name")).unwrap();

        let condition = resolved.condition(&IlikeEngine, &term, &opts);
        let sql = SqlTranslator::translate_predicate(&condition, Dialect::Postgres);
        // Inner key on the alias, outer key on the queried table
        assert!(sql.sql.starts_with(
            r#"EXISTS (SELECT 1 FROM "users" AS "manager_rel" WHERE "manager_rel"."id" = "users"."manager_id" AND ("#
        ));
        assert!(sql.sql.contains(r#"CAST("manager_rel"."name" AS TEXT) ILIKE $1"#));
    }
}
