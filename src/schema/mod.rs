// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Schema resolution: logical column names to qualified column references.
//!
//! The search compiler never guesses table layout. Every column it touches
//! goes through a [`SchemaResolver`], and relationship-qualified columns
//! (`"user.name"`) go through [`SchemaResolver::resolve_relation`] first.
//!
//! # Example
//!
//! ```rust
//! use pg_search::schema::{SchemaRegistry, SchemaResolver, TableSchema};
//!
//! let registry = SchemaRegistry::new();
//! registry.register(TableSchema::new("users").columns(["id", "name", "email"]));
//! registry.register(
//!     TableSchema::new("posts")
//!         .columns(["id", "title", "user_id"])
//!         .belongs_to("user", "users", "user_id", "id"),
//! );
//!
//! let column = registry.resolve_column("posts", "title").unwrap();
//! assert_eq!(column.table, "posts");
//!
//! let relation = registry.resolve_relation("posts", "user").unwrap();
//! assert_eq!(relation.related_table, "users");
//! ```

mod registry;

pub use registry::{SchemaRegistry, TableSchema};

use crate::error::SearchError;

/// A column qualified by its table. Rendered and escaped by the translator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// The same column read through another table name or alias.
    #[must_use]
    pub fn requalify(&self, table: &str) -> Self {
        Self::new(table, self.column.clone())
    }
}

/// How two tables are linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Parent row holds the foreign key (`posts.user_id -> users.id`).
    BelongsTo,
    /// Related rows hold the foreign key (`users.id <- posts.user_id`).
    HasMany,
}

/// A resolved one-hop relationship.
///
/// A related row belongs to a parent row when `related_key = parent_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: String,
    pub kind: RelationKind,
    pub related_table: String,
    /// Key column on the related table
    pub related_key: ColumnRef,
    /// Key column on the parent (queried) table
    pub parent_key: ColumnRef,
}

impl Relation {
    /// Name the related table is read under inside an `EXISTS` sub-query.
    #[must_use]
    pub fn alias(&self) -> String {
        format!("{}_rel", self.name)
    }
}

/// Resolves logical names against a schema.
///
/// Implementations must fail with [`SearchError::Resolution`] for unknown
/// names rather than returning a best guess.
pub trait SchemaResolver: Send + Sync {
    fn resolve_column(&self, table: &str, column: &str) -> Result<ColumnRef, SearchError>;

    fn resolve_relation(&self, table: &str, relation: &str) -> Result<Relation, SearchError>;
}

impl<T: SchemaResolver + ?Sized> SchemaResolver for &T {
    fn resolve_column(&self, table: &str, column: &str) -> Result<ColumnRef, SearchError> {
        (**self).resolve_column(table, column)
    }

    fn resolve_relation(&self, table: &str, relation: &str) -> Result<Relation, SearchError> {
        (**self).resolve_relation(table, relation)
    }
}

impl<T: SchemaResolver + ?Sized> SchemaResolver for std::sync::Arc<T> {
    fn resolve_column(&self, table: &str, column: &str) -> Result<ColumnRef, SearchError> {
        (**self).resolve_column(table, column)
    }

    fn resolve_relation(&self, table: &str, relation: &str) -> Result<Relation, SearchError> {
        (**self).resolve_relation(table, relation)
    }
}
