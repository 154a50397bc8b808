// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory schema registry.
//!
//! Tables are registered once at startup and read concurrently afterwards.
//! Re-registering a table replaces its previous definition.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{ColumnRef, Relation, RelationKind, SchemaResolver};
use crate::error::{ResolutionKind, SearchError};

#[derive(Debug, Clone)]
struct RelationDef {
    kind: RelationKind,
    related_table: String,
    /// belongs_to: foreign key on this table; has_many: foreign key on the related table
    foreign_key: String,
    /// belongs_to: owner key on the related table; has_many: local key on this table
    other_key: String,
}

/// Column and relationship definitions for one table.
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    columns: Vec<String>,
    relations: HashMap<String, RelationDef>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            relations: HashMap::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.columns.contains(&name) {
            self.columns.push(name);
        }
        self
    }

    #[must_use]
    pub fn columns<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |table, name| table.column(name))
    }

    /// This table holds `foreign_key` pointing at `related_table.owner_key`.
    #[must_use]
    pub fn belongs_to(
        mut self,
        relation: impl Into<String>,
        related_table: impl Into<String>,
        foreign_key: impl Into<String>,
        owner_key: impl Into<String>,
    ) -> Self {
        self.relations.insert(
            relation.into(),
            RelationDef {
                kind: RelationKind::BelongsTo,
                related_table: related_table.into(),
                foreign_key: foreign_key.into(),
                other_key: owner_key.into(),
            },
        );
        self
    }

    /// `related_table.foreign_key` points at this table's `local_key`.
    #[must_use]
    pub fn has_many(
        mut self,
        relation: impl Into<String>,
        related_table: impl Into<String>,
        foreign_key: impl Into<String>,
        local_key: impl Into<String>,
    ) -> Self {
        self.relations.insert(
            relation.into(),
            RelationDef {
                kind: RelationKind::HasMany,
                related_table: related_table.into(),
                foreign_key: foreign_key.into(),
                other_key: local_key.into(),
            },
        );
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Thread-safe registry of [`TableSchema`]s.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: RwLock<HashMap<String, TableSchema>>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, table: TableSchema) {
        self.tables.write().insert(table.name.clone(), table);
    }

    /// Returns `true` if the table was registered.
    pub fn unregister(&self, table: &str) -> bool {
        self.tables.write().remove(table).is_some()
    }

    #[must_use]
    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }
}

impl SchemaResolver for SchemaRegistry {
    fn resolve_column(&self, table: &str, column: &str) -> Result<ColumnRef, SearchError> {
        let tables = self.tables.read();
        let schema = tables
            .get(table)
            .ok_or_else(|| SearchError::unresolved(ResolutionKind::Table, table, table))?;

        if schema.has_column(column) {
            Ok(ColumnRef::new(table, column))
        } else {
            Err(SearchError::unresolved(ResolutionKind::Column, table, column))
        }
    }

    fn resolve_relation(&self, table: &str, relation: &str) -> Result<Relation, SearchError> {
        let tables = self.tables.read();
        let schema = tables
            .get(table)
            .ok_or_else(|| SearchError::unresolved(ResolutionKind::Table, table, table))?;
        let def = schema
            .relations
            .get(relation)
            .ok_or_else(|| SearchError::unresolved(ResolutionKind::Relationship, table, relation))?;

        let (related_key, parent_key) = match def.kind {
            RelationKind::BelongsTo => (
                ColumnRef::new(&def.related_table, &def.other_key),
                ColumnRef::new(table, &def.foreign_key),
            ),
            RelationKind::HasMany => (
                ColumnRef::new(&def.related_table, &def.foreign_key),
                ColumnRef::new(table, &def.other_key),
            ),
        };

        Ok(Relation {
            name: relation.to_string(),
            kind: def.kind,
            related_table: def.related_table.clone(),
            related_key,
            parent_key,
        })
    }
}
