// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types for search compilation and execution.
//!
//! Pass-through cases (blank term, no columns, unsupported backend) are not
//! errors and never produce a [`SearchError`].

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// A table, column or relationship name the schema layer could not resolve.
    #[error("Cannot resolve {kind} '{name}' on table '{table}'")]
    Resolution {
        kind: ResolutionKind,
        table: String,
        name: String,
    },
    /// Malformed caller input, e.g. a column path with more than one dot.
    #[error("Invalid search configuration: {0}")]
    Configuration(String),
    /// Failure reported by the database driver.
    #[error("Database backend error: {0}")]
    Backend(String),
}

/// What kind of name failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    Table,
    Column,
    Relationship,
}

impl std::fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionKind::Table => write!(f, "table"),
            ResolutionKind::Column => write!(f, "column"),
            ResolutionKind::Relationship => write!(f, "relationship"),
        }
    }
}

impl SearchError {
    pub(crate) fn unresolved(kind: ResolutionKind, table: &str, name: &str) -> Self {
        SearchError::Resolution {
            kind,
            table: table.to_string(),
            name: name.to_string(),
        }
    }

    /// True for errors raised by the schema layer.
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        matches!(self, SearchError::Resolution { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_message() {
        let err = SearchError::unresolved(ResolutionKind::Relationship, "posts", "author");
        assert_eq!(
            err.to_string(),
            "Cannot resolve relationship 'author' on table 'posts'"
        );
        assert!(err.is_resolution());
    }

    #[test]
    fn test_configuration_is_not_resolution() {
        let err = SearchError::Configuration("a.b.c".into());
        assert!(!err.is_resolution());
        assert_eq!(err.to_string(), "Invalid search configuration: a.b.c");
    }
}
