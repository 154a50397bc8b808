//! Logical column references: `"name"` or `"relation.name"`.

use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// A searchable column, optionally reached through exactly one relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnSpec {
    /// Column on the queried table
    Local(String),
    /// Column on the table behind a one-hop relationship
    Related { relation: String, column: String },
}

impl ColumnSpec {
    pub fn local(column: impl Into<String>) -> Self {
        ColumnSpec::Local(column.into())
    }

    pub fn related(relation: impl Into<String>, column: impl Into<String>) -> Self {
        ColumnSpec::Related {
            relation: relation.into(),
            column: column.into(),
        }
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, ColumnSpec::Local(_))
    }

    /// Parse every entry, failing on the first malformed one.
    pub fn parse_all<S: AsRef<str>>(columns: &[S]) -> Result<Vec<ColumnSpec>, SearchError> {
        columns.iter().map(|c| c.as_ref().parse()).collect()
    }
}

impl FromStr for ColumnSpec {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();

        if parts.iter().any(|p| p.is_empty()) {
            return Err(SearchError::Configuration(format!(
                "empty segment in column '{}'",
                s
            )));
        }

        match parts.as_slice() {
            [column] => Ok(ColumnSpec::local(*column)),
            [relation, column] => Ok(ColumnSpec::related(*relation, *column)),
            _ => Err(SearchError::Configuration(format!(
                "column '{}' has a nested relation path; only one level is supported",
                s
            ))),
        }
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSpec::Local(column) => write!(f, "{}", column),
            ColumnSpec::Related { relation, column } => write!(f, "{}.{}", relation, column),
        }
    }
}
