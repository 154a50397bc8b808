// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search predicate and relevance compiler.
//!
//! Fuzzy, multi-column, punctuation-tolerant search over a [`SelectQuery`].
//!
//! # Architecture
//!
//! ```text
//! term ──→ normalize / tokenize ──→ NormalizedTerm
//!                                        │
//! columns ──→ ColumnSpec ──→ ResolvedColumn (schema)
//!                                        │
//!                MatchEngine (IlikeEngine)
//!                    ├─→ column_condition → WHERE (... OR ... OR EXISTS(...))
//!                    └─→ score_expression → ORDER BY GREATEST(...) DESC
//! ```
//!
//! # Matching
//!
//! For every column, a row matches when the column text contains:
//!
//! ```text
//! the raw term                       "Jane Doe"  (case-insensitive)
//! the term without punctuation       "JaneDoe"   against stripped column text
//! any significant word               "Jane", "Doe"
//! ```
//!
//! Ranking scores a raw match 100, a normalized match 50 and each word 10,
//! taking the best column.
//!
//! [`SelectQuery`]: crate::query::SelectQuery

mod apply;
mod column_spec;
mod engine;
mod normalizer;
mod resolver;
mod scorer;
mod tokenizer;

pub use apply::{apply_search, pg_search, PgSearchExt, Searcher};
pub use column_spec::ColumnSpec;
pub use engine::{
    contains_pattern, escape_like, IlikeEngine, MatchCondition, MatchEngine,
    NORMALIZED_MATCH_WEIGHT, RAW_MATCH_WEIGHT, TOKEN_MATCH_WEIGHT,
};
pub use normalizer::normalize;
pub use resolver::ResolvedColumn;
pub use scorer::best_match_order;
pub use tokenizer::{tokenize, NormalizedTerm};
