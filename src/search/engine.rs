//! Matching engines: per-column match conditions and relevance scores.
//!
//! [`IlikeEngine`] is the portable baseline. Each column gets
//!
//! ```text
//! raw ILIKE %term%
//!   OR stripped ILIKE %normalized%          (normalize)
//!   OR (stripped ILIKE %token1% OR ...)     (normalize + word matching)
//! ```
//!
//! and, for ordering,
//!
//! ```text
//! raw 100 + normalized 50 + 10 per token
//! ```

use super::tokenizer::NormalizedTerm;
use crate::config::ResolvedOptions;
use crate::query::{Predicate, ScoreBranch, ScoreExpression, TextExpr};
use crate::schema::ColumnRef;

/// Filter produced for a single column.
pub type MatchCondition = Predicate;

pub const RAW_MATCH_WEIGHT: u32 = 100;
pub const NORMALIZED_MATCH_WEIGHT: u32 = 50;
pub const TOKEN_MATCH_WEIGHT: u32 = 10;

/// Builds match and score expressions for one column.
pub trait MatchEngine: Send + Sync {
    fn column_condition(
        &self,
        column: &ColumnRef,
        term: &NormalizedTerm,
        options: &ResolvedOptions,
    ) -> MatchCondition;

    fn score_expression(
        &self,
        column: &ColumnRef,
        term: &NormalizedTerm,
        options: &ResolvedOptions,
    ) -> ScoreExpression;
}

/// Case-insensitive substring matching on raw and punctuation-stripped text.
#[derive(Debug, Clone, Copy, Default)]
pub struct IlikeEngine;

impl IlikeEngine {
    fn normalized_pattern(term: &NormalizedTerm, options: &ResolvedOptions) -> Option<String> {
        // An all-punctuation term normalizes to '' and its pattern '%%' matches every row
        if options.normalize {
            Some(contains_pattern(&term.normalized))
        } else {
            None
        }
    }
}

impl MatchEngine for IlikeEngine {
    fn column_condition(
        &self,
        column: &ColumnRef,
        term: &NormalizedTerm,
        options: &ResolvedOptions,
    ) -> MatchCondition {
        let mut clauses = vec![Predicate::ilike(
            TextExpr::Cast(column.clone()),
            contains_pattern(&term.raw),
        )];

        if let Some(pattern) = Self::normalized_pattern(term, options) {
            clauses.push(Predicate::ilike(TextExpr::Stripped(column.clone()), pattern));
        }

        // Token clauses compare against stripped text, so they only apply with normalization on
        let tokens = term.match_tokens(options);
        if options.normalize && !tokens.is_empty() {
            clauses.push(Predicate::Or(
                tokens
                    .iter()
                    .map(|t| Predicate::ilike(TextExpr::Stripped(column.clone()), contains_pattern(t)))
                    .collect(),
            ));
        }

        if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            Predicate::Or(clauses)
        }
    }

    fn score_expression(
        &self,
        column: &ColumnRef,
        term: &NormalizedTerm,
        options: &ResolvedOptions,
    ) -> ScoreExpression {
        let mut branches = vec![ScoreBranch {
            target: TextExpr::Cast(column.clone()),
            pattern: contains_pattern(&term.raw),
            weight: RAW_MATCH_WEIGHT,
        }];

        if let Some(pattern) = Self::normalized_pattern(term, options) {
            branches.push(ScoreBranch {
                target: TextExpr::Stripped(column.clone()),
                pattern,
                weight: NORMALIZED_MATCH_WEIGHT,
            });
        }

        branches.extend(term.match_tokens(options).iter().map(|t| ScoreBranch {
            target: TextExpr::Stripped(column.clone()),
            pattern: contains_pattern(t),
            weight: TOKEN_MATCH_WEIGHT,
        }));

        ScoreExpression {
            column: column.clone(),
            branches,
        }
    }
}

/// `%value%` with LIKE wildcards in `value` escaped.
pub fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value))
}

/// Escape `\`, `%` and `_` so they match literally (backslash is the default ESCAPE).
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
