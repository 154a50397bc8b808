//! Relevance ordering.
//!
//! The row score is the GREATEST of the per-column scores, not their sum, so
//! matching several columns does not outrank one strong match. Only local
//! columns are scored; relationship columns filter but never rank.

use super::engine::MatchEngine;
use super::resolver::ResolvedColumn;
use super::tokenizer::NormalizedTerm;
use crate::config::ResolvedOptions;
use crate::query::{Direction, OrderClause, OrderExpr};

/// ORDER BY clause ranking rows by best match, or `None` when ordering is
/// disabled or no local column was requested.
pub fn best_match_order<E: MatchEngine + ?Sized>(
    engine: &E,
    columns: &[ResolvedColumn],
    term: &NormalizedTerm,
    options: &ResolvedOptions,
) -> Option<OrderClause> {
    if !options.order_by_best_match {
        return None;
    }

    let scores: Vec<_> = columns
        .iter()
        .filter_map(ResolvedColumn::local)
        .map(|column| engine.score_expression(column, term, options))
        .collect();

    if scores.is_empty() {
        return None;
    }

    Some(OrderClause {
        expr: OrderExpr::GreatestScore(scores),
        direction: Direction::Desc,
    })
}
