// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for pg-search.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `pg_search_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `outcome`: applied, passthrough
//! - `reason`: blank_term, no_columns, unsupported_backend
//! - `kind`: local, related
//! - `dialect`: postgres, sqlite, mysql
//! - `status`: success, error

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a search attached to a query
pub fn record_search_applied() {
    counter!(
        "pg_search_applied_total",
        "outcome" => "applied"
    )
    .increment(1);
}

/// Record a search that left the query unchanged
pub fn record_search_passthrough(reason: &'static str) {
    counter!(
        "pg_search_applied_total",
        "outcome" => "passthrough",
        "reason" => reason
    )
    .increment(1);
}

/// Record how many columns of each kind a search targeted
pub fn record_search_columns(local: usize, related: usize) {
    histogram!("pg_search_columns", "kind" => "local").record(local as f64);
    histogram!("pg_search_columns", "kind" => "related").record(related as f64);
}

/// Record number of significant tokens extracted from a term
pub fn record_search_tokens(count: usize) {
    histogram!("pg_search_tokens").record(count as f64);
}

/// Record a query execution
pub fn record_query(dialect: &str, status: &str) {
    counter!(
        "pg_search_query_total",
        "dialect" => dialect.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record query latency
pub fn record_query_latency(dialect: &str, duration: Duration) {
    histogram!(
        "pg_search_query_seconds",
        "dialect" => dialect.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record number of rows a query returned
pub fn record_query_rows(count: usize) {
    histogram!("pg_search_query_rows").record(count as f64);
}

/// Latency timer that records on drop
pub struct LatencyTimer {
    dialect: &'static str,
    start: Instant,
}

impl LatencyTimer {
    pub fn new(dialect: &'static str) -> Self {
        Self {
            dialect,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_query_latency(self.dialect, self.start.elapsed());
    }
}
