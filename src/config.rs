// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search configuration and per-call option resolution.
//!
//! Three layers, highest precedence first:
//!
//! 1. [`SearchOptions`] passed by the caller for one search
//! 2. Process-wide [`SearchConfig`] installed once at startup via [`install_defaults`]
//! 3. Built-in defaults ([`SearchConfig::default`])
//!
//! # Example
//!
//! ```
//! use pg_search::config::{SearchConfig, SearchOptions};
//!
//! let config = SearchConfig::default();
//! assert!(config.normalize);
//! assert_eq!(config.ignore_suffixes.len(), 7);
//!
//! let resolved = config.resolve(&SearchOptions::new().normalize(false));
//! assert!(!resolved.normalize);
//! assert!(resolved.word_based_matching);
//! ```

use serde::Deserialize;
use std::sync::OnceLock;

/// Matching engine used to build predicates.
///
/// Only substring matching is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// `ILIKE` substring matching on raw and punctuation-stripped text.
    #[default]
    Ilike,
}

/// Process-wide search defaults (the `pgsearch` config block).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchConfig {
    /// Also compare with punctuation stripped (phone numbers, IDs, ...)
    #[serde(default = "default_true")]
    pub normalize: bool,

    /// Order results by relevance (exact 100, normalized 50, word 10)
    #[serde(default = "default_true")]
    pub order_by_best_match: bool,

    /// Split the term into words and also match each significant word.
    /// Lets "Lagos State" find rows that only contain "Lagos".
    #[serde(default = "default_true")]
    pub word_based_matching: bool,

    /// Standalone words ignored during word matching (case-insensitive)
    #[serde(default = "default_ignore_suffixes")]
    pub ignore_suffixes: Vec<String>,

    /// Engine [`Searcher::new`](crate::search::Searcher::new) builds
    #[serde(default)]
    pub engine: EngineKind,
}

fn default_true() -> bool { true }
fn default_ignore_suffixes() -> Vec<String> {
    ["state", "province", "region", "territory", "city", "town", "municipality"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            normalize: default_true(),
            order_by_best_match: default_true(),
            word_based_matching: default_true(),
            ignore_suffixes: default_ignore_suffixes(),
            engine: EngineKind::default(),
        }
    }
}

impl SearchConfig {
    /// Merge caller options over this config.
    #[must_use]
    pub fn resolve(&self, options: &SearchOptions) -> ResolvedOptions {
        let suffixes = options
            .ignore_suffixes
            .as_ref()
            .unwrap_or(&self.ignore_suffixes);

        ResolvedOptions {
            normalize: options.normalize.unwrap_or(self.normalize),
            word_based_matching: options.word_based_matching.unwrap_or(self.word_based_matching),
            order_by_best_match: options.order_by_best_match.unwrap_or(self.order_by_best_match),
            ignore_suffixes: suffixes.iter().map(|s| s.to_lowercase()).collect(),
        }
    }
}

/// Caller overrides for a single search. Unset fields fall back to [`SearchConfig`].
///
/// Deserializes from the same keys as the config block, so an options map
/// like `{"normalize": false}` can be passed straight through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchOptions {
    #[serde(default)]
    pub normalize: Option<bool>,
    #[serde(default)]
    pub word_based_matching: Option<bool>,
    #[serde(default)]
    pub order_by_best_match: Option<bool>,
    #[serde(default)]
    pub ignore_suffixes: Option<Vec<String>>,
}

impl SearchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn normalize(mut self, enabled: bool) -> Self {
        self.normalize = Some(enabled);
        self
    }

    #[must_use]
    pub fn word_based_matching(mut self, enabled: bool) -> Self {
        self.word_based_matching = Some(enabled);
        self
    }

    #[must_use]
    pub fn order_by_best_match(mut self, enabled: bool) -> Self {
        self.order_by_best_match = Some(enabled);
        self
    }

    #[must_use]
    pub fn ignore_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_suffixes = Some(suffixes.into_iter().map(Into::into).collect());
        self
    }
}

/// Fully merged options for one search invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub normalize: bool,
    pub word_based_matching: bool,
    pub order_by_best_match: bool,
    /// Lowercased.
    pub ignore_suffixes: Vec<String>,
}

impl ResolvedOptions {
    /// Case-insensitive membership test against the suffix list.
    #[must_use]
    pub fn is_ignored_suffix(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.ignore_suffixes.iter().any(|s| *s == lower)
    }
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        SearchConfig::default().resolve(&SearchOptions::default())
    }
}

static DEFAULTS: OnceLock<SearchConfig> = OnceLock::new();

/// Install the process-wide defaults. Call once at startup.
///
/// Returns `false` if defaults were already installed (or already read via
/// [`defaults`]); the first value wins.
pub fn install_defaults(config: SearchConfig) -> bool {
    let installed = DEFAULTS.set(config).is_ok();
    if !installed {
        tracing::warn!("Search defaults already installed, ignoring new config");
    }
    installed
}

/// Process-wide defaults, falling back to built-ins if none were installed.
pub fn defaults() -> &'static SearchConfig {
    DEFAULTS.get_or_init(SearchConfig::default)
}
