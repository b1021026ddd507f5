//! Static recommendation tables keyed by category or tier.

use std::collections::HashMap;

const FALLBACK_RECOMMENDATION: &str = "Schedule a follow-up assessment";

/// Read-only mapping from a key to an ordered list of recommendations.
///
/// Lookups never fail: a missing key, or a key mapped to an empty list,
/// resolves to the default list, and the default list is never empty.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    entries: HashMap<String, Vec<String>>,
    default: Vec<String>,
}

impl PolicyTable {
    pub fn new<I, S>(default: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut default: Vec<String> = default.into_iter().map(Into::into).collect();
        if default.is_empty() {
            default.push(FALLBACK_RECOMMENDATION.to_string());
        }
        Self {
            entries: HashMap::new(),
            default,
        }
    }

    pub fn with_entry<I, S>(mut self, key: impl Into<String>, recommendations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(
            key.into(),
            recommendations.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|list| !list.is_empty())
    }

    pub fn recommendations_for(&self, key: &str) -> &[String] {
        match self.entries.get(key) {
            Some(list) if !list.is_empty() => list,
            _ => &self.default,
        }
    }

    /// The first `n` recommendations for `key` (at least one is always returned).
    pub fn first_n(&self, key: &str, n: usize) -> &[String] {
        let list = self.recommendations_for(key);
        &list[..n.clamp(1, list.len())]
    }

    pub fn default_recommendations(&self) -> &[String] {
        &self.default
    }
}

/// Free-function form of [`PolicyTable::recommendations_for`].
pub fn recommendations_for(key: &str, table: &PolicyTable) -> Vec<String> {
    table.recommendations_for(key).to_vec()
}
