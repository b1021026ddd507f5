//! Lexical scoring of free text against keyword category tables, and
//! threshold-based label selection over the resulting scores.
//!
//! A [`CategoryTable`] is an ordered list of categories, each with trigger
//! phrases and a per-match increment. Scoring is a single lowercase substring
//! scan per phrase; the table order is the iteration order everywhere, which
//! makes the dominant-category tie-break stable.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A named bucket scored by phrase matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub phrases: Vec<String>,
    pub increment: f64,
}

impl Category {
    pub fn new(name: impl Into<String>, phrases: &[&str], increment: f64) -> Self {
        Self {
            name: name.into(),
            phrases: phrases.iter().map(|p| p.to_lowercase()).collect(),
            increment,
        }
    }
}

/// Ordered, immutable set of categories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

/// A phrase that was found in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseMatch<'a> {
    pub category: &'a str,
    pub phrase: &'a str,
    pub occurrences: usize,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table where every category shares the same increment.
    pub fn uniform(increment: f64, entries: &[(&str, &[&str])]) -> Self {
        entries
            .iter()
            .fold(Self::new(), |table, (name, phrases)| {
                table.with_category(Category::new(*name, phrases, increment))
            })
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Score `text` against this table.
    pub fn score(&self, text: &str) -> ScoreVector {
        score(text, self)
    }

    /// Every phrase present in `text`, in table order.
    pub fn matches<'a>(&'a self, text: &str) -> Vec<PhraseMatch<'a>> {
        let lowered = text.to_lowercase();
        self.categories
            .iter()
            .flat_map(|category| {
                let lowered = &lowered;
                category.phrases.iter().filter_map(move |phrase| {
                    let occurrences = count_occurrences(lowered, phrase);
                    (occurrences > 0).then_some(PhraseMatch {
                        category: category.name.as_str(),
                        phrase: phrase.as_str(),
                        occurrences,
                    })
                })
            })
            .collect()
    }

    /// First phrase of `category` that appears in `text`, in phrase order.
    pub fn first_match(&self, category: &str, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.categories
            .iter()
            .find(|c| c.name == category)?
            .phrases
            .iter()
            .find(|phrase| lowered.contains(phrase.as_str()))
            .map(String::as_str)
    }
}

/// Count non-overlapping occurrences; an empty phrase never matches.
fn count_occurrences(haystack: &str, phrase: &str) -> usize {
    if phrase.is_empty() {
        return 0;
    }
    haystack.matches(phrase).count()
}

/// Clamp a score into `[0, 1]` and round it to two decimals. NaN becomes 0.
pub fn clamp_score(value: f64) -> f64 {
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    (clamped * 100.0).round() / 100.0
}

/// Score `text` against `table`: each phrase occurrence adds the category's
/// increment, then every score is clamped to `[0, 1]` and rounded to two
/// decimals. Empty text yields an all-zero vector.
pub fn score(text: &str, table: &CategoryTable) -> ScoreVector {
    let lowered = text.to_lowercase();
    let entries = table
        .categories
        .iter()
        .map(|category| {
            let raw: f64 = category
                .phrases
                .iter()
                .map(|phrase| count_occurrences(&lowered, phrase) as f64 * category.increment)
                .sum();
            (category.name.clone(), clamp_score(raw))
        })
        .collect();
    ScoreVector { entries }
}

/// Per-category scores in table order. Every score lies in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreVector {
    entries: Vec<(String, f64)>,
}

impl ScoreVector {
    /// Build a vector from precomputed values; values are clamped and rounded.
    pub fn from_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            entries: scores
                .into_iter()
                .map(|(name, value)| (name.into(), clamp_score(value)))
                .collect(),
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_score(&self) -> f64 {
        self.entries.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }

    pub fn is_all_zero(&self) -> bool {
        self.entries.iter().all(|(_, v)| *v == 0.0)
    }

    /// The first category, in table order, holding the maximum score.
    pub fn dominant(&self) -> Option<(&str, f64)> {
        let max = self.max_score();
        self.iter().find(|(_, value)| *value == max)
    }

    /// Dominant category if its score reaches `min_score`, else `fallback`.
    pub fn dominant_or<'a>(&'a self, min_score: f64, fallback: &'a str) -> &'a str {
        match self.dominant() {
            Some((name, value)) if value >= min_score => name,
            _ => fallback,
        }
    }

    /// Categories scoring at least `threshold`, in table order.
    pub fn at_least(&self, threshold: f64) -> Vec<&str> {
        self.iter()
            .filter(|(_, value)| *value >= threshold)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Serialize for ScoreVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Ordered cutoffs mapping a score to a label, with a floor label for scores
/// below every cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdLadder<L> {
    steps: Vec<(f64, L)>,
    floor: L,
}

impl<L: Clone> ThresholdLadder<L> {
    /// Cutoffs may be given in any order; they are walked highest first.
    pub fn new(steps: impl IntoIterator<Item = (f64, L)>, floor: L) -> Self {
        let mut steps: Vec<(f64, L)> = steps.into_iter().collect();
        steps.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self { steps, floor }
    }

    /// Label for a single value.
    pub fn label_for(&self, value: f64) -> L {
        self.steps
            .iter()
            .find(|(cutoff, _)| value >= *cutoff)
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| self.floor.clone())
    }
}

/// Label for the maximum score in `scores`.
pub fn select_label<L: Clone>(scores: &ScoreVector, ladder: &ThresholdLadder<L>) -> L {
    ladder.label_for(scores.max_score())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn safety_like() -> CategoryTable {
        CategoryTable::uniform(
            0.3,
            &[
                ("self_harm", &["hurt myself", "suicide"]),
                ("severe_distress", &["hopeless", "crisis"]),
            ],
        )
    }

    #[test]
    fn test_empty_text_scores_zero() {
        let scores = score("", &safety_like());
        assert_eq!(scores.len(), 2);
        assert!(scores.is_all_zero());
        assert_eq!(scores.dominant_or(0.2, "neutral"), "neutral");
    }

    #[test]
    fn test_repeated_phrase_accumulates() {
        let scores = score("I could hurt myself. I might HURT MYSELF.", &safety_like());
        assert_eq!(scores.get("self_harm"), Some(0.6));
        assert_eq!(scores.get("severe_distress"), Some(0.0));
    }

    #[test]
    fn test_scores_are_clamped_and_rounded() {
        let table = CategoryTable::uniform(0.7, &[("x", &["a"])]);
        let scores = score("a a a", &table);
        assert_eq!(scores.get("x"), Some(1.0));

        let table = CategoryTable::uniform(0.1, &[("y", &["b"])]);
        let scores = score("b b b", &table);
        assert_eq!(scores.get("y"), Some(0.3));
    }

    #[test]
    fn test_tie_break_follows_table_order() {
        let table = CategoryTable::uniform(0.2, &[("first", &["alpha"]), ("second", &["beta"])]);
        let scores = score("beta alpha", &table);
        assert_eq!(scores.dominant(), Some(("first", 0.2)));
    }

    #[test]
    fn test_ladder_walks_from_highest_cutoff() {
        let ladder = ThresholdLadder::new([(0.3, "Medium"), (0.6, "High")], "Low");
        assert_eq!(ladder.label_for(0.6), "High");
        assert_eq!(ladder.label_for(0.59), "Medium");
        assert_eq!(ladder.label_for(0.0), "Low");

        let scores = score("hurt myself and hurt myself", &safety_like());
        assert_eq!(select_label(&scores, &ladder), "High");
    }

    #[test]
    fn test_matches_and_first_match() {
        let table = safety_like();
        let found = table.matches("a crisis, a hopeless crisis");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].phrase, "hopeless");
        assert_eq!(found[1].occurrences, 2);
        assert_eq!(table.first_match("severe_distress", "crisis and hopeless"), Some("hopeless"));
        assert_eq!(table.first_match("missing", "crisis"), None);
    }

    #[test]
    fn test_serializes_in_table_order() {
        let scores = ScoreVector::from_scores([("zeta", 0.5), ("alpha", 0.25)]);
        let json = serde_json::to_string(&scores).unwrap();
        assert_eq!(json, r#"{"zeta":0.5,"alpha":0.25}"#);
    }
}
