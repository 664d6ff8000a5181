//! Mood-driven "pick something for me".
//!
//! Candidates are filtered, scored, then one is drawn with probability
//! proportional to its score. The engine holds no state; the caller builds a
//! fresh [`SuggestionContext`] per request and supplies the random source.

mod scoring;
mod select;

pub use scoring::{passes_filters, score_item};
pub use select::pick_weighted_random;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{MoodTag, ReadableItem};

/// Which readables are eligible for a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionFilters {
    pub include_books: bool,
    pub include_fanfic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_word_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_word_count: Option<u64>,
}

impl Default for SuggestionFilters {
    fn default() -> Self {
        Self {
            include_books: true,
            include_fanfic: true,
            min_word_count: None,
            max_word_count: None,
        }
    }
}

impl SuggestionFilters {
    pub fn has_length_bounds(&self) -> bool {
        self.min_word_count.is_some() || self.max_word_count.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionContext {
    #[serde(default)]
    pub mood_tags: Vec<MoodTag>,
    #[serde(default)]
    pub filters: SuggestionFilters,
}

/// An eligible item with its selection weight.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub item: &'a ReadableItem,
    pub score: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionResult {
    pub item: ReadableItem,
    pub score: u32,
    pub reason: String,
}

/// Picks one of `items` for `ctx`, or `None` when nothing is eligible.
///
/// `random` yields uniform values on `[0, 1)`; it is the only impurity.
pub fn run_suggestion_engine<R>(
    items: &[ReadableItem],
    ctx: &SuggestionContext,
    random: &mut R,
) -> Option<SuggestionResult>
where
    R: FnMut() -> f64,
{
    let candidates: Vec<ScoredCandidate<'_>> =
        items.iter().filter_map(|item| score_item(item, ctx)).collect();
    debug!(
        total = items.len(),
        eligible = candidates.len(),
        moods = ctx.mood_tags.len(),
        "Scored suggestion candidates"
    );

    let picked = pick_weighted_random(&candidates, random)?;
    debug!(id = %picked.item.id, score = picked.score, "Picked suggestion");
    Some(SuggestionResult {
        item: picked.item.clone(),
        score: picked.score,
        reason: picked.reason.clone(),
    })
}

/// [`run_suggestion_engine`] drawing from the thread-local RNG.
pub fn suggest(items: &[ReadableItem], ctx: &SuggestionContext) -> Option<SuggestionResult> {
    let mut rng = rand::rng();
    run_suggestion_engine(items, ctx, &mut || rng.random::<f64>())
}
