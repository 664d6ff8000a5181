use super::{ScoredCandidate, SuggestionContext, SuggestionFilters};
use crate::models::{ReadableItem, ReadableType};

const MOOD_MATCH_POINTS: u32 = 10;
const PRIORITY_POINTS: u32 = 5;
const BOOK_NUDGE: u32 = 2;
const FANFIC_NUDGE: u32 = 3;

/// Whether `item` is eligible under `filters`.
///
/// Items of unknown length always pass the word-count bounds.
pub fn passes_filters(item: &ReadableItem, filters: &SuggestionFilters) -> bool {
    let type_allowed = match item.readable_type() {
        ReadableType::Book => filters.include_books,
        ReadableType::Fanfic => filters.include_fanfic,
    };
    if !type_allowed {
        return false;
    }

    let Some(words) = item.approximate_word_count() else {
        return true;
    };
    if filters.min_word_count.is_some_and(|min| words < min) {
        return false;
    }
    if filters.max_word_count.is_some_and(|max| words > max) {
        return false;
    }
    true
}

/// Scores `item` against `ctx`, or `None` when it is filtered out.
///
/// The score is never below 1, so every eligible item can be picked.
pub fn score_item<'a>(item: &'a ReadableItem, ctx: &SuggestionContext) -> Option<ScoredCandidate<'a>> {
    let filters = &ctx.filters;
    if !passes_filters(item, filters) {
        return None;
    }

    let matched = item
        .mood_tags
        .iter()
        .filter(|mood| ctx.mood_tags.contains(mood))
        .count() as u32;
    let mood_score = if ctx.mood_tags.is_empty() {
        0
    } else {
        MOOD_MATCH_POINTS * matched
    };

    let priority_score = u32::from(item.priority) * PRIORITY_POINTS;

    let type_score = if filters.include_books && filters.include_fanfic {
        match item.readable_type() {
            ReadableType::Book => BOOK_NUDGE,
            ReadableType::Fanfic => FANFIC_NUDGE,
        }
    } else {
        0
    };

    let score = (mood_score + priority_score + type_score).max(1);
    Some(ScoredCandidate {
        item,
        score,
        reason: build_reason(item, ctx, matched),
    })
}

fn build_reason(item: &ReadableItem, ctx: &SuggestionContext, matched: u32) -> String {
    let mut parts = Vec::with_capacity(4);

    parts.push(match (ctx.mood_tags.is_empty(), matched) {
        (true, _) => "no mood selected".to_string(),
        (false, 0) => "no mood match".to_string(),
        (false, n) => format!("matches {n} of your moods"),
    });
    parts.push(format!("priority {}", item.priority));
    parts.push(
        match item.readable_type() {
            ReadableType::Book => "book",
            ReadableType::Fanfic => "fan fiction",
        }
        .to_string(),
    );
    if let Some(words) = item.approximate_word_count() {
        if ctx.filters.has_length_bounds() {
            parts.push("within your length range".to_string());
        } else {
            parts.push(format!("about {} words", group_thousands(words)));
        }
    }

    capitalize(&parts.join(", "))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MoodTag, ReadableKind};

    fn book(priority: u8, pages: Option<u32>) -> ReadableItem {
        let mut item = ReadableItem::new_book("Book", "A");
        item.priority = priority;
        if let ReadableKind::Book(details) = &mut item.kind {
            details.page_count = pages;
        }
        item
    }

    fn fanfic(priority: u8, words: Option<u64>) -> ReadableItem {
        let mut item = ReadableItem::new_fanfic("Fic", "B");
        item.priority = priority;
        if let ReadableKind::Fanfic(details) = &mut item.kind {
            details.word_count = words;
        }
        item
    }

    fn ctx(moods: Vec<MoodTag>, filters: SuggestionFilters) -> SuggestionContext {
        SuggestionContext {
            mood_tags: moods,
            filters,
        }
    }

    #[test]
    fn test_excluded_books_rejected_regardless_of_fields() {
        let filters = SuggestionFilters {
            include_books: false,
            ..Default::default()
        };
        assert!(!passes_filters(&book(5, Some(100)), &filters));
        assert!(!passes_filters(&book(1, None), &filters));
        assert!(passes_filters(&fanfic(1, None), &filters));
    }

    #[test]
    fn test_excluded_fanfic_rejected() {
        let filters = SuggestionFilters {
            include_fanfic: false,
            ..Default::default()
        };
        assert!(!passes_filters(&fanfic(3, Some(1_000)), &filters));
    }

    #[test]
    fn test_unknown_length_always_passes_bounds() {
        let filters = SuggestionFilters {
            min_word_count: Some(50_000),
            max_word_count: Some(60_000),
            ..Default::default()
        };
        assert!(passes_filters(&book(3, None), &filters));
        assert!(passes_filters(&fanfic(3, None), &filters));
    }

    #[test]
    fn test_length_bounds_inclusive() {
        let filters = SuggestionFilters {
            min_word_count: Some(30_000),
            max_word_count: Some(90_000),
            ..Default::default()
        };
        assert!(passes_filters(&book(3, Some(100)), &filters));
        assert!(passes_filters(&book(3, Some(300)), &filters));
        assert!(!passes_filters(&book(3, Some(99)), &filters));
        assert!(!passes_filters(&fanfic(3, Some(90_001)), &filters));
    }

    #[test]
    fn test_score_components() {
        let mut item = book(3, None);
        item.mood_tags = vec![MoodTag::Cozy, MoodTag::Mysterious];
        let c = ctx(vec![MoodTag::Cozy], SuggestionFilters::default());
        assert_eq!(score_item(&item, &c).unwrap().score, 10 + 15 + 2);

        let c = ctx(vec![MoodTag::Cozy, MoodTag::Mysterious], SuggestionFilters::default());
        assert_eq!(score_item(&item, &c).unwrap().score, 20 + 15 + 2);
    }

    #[test]
    fn test_type_nudge_only_when_both_included() {
        let item = fanfic(2, None);
        let both = ctx(vec![], SuggestionFilters::default());
        assert_eq!(score_item(&item, &both).unwrap().score, 13);

        let fic_only = ctx(
            vec![],
            SuggestionFilters {
                include_books: false,
                ..Default::default()
            },
        );
        assert_eq!(score_item(&item, &fic_only).unwrap().score, 10);
    }

    #[test]
    fn test_score_floor_is_one() {
        let mut item = fanfic(1, None);
        item.priority = 0;
        let c = ctx(
            vec![MoodTag::Dark],
            SuggestionFilters {
                include_books: false,
                ..Default::default()
            },
        );
        assert_eq!(score_item(&item, &c).unwrap().score, 1);
    }

    #[test]
    fn test_filtered_item_scores_none() {
        let c = ctx(
            vec![],
            SuggestionFilters {
                include_books: false,
                include_fanfic: false,
                ..Default::default()
            },
        );
        assert!(score_item(&book(5, None), &c).is_none());
    }

    #[test]
    fn test_reason_text() {
        let mut item = book(3, Some(320));
        item.mood_tags = vec![MoodTag::Cozy];

        let c = ctx(vec![], SuggestionFilters::default());
        assert_eq!(
            score_item(&item, &c).unwrap().reason,
            "No mood selected, priority 3, book, about 96,000 words"
        );

        let c = ctx(
            vec![MoodTag::Cozy],
            SuggestionFilters {
                max_word_count: Some(100_000),
                ..Default::default()
            },
        );
        assert_eq!(
            score_item(&item, &c).unwrap().reason,
            "Matches 1 of your moods, priority 3, book, within your length range"
        );

        let fic = fanfic(4, None);
        let c = ctx(vec![MoodTag::Dark], SuggestionFilters::default());
        assert_eq!(
            score_item(&fic, &c).unwrap().reason,
            "No mood match, priority 4, fan fiction"
        );
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
