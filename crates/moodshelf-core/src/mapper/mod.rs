//! Conversion between stored [`ReadableRow`]s and [`ReadableItem`]s.
//!
//! Both directions are total: bad historical data degrades to defaults
//! instead of surfacing an error.

mod chapters;
mod decode;
mod row;

pub use chapters::ChapterProgress;
pub use decode::{decode_json_list, decode_timestamp, encode_json_list};
pub use row::{READABLE_COLUMNS, ReadableRow};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::{
    BookDetails, BookSource, DEFAULT_PRIORITY, FanficDetails, MAX_PRIORITY, MIN_PRIORITY,
    MoodTag, ProgressMode, ReadableItem, ReadableKind, ReadableStatus, ReadableType,
};
use decode::{
    decode_count, decode_enum, decode_flag, decode_optional_enum, decode_word_count, encode_flag,
    encode_timestamp,
};

/// Options for [`build_row_from_domain`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildRowOptions {
    /// Write time. Defaults to the current instant.
    pub now: Option<DateTime<Utc>>,
}

impl BuildRowOptions {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Some(now) }
    }
}

pub fn map_row_to_domain(row: &ReadableRow) -> ReadableItem {
    let readable_type = match row.readable_type.parse::<ReadableType>() {
        Ok(t) => t,
        Err(_) => {
            warn!(id = %row.id, value = %row.readable_type, "Unknown readable type, reading as book");
            ReadableType::Book
        }
    };

    let kind = match readable_type {
        ReadableType::Book => ReadableKind::Book(book_from_row(row)),
        ReadableType::Fanfic => ReadableKind::Fanfic(fanfic_from_row(row)),
    };

    let mut mood_tags: Vec<MoodTag> = decode_json_list(row.mood_tags_json.as_deref());
    dedup_in_order(&mut mood_tags);

    ReadableItem {
        id: row.id.clone(),
        title: row.title.clone(),
        author: row.author.clone(),
        description: row.description.clone(),
        status: decode_status(row.status.as_deref()),
        priority: decode_priority(row.priority),
        mood_tags,
        created_at: decode_timestamp(row.created_at.as_deref()),
        updated_at: decode_timestamp(row.updated_at.as_deref()),
        progress_percent: row
            .progress_percent
            .filter(|p| p.is_finite())
            .map_or(0.0, |p| p.clamp(0.0, 100.0)),
        progress_mode: decode_enum(row.progress_mode.as_deref(), ProgressMode::Units),
        time_current_seconds: row.time_current_seconds,
        time_total_seconds: row.time_total_seconds,
        started_at: decode_timestamp(row.started_at.as_deref()),
        finished_at: decode_timestamp(row.finished_at.as_deref()),
        dnf_at: decode_timestamp(row.dnf_at.as_deref()),
        notes: row.notes.clone(),
        kind,
    }
}

fn book_from_row(row: &ReadableRow) -> BookDetails {
    BookDetails {
        source: decode_enum(row.source.as_deref(), BookSource::Manual),
        source_id: row.source_id.clone(),
        page_count: decode_count(row.page_count),
        current_page: decode_count(row.current_page),
        genres: decode_json_list(row.genres_json.as_deref()),
    }
}

fn fanfic_from_row(row: &ReadableRow) -> FanficDetails {
    let legacy_count = decode_count(row.chapter_count);
    let stored = ChapterProgress {
        legacy_count,
        available: decode_count(row.available_chapters),
        total: decode_count(row.total_chapters),
        complete: decode_flag(row.is_complete),
    };
    let chapters = stored.reconcile_for_read();
    if chapters.is_unresolved() {
        warn!(
            id = %row.id,
            chapter_count = ?legacy_count,
            total_chapters = ?chapters.total,
            "Chapter data has a total but no available count; keeping as stored"
        );
    }

    let details = FanficDetails {
        ao3_work_id: row.ao3_work_id.clone(),
        ao3_url: row.ao3_url.clone(),
        fandoms: decode_json_list(row.fandoms_json.as_deref()),
        relationships: decode_json_list(row.relationships_json.as_deref()),
        characters: decode_json_list(row.characters_json.as_deref()),
        tags: decode_json_list(row.ao3_tags_json.as_deref()),
        warnings: decode_json_list(row.warnings_json.as_deref()),
        rating: decode_optional_enum(row.rating.as_deref()),
        chapter_count: legacy_count,
        available_chapters: chapters.available,
        total_chapters: chapters.total,
        current_chapter: decode_count(row.current_chapter),
        complete: chapters.complete,
        word_count: decode_word_count(row.word_count),
    };
    if let Some(problem) = details.chapter_warning() {
        warn!(id = %row.id, "{problem}");
    }
    details
}

/// Stored status as the domain reads it: missing or unrecognised values are
/// `to_read`. Storage queries that bucket by status go through this too.
pub fn decode_status(raw: Option<&str>) -> ReadableStatus {
    decode_enum(raw, ReadableStatus::default())
}

fn decode_priority(raw: Option<i64>) -> u8 {
    raw.map_or(DEFAULT_PRIORITY, |p| {
        p.clamp(i64::from(MIN_PRIORITY), i64::from(MAX_PRIORITY)) as u8
    })
}

fn dedup_in_order<T: PartialEq + Copy>(values: &mut Vec<T>) {
    let mut seen = Vec::with_capacity(values.len());
    values.retain(|v| {
        if seen.contains(v) {
            false
        } else {
            seen.push(*v);
            true
        }
    });
}

/// Builds the stored row for `item`.
///
/// `updated_at` is always the write time; `created_at` falls back to it for
/// items that have never been stored.
pub fn build_row_from_domain(item: &ReadableItem, options: &BuildRowOptions) -> ReadableRow {
    let now = options.now.unwrap_or_else(Utc::now);

    let mut row = ReadableRow {
        id: item.id.clone(),
        title: item.title.clone(),
        author: item.author.clone(),
        description: item.description.clone(),
        status: Some(item.status.to_string()),
        priority: Some(i64::from(item.priority)),
        source: Some(item.source().to_string()),
        mood_tags_json: Some(encode_json_list(&item.mood_tags)),
        created_at: encode_timestamp(Some(item.created_at.unwrap_or(now))),
        updated_at: encode_timestamp(Some(now)),
        started_at: encode_timestamp(item.started_at),
        finished_at: encode_timestamp(item.finished_at),
        dnf_at: encode_timestamp(item.dnf_at),
        notes: item.notes.clone(),
        progress_percent: Some(item.progress_percent),
        time_current_seconds: item.time_current_seconds,
        time_total_seconds: item.time_total_seconds,
        progress_mode: Some(item.progress_mode.to_string()),
        readable_type: item.readable_type().to_string(),
        ..Default::default()
    };

    match &item.kind {
        ReadableKind::Book(book) => {
            row.source_id = book.source_id.clone();
            row.page_count = book.page_count.map(i64::from);
            row.current_page = book.current_page.map(i64::from);
            row.genres_json = Some(encode_json_list(&book.genres));
        }
        ReadableKind::Fanfic(fanfic) => {
            let (chapters, legacy) = ChapterProgress {
                legacy_count: fanfic.chapter_count,
                available: fanfic.available_chapters,
                total: fanfic.total_chapters,
                complete: fanfic.complete,
            }
            .reconcile_for_write();

            row.ao3_work_id = fanfic.ao3_work_id.clone();
            row.ao3_url = fanfic.ao3_url.clone();
            row.fandoms_json = Some(encode_json_list(&fanfic.fandoms));
            row.relationships_json = Some(encode_json_list(&fanfic.relationships));
            row.characters_json = Some(encode_json_list(&fanfic.characters));
            row.ao3_tags_json = Some(encode_json_list(&fanfic.tags));
            row.warnings_json = Some(encode_json_list(&fanfic.warnings));
            row.rating = fanfic.rating.map(|r| r.to_string());
            row.chapter_count = legacy.map(i64::from);
            row.available_chapters = chapters.available.map(i64::from);
            row.total_chapters = chapters.total.map(i64::from);
            row.current_chapter = fanfic.current_chapter.map(i64::from);
            row.is_complete = encode_flag(chapters.complete);
            row.word_count = fanfic.word_count.and_then(|w| i64::try_from(w).ok());
        }
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FanficRating;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn legacy_fanfic_row(is_complete: Option<i64>) -> ReadableRow {
        ReadableRow {
            id: "fic-1".to_string(),
            title: "Old Fic".to_string(),
            author: "anon".to_string(),
            chapter_count: Some(10),
            is_complete,
            readable_type: "fanfic".to_string(),
            ..Default::default()
        }
    }

    fn sample_book() -> ReadableItem {
        let mut item = ReadableItem::new_book("The Left Hand of Darkness", "Ursula K. Le Guin");
        item.description = Some("Winter".to_string());
        item.priority = 4;
        item.mood_tags = vec![MoodTag::Reflective, MoodTag::Cozy];
        item.started_at = Some(fixed_now() - chrono::Duration::days(2));
        item.notes = Some("library copy".to_string());
        item.progress_percent = 12.5;
        item.kind = ReadableKind::Book(BookDetails {
            source: BookSource::OpenLibrary,
            source_id: Some("OL59863W".to_string()),
            page_count: Some(304),
            current_page: Some(38),
            genres: vec!["Science Fiction".to_string(), "Classic".to_string()],
        });
        item
    }

    fn sample_fanfic() -> ReadableItem {
        let mut item = ReadableItem::new_fanfic("A Long Walk", "writer42");
        item.priority = 5;
        item.mood_tags = vec![MoodTag::Epic];
        item.progress_mode = ProgressMode::Time;
        item.time_current_seconds = Some(600);
        item.time_total_seconds = Some(3600);
        item.kind = ReadableKind::Fanfic(FanficDetails {
            ao3_work_id: Some("123456".to_string()),
            ao3_url: Some("https://archiveofourown.org/works/123456".to_string()),
            fandoms: vec!["Star Wars".to_string()],
            relationships: vec!["A/B".to_string()],
            characters: vec!["A".to_string(), "B".to_string()],
            tags: vec!["Slow Burn".to_string()],
            warnings: vec!["No Archive Warnings Apply".to_string()],
            rating: Some(FanficRating::T),
            chapter_count: Some(30),
            available_chapters: Some(12),
            total_chapters: Some(30),
            current_chapter: Some(4),
            complete: Some(false),
            word_count: Some(140_000),
        });
        item
    }

    #[test]
    fn test_book_round_trip() {
        let item = sample_book();
        let row = build_row_from_domain(&item, &BuildRowOptions::at(fixed_now()));
        let restored = map_row_to_domain(&row);

        let mut expected = item.clone();
        expected.updated_at = Some(fixed_now());
        assert_eq!(restored, expected);
    }

    #[test]
    fn test_fanfic_round_trip() {
        let item = sample_fanfic();
        let row = build_row_from_domain(&item, &BuildRowOptions::at(fixed_now()));
        let restored = map_row_to_domain(&row);

        let mut expected = item.clone();
        expected.updated_at = Some(fixed_now());
        assert_eq!(restored, expected);
    }

    #[test]
    fn test_legacy_complete_row_reconciles() {
        let item = map_row_to_domain(&legacy_fanfic_row(Some(1)));
        let fic = item.as_fanfic().unwrap();
        assert_eq!(fic.available_chapters, Some(10));
        assert_eq!(fic.total_chapters, Some(10));
        assert_eq!(fic.chapter_count, Some(10));
        assert_eq!(fic.complete, Some(true));
    }

    #[test]
    fn test_legacy_ongoing_row_reconciles() {
        let item = map_row_to_domain(&legacy_fanfic_row(Some(0)));
        let fic = item.as_fanfic().unwrap();
        assert_eq!(fic.available_chapters, Some(10));
        assert_eq!(fic.total_chapters, None);
    }

    #[test]
    fn test_duplicated_total_is_cleared() {
        let mut row = legacy_fanfic_row(Some(0));
        row.total_chapters = Some(10);
        let item = map_row_to_domain(&row);
        let fic = item.as_fanfic().unwrap();
        assert_eq!(fic.available_chapters, Some(10));
        assert_eq!(fic.total_chapters, None);
    }

    #[test]
    fn test_malformed_row_degrades_to_defaults() {
        let row = ReadableRow {
            id: "b-1".to_string(),
            title: "Broken".to_string(),
            author: "?".to_string(),
            status: Some("shelved".to_string()),
            priority: Some(42),
            genres_json: Some("{not json".to_string()),
            mood_tags_json: Some("{\"cozy\": true}".to_string()),
            progress_mode: Some("pages".to_string()),
            progress_percent: Some(250.0),
            created_at: Some("last tuesday".to_string()),
            readable_type: "book".to_string(),
            ..Default::default()
        };
        let item = map_row_to_domain(&row);
        assert_eq!(item.status, ReadableStatus::ToRead);
        assert_eq!(item.priority, MAX_PRIORITY);
        assert!(item.mood_tags.is_empty());
        assert!(item.as_book().unwrap().genres.is_empty());
        assert_eq!(item.progress_mode, ProgressMode::Units);
        assert_eq!(item.progress_percent, 100.0);
        assert_eq!(item.created_at, None);
        assert_eq!(item.as_book().unwrap().source, BookSource::Manual);
    }

    #[test]
    fn test_unknown_type_reads_as_book() {
        let row = ReadableRow {
            id: "x".to_string(),
            readable_type: "audiobook".to_string(),
            page_count: Some(100),
            ..Default::default()
        };
        let item = map_row_to_domain(&row);
        assert_eq!(item.readable_type(), ReadableType::Book);
        assert_eq!(item.approximate_word_count(), Some(30_000));
    }

    #[test]
    fn test_duplicate_moods_collapse() {
        let row = ReadableRow {
            mood_tags_json: Some("[\"cozy\",\"epic\",\"cozy\"]".to_string()),
            readable_type: "book".to_string(),
            ..Default::default()
        };
        assert_eq!(
            map_row_to_domain(&row).mood_tags,
            vec![MoodTag::Cozy, MoodTag::Epic]
        );
    }

    #[test]
    fn test_build_sets_write_timestamps() {
        let mut item = sample_book();
        item.created_at = None;
        item.updated_at = Some(fixed_now() - chrono::Duration::days(30));

        let row = build_row_from_domain(&item, &BuildRowOptions::at(fixed_now()));
        let stamp = fixed_now().to_rfc3339();
        assert_eq!(row.created_at.as_deref(), Some(stamp.as_str()));
        assert_eq!(row.updated_at.as_deref(), Some(stamp.as_str()));
    }

    #[test]
    fn test_build_book_nulls_fanfic_columns() {
        let row = build_row_from_domain(&sample_book(), &BuildRowOptions::at(fixed_now()));
        assert_eq!(row.readable_type, "book");
        assert_eq!(row.source.as_deref(), Some("open_library"));
        assert!(row.fandoms_json.is_none());
        assert!(row.chapter_count.is_none());
        assert!(row.is_complete.is_none());
        assert!(row.word_count.is_none());
    }

    #[test]
    fn test_build_fanfic_writes_legacy_count() {
        let mut item = sample_fanfic();
        if let ReadableKind::Fanfic(fic) = &mut item.kind {
            fic.chapter_count = None;
            fic.available_chapters = Some(18);
            fic.total_chapters = None;
            fic.complete = Some(true);
        }
        let row = build_row_from_domain(&item, &BuildRowOptions::at(fixed_now()));
        assert_eq!(row.source.as_deref(), Some("ao3"));
        assert_eq!(row.total_chapters, Some(18));
        assert_eq!(row.chapter_count, Some(18));
        assert_eq!(row.is_complete, Some(1));
        assert!(row.genres_json.is_none());
        assert!(row.page_count.is_none());
    }

    type Chapters = (Option<u32>, Option<u32>, Option<u32>, Option<bool>);

    fn chapters_after_round_trip(input: Chapters) -> Chapters {
        let (chapter_count, available, total, complete) = input;
        let mut item = sample_fanfic();
        if let ReadableKind::Fanfic(fic) = &mut item.kind {
            fic.chapter_count = chapter_count;
            fic.available_chapters = available;
            fic.total_chapters = total;
            fic.complete = complete;
        }
        let row = build_row_from_domain(&item, &BuildRowOptions::at(fixed_now()));
        let restored = map_row_to_domain(&row);
        let fic = restored.as_fanfic().unwrap();
        (
            fic.chapter_count,
            fic.available_chapters,
            fic.total_chapters,
            fic.complete,
        )
    }

    #[test]
    fn test_chapter_shapes_round_trip() {
        // (chapter_count, available, total, complete) in, then out
        let cases: [(&str, Chapters, Chapters); 9] = [
            (
                "legacy only, ongoing",
                (Some(10), None, None, Some(false)),
                (Some(10), Some(10), None, Some(false)),
            ),
            (
                "legacy only, complete",
                (Some(10), None, None, Some(true)),
                (Some(10), Some(10), Some(10), Some(true)),
            ),
            (
                "total only, ongoing",
                (None, None, Some(9), Some(false)),
                (None, None, Some(9), Some(false)),
            ),
            (
                "total only, completion unknown",
                (None, None, Some(9), None),
                (None, None, Some(9), None),
            ),
            (
                "total only, complete",
                (None, None, Some(9), Some(true)),
                (Some(9), Some(9), Some(9), Some(true)),
            ),
            (
                "available only, complete",
                (None, Some(8), None, Some(true)),
                (Some(8), Some(8), Some(8), Some(true)),
            ),
            (
                "available only, completion unknown",
                (None, Some(6), None, None),
                (Some(6), Some(6), None, None),
            ),
            (
                "full set",
                (Some(3), Some(5), Some(20), Some(false)),
                (Some(20), Some(5), Some(20), Some(false)),
            ),
            ("nothing known", (None, None, None, None), (None, None, None, None)),
        ];

        for (name, input, expected) in cases {
            let once = chapters_after_round_trip(input);
            assert_eq!(once, expected, "{name}");
            assert_eq!(chapters_after_round_trip(once), once, "{name} is not stable");
        }
    }

    #[test]
    fn test_list_order_survives_round_trip() {
        let mut item = sample_book();
        item.mood_tags = vec![MoodTag::Tense, MoodTag::Cozy, MoodTag::Dark];
        let row = build_row_from_domain(&item, &BuildRowOptions::at(fixed_now()));
        assert_eq!(row.mood_tags_json.as_deref(), Some("[\"tense\",\"cozy\",\"dark\"]"));
        assert_eq!(map_row_to_domain(&row).mood_tags, item.mood_tags);
    }
}
