mod book;
mod fanfic;
mod progress;

pub use book::*;
pub use fanfic::*;
pub use progress::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MoodTag;

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 5;
pub const DEFAULT_PRIORITY: u8 = 3;

/// Discriminator of [`ReadableKind`], used where only the kind matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadableType {
    Book,
    Fanfic,
}

impl ReadableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Fanfic => "fanfic",
        }
    }
}

impl std::fmt::Display for ReadableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReadableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(Self::Book),
            "fanfic" => Ok(Self::Fanfic),
            _ => Err(format!("Invalid ReadableType: {s}")),
        }
    }
}

/// The variant-specific half of a readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReadableKind {
    Book(BookDetails),
    Fanfic(FanficDetails),
}

/// A book or fan work tracked in the reading queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadableItem {
    pub id: String,
    pub title: String,
    pub author: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: ReadableStatus,

    pub priority: u8,

    #[serde(default)]
    pub mood_tags: Vec<MoodTag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub progress_percent: f64,

    #[serde(default)]
    pub progress_mode: ProgressMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_current_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_total_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnf_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub kind: ReadableKind,
}

impl ReadableItem {
    fn with_kind(title: impl Into<String>, author: impl Into<String>, kind: ReadableKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            title: title.into(),
            author: author.into(),
            description: None,
            status: ReadableStatus::ToRead,
            priority: DEFAULT_PRIORITY,
            mood_tags: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
            progress_percent: 0.0,
            progress_mode: ProgressMode::Units,
            time_current_seconds: None,
            time_total_seconds: None,
            started_at: None,
            finished_at: None,
            dnf_at: None,
            notes: None,
            kind,
        }
    }

    pub fn new_book(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self::with_kind(title, author, ReadableKind::Book(BookDetails::default()))
    }

    pub fn new_fanfic(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self::with_kind(title, author, ReadableKind::Fanfic(FanficDetails::default()))
    }

    pub fn readable_type(&self) -> ReadableType {
        match self.kind {
            ReadableKind::Book(_) => ReadableType::Book,
            ReadableKind::Fanfic(_) => ReadableType::Fanfic,
        }
    }

    pub fn as_book(&self) -> Option<&BookDetails> {
        match &self.kind {
            ReadableKind::Book(book) => Some(book),
            ReadableKind::Fanfic(_) => None,
        }
    }

    pub fn as_fanfic(&self) -> Option<&FanficDetails> {
        match &self.kind {
            ReadableKind::Fanfic(fanfic) => Some(fanfic),
            ReadableKind::Book(_) => None,
        }
    }

    /// Provenance tag as stored in the `source` column.
    pub fn source(&self) -> &'static str {
        match &self.kind {
            ReadableKind::Book(book) => book.source.as_str(),
            ReadableKind::Fanfic(_) => FANFIC_SOURCE,
        }
    }

    /// Length in words, when it can be known or estimated.
    pub fn approximate_word_count(&self) -> Option<u64> {
        match &self.kind {
            ReadableKind::Book(book) => book.approximate_word_count(),
            ReadableKind::Fanfic(fanfic) => fanfic.word_count,
        }
    }

    pub fn has_mood(&self, mood: MoodTag) -> bool {
        self.mood_tags.contains(&mood)
    }

    pub fn set_priority(&mut self, priority: u8) {
        self.priority = priority.clamp(MIN_PRIORITY, MAX_PRIORITY);
    }

    /// Moves the item to `status`, stamping the matching lifecycle timestamp.
    pub fn set_status(&mut self, status: ReadableStatus, now: DateTime<Utc>) {
        match status {
            ReadableStatus::ToRead => {}
            ReadableStatus::InProgress => {
                self.started_at.get_or_insert(now);
            }
            ReadableStatus::Finished => {
                self.started_at.get_or_insert(now);
                self.finished_at = Some(now);
                self.progress_percent = 100.0;
            }
            ReadableStatus::Dnf => {
                self.dnf_at = Some(now);
            }
        }
        self.status = status;
    }

    /// Records a page (books) or chapter (fan works) position.
    pub fn record_position(&mut self, position: u32) {
        self.progress_mode = ProgressMode::Units;
        let denominator = match &mut self.kind {
            ReadableKind::Book(book) => {
                book.current_page = Some(position);
                book.page_count
            }
            ReadableKind::Fanfic(fanfic) => {
                fanfic.current_chapter = Some(position);
                fanfic.progress_denominator()
            }
        };
        if let Some(total) = denominator {
            self.progress_percent = percent_of(position, total);
        }
    }

    pub fn record_percent(&mut self, percent: f64) {
        self.progress_mode = ProgressMode::Percent;
        self.progress_percent = percent.clamp(0.0, 100.0);
    }

    pub fn record_time(&mut self, current_seconds: i64, total_seconds: Option<i64>) {
        self.progress_mode = ProgressMode::Time;
        self.time_current_seconds = Some(current_seconds.max(0));
        if total_seconds.is_some() {
            self.time_total_seconds = total_seconds;
        }
        if let Some(total) = self.time_total_seconds.filter(|t| *t > 0) {
            self.progress_percent = (current_seconds as f64 / total as f64 * 100.0).clamp(0.0, 100.0);
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
