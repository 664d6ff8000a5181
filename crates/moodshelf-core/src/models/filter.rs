use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{MoodTag, ReadableItem, ReadableKind, ReadableStatus, ReadableType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibrarySort {
    #[default]
    UpdatedDesc,
    CreatedDesc,
    PriorityDesc,
    TitleAsc,
}

impl std::str::FromStr for LibrarySort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "updated_desc" | "updated" => Ok(Self::UpdatedDesc),
            "created_desc" | "created" => Ok(Self::CreatedDesc),
            "priority_desc" | "priority" => Ok(Self::PriorityDesc),
            "title_asc" | "title" => Ok(Self::TitleAsc),
            _ => Err(format!("Invalid LibrarySort: {s}")),
        }
    }
}

/// Library view filters. A smart shelf is a saved copy of this state.
///
/// Empty lists mean "no restriction". Mood tags match when the item carries
/// any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryFilterState {
    pub types: Vec<ReadableType>,
    pub statuses: Vec<ReadableStatus>,
    pub mood_tags: Vec<MoodTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_priority: Option<u8>,
    pub sort: LibrarySort,
}

impl LibraryFilterState {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.statuses.is_empty()
            && self.mood_tags.is_empty()
            && self.query.as_deref().is_none_or(|q| q.trim().is_empty())
            && self.min_priority.is_none()
    }

    pub fn matches(&self, item: &ReadableItem) -> bool {
        if !self.types.is_empty() && !self.types.contains(&item.readable_type()) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&item.status) {
            return false;
        }
        if !self.mood_tags.is_empty() && !self.mood_tags.iter().any(|m| item.has_mood(*m)) {
            return false;
        }
        if let Some(min) = self.min_priority
            && item.priority < min
        {
            return false;
        }
        match self.query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => matches_query(item, &query.to_lowercase()),
            _ => true,
        }
    }

    /// Filters `items` and orders the survivors by `sort`.
    pub fn apply(&self, items: impl IntoIterator<Item = ReadableItem>) -> Vec<ReadableItem> {
        let mut kept: Vec<ReadableItem> = items.into_iter().filter(|i| self.matches(i)).collect();
        kept.sort_by(|a, b| self.compare(a, b));
        kept
    }

    fn compare(&self, a: &ReadableItem, b: &ReadableItem) -> Ordering {
        match self.sort {
            LibrarySort::UpdatedDesc => b.updated_at.cmp(&a.updated_at),
            LibrarySort::CreatedDesc => b.created_at.cmp(&a.created_at),
            LibrarySort::PriorityDesc => b
                .priority
                .cmp(&a.priority)
                .then_with(|| b.updated_at.cmp(&a.updated_at)),
            LibrarySort::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    }
}

fn matches_query(item: &ReadableItem, needle: &str) -> bool {
    let hit = |s: &str| s.to_lowercase().contains(needle);
    if hit(&item.title) || hit(&item.author) {
        return true;
    }
    match &item.kind {
        ReadableKind::Book(book) => book.genres.iter().any(|g| hit(g)),
        ReadableKind::Fanfic(fanfic) => fanfic
            .fandoms
            .iter()
            .chain(&fanfic.relationships)
            .chain(&fanfic.characters)
            .chain(&fanfic.tags)
            .any(|s| hit(s)),
    }
}
