use serde::{Deserialize, Serialize};

/// The archive every fan work is tracked from.
pub const FANFIC_SOURCE: &str = "ao3";

/// Archive content rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FanficRating {
    G,
    T,
    M,
    E,
    /// Not rated.
    #[serde(rename = "NR")]
    NotRated,
}

impl FanficRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::G => "G",
            Self::T => "T",
            Self::M => "M",
            Self::E => "E",
            Self::NotRated => "NR",
        }
    }
}

impl std::fmt::Display for FanficRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FanficRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "G" => Ok(Self::G),
            "T" => Ok(Self::T),
            "M" => Ok(Self::M),
            "E" => Ok(Self::E),
            "NR" => Ok(Self::NotRated),
            _ => Err(format!("Invalid FanficRating: {s}")),
        }
    }
}

/// Fan-work specific fields.
///
/// Chapter progress is a triple of `available_chapters` (released so far),
/// `total_chapters` (final length, `None` while unknown) and
/// `current_chapter`. `chapter_count` is the single count older rows carried
/// before the pair existed; it is kept so those rows keep reading the same.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FanficDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ao3_work_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ao3_url: Option<String>,

    #[serde(default)]
    pub fandoms: Vec<String>,

    #[serde(default)]
    pub relationships: Vec<String>,

    #[serde(default)]
    pub characters: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub warnings: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<FanficRating>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_chapters: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chapters: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_chapter: Option<u32>,

    /// `None` when the archive never said whether the work is finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
}

impl FanficDetails {
    /// Best known chapter count to measure progress against.
    pub fn progress_denominator(&self) -> Option<u32> {
        self.total_chapters
            .or(self.available_chapters)
            .or(self.chapter_count)
    }

    /// Reports chapter data that is inconsistent but still accepted.
    pub fn chapter_warning(&self) -> Option<String> {
        match (self.available_chapters, self.total_chapters) {
            (Some(available), Some(total)) if total < available => Some(format!(
                "total chapters ({total}) is below available chapters ({available})"
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_serde_uses_archive_codes() {
        assert_eq!(serde_json::to_string(&FanficRating::NotRated).unwrap(), "\"NR\"");
        assert_eq!("E".parse::<FanficRating>().unwrap(), FanficRating::E);
        assert!("PG".parse::<FanficRating>().is_err());
    }

    #[test]
    fn test_chapter_warning() {
        let mut details = FanficDetails {
            available_chapters: Some(12),
            total_chapters: Some(10),
            ..Default::default()
        };
        assert!(details.chapter_warning().is_some());

        details.total_chapters = Some(20);
        assert!(details.chapter_warning().is_none());

        details.total_chapters = None;
        assert!(details.chapter_warning().is_none());
    }

    #[test]
    fn test_progress_denominator_prefers_total() {
        let details = FanficDetails {
            chapter_count: Some(3),
            available_chapters: Some(7),
            total_chapters: Some(30),
            ..Default::default()
        };
        assert_eq!(details.progress_denominator(), Some(30));
    }
}
