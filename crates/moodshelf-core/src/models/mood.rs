use serde::{Deserialize, Serialize};

/// Enumerated descriptor used both to annotate readables and to express
/// what the reader is in the mood for right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTag {
    Cozy,
    Dark,
    Funny,
    Romantic,
    Mysterious,
    Epic,
    Emotional,
    Adventurous,
    Hopeful,
    Tense,
    Whimsical,
    Reflective,
}

impl MoodTag {
    pub const ALL: [MoodTag; 12] = [
        Self::Cozy,
        Self::Dark,
        Self::Funny,
        Self::Romantic,
        Self::Mysterious,
        Self::Epic,
        Self::Emotional,
        Self::Adventurous,
        Self::Hopeful,
        Self::Tense,
        Self::Whimsical,
        Self::Reflective,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cozy => "cozy",
            Self::Dark => "dark",
            Self::Funny => "funny",
            Self::Romantic => "romantic",
            Self::Mysterious => "mysterious",
            Self::Epic => "epic",
            Self::Emotional => "emotional",
            Self::Adventurous => "adventurous",
            Self::Hopeful => "hopeful",
            Self::Tense => "tense",
            Self::Whimsical => "whimsical",
            Self::Reflective => "reflective",
        }
    }
}

impl std::fmt::Display for MoodTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MoodTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|mood| mood.as_str() == needle)
            .ok_or_else(|| format!("Invalid MoodTag: {s}"))
    }
}
