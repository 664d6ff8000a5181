use serde::{Deserialize, Serialize};

/// Words assumed per printed page when estimating a book's length.
pub const WORDS_PER_PAGE: u64 = 300;

/// Where a book's metadata came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSource {
    #[default]
    Manual,
    OpenLibrary,
    GoogleBooks,
}

impl BookSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::OpenLibrary => "open_library",
            Self::GoogleBooks => "google_books",
        }
    }
}

impl std::fmt::Display for BookSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "open_library" | "openlibrary" => Ok(Self::OpenLibrary),
            "google_books" | "googlebooks" => Ok(Self::GoogleBooks),
            _ => Err(format!("Invalid BookSource: {s}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookDetails {
    #[serde(default)]
    pub source: BookSource,

    /// Identifier in the external catalog named by `source`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,

    #[serde(default)]
    pub genres: Vec<String>,
}

impl BookDetails {
    pub fn approximate_word_count(&self) -> Option<u64> {
        self.page_count.map(|pages| u64::from(pages) * WORDS_PER_PAGE)
    }
}
