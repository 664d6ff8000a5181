use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MoodshelfError, Result};
use crate::suggestion::SuggestionFilters;

/// Root application configuration, loaded from `~/.config/moodshelf/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub suggest: SuggestConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    pub data_dir: String,
}

/// Defaults for `moodshelf suggest`; command-line flags override them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuggestConfig {
    pub include_books: bool,
    pub include_fanfic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_word_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_word_count: Option<u64>,
    pub exclude_finished: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// An `EnvFilter` directive such as `warn` or `moodshelf_core=debug`.
    pub level: String,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("moodshelf");

        Self {
            data_dir: data_dir.to_string_lossy().to_string(),
        }
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            include_books: true,
            include_fanfic: true,
            min_word_count: None,
            max_word_count: None,
            exclude_finished: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl SuggestConfig {
    pub fn to_filters(&self) -> SuggestionFilters {
        SuggestionFilters {
            include_books: self.include_books,
            include_fanfic: self.include_fanfic,
            min_word_count: self.min_word_count,
            max_word_count: self.max_word_count,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/moodshelf/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("MOODSHELF_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("moodshelf")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    /// `MOODSHELF_DATA_DIR` overrides `core.data_dir`.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        if let Ok(dir) = std::env::var("MOODSHELF_DATA_DIR")
            && !dir.trim().is_empty()
        {
            config.core.data_dir = dir;
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.suggest.min_word_count, self.suggest.max_word_count)
            && min > max
        {
            return Err(MoodshelfError::ConfigError(format!(
                "suggest.min_word_count ({min}) is greater than suggest.max_word_count ({max})"
            )));
        }
        Ok(())
    }

    pub fn set_data_dir(&mut self, dir: impl AsRef<Path>) {
        self.core.data_dir = dir.as_ref().to_string_lossy().to_string();
    }

    // ─── Derived paths ─────────────────────────────────────

    /// Path to the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.core.data_dir).join("moodshelf.db")
    }
}
