use thiserror::Error;

/// All errors that can occur in moodshelf-core.
///
/// Row mapping and suggestion never fail; these come from storage,
/// configuration and user input.
#[derive(Debug, Error)]
pub enum MoodshelfError {
    #[error("Readable not found: {0}")]
    ItemNotFound(String),

    #[error("Shelf not found: {0}")]
    ShelfNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl MoodshelfError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound(_) | Self::ShelfNotFound(_))
    }
}

/// Exit codes used by the CLI.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    ConfirmRequired = 8,
}

impl From<&MoodshelfError> for ExitCode {
    fn from(err: &MoodshelfError) -> Self {
        match err {
            MoodshelfError::ItemNotFound(_) | MoodshelfError::ShelfNotFound(_) => Self::NotFound,
            MoodshelfError::ValidationError(_) => Self::InvalidArgs,
            _ => Self::GeneralError,
        }
    }
}

pub type Result<T> = std::result::Result<T, MoodshelfError>;
