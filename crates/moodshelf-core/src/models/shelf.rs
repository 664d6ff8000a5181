use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LibraryFilterState;
use crate::error::{MoodshelfError, Result};

/// A named, saved filter preset over the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartShelf {
    pub id: String,
    pub name: String,
    pub filter: LibraryFilterState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SmartShelf {
    /// Captures `filter` under `name`.
    pub fn new(name: impl Into<String>, filter: LibraryFilterState) -> Result<Self> {
        let name = validate_name(name.into())?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7().to_string(),
            name,
            filter,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        self.name = validate_name(name.into())?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_name(name: String) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(MoodshelfError::ValidationError(
            "shelf name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
