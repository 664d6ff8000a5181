pub mod config;
pub mod error;
pub mod mapper;
pub mod models;
pub mod storage;
pub mod suggestion;

pub use config::AppConfig;
pub use error::{ExitCode, MoodshelfError, Result};
pub use models::*;

pub use mapper::{BuildRowOptions, ReadableRow, build_row_from_domain, map_row_to_domain};

pub use storage::database::{ConnectionPool, Database, open_database, open_in_memory};
pub use storage::queries::{LibraryStats, LibraryStatsQuery};
pub use storage::repositories::{
    ReadableRepository, Repository, SmartShelfRepository, SqliteReadableRepository,
    SqliteSmartShelfRepository,
};

pub use suggestion::{
    SuggestionContext, SuggestionFilters, SuggestionResult, run_suggestion_engine, suggest,
};
