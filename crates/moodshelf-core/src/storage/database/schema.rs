use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 4;

pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

pub fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let exists = conn
        .prepare("SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2")?
        .exists(rusqlite::params![table, column])?;
    Ok(exists)
}

/// Readables as first stored: fan works carry only the single `chapter_count`.
pub fn create_readables_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS readables (
            id                 TEXT PRIMARY KEY,
            type               TEXT NOT NULL CHECK(type IN ('book', 'fanfic')) DEFAULT 'book',
            title              TEXT NOT NULL,
            author             TEXT NOT NULL DEFAULT '',
            description        TEXT,
            status             TEXT DEFAULT 'to_read',
            priority           INTEGER DEFAULT 3,
            source             TEXT,
            source_id          TEXT,
            page_count         INTEGER,
            current_page       INTEGER,
            ao3_work_id        TEXT,
            ao3_url            TEXT,
            fandoms_json       TEXT,
            relationships_json TEXT,
            characters_json    TEXT,
            ao3_tags_json      TEXT,
            rating             TEXT,
            warnings_json      TEXT,
            chapter_count      INTEGER,
            current_chapter    INTEGER,
            word_count         INTEGER,
            genres_json        TEXT,
            mood_tags_json     TEXT DEFAULT '[]',
            created_at         TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at         TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            started_at         TEXT,
            finished_at        TEXT,
            dnf_at             TEXT,
            notes              TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_readables_status  ON readables(status);
        CREATE INDEX IF NOT EXISTS idx_readables_type    ON readables(type);
        CREATE INDEX IF NOT EXISTS idx_readables_updated ON readables(updated_at);
        ",
    )?;
    Ok(())
}

pub fn add_chapter_progress_columns(conn: &Connection) -> Result<()> {
    if !has_column(conn, "readables", "available_chapters")? {
        conn.execute_batch(
            "
            ALTER TABLE readables ADD COLUMN available_chapters INTEGER;
            ALTER TABLE readables ADD COLUMN total_chapters     INTEGER;
            ALTER TABLE readables ADD COLUMN is_complete        INTEGER;
            ",
        )?;
    }
    Ok(())
}

pub fn add_progress_tracking_columns(conn: &Connection) -> Result<()> {
    if !has_column(conn, "readables", "progress_percent")? {
        conn.execute_batch(
            "
            ALTER TABLE readables ADD COLUMN progress_percent     REAL DEFAULT 0;
            ALTER TABLE readables ADD COLUMN progress_mode        TEXT DEFAULT 'units';
            ALTER TABLE readables ADD COLUMN time_current_seconds INTEGER;
            ALTER TABLE readables ADD COLUMN time_total_seconds   INTEGER;
            ",
        )?;
    }
    Ok(())
}

pub fn create_smart_shelves_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS smart_shelves (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            filter_json TEXT NOT NULL DEFAULT '{}',
            created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        ",
    )?;
    Ok(())
}
