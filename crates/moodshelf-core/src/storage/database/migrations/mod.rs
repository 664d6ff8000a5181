mod v1_initial;
mod v2_chapter_progress;
mod v3_progress_tracking;
mod v4_smart_shelves;

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

pub trait Migration {
    fn version(&self) -> u32;
    fn description(&self) -> &'static str;
    fn up(&self, conn: &Connection) -> Result<()>;
}

fn record_migration(conn: &Connection, version: u32) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations(version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![version, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn has_migrations_table(conn: &Connection) -> Result<bool> {
    let exists = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='schema_migrations'")?
        .exists([])?;
    Ok(exists)
}

fn is_migration_applied(conn: &Connection, version: u32) -> Result<bool> {
    if !has_migrations_table(conn)? {
        return Ok(false);
    }

    let applied: bool = conn
        .prepare("SELECT 1 FROM schema_migrations WHERE version = ?1")?
        .exists(rusqlite::params![version])?;
    Ok(applied)
}

fn all_migrations() -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(v1_initial::V1Initial),
        Box::new(v2_chapter_progress::V2ChapterProgress),
        Box::new(v3_progress_tracking::V3ProgressTracking),
        Box::new(v4_smart_shelves::V4SmartShelves),
    ]
}

pub fn run_migrations(conn: &Connection) -> Result<()> {
    run_migrations_up_to(conn, u32::MAX)
}

/// Applies pending migrations with a version not above `target`.
pub fn run_migrations_up_to(conn: &Connection, target: u32) -> Result<()> {
    for migration in all_migrations() {
        if migration.version() > target {
            break;
        }
        if !is_migration_applied(conn, migration.version())? {
            migration.up(conn)?;
            record_migration(conn, migration.version())?;
            info!(
                version = migration.version(),
                "Applied migration: {}",
                migration.description()
            );
        }
    }

    Ok(())
}

pub fn get_applied_versions(conn: &Connection) -> Result<Vec<u32>> {
    if !has_migrations_table(conn)? {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    let mut versions = Vec::new();
    for row in rows {
        versions.push(row?);
    }
    Ok(versions)
}
