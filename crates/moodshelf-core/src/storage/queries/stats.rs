use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;

use crate::error::Result;
use crate::mapper::decode_status;
use crate::models::{ReadableStatus, ReadableType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total: usize,
    pub books: usize,
    pub fanfics: usize,
    pub to_read: usize,
    pub in_progress: usize,
    pub finished: usize,
    pub dnf: usize,
}

pub struct LibraryStatsQuery<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl<'a> LibraryStatsQuery<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Self {
        Self { conn }
    }

    /// Buckets every row by the status and type the row mapper would read,
    /// so missing, unknown and dashed statuses count where the domain puts them.
    pub fn get_stats(&self) -> Result<LibraryStats> {
        let mut stmt = self.conn.prepare("SELECT status, type FROM readables")?;
        let rows = stmt.query_map([], |row| {
            let status = decode_status(row.get_ref(0)?.as_str().ok());
            let readable_type = row
                .get_ref(1)?
                .as_str()
                .ok()
                .and_then(|t| t.parse::<ReadableType>().ok());
            Ok((status, readable_type))
        })?;

        let mut stats = LibraryStats::default();
        for row in rows {
            let (status, readable_type) = row?;
            stats.total += 1;
            match readable_type.unwrap_or(ReadableType::Book) {
                ReadableType::Book => stats.books += 1,
                ReadableType::Fanfic => stats.fanfics += 1,
            }
            match status {
                ReadableStatus::ToRead => stats.to_read += 1,
                ReadableStatus::InProgress => stats.in_progress += 1,
                ReadableStatus::Finished => stats.finished += 1,
                ReadableStatus::Dnf => stats.dnf += 1,
            }
        }
        Ok(stats)
    }

    pub fn count_by_status(&self, status: ReadableStatus) -> Result<usize> {
        let stats = self.get_stats()?;
        Ok(match status {
            ReadableStatus::ToRead => stats.to_read,
            ReadableStatus::InProgress => stats.in_progress,
            ReadableStatus::Finished => stats.finished,
            ReadableStatus::Dnf => stats.dnf,
        })
    }

    pub fn count_by_type(&self, readable_type: ReadableType) -> Result<usize> {
        let stats = self.get_stats()?;
        Ok(match readable_type {
            ReadableType::Book => stats.books,
            ReadableType::Fanfic => stats.fanfics,
        })
    }
}
