use rusqlite::Connection;

use super::Migration;
use crate::error::Result;
use crate::storage::database::schema;

pub struct V3ProgressTracking;

impl Migration for V3ProgressTracking {
    fn version(&self) -> u32 {
        3
    }

    fn description(&self) -> &'static str {
        "Add progress percent, mode and time columns to readables"
    }

    fn up(&self, conn: &Connection) -> Result<()> {
        schema::add_progress_tracking_columns(conn)
    }
}
