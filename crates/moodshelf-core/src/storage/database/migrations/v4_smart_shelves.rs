use rusqlite::Connection;

use super::Migration;
use crate::error::Result;
use crate::storage::database::schema;

pub struct V4SmartShelves;

impl Migration for V4SmartShelves {
    fn version(&self) -> u32 {
        4
    }

    fn description(&self) -> &'static str {
        "Add smart_shelves table"
    }

    fn up(&self, conn: &Connection) -> Result<()> {
        schema::create_smart_shelves_table(conn)
    }
}
