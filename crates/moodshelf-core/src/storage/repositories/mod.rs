mod readable_repository;
mod shelf_repository;

pub use readable_repository::{ReadableRepository, SqliteReadableRepository};
pub use shelf_repository::{SmartShelfRepository, SqliteSmartShelfRepository};

use crate::error::Result;

pub trait Repository {
    type Entity;
    type Id;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>>;
    fn save(&self, entity: &Self::Entity) -> Result<()>;
    fn delete(&self, id: &Self::Id) -> Result<bool>;
}
