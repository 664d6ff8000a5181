mod stats;

pub use stats::{LibraryStats, LibraryStatsQuery};
