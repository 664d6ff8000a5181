pub mod filter;
pub mod mood;
pub mod readable;
pub mod shelf;

pub use filter::*;
pub use mood::*;
pub use readable::*;
pub use shelf::*;
