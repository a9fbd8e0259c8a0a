pub mod charts;
pub mod table;

pub use charts::*;
pub use table::*;
