pub mod date;
pub mod logger;
pub mod sma;

pub use date::*;
pub use logger::*;
pub use sma::*;
