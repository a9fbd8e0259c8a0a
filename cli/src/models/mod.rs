pub mod enriched_series;
pub mod price_series;
pub mod request;
pub mod ticker;

pub use enriched_series::*;
pub use price_series::*;
pub use request::*;
pub use ticker::*;
