pub mod geo;
pub mod similarity;
pub mod time;

pub use geo::*;
pub use similarity::*;
pub use time::*;
