pub mod feed;
pub mod resolver;
pub mod shared;
pub mod snapshot;

pub mod prelude {
    pub use crate::feed::{Config, Feed};
    pub use crate::resolver::{Embedder, StopQuery, StopResolver};
    pub use crate::shared::geo::{Coordinate, Distance};
    pub use crate::shared::time::Time;
    pub use crate::snapshot::{Snapshot, Window};
}
