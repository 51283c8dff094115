pub mod info;
pub mod relations;

pub use info::{FeedInfo, FeedLink, Link};
pub use relations::RelationTable;
