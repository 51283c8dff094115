pub mod limits;
pub mod page;
pub mod query;

pub use limits::{MAX_PAGE_SIZE, MAX_RESULTS, StreamLimits};
pub use page::{PageRequest, PageResponse};
pub use query::QueryParams;
