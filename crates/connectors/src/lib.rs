pub mod decoder;
pub mod error;
pub mod gdata;
pub mod http;
pub mod memory;
pub mod retry;
pub mod source;

pub use decoder::{FnDecoder, GDataFeedDecoder, PageDecoder};
pub use error::{DecodeError, FetchError};
pub use gdata::FeedEndpoint;
pub use http::{HttpConfig, HttpFeedSource};
pub use memory::MemorySource;
pub use retry::RetryPolicy;
pub use source::FeedSource;
