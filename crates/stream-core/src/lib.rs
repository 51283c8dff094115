pub mod error;
pub mod state;
pub mod stream;

pub use error::StreamError;
pub use state::FrontierState;
pub use stream::FeedStream;
