mod config;
mod source;

pub use config::HttpConfig;
pub use source::{DEV_KEY_HEADER, HttpFeedSource};
