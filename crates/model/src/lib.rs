pub mod core;
pub mod error;
pub mod feeds;
pub mod pagination;
