pub mod identifiers;
pub mod utils;
