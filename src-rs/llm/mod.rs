pub mod error;
pub mod models;
pub mod utils;

// Re-export config from crate root
pub use crate::config;
