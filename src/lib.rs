pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod http;
pub mod logger;
pub mod runner;
pub mod utils;

// Re-export commonly used types
pub use error::{RestdeskError, Result, ValidationError};
