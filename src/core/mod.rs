// Public modules
pub mod build;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod job;
pub mod keychain;
pub mod pipeline;
pub mod publish;
pub mod trigger;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
