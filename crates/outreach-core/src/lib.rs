pub mod analysis;
pub mod backend;
pub mod error;
pub mod settings;
pub mod stats;
pub mod task;
pub mod template;

// Re-export common error type
pub use error::{OutreachError, Result};
