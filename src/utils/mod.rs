//! Utility modules.

pub mod file;
pub mod retry;

pub use file::{calculate_checksum, read_text_with_fallback};
pub use retry::{RetryConfig, Retryable, with_retry};
