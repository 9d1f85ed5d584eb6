pub use crate::error::Error;

/// Result type used throughout Lexlang.
pub type Result<T> = std::result::Result<T, Box<Error>>;
