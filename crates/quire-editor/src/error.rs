//! Editor error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Failed to parse document HTML: {0}")]
    Parse(String),
}
