use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid state: expected {expected}, found {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("duplicate key `{key}` at index {duplicate_index} (first seen at index {first_index})")]
    DuplicateKey {
        key: String,
        first_index: usize,
        duplicate_index: usize,
    },

    #[error("dataset shape mismatch: expected {expected}, found {actual}")]
    ShapeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("surface rejected element {element}: {reason}")]
    Surface { element: u64, reason: String },

    #[error("unknown element {0}")]
    UnknownElement(u64),
}
