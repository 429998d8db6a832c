use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Failed to encode appearance stream: {0}")]
    EncodeError(String),

    /// Raised by appearance handlers; returned from `construct_appearances` untouched.
    #[error("Appearance handler failed: {0}")]
    Handler(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
