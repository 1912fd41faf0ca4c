use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
    #[error("Malformed template: {0}")]
    MalformedTemplate(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Upload error: {0}")]
    Upload(String),
    #[error("File is {size} bytes, limit is {limit} bytes")]
    ResourceLimit { size: usize, limit: usize },
    #[error("Unsupported file type: {0}")]
    UnsupportedMime(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid print specification: {0}")]
    InvalidSpec(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, EditorError>;

impl EditorError {
    /// Transient failures are surfaced to the user and may be retried by
    /// re-invoking the same action.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EditorError::Persistence(_) | EditorError::Upload(_) | EditorError::Io(_)
        )
    }
}
