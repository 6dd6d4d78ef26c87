/// Convenience result type used across printmock.
pub type PrintmockResult<T> = Result<T, PrintmockError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum PrintmockError {
    /// Asset directory or required layer file missing. Not retryable; the
    /// message carries the attempted paths or missing filenames so operators
    /// can fix asset deployment.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Missing or unparsable placement fields in a render request.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced source image does not exist on disk at render time.
    #[error("not found: {0}")]
    NotFound(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PrintmockError {
    /// Build a [`PrintmockError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`PrintmockError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PrintmockError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
