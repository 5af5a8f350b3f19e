use thiserror::Error;

/// Errors raised by the extraction core and its harness.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid stream state: {0}")]
    InvalidState(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SourceError {
    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            SourceError::Config(_) | SourceError::Io(_) => 2,
            SourceError::InvalidState(_) => 3,
            SourceError::MalformedResponse(_) | SourceError::Transport(_) | SourceError::Json(_) => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
