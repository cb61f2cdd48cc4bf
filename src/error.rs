use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementAnalystError {
    #[error("Statement '{0}' has an empty payload")]
    EmptyStatement(String),

    #[error("Path '{0}' has no usable file name")]
    InvalidFileName(String),

    #[error("No statements have been loaded")]
    NoStatements,

    #[error("Model returned no content for {0}")]
    EmptyResponse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Model API error (status {status}): {body}")]
    ModelApi { status: u16, body: String },

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StatementAnalystError>;
