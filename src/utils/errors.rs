use thiserror::Error;

use crate::constants::{GENERIC_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE};

/// Main error type for the admin client
#[derive(Error, Debug)]
pub enum AdminError {
    /// The request never produced a usable HTTP response
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The server answered but reported `success = false`
    #[error("API error: {0}")]
    ApplicationError(String),

    /// Rejected locally before anything was sent
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AdminError {
    /// Human-readable message for display in place of the raw error
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkError(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::ApplicationError(msg) | Self::ValidationError(msg) if !msg.trim().is_empty() => {
                msg.clone()
            }
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ApplicationError(format!("Malformed response from server: {}", err))
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
