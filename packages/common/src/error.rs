use thiserror::Error;

/// Common error type shared by block loading, asset loading and configuration
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Asset '{src}' could not be loaded: {reason}")]
    Asset { src: String, reason: String },

    #[error("Generic error: {0}")]
    Generic(String),
}

impl CommonError {
    pub fn asset(src: impl Into<String>, reason: impl Into<String>) -> Self {
        CommonError::Asset {
            src: src.into(),
            reason: reason.into(),
        }
    }
}

impl From<String> for CommonError {
    fn from(s: String) -> Self {
        CommonError::Generic(s)
    }
}

impl From<&str> for CommonError {
    fn from(s: &str) -> Self {
        CommonError::Generic(s.to_string())
    }
}
