use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse router config: {0}")]
    Parse(String),
    #[error("invalid rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },
}
