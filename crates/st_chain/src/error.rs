use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error("Chain file is corrupt: {0}")]
    Corrupt(String),

    #[error("Invalid chain id {0:?}: must not contain path separators")]
    InvalidChainId(String),
}
