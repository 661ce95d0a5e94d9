use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No sync key configured — unlock with the passphrase first")]
    KeyNotConfigured,

    #[error("Chain error: {0}")]
    Chain(#[from] st_chain::ChainError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] st_crypto::CryptoError),
}
