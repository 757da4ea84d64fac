use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// `latest()` was called on a chain without a genesis block.
    #[error("chain is empty")]
    EmptyChain,

    #[error("proof-of-work cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("nonce space exhausted without meeting the difficulty target")]
    NonceSpaceExhausted,

    #[error("invalid difficulty prefix {0:?}: must be at most 64 lowercase hex digits")]
    InvalidDifficulty(String),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
