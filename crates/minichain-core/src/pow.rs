use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{debug, info};

use crate::{
    constants::{DEFAULT_DIFFICULTY_PREFIX, HASH_HEX_SIZE},
    Block, LedgerError, Payload, Result,
};

/// Proof-of-work target: a sealed block's hex hash must start with `prefix`.
///
/// Only prefixes a lowercase hex digest could produce are accepted. Expected
/// work is `16^prefix.len()` attempts; sealing walks a 2^64 nonce cycle, so
/// prefixes much longer than 16 digits may never be met and block forever
/// unless sealed through [`Block::seal_with_cancel`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Difficulty {
    prefix: String,
}

impl Difficulty {
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let hex = prefix.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !hex || prefix.len() > HASH_HEX_SIZE {
            return Err(LedgerError::InvalidDifficulty(prefix));
        }
        Ok(Self { prefix })
    }

    /// A run of `n` leading zero digits.
    pub fn zeros(n: usize) -> Result<Self> {
        Self::new("0".repeat(n))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_met_by(&self, hash: &str) -> bool {
        hash.starts_with(&self.prefix)
    }

    pub fn expected_attempts(&self) -> f64 {
        16f64.powi(self.prefix.len() as i32)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_DIFFICULTY_PREFIX.to_string(),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)
    }
}

impl TryFrom<String> for Difficulty {
    type Error = LedgerError;

    fn try_from(prefix: String) -> Result<Self> {
        Self::new(prefix)
    }
}

impl From<Difficulty> for String {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.prefix
    }
}

/// Cooperative stop flag for [`Block::seal_with_cancel`]. Clones share the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl<P: Payload> Block<P> {
    /// Mine the block in place: bump `nonce` until `hash` meets `difficulty`.
    ///
    /// Starts from the current nonce and first re-derives `hash` from the
    /// current fields, so a stale hash can never be accepted as a seal. Blocks
    /// until a match is found; there is no attempt cap.
    pub fn seal_with_proof_of_work(&mut self, difficulty: &Difficulty) {
        let template = self.hash_template();
        self.hash = template.with_nonce(self.nonce);
        let mut attempts = 1u64;
        while !difficulty.is_met_by(&self.hash) {
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = template.with_nonce(self.nonce);
            attempts = attempts.saturating_add(1);
        }
        info!(hash = %self.hash, nonce = self.nonce, attempts, "block mined");
    }

    /// Same search as [`Block::seal_with_proof_of_work`], checking `cancel`
    /// between attempts. Returns the number of attempts on success.
    pub fn seal_with_cancel(
        &mut self,
        difficulty: &Difficulty,
        cancel: &CancelToken,
    ) -> Result<u64> {
        let template = self.hash_template();
        self.hash = template.with_nonce(self.nonce);
        let mut attempts = 1u64;
        while !difficulty.is_met_by(&self.hash) {
            if cancel.is_cancelled() {
                debug!(nonce = self.nonce, attempts, "sealing cancelled");
                return Err(LedgerError::Cancelled { attempts });
            }
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = template.with_nonce(self.nonce);
            attempts = attempts.saturating_add(1);
        }
        info!(hash = %self.hash, nonce = self.nonce, attempts, "block mined");
        Ok(attempts)
    }

    pub fn meets(&self, difficulty: &Difficulty) -> bool {
        difficulty.is_met_by(&self.hash)
    }
}
