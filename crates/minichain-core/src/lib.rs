pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod mine;
pub mod payload;
pub mod pow;
pub mod transaction;

pub use chain::{Chain, InvalidBlock, InvalidReason, Mining};
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use payload::Payload;
pub use pow::{CancelToken, Difficulty};
pub use transaction::Transaction;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Lowercase hex SHA-256 digest.
pub type BlockHash = String;

/// A single block. Every field is public and `hash` is plain storage: mutating
/// a sealed block without calling [`Block::rehash`] leaves a stale hash behind,
/// which is exactly what [`Chain::is_valid`] looks for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block<P> {
    pub timestamp: u64,
    pub payload: P,
    pub previous_hash: BlockHash,
    pub nonce: u64,
    pub hash: BlockHash,
}

impl<P: Payload> Block<P> {
    /// Build a block with nonce 0 and its hash computed from the given fields.
    pub fn new(timestamp: u64, payload: P, previous_hash: impl Into<BlockHash>) -> Self {
        let mut block = Self {
            timestamp,
            payload,
            previous_hash: previous_hash.into(),
            nonce: 0,
            hash: BlockHash::new(),
        };
        block.rehash();
        block
    }

    /// Digest of the block's current fields. Does not touch `hash`.
    pub fn calculate_hash(&self) -> BlockHash {
        compute_hash(&self.previous_hash, self.timestamp, &self.payload, self.nonce)
    }

    /// Overwrite `hash` with the digest of the current fields.
    pub fn rehash(&mut self) {
        self.hash = self.calculate_hash();
    }

    pub fn has_consistent_hash(&self) -> bool {
        self.hash == self.calculate_hash()
    }

    pub(crate) fn hash_template(&self) -> HashTemplate {
        HashTemplate::new(&self.previous_hash, self.timestamp, &self.payload)
    }
}

/// Hash `previous_hash ++ timestamp ++ canonical(payload) ++ nonce`, with the
/// numbers rendered in decimal.
pub fn compute_hash<P: Payload>(
    previous_hash: &str,
    timestamp: u64,
    payload: &P,
    nonce: u64,
) -> BlockHash {
    HashTemplate::new(previous_hash, timestamp, payload).with_nonce(nonce)
}

/// SHA-256 state already fed with everything except the nonce, so mining
/// loops only hash the nonce suffix on each attempt.
#[derive(Clone)]
pub(crate) struct HashTemplate {
    hasher: Sha256,
}

impl HashTemplate {
    fn new<P: Payload>(previous_hash: &str, timestamp: u64, payload: &P) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(previous_hash.as_bytes());
        hasher.update(timestamp.to_string().as_bytes());
        hasher.update(payload.canonical_bytes());
        Self { hasher }
    }

    pub(crate) fn with_nonce(&self, nonce: u64) -> BlockHash {
        let digest = self
            .hasher
            .clone()
            .chain_update(nonce.to_string().as_bytes())
            .finalize();
        hex::encode(digest)
    }
}

/// Wall-clock milliseconds since the Unix epoch, used as the timestamp of
/// mined ledger blocks.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GENESIS_PREVIOUS_HASH, GENESIS_TIMESTAMP, HASH_HEX_SIZE};
    use serde_json::{json, Value};

    #[test]
    fn compute_hash_example() {
        let hash = compute_hash("abc", 42, &json!({ "SendCoinToA": 3 }), 7);
        let expected_hex = "a2d7f8f9149219476659f2eff69a158000f00450efa28c193febc21a4c42ae37";
        assert_eq!(hash, expected_hex);
    }

    #[test]
    fn genesis_hash_example() {
        let payload = Value::String("GenesisBlock".to_string());
        let hash = compute_hash(GENESIS_PREVIOUS_HASH, GENESIS_TIMESTAMP, &payload, 0);
        let expected_hex = "a759a6ab18fbb6be1ae30f1cd68a0796960b9ef0ec03126222e119d35e668f87";
        assert_eq!(hash, expected_hex);
        assert_eq!(hash.len(), HASH_HEX_SIZE);
    }

    #[test]
    fn compute_hash_is_deterministic() {
        let payload = json!({ "SendCoinToB": 8 });
        let a = compute_hash("prev", 1_600_000_000, &payload, 3);
        let b = compute_hash("prev", 1_600_000_000, &payload.clone(), 3);
        assert_eq!(a, b);
    }

    #[test]
    fn block_new_computes_hash() {
        let block = Block::new(1_600_000_000, json!({ "SendCoinToA": 3 }), "prev");
        assert_eq!(block.nonce, 0);
        assert_eq!(block.previous_hash, "prev");
        assert_eq!(
            block.hash,
            compute_hash("prev", 1_600_000_000, &block.payload, 0)
        );
        assert!(block.has_consistent_hash());
    }

    #[test]
    fn block_hash_changes_with_nonce() {
        let mut block = Block::new(1_600_000_000, json!("data"), "prev");
        let hash1 = block.calculate_hash();
        block.nonce += 1;
        let hash2 = block.calculate_hash();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn mutation_leaves_stored_hash_stale() {
        let mut block = Block::new(1_600_000_000, json!({ "SendCoinToA": 3 }), "prev");
        let sealed = block.hash.clone();
        block.payload = json!({ "SendCoinToA": 400 });
        assert_eq!(block.hash, sealed);
        assert!(!block.has_consistent_hash());

        block.rehash();
        assert_ne!(block.hash, sealed);
        assert!(block.has_consistent_hash());
    }

    #[test]
    fn hash_template_matches_compute_hash() {
        let block = Block::new(5, json!([1, 2, 3]), "prev");
        let template = block.hash_template();
        for nonce in [0u64, 1, 99, u64::MAX] {
            assert_eq!(
                template.with_nonce(nonce),
                compute_hash("prev", 5, &block.payload, nonce)
            );
        }
    }

    #[test]
    fn block_serialization_example() {
        let block = Block::new(7, json!("hi"), "0");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["timestamp"], 7);
        assert_eq!(json["payload"], "hi");
        assert_eq!(json["previous_hash"], "0");
        assert_eq!(json["nonce"], 0);
        assert_eq!(json["hash"], Value::String(block.hash.clone()));
        let back: Block<Value> = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn now_millis_is_after_genesis() {
        assert!(now_millis() > GENESIS_TIMESTAMP);
    }
}
