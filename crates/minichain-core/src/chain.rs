use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    constants::{GENESIS_PREVIOUS_HASH, GENESIS_TIMESTAMP},
    mine, Block, Difficulty, LedgerError, Payload, Result,
};

/// How blocks are sealed when they join a chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "difficulty", rename_all = "snake_case")]
pub enum Mining {
    /// Hash only, no proof-of-work.
    #[default]
    Disabled,
    /// Single-threaded nonce search.
    Sequential(Difficulty),
    /// Rayon nonce search; first worker to hit the target wins.
    Parallel(Difficulty),
}

impl Mining {
    pub fn difficulty(&self) -> Option<&Difficulty> {
        match self {
            Mining::Disabled => None,
            Mining::Sequential(d) | Mining::Parallel(d) => Some(d),
        }
    }

    /// Bring `block.hash` in line with its fields, mining it if required.
    pub fn seal<P: Payload>(&self, block: &mut Block<P>) -> Result<()> {
        match self {
            Mining::Disabled => block.rehash(),
            Mining::Sequential(difficulty) => block.seal_with_proof_of_work(difficulty),
            Mining::Parallel(difficulty) => mine::seal_parallel(block, difficulty)?,
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    /// Stored hash differs from the digest of the block's current fields.
    HashMismatch,
    /// `previous_hash` differs from the stored hash of the preceding block.
    BrokenLink,
}

/// First block that failed a validation scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidBlock {
    pub index: usize,
    pub reason: InvalidReason,
}

/// Append-only sequence of blocks rooted at a fixed genesis block.
///
/// Invariants maintained through the public API:
/// - Always contains at least the genesis block.
/// - Appended blocks are linked to the tail by the chain itself, never by the
///   caller.
///
/// Validity is not cached. [`Chain::block_mut`] hands out raw access to stored
/// blocks, so every call to [`Chain::is_valid`] rescans from scratch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chain<P> {
    blocks: Vec<Block<P>>,
    mining: Mining,
}

impl<P: Payload> Default for Chain<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> Chain<P> {
    /// Genesis-only chain without proof-of-work.
    pub fn new() -> Self {
        Self {
            blocks: vec![genesis_block()],
            mining: Mining::Disabled,
        }
    }

    /// Genesis-only chain whose blocks, genesis included, are mined sequentially.
    /// Sequential sealing cannot fail, so unlike [`Chain::with_mining`] this
    /// needs no `Result`.
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        let mut genesis = genesis_block();
        genesis.seal_with_proof_of_work(&difficulty);
        Self::from_genesis(genesis, Mining::Sequential(difficulty))
    }

    pub fn with_mining(mining: Mining) -> Result<Self> {
        let mut genesis = genesis_block();
        mining.seal(&mut genesis)?;
        Ok(Self::from_genesis(genesis, mining))
    }

    fn from_genesis(genesis: Block<P>, mining: Mining) -> Self {
        debug!(hash = %genesis.hash, ?mining, "genesis block created");
        Self {
            blocks: vec![genesis],
            mining,
        }
    }

    pub fn mining(&self) -> &Mining {
        &self.mining
    }

    /// Number of blocks in the chain (including genesis).
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The most recent block.
    pub fn latest(&self) -> Result<&Block<P>> {
        self.blocks.last().ok_or(LedgerError::EmptyChain)
    }

    pub fn get(&self, index: usize) -> Option<&Block<P>> {
        self.blocks.get(index)
    }

    /// Raw mutable access to a stored block.
    ///
    /// Nothing is resealed afterwards: edits made through this handle are
    /// exactly the tampering that [`Chain::is_valid`] detects.
    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block<P>> {
        self.blocks.get_mut(index)
    }

    pub fn blocks(&self) -> &[Block<P>] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block<P>> {
        self.blocks.iter()
    }

    /// Link `block` to the current tail, seal it and push it.
    ///
    /// Whatever `previous_hash` the caller put on the block is overwritten.
    pub fn append(&mut self, mut block: Block<P>) -> Result<&Block<P>> {
        block.previous_hash = self.latest()?.hash.clone();
        self.mining.seal(&mut block)?;
        debug!(
            index = self.blocks.len(),
            hash = %block.hash,
            nonce = block.nonce,
            "block appended"
        );
        self.blocks.push(block);
        self.latest()
    }

    /// Append a new block carrying `payload`.
    pub fn append_payload(&mut self, timestamp: u64, payload: P) -> Result<&Block<P>> {
        let previous_hash = self.latest()?.hash.clone();
        self.append(Block::new(timestamp, payload, previous_hash))
    }

    /// Scan every block after genesis and report the first one whose stored
    /// hash or link does not match.
    pub fn first_invalid(&self) -> Option<InvalidBlock> {
        self.blocks
            .windows(2)
            .enumerate()
            .find_map(|(offset, pair)| {
                let (previous, current) = (&pair[0], &pair[1]);
                let reason = if !current.has_consistent_hash() {
                    InvalidReason::HashMismatch
                } else if current.previous_hash != previous.hash {
                    InvalidReason::BrokenLink
                } else {
                    return None;
                };
                Some(InvalidBlock {
                    index: offset + 1,
                    reason,
                })
            })
    }

    pub fn is_valid(&self) -> bool {
        match self.first_invalid() {
            None => true,
            Some(InvalidBlock { index, reason }) => {
                warn!(index, ?reason, "chain failed validation");
                false
            }
        }
    }
}

impl<'a, P> IntoIterator for &'a Chain<P> {
    type Item = &'a Block<P>;
    type IntoIter = std::slice::Iter<'a, Block<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// The fixed first block: sentinel payload, fixed timestamp and `"0"` as its
/// previous hash. Unsealed.
pub fn genesis_block<P: Payload>() -> Block<P> {
    Block::new(GENESIS_TIMESTAMP, P::genesis(), GENESIS_PREVIOUS_HASH)
}
