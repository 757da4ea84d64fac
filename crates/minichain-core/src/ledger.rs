use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{now_millis, Block, Chain, Difficulty, LedgerConfig, Result, Transaction};

/// A chain of transaction blocks plus the pool of transactions waiting for
/// the next block.
///
/// Balances are never stored; [`Ledger::balance_of`] replays the sealed blocks
/// every time, so the chain is the only source of truth.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledger {
    chain: Chain<Vec<Transaction>>,
    pending: Vec<Transaction>,
    mining_reward: f64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_MINING_REWARD)
    }
}

impl Ledger {
    /// Ledger mined at the default difficulty with an empty pending pool.
    pub fn new(mining_reward: f64) -> Self {
        Self {
            chain: Chain::with_difficulty(Difficulty::default()),
            pending: Vec::new(),
            mining_reward,
        }
    }

    pub fn with_config(config: &LedgerConfig) -> Result<Self> {
        Ok(Self {
            chain: Chain::with_mining(config.mining()?)?,
            pending: Vec::new(),
            mining_reward: config.mining_reward,
        })
    }

    pub fn chain(&self) -> &Chain<Vec<Transaction>> {
        &self.chain
    }

    /// Raw access to the underlying chain, e.g. for tampering with sealed
    /// blocks through [`Chain::block_mut`].
    pub fn chain_mut(&mut self) -> &mut Chain<Vec<Transaction>> {
        &mut self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn mining_reward(&self) -> f64 {
        self.mining_reward
    }

    pub fn is_valid(&self) -> bool {
        self.chain.is_valid()
    }

    /// Accept a transaction into the pending pool as-is.
    pub fn queue_transaction(&mut self, tx: Transaction) {
        debug!(
            sender = tx.sender.as_deref().unwrap_or("<reward>"),
            recipient = %tx.recipient,
            amount = tx.amount,
            "transaction queued"
        );
        self.pending.push(tx);
    }

    /// Seal the pending pool into a block stamped with the current time.
    pub fn mine_pending(&mut self, miner: &str) -> Result<&Block<Vec<Transaction>>> {
        self.mine_pending_at(now_millis(), miner)
    }

    /// Seal the pending pool into a block stamped `timestamp`, then reset the
    /// pool to a single reward credit for `miner`. The reward only counts once
    /// a later block seals it.
    pub fn mine_pending_at(
        &mut self,
        timestamp: u64,
        miner: &str,
    ) -> Result<&Block<Vec<Transaction>>> {
        let previous_hash = self.chain.latest()?.hash.clone();
        let block = Block::new(timestamp, self.pending.clone(), previous_hash);
        let sealed = self.chain.append(block)?;
        info!(
            miner,
            transactions = sealed.payload.len(),
            hash = %sealed.hash,
            "pending transactions mined"
        );
        self.pending = vec![Transaction::reward(miner, self.mining_reward)];
        Ok(sealed)
    }

    /// Net amount received by `address` across every sealed block.
    pub fn balance_of(&self, address: &str) -> f64 {
        self.chain
            .iter()
            .flat_map(|block| block.payload.iter())
            .fold(0.0, |mut balance, tx| {
                if tx.sender.as_deref() == Some(address) {
                    balance -= tx.amount;
                }
                if tx.recipient == address {
                    balance += tx.amount;
                }
                balance
            })
    }
}
