#![allow(dead_code)]

use minichain_core::{Block, Chain, Difficulty, Ledger, LedgerConfig, Transaction};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// Install a test-friendly subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Genesis plus the two coin-sending blocks used throughout the tamper tests.
pub fn demo_chain(difficulty: Option<Difficulty>) -> anyhow::Result<Chain<Value>> {
    let mut chain = match difficulty {
        Some(d) => Chain::with_difficulty(d),
        None => Chain::new(),
    };
    chain.append(Block::new(1_549_065_600_000, json!({ "SendCoinToA": 3 }), ""))?;
    chain.append(Block::new(1_551_916_800_000, json!({ "SendCoinToB": 8 }), ""))?;
    Ok(chain)
}

pub fn ledger_without_pow(mining_reward: f64) -> anyhow::Result<Ledger> {
    Ok(Ledger::with_config(&LedgerConfig {
        mining_reward,
        difficulty: None,
        parallel_mining: false,
    })?)
}

/// Deterministic batch of transfers between a handful of addresses.
pub fn random_transfers(seed: u64, count: usize) -> Vec<Transaction> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let from = format!("user-{}", rng.gen_range(0..5));
            let to = format!("user-{}", rng.gen_range(0..5));
            Transaction::transfer(from, to, rng.gen_range(1..100) as f64)
        })
        .collect()
}
