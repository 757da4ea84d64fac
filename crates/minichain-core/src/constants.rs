pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// `previous_hash` stored in every genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
/// 2019-01-01T00:00:00Z in milliseconds.
pub const GENESIS_TIMESTAMP: u64 = 1_546_300_800_000;
pub const GENESIS_DATA: &str = "GenesisBlock";

pub const DEFAULT_DIFFICULTY_PREFIX: &str = "00";
pub const DEFAULT_MINING_REWARD: f64 = 12.5;
