use crate::{Block, Difficulty, LedgerError, Payload, Result};
use rayon::prelude::*;
use tracing::info;

/// Seals a block by searching nonces in parallel until its hash meets `difficulty`.
///
/// Workers race over disjoint slices of the nonce space starting at the
/// block's current nonce; the first match found wins, so the result is any
/// satisfying nonce rather than the smallest one.
pub fn seal_parallel<P: Payload>(block: &mut Block<P>, difficulty: &Difficulty) -> Result<()> {
    // Everything but the nonce is fixed for the whole search.
    let template = block.hash_template();
    let start = block.nonce;

    let found = (0u64..u64::MAX)
        .into_par_iter()
        .map(|offset| start.wrapping_add(offset))
        .find_any(|nonce| difficulty.is_met_by(&template.with_nonce(*nonce)))
        .ok_or(LedgerError::NonceSpaceExhausted)?;

    block.nonce = found;
    block.hash = template.with_nonce(found);

    info!(hash = %block.hash, nonce = found, "block mined in parallel");
    Ok(())
}
