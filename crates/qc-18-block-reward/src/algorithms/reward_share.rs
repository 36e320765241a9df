//! # Reward Share Fraction
//!
//! How much of an epoch's reward is distributable given how late the
//! validator set was finalized.
//!
//! ```text
//!  start           ideal        real                     end
//!    |---------------|------------|------------------------|
//!                    |<-------- denominator --------------->|
//!                                 |<----- numerator ------->|
//! ```

use crate::domain::RewardShareFraction;
use crate::error::{BlockRewardError, BlockRewardResult};
use serde::{Deserialize, Serialize};
use shared_types::BlockNumber;

/// Epoch boundaries and finalization data read from the collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationTiming {
    /// First block of the epoch.
    pub epoch_start_block: BlockNumber,
    /// Last block of the epoch.
    pub epoch_end_block: BlockNumber,
    /// Block at which the validator set was applied (0 = never).
    pub apply_block: BlockNumber,
    /// Maximum number of validators.
    pub max_validators: u64,
}

impl FinalizationTiming {
    /// Earliest block at which finalization can be expected.
    ///
    /// `start + floor(max_validators * 2 / 3) + 1`
    pub fn ideal_finalization_block(&self) -> BlockRewardResult<BlockNumber> {
        let two_thirds = self
            .max_validators
            .checked_mul(2)
            .ok_or_else(|| BlockRewardError::overflow("ideal finalization block"))?
            / 3;
        self.epoch_start_block
            .checked_add(two_thirds)
            .and_then(|b| b.checked_add(1))
            .ok_or_else(|| BlockRewardError::overflow("ideal finalization block"))
    }
}

/// Compute the distributable fraction of the epoch reward.
///
/// Returns `0/1` when the validator set was never finalized. A finalization
/// later than the ideal block shrinks the numerator.
pub fn reward_share_fraction(
    timing: &FinalizationTiming,
) -> BlockRewardResult<RewardShareFraction> {
    if timing.apply_block == 0 {
        return Ok(RewardShareFraction::NONE);
    }

    let ideal = timing.ideal_finalization_block()?;
    let real = timing.apply_block.max(ideal);
    let past_end = timing
        .epoch_end_block
        .checked_add(1)
        .ok_or_else(|| BlockRewardError::overflow("epoch end block"))?;

    Ok(RewardShareFraction {
        numerator: past_end.saturating_sub(real),
        denominator: past_end.saturating_sub(ideal),
    })
}
