//! # Native Reward Distribution
//!
//! Splits an epoch's native reward between validator pools in proportion to
//! their block production shares. Truncation dust is carried into the next
//! epoch through `undistributed`.

use crate::domain::{BlockProductionShares, NativeDistribution, RewardShareFraction};
use crate::error::{BlockRewardError, BlockRewardResult};
use shared_types::{PoolId, StakingEpoch, U256};

/// Sources of an epoch's total reward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EpochRewardSources {
    /// Fees accumulated from bridges.
    pub bridge_reward: U256,
    /// Dust carried from the previous epoch.
    pub carryover: U256,
    /// Output of the inflation policy.
    pub inflation: U256,
}

impl EpochRewardSources {
    /// `bridge_reward + carryover + inflation`
    pub fn total(&self) -> BlockRewardResult<U256> {
        self.bridge_reward
            .checked_add(self.carryover)
            .and_then(|sum| sum.checked_add(self.inflation))
            .ok_or_else(|| BlockRewardError::overflow("epoch total reward"))
    }
}

/// Reward of each validator: `total * numerator / denominator`.
///
/// All zeros when the denominator is zero.
pub fn pool_rewards(total: U256, shares: &BlockProductionShares) -> BlockRewardResult<Vec<U256>> {
    if shares.denominator == 0 {
        return Ok(vec![U256::zero(); shares.numerators.len()]);
    }
    let denominator = U256::from(shares.denominator);
    shares
        .numerators
        .iter()
        .map(|n| {
            total
                .checked_mul(U256::from(*n))
                .map(|product| product / denominator)
                .ok_or_else(|| BlockRewardError::overflow("pool reward"))
        })
        .collect()
}

/// Part of `total` eligible after the finalization penalty.
pub fn eligible_reward(
    total: U256,
    fraction: &RewardShareFraction,
    shares: &BlockProductionShares,
) -> BlockRewardResult<U256> {
    if fraction.denominator == 0 || shares.denominator == 0 {
        return Ok(U256::zero());
    }
    total
        .checked_mul(U256::from(fraction.numerator))
        .map(|product| product / U256::from(fraction.denominator))
        .ok_or_else(|| BlockRewardError::overflow("eligible reward"))
}

/// Plan the native reward distribution of `epoch`.
///
/// `pools` and `shares.numerators` are aligned with the epoch's validators.
pub fn plan_native_distribution(
    epoch: StakingEpoch,
    sources: EpochRewardSources,
    fraction: &RewardShareFraction,
    pools: &[PoolId],
    shares: &BlockProductionShares,
) -> BlockRewardResult<NativeDistribution> {
    let total_reward = sources.total()?;
    if total_reward.is_zero() {
        return Ok(NativeDistribution {
            epoch,
            ..Default::default()
        });
    }

    let reward_to_distribute = eligible_reward(total_reward, fraction, shares)?;
    let rewards = pool_rewards(reward_to_distribute, shares)?;
    let distributed = rewards
        .iter()
        .try_fold(U256::zero(), |acc, r| acc.checked_add(*r))
        .ok_or_else(|| BlockRewardError::overflow("distributed reward"))?;
    let undistributed = total_reward
        .checked_sub(distributed)
        .ok_or_else(|| BlockRewardError::overflow("undistributed reward"))?;

    Ok(NativeDistribution {
        epoch,
        total_reward,
        reward_to_distribute,
        pool_rewards: pools.iter().copied().zip(rewards).collect(),
        distributed,
        undistributed,
    })
}
