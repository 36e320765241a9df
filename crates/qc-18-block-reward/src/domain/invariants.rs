//! # Domain Invariants
//!
//! Business rules of the reward engine, checked while planning a block
//! close and exercised directly by the tests.

use super::extra_queue::ExtraReceiverQueue;
use super::value_objects::NativeDistribution;
use crate::error::{BlockRewardError, BlockRewardResult};
use shared_types::U256;

/// Largest accepted minimum validator reward percent.
pub const MAX_REWARD_PERCENT: u64 = 100;

/// Invariant: Distribution conserves the epoch total.
///
/// `distributed + undistributed == total_reward` and nothing distributed
/// exceeds what was eligible.
pub fn invariant_distribution_conserves(
    distribution: &NativeDistribution,
) -> BlockRewardResult<()> {
    let sum = distribution
        .pool_rewards
        .iter()
        .try_fold(U256::zero(), |acc, (_, reward)| acc.checked_add(*reward))
        .ok_or_else(|| BlockRewardError::overflow("distribution sum"))?;
    let accounted = distribution
        .distributed
        .checked_add(distribution.undistributed)
        .ok_or_else(|| BlockRewardError::overflow("distribution total"))?;

    if sum != distribution.distributed
        || accounted != distribution.total_reward
        || distribution.distributed > distribution.reward_to_distribute
    {
        return Err(BlockRewardError::InvariantViolation {
            invariant: "distribution conservation",
        });
    }
    Ok(())
}

/// Invariant: Queue size equals `last + 1 - first`.
pub fn invariant_queue_size(queue: &ExtraReceiverQueue) -> bool {
    if !queue.is_initialized() {
        return queue.size() == 0;
    }
    queue.size() == (queue.last() + 1).saturating_sub(queue.first())
}

/// Invariant: Validator and delegator shares never exceed the pool reward.
pub fn invariant_split_within_pool_reward(
    validator_share: U256,
    delegator_shares: &[U256],
    pool_reward: U256,
) -> bool {
    delegator_shares
        .iter()
        .try_fold(validator_share, |acc, share| acc.checked_add(*share))
        .is_some_and(|total| total <= pool_reward)
}

/// Invariant: Minimum reward percent is a percentage.
pub fn invariant_valid_percent(percent: u64) -> bool {
    percent <= MAX_REWARD_PERCENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution(rewards: &[u64], total: u64, eligible: u64) -> NativeDistribution {
        let pool_rewards: Vec<_> = rewards
            .iter()
            .enumerate()
            .map(|(i, r)| (i as u64 + 1, U256::from(*r)))
            .collect();
        let distributed: u64 = rewards.iter().sum();
        NativeDistribution {
            epoch: 1,
            total_reward: U256::from(total),
            reward_to_distribute: U256::from(eligible),
            pool_rewards,
            distributed: U256::from(distributed),
            undistributed: U256::from(total - distributed),
        }
    }

    #[test]
    fn test_distribution_conserves() {
        assert!(invariant_distribution_conserves(&distribution(&[300, 100], 401, 401)).is_ok());
    }

    #[test]
    fn test_distribution_above_eligible_rejected() {
        let result = invariant_distribution_conserves(&distribution(&[300, 100], 500, 350));
        assert!(matches!(
            result,
            Err(BlockRewardError::InvariantViolation {
                invariant: "distribution conservation"
            })
        ));
    }

    #[test]
    fn test_split_within_pool_reward() {
        let delegators = [U256::from(80); 10];
        assert!(invariant_split_within_pool_reward(
            U256::from(200),
            &delegators,
            U256::from(1000)
        ));
        assert!(!invariant_split_within_pool_reward(
            U256::from(201),
            &delegators,
            U256::from(1000)
        ));
    }

    #[test]
    fn test_queue_size_invariant() {
        let mut queue = ExtraReceiverQueue::new();
        assert!(invariant_queue_size(&queue));
        queue.initialize();
        assert!(invariant_queue_size(&queue));
    }

    #[test]
    fn test_valid_percent() {
        assert!(invariant_valid_percent(0));
        assert!(invariant_valid_percent(100));
        assert!(!invariant_valid_percent(101));
    }
}
