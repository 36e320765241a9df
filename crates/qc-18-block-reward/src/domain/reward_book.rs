//! # Reward Book
//!
//! Per-epoch accounting of block production and committed pool rewards.

use serde::{Deserialize, Serialize};
use shared_types::{PoolId, StakingEpoch, U256};
use std::collections::BTreeMap;

/// Block counters, pool reward records and the minimum validator percent
/// per epoch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBook {
    blocks_created: BTreeMap<(StakingEpoch, PoolId), u64>,
    pool_rewards: BTreeMap<(StakingEpoch, PoolId), U256>,
    rewarded_epochs: BTreeMap<PoolId, Vec<StakingEpoch>>,
    min_reward_percent: BTreeMap<StakingEpoch, u64>,
}

impl RewardBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks produced by `pool` in `epoch`.
    pub fn blocks_created(&self, epoch: StakingEpoch, pool: PoolId) -> u64 {
        self.blocks_created
            .get(&(epoch, pool))
            .copied()
            .unwrap_or_default()
    }

    /// Overwrite the block counter of `pool` in `epoch`.
    pub fn set_blocks_created(&mut self, epoch: StakingEpoch, pool: PoolId, count: u64) {
        if count == 0 {
            self.blocks_created.remove(&(epoch, pool));
        } else {
            self.blocks_created.insert((epoch, pool), count);
        }
    }

    /// Reset the block counter of `pool` in `epoch`.
    pub fn clear_blocks_created(&mut self, epoch: StakingEpoch, pool: PoolId) {
        self.blocks_created.remove(&(epoch, pool));
    }

    /// Native reward committed to `pool` for `epoch`.
    pub fn pool_reward(&self, epoch: StakingEpoch, pool: PoolId) -> U256 {
        self.pool_rewards
            .get(&(epoch, pool))
            .copied()
            .unwrap_or_default()
    }

    /// Commit a pool reward.
    ///
    /// Zero rewards are not stored. The epoch is appended to the pool's
    /// rewarded-epoch list the first time a non-zero reward lands.
    pub fn record_pool_reward(&mut self, epoch: StakingEpoch, pool: PoolId, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let previous = self.pool_rewards.insert((epoch, pool), amount);
        if previous.map_or(true, |p| p.is_zero()) {
            self.rewarded_epochs.entry(pool).or_default().push(epoch);
        }
    }

    /// Epochs in which `pool` earned a reward, in commit order.
    pub fn epochs_pool_got_reward_for(&self, pool: PoolId) -> &[StakingEpoch] {
        self.rewarded_epochs
            .get(&pool)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Minimum validator percent recorded for `epoch` (zero if none).
    pub fn validator_min_reward_percent(&self, epoch: StakingEpoch) -> u64 {
        self.min_reward_percent
            .get(&epoch)
            .copied()
            .unwrap_or_default()
    }

    /// Record the minimum validator percent for `epoch`.
    pub fn set_validator_min_reward_percent(&mut self, epoch: StakingEpoch, percent: u64) {
        self.min_reward_percent.insert(epoch, percent);
    }
}
