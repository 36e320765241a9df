//! # Block Close Plan
//!
//! Every write a block close performs, computed before any of them is made.
//! Planning is fallible; committing is not.

use super::minting_ledger::LedgerUpdate;
use super::reward_book::RewardBook;
use super::state::RewardEngineState;
use super::value_objects::{ExtraReceiver, NativeDistribution, StakeSnapshot};
use shared_types::{BlockNumber, PoolId, StakingEpoch};

/// Block credit for one pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockCredit {
    /// Epoch being credited.
    pub epoch: StakingEpoch,
    /// Credited pool.
    pub pool: PoolId,
    /// Counter value after the credit.
    pub blocks_created: u64,
}

/// Staged writes of one `on_block_close` call.
#[derive(Clone, Debug, Default)]
pub struct BlockClosePlan {
    /// Block being closed.
    pub block: BlockNumber,
    /// Initialize the extra receiver queue.
    pub initialize_queue: bool,
    /// Block production credit.
    pub credit: Option<BlockCredit>,
    /// Epoch reward distribution.
    pub distribution: Option<NativeDistribution>,
    /// Snapshots for the next epoch, in capture order.
    pub snapshots: Vec<(StakingEpoch, PoolId, StakeSnapshot)>,
    /// Minimum validator percent for the next epoch.
    pub min_reward_percent: Option<(StakingEpoch, u64)>,
    /// Extra receivers drained this block.
    pub drained: Vec<ExtraReceiver>,
    /// Ledger counters for migration and drained entries.
    pub ledger: LedgerUpdate,
}

impl BlockClosePlan {
    /// Empty plan for `block`.
    pub fn new(block: BlockNumber) -> Self {
        Self {
            block,
            ..Default::default()
        }
    }

    /// True if `pool` already has a snapshot staged for `epoch`.
    pub fn has_snapshot(&self, epoch: StakingEpoch, pool: PoolId) -> bool {
        self.snapshots
            .iter()
            .any(|(e, p, _)| *e == epoch && *p == pool)
    }

    /// Blocks created by `pool` in `epoch`, counting the staged credit.
    pub fn blocks_created(&self, book: &RewardBook, epoch: StakingEpoch, pool: PoolId) -> u64 {
        match self.credit {
            Some(credit) if credit.epoch == epoch && credit.pool == pool => credit.blocks_created,
            _ => book.blocks_created(epoch, pool),
        }
    }

    /// Apply every staged write to `state`.
    pub fn commit(self, state: &mut RewardEngineState) {
        if self.initialize_queue {
            state.extra_receivers.initialize();
        }

        if let Some(credit) = self.credit {
            state
                .book
                .set_blocks_created(credit.epoch, credit.pool, credit.blocks_created);
        }

        if let Some(distribution) = self.distribution {
            state.bridge_native_reward = Default::default();
            for (pool, reward) in &distribution.pool_rewards {
                state
                    .book
                    .record_pool_reward(distribution.epoch, *pool, *reward);
            }
            state.native_reward_undistributed = distribution.undistributed;
            state.last_distributed_reward = distribution.distributed;
        }

        for (epoch, pool, snapshot) in self.snapshots {
            state.snapshots.record(epoch, pool, snapshot);
        }

        if let Some((epoch, percent)) = self.min_reward_percent {
            state.book.set_validator_min_reward_percent(epoch, percent);
        }

        state.extra_receivers.pop_front_n(self.drained.len());
        state.ledger.apply(self.ledger);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::U256;

    #[test]
    fn test_empty_plan_is_noop() {
        let mut state = RewardEngineState::new();
        BlockClosePlan::new(5).commit(&mut state);
        assert_eq!(state, RewardEngineState::new());
    }

    #[test]
    fn test_commit_applies_distribution_and_snapshots() {
        let mut state = RewardEngineState::new();
        state.bridge_native_reward = U256::from(50);

        let mut plan = BlockClosePlan::new(100);
        plan.credit = Some(BlockCredit {
            epoch: 1,
            pool: 4,
            blocks_created: 2,
        });
        plan.distribution = Some(NativeDistribution {
            epoch: 1,
            total_reward: U256::from(50),
            reward_to_distribute: U256::from(50),
            pool_rewards: vec![(4, U256::from(33)), (5, U256::zero())],
            distributed: U256::from(33),
            undistributed: U256::from(17),
        });
        plan.snapshots
            .push((2, 4, StakeSnapshot::new(U256::from(10), U256::from(10))));
        plan.min_reward_percent = Some((2, 20));
        assert!(plan.has_snapshot(2, 4));
        assert!(!plan.has_snapshot(1, 4));
        assert_eq!(plan.blocks_created(&state.book, 1, 4), 2);
        assert_eq!(plan.blocks_created(&state.book, 1, 5), 0);

        plan.commit(&mut state);

        assert_eq!(state.book.blocks_created(1, 4), 2);
        assert_eq!(state.bridge_native_reward, U256::zero());
        assert_eq!(state.book.pool_reward(1, 4), U256::from(33));
        assert_eq!(state.book.epochs_pool_got_reward_for(4), &[1]);
        assert!(state.book.epochs_pool_got_reward_for(5).is_empty());
        assert_eq!(state.native_reward_undistributed, U256::from(17));
        assert_eq!(state.last_distributed_reward, U256::from(33));
        assert!(state.snapshots.is_taken(2, 4));
        assert_eq!(state.book.validator_min_reward_percent(2), 20);
    }
}
