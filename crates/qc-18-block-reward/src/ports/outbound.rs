//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Collaborators the engine reads from during a block close. All calls are
//! synchronous and run while the engine holds its state lock, so an
//! implementation must never call back into the engine.

use crate::domain::SnapshotStore;
use crate::error::BlockRewardResult;
use shared_types::{Address, BlockNumber, PoolId, StakingEpoch, U256};

/// Validator-set subsystem.
pub trait ValidatorSetGateway: Send + Sync {
    /// Pools of the current validator set.
    fn validators(&self) -> BlockRewardResult<Vec<PoolId>>;

    /// Pools elected but not yet finalized.
    fn pending_validators(&self) -> BlockRewardResult<Vec<PoolId>>;

    /// Pools waiting for finalization of a set change.
    fn validators_to_be_finalized(&self) -> BlockRewardResult<Vec<PoolId>>;

    /// True if `pool` is in the current validator set.
    fn is_validator(&self, pool: PoolId) -> BlockRewardResult<bool>;

    /// True if `pool` is banned.
    fn is_validator_banned(&self, pool: PoolId) -> BlockRewardResult<bool>;

    /// Pool whose validator mines with `mining_address`.
    fn pool_id_by_mining_address(
        &self,
        mining_address: &Address,
    ) -> BlockRewardResult<Option<PoolId>>;

    /// Pool owned by `staking_address`.
    fn pool_id_by_staking_address(
        &self,
        staking_address: &Address,
    ) -> BlockRewardResult<Option<PoolId>>;

    /// Maximum number of validators.
    fn max_validators(&self) -> BlockRewardResult<u64>;

    /// Block at which the current set was applied (0 if not finalized).
    fn validator_set_apply_block(&self) -> BlockRewardResult<BlockNumber>;

    /// Trigger validator-set rotation at the epoch boundary.
    fn new_validator_set(&self) -> BlockRewardResult<()>;
}

/// Staking subsystem.
pub trait StakingGateway: Send + Sync {
    /// Current staking epoch.
    fn staking_epoch(&self) -> BlockRewardResult<StakingEpoch>;

    /// First block of the current epoch.
    fn staking_epoch_start_block(&self) -> BlockRewardResult<BlockNumber>;

    /// Last block of the current epoch.
    fn staking_epoch_end_block(&self) -> BlockRewardResult<BlockNumber>;

    /// Total stake of `pool` (validator plus delegators).
    fn stake_amount_total(&self, pool: PoolId) -> BlockRewardResult<U256>;

    /// Self-stake of the validator of `pool`.
    fn validator_stake_amount(&self, pool: PoolId) -> BlockRewardResult<U256>;

    /// First epoch in which `staker` held stake in `pool` (0 = never).
    fn stake_first_epoch(&self, pool: PoolId, staker: &Address) -> BlockRewardResult<StakingEpoch>;

    /// Epoch in which `staker` fully withdrew from `pool` (0 = still staked).
    fn stake_last_epoch(&self, pool: PoolId, staker: &Address) -> BlockRewardResult<StakingEpoch>;

    /// True if `staker` already claimed the reward of `pool` for `epoch`.
    fn reward_was_taken(
        &self,
        pool: PoolId,
        staker: &Address,
        epoch: StakingEpoch,
    ) -> BlockRewardResult<bool>;
}

/// Randomness / round-collection subsystem.
pub trait RandomnessGateway: Send + Sync {
    /// Notify that a collection round finished.
    fn on_finish_collect_round(&self) -> BlockRewardResult<()>;
}

/// Predecessor engine whose minting statistics are migrated once.
pub trait PredecessorLedger: Send + Sync {
    /// Address of the predecessor engine.
    fn address(&self) -> Address;

    /// Total minted by the predecessor.
    fn minted_totally(&self) -> BlockRewardResult<U256>;

    /// Total minted by the predecessor on behalf of `bridge`.
    fn minted_totally_by_bridge(&self, bridge: &Address) -> BlockRewardResult<U256>;
}

/// Inflation hook contributing to an epoch's total reward.
pub trait InflationPolicy: Send + Sync {
    /// Inflation minted for `epoch` over `validators`.
    fn inflation_amount(
        &self,
        epoch: StakingEpoch,
        validators: &[PoolId],
        snapshots: &SnapshotStore,
    ) -> BlockRewardResult<U256>;
}
