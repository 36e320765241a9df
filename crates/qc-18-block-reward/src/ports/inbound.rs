//! Driving Ports (API - Inbound)
//!
//! Every command takes a [`CallContext`]; the caller identity in the
//! envelope is the only identity the engine trusts.

use crate::domain::{BlockCloseOutcome, RewardShareFraction, StakeSnapshot};
use crate::error::BlockRewardResult;
use crate::ports::outbound::PredecessorLedger;
use shared_types::{Address, BlockNumber, CallContext, PoolId, StakingEpoch, U256};
use std::sync::Arc;

/// Block reward API
pub trait BlockRewardApi: Send + Sync {
    // ---- commands ----

    /// Close a block (system caller only).
    ///
    /// Unexpected benefactor shapes and an uninitialized engine yield an
    /// empty outcome. Authorization failures and arithmetic overflow abort
    /// the call without touching state.
    fn on_block_close(
        &self,
        ctx: &CallContext,
        benefactors: &[Address],
        kinds: &[u16],
    ) -> BlockRewardResult<BlockCloseOutcome>;

    /// Accumulate a bridge fee into the next epoch's reward (bridge only).
    fn add_bridge_native_fee_receivers(
        &self,
        ctx: &CallContext,
        amount: U256,
    ) -> BlockRewardResult<()>;

    /// Enqueue an extra mint (bridge only).
    fn add_extra_receiver(
        &self,
        ctx: &CallContext,
        amount: U256,
        receiver: Address,
    ) -> BlockRewardResult<()>;

    /// Replace the allowed bridge list (owner only).
    fn set_bridges_allowed(&self, ctx: &CallContext, bridges: &[Address]) -> BlockRewardResult<()>;

    /// Wire the validator-set address and optional predecessor (owner only, once).
    fn initialize(
        &self,
        ctx: &CallContext,
        validator_set_address: Address,
        predecessor: Option<Arc<dyn PredecessorLedger>>,
    ) -> BlockRewardResult<()>;

    /// Reset the current epoch's block counters (validator-set only).
    fn clear_blocks_created(&self, ctx: &CallContext) -> BlockRewardResult<()>;

    // ---- queries ----

    /// Total reward the current epoch would distribute if it closed now.
    fn current_native_reward_to_distribute(&self) -> BlockRewardResult<U256>;

    /// Reward committed to `pool` for `epoch`.
    fn epoch_pool_native_reward(&self, epoch: StakingEpoch, pool: PoolId) -> U256;

    /// Epochs in which `pool` earned a reward.
    fn epochs_pool_got_reward_for(&self, pool: PoolId) -> Vec<StakingEpoch>;

    /// Rewarded epochs of `pool` that `staker` can still claim.
    fn epochs_to_claim_reward_from(
        &self,
        pool: PoolId,
        staker: &Address,
    ) -> BlockRewardResult<Vec<StakingEpoch>>;

    /// Pending extra receivers.
    fn extra_receivers_queue_size(&self) -> u64;

    /// Total minted across all time.
    fn minted_totally(&self) -> U256;

    /// Total minted on behalf of `bridge`.
    fn minted_totally_by_bridge(&self, bridge: &Address) -> U256;

    /// Total minted to `account`.
    fn minted_for_account(&self, account: &Address) -> U256;

    /// Total minted to `account` in `block`.
    fn minted_for_account_in_block(&self, account: &Address, block: BlockNumber) -> U256;

    /// Total minted in `block`.
    fn minted_in_block(&self, block: BlockNumber) -> U256;

    /// Blocks produced by `pool` in `epoch`.
    fn blocks_created(&self, epoch: StakingEpoch, pool: PoolId) -> u64;

    /// Stake snapshot of `pool` for `epoch`.
    fn snapshot(&self, epoch: StakingEpoch, pool: PoolId) -> StakeSnapshot;

    /// Minimum validator percent recorded for `epoch`.
    fn validator_min_reward_percent(&self, epoch: StakingEpoch) -> u64;

    /// Bridge fees accumulated since the last distribution.
    fn bridge_native_reward(&self) -> U256;

    /// Dust carried into the next epoch.
    fn native_reward_undistributed(&self) -> U256;

    /// Amount distributed to pools at the last epoch close.
    fn last_distributed_reward(&self) -> U256;

    /// Allowed bridges.
    fn bridges_allowed(&self) -> Vec<Address>;

    /// Validator's effective share of `pool`'s current-epoch reward.
    fn validator_reward_percent(&self, pool: PoolId) -> BlockRewardResult<U256>;

    // ---- previews ----

    /// Distributable fraction for the current epoch ending at `epoch_end_block`.
    fn reward_share_fraction(
        &self,
        epoch_end_block: BlockNumber,
    ) -> BlockRewardResult<RewardShareFraction>;

    /// Block production shares of `validators` in `epoch`.
    fn block_production_shares(
        &self,
        epoch: StakingEpoch,
        validators: &[PoolId],
    ) -> BlockRewardResult<(Vec<u64>, u64)>;

    /// Per-pool rewards of `total` for `epoch` over `validators`.
    fn pool_rewards(
        &self,
        total: U256,
        epoch: StakingEpoch,
        validators: &[PoolId],
    ) -> BlockRewardResult<Vec<U256>>;

    /// Validator part of `pool_reward` under `epoch`'s minimum percent.
    fn validator_share(
        &self,
        epoch: StakingEpoch,
        validator_staked: U256,
        total_staked: U256,
        pool_reward: U256,
    ) -> BlockRewardResult<U256>;

    /// Delegator part of `pool_reward` under `epoch`'s minimum percent.
    fn delegator_share(
        &self,
        epoch: StakingEpoch,
        delegator_staked: U256,
        validator_staked: U256,
        total_staked: U256,
        pool_reward: U256,
    ) -> BlockRewardResult<U256>;
}
