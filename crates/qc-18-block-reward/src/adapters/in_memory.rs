//! In-Memory Collaborator Adapters
//!
//! Self-contained implementations of the outbound ports, used by the
//! simulator and the tests. State sits behind `parking_lot` locks so a
//! driver can mutate it between block closes through a shared `Arc`.

use crate::error::{BlockRewardError, BlockRewardResult};
use crate::ports::outbound::{
    PredecessorLedger, RandomnessGateway, StakingGateway, ValidatorSetGateway,
};
use parking_lot::RwLock;
use shared_types::{Address, BlockNumber, PoolId, StakingEpoch, U256};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Default)]
struct ValidatorSetData {
    validators: Vec<PoolId>,
    pending: Vec<PoolId>,
    to_be_finalized: Vec<PoolId>,
    banned: BTreeSet<PoolId>,
    mining: BTreeMap<Address, PoolId>,
    staking: BTreeMap<Address, PoolId>,
    max_validators: u64,
    apply_block: BlockNumber,
    rotations: u64,
    fail_rotation: bool,
}

/// Validator set kept in memory.
///
/// `new_validator_set` only clears the apply block; the driver arranges the
/// pending and to-be-finalized views, and `finalize` makes the
/// to-be-finalized pools current.
#[derive(Debug, Default)]
pub struct InMemoryValidatorSet {
    data: RwLock<ValidatorSetData>,
}

impl InMemoryValidatorSet {
    /// Create an empty validator set allowing `max_validators`.
    pub fn new(max_validators: u64) -> Self {
        let set = Self::default();
        set.data.write().max_validators = max_validators;
        set
    }

    /// Register a pool with its mining and staking addresses.
    pub fn add_pool(&self, pool: PoolId, mining: Address, staking: Address) {
        let mut data = self.data.write();
        data.mining.insert(mining, pool);
        data.staking.insert(staking, pool);
    }

    /// Replace the current validators.
    pub fn set_validators(&self, pools: Vec<PoolId>) {
        self.data.write().validators = pools;
    }

    /// Replace the pending validators.
    pub fn set_pending(&self, pools: Vec<PoolId>) {
        self.data.write().pending = pools;
    }

    /// Replace the to-be-finalized validators.
    pub fn set_to_be_finalized(&self, pools: Vec<PoolId>) {
        self.data.write().to_be_finalized = pools;
    }

    /// Ban or unban a pool.
    pub fn set_banned(&self, pool: PoolId, banned: bool) {
        let mut data = self.data.write();
        if banned {
            data.banned.insert(pool);
        } else {
            data.banned.remove(&pool);
        }
    }

    /// Set the finalization block directly.
    pub fn set_apply_block(&self, block: BlockNumber) {
        self.data.write().apply_block = block;
    }

    /// Finalize the to-be-finalized set at `block`.
    pub fn finalize(&self, block: BlockNumber) {
        let mut data = self.data.write();
        if !data.to_be_finalized.is_empty() {
            data.validators = std::mem::take(&mut data.to_be_finalized);
        }
        data.apply_block = block;
    }

    /// Make the next rotation fail.
    pub fn set_fail_rotation(&self, fail: bool) {
        self.data.write().fail_rotation = fail;
    }

    /// Number of rotations requested so far.
    pub fn rotations(&self) -> u64 {
        self.data.read().rotations
    }
}

impl ValidatorSetGateway for InMemoryValidatorSet {
    fn validators(&self) -> BlockRewardResult<Vec<PoolId>> {
        Ok(self.data.read().validators.clone())
    }

    fn pending_validators(&self) -> BlockRewardResult<Vec<PoolId>> {
        Ok(self.data.read().pending.clone())
    }

    fn validators_to_be_finalized(&self) -> BlockRewardResult<Vec<PoolId>> {
        Ok(self.data.read().to_be_finalized.clone())
    }

    fn is_validator(&self, pool: PoolId) -> BlockRewardResult<bool> {
        Ok(self.data.read().validators.contains(&pool))
    }

    fn is_validator_banned(&self, pool: PoolId) -> BlockRewardResult<bool> {
        Ok(self.data.read().banned.contains(&pool))
    }

    fn pool_id_by_mining_address(
        &self,
        mining_address: &Address,
    ) -> BlockRewardResult<Option<PoolId>> {
        Ok(self.data.read().mining.get(mining_address).copied())
    }

    fn pool_id_by_staking_address(
        &self,
        staking_address: &Address,
    ) -> BlockRewardResult<Option<PoolId>> {
        Ok(self.data.read().staking.get(staking_address).copied())
    }

    fn max_validators(&self) -> BlockRewardResult<u64> {
        Ok(self.data.read().max_validators)
    }

    fn validator_set_apply_block(&self) -> BlockRewardResult<BlockNumber> {
        Ok(self.data.read().apply_block)
    }

    fn new_validator_set(&self) -> BlockRewardResult<()> {
        let mut data = self.data.write();
        if data.fail_rotation {
            return Err(BlockRewardError::Collaborator {
                reason: "validator set rotation failed".to_string(),
            });
        }
        data.rotations += 1;
        data.apply_block = 0;
        debug!("[qc-18] In-memory validator set rotation #{}", data.rotations);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct StakingData {
    epoch: StakingEpoch,
    start_block: BlockNumber,
    end_block: BlockNumber,
    stakes: BTreeMap<PoolId, (U256, U256)>,
    staker_epochs: BTreeMap<(PoolId, Address), (StakingEpoch, StakingEpoch)>,
    claimed: BTreeSet<(PoolId, Address, StakingEpoch)>,
}

/// Staking state kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryStaking {
    data: RwLock<StakingData>,
}

impl InMemoryStaking {
    /// Create staking state for `epoch` spanning `start..=end`.
    pub fn new(epoch: StakingEpoch, start_block: BlockNumber, end_block: BlockNumber) -> Self {
        let staking = Self::default();
        staking.set_epoch(epoch, start_block, end_block);
        staking
    }

    /// Move to `epoch` spanning `start..=end`.
    pub fn set_epoch(&self, epoch: StakingEpoch, start_block: BlockNumber, end_block: BlockNumber) {
        let mut data = self.data.write();
        data.epoch = epoch;
        data.start_block = start_block;
        data.end_block = end_block;
    }

    /// Start the next epoch right after the current one, `length` blocks long.
    pub fn advance_epoch(&self, length: u64) -> StakingEpoch {
        let mut data = self.data.write();
        data.epoch += 1;
        data.start_block = data.end_block + 1;
        data.end_block = data.start_block + length.max(1) - 1;
        data.epoch
    }

    /// Set the total and validator stake of `pool`.
    pub fn set_stake(&self, pool: PoolId, total: U256, validator: U256) {
        self.data.write().stakes.insert(pool, (total, validator));
    }

    /// Set the first/last staking epoch of `staker` in `pool`.
    pub fn set_staker_epochs(
        &self,
        pool: PoolId,
        staker: Address,
        first: StakingEpoch,
        last: StakingEpoch,
    ) {
        self.data
            .write()
            .staker_epochs
            .insert((pool, staker), (first, last));
    }

    /// Record that `staker` claimed the reward of `pool` for `epoch`.
    pub fn mark_reward_taken(&self, pool: PoolId, staker: Address, epoch: StakingEpoch) {
        self.data.write().claimed.insert((pool, staker, epoch));
    }

    /// Current staking epoch.
    pub fn epoch(&self) -> StakingEpoch {
        self.data.read().epoch
    }

    /// Current epoch start block.
    pub fn start_block(&self) -> BlockNumber {
        self.data.read().start_block
    }

    /// Current epoch end block.
    pub fn end_block(&self) -> BlockNumber {
        self.data.read().end_block
    }
}

impl StakingGateway for InMemoryStaking {
    fn staking_epoch(&self) -> BlockRewardResult<StakingEpoch> {
        Ok(self.data.read().epoch)
    }

    fn staking_epoch_start_block(&self) -> BlockRewardResult<BlockNumber> {
        Ok(self.data.read().start_block)
    }

    fn staking_epoch_end_block(&self) -> BlockRewardResult<BlockNumber> {
        Ok(self.data.read().end_block)
    }

    fn stake_amount_total(&self, pool: PoolId) -> BlockRewardResult<U256> {
        Ok(self
            .data
            .read()
            .stakes
            .get(&pool)
            .map(|(total, _)| *total)
            .unwrap_or_default())
    }

    fn validator_stake_amount(&self, pool: PoolId) -> BlockRewardResult<U256> {
        Ok(self
            .data
            .read()
            .stakes
            .get(&pool)
            .map(|(_, validator)| *validator)
            .unwrap_or_default())
    }

    fn stake_first_epoch(&self, pool: PoolId, staker: &Address) -> BlockRewardResult<StakingEpoch> {
        Ok(self
            .data
            .read()
            .staker_epochs
            .get(&(pool, *staker))
            .map(|(first, _)| *first)
            .unwrap_or_default())
    }

    fn stake_last_epoch(&self, pool: PoolId, staker: &Address) -> BlockRewardResult<StakingEpoch> {
        Ok(self
            .data
            .read()
            .staker_epochs
            .get(&(pool, *staker))
            .map(|(_, last)| *last)
            .unwrap_or_default())
    }

    fn reward_was_taken(
        &self,
        pool: PoolId,
        staker: &Address,
        epoch: StakingEpoch,
    ) -> BlockRewardResult<bool> {
        Ok(self.data.read().claimed.contains(&(pool, *staker, epoch)))
    }
}

/// Randomness collaborator that counts finished rounds.
#[derive(Debug, Default)]
pub struct RecordingRandomness {
    rounds: AtomicU64,
}

impl RecordingRandomness {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rounds reported so far.
    pub fn rounds(&self) -> u64 {
        self.rounds.load(Ordering::SeqCst)
    }
}

impl RandomnessGateway for RecordingRandomness {
    fn on_finish_collect_round(&self) -> BlockRewardResult<()> {
        self.rounds.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Predecessor engine with fixed totals.
#[derive(Clone, Debug)]
pub struct StaticPredecessor {
    address: Address,
    minted_totally: U256,
    by_bridge: BTreeMap<Address, U256>,
}

impl StaticPredecessor {
    /// Predecessor at `address` that minted `minted_totally`.
    pub fn new(address: Address, minted_totally: U256) -> Self {
        Self {
            address,
            minted_totally,
            by_bridge: BTreeMap::new(),
        }
    }

    /// Set the amount minted on behalf of `bridge`.
    pub fn with_bridge_total(mut self, bridge: Address, amount: U256) -> Self {
        self.by_bridge.insert(bridge, amount);
        self
    }
}

impl PredecessorLedger for StaticPredecessor {
    fn address(&self) -> Address {
        self.address
    }

    fn minted_totally(&self) -> BlockRewardResult<U256> {
        Ok(self.minted_totally)
    }

    fn minted_totally_by_bridge(&self, bridge: &Address) -> BlockRewardResult<U256> {
        Ok(self.by_bridge.get(bridge).copied().unwrap_or_default())
    }
}
