//! Block Reward Service - Core business logic
//!
//! The service owns the engine state behind a single `RwLock`. A block close
//! holds the write lock for the whole call, plans every write into a
//! [`BlockClosePlan`] and commits only after planning succeeded, so a failed
//! close leaves the state exactly as it was.

use crate::adapters::NoInflation;
use crate::algorithms::{
    block_production_shares, delegator_share, plan_native_distribution, pool_rewards,
    reward_share_fraction, validator_reward_percent, validator_share, EpochRewardSources,
    FinalizationTiming, PoolProduction,
};
use crate::config::BlockRewardConfig;
use crate::domain::invariants::{invariant_distribution_conserves, invariant_queue_size};
use crate::domain::{
    BlockCloseOutcome, BlockClosePlan, BlockCredit, BlockProductionShares, ExtraReceiver,
    NativeDistribution, NativeMint, RewardEngineState, RewardKind, RewardShareFraction,
    StakeSnapshot,
};
use crate::error::{BlockRewardError, BlockRewardResult, CallerRole};
use crate::events::BlockRewardEvent;
use crate::metrics;
use crate::ports::inbound::BlockRewardApi;
use crate::ports::outbound::{
    InflationPolicy, PredecessorLedger, RandomnessGateway, StakingGateway, ValidatorSetGateway,
};
use parking_lot::RwLock;
use shared_types::{
    is_zero_address, short_address, Address, BlockNumber, CallContext, PoolId, StakingEpoch, U256,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// State guarded by the service lock.
struct Inner {
    state: RewardEngineState,
    predecessor: Option<Arc<dyn PredecessorLedger>>,
    events: Vec<BlockRewardEvent>,
}

/// Block reward engine.
pub struct BlockRewardService<V, S, R>
where
    V: ValidatorSetGateway,
    S: StakingGateway,
    R: RandomnessGateway,
{
    config: BlockRewardConfig,
    validator_set: Arc<V>,
    staking: Arc<S>,
    randomness: Arc<R>,
    inflation: Arc<dyn InflationPolicy>,
    inner: RwLock<Inner>,
}

impl<V, S, R> BlockRewardService<V, S, R>
where
    V: ValidatorSetGateway,
    S: StakingGateway,
    R: RandomnessGateway,
{
    /// Create an uninitialized engine.
    pub fn new(
        config: BlockRewardConfig,
        validator_set: Arc<V>,
        staking: Arc<S>,
        randomness: Arc<R>,
    ) -> BlockRewardResult<Self> {
        Self::with_state(
            config,
            validator_set,
            staking,
            randomness,
            RewardEngineState::new(),
            None,
        )
    }

    /// Rebuild an engine from state produced by [`Self::export_state`].
    ///
    /// The predecessor handle is not part of the encoded state; pass it
    /// again if the first block close has not happened yet.
    pub fn restore(
        config: BlockRewardConfig,
        validator_set: Arc<V>,
        staking: Arc<S>,
        randomness: Arc<R>,
        bytes: &[u8],
        predecessor: Option<Arc<dyn PredecessorLedger>>,
    ) -> BlockRewardResult<Self> {
        let state = RewardEngineState::decode(bytes)?;
        info!(
            "[qc-18] Restored engine state ({} snapshots, {} queued extra receivers)",
            state.snapshots.len(),
            state.extra_receivers.size()
        );
        Self::with_state(config, validator_set, staking, randomness, state, predecessor)
    }

    fn with_state(
        config: BlockRewardConfig,
        validator_set: Arc<V>,
        staking: Arc<S>,
        randomness: Arc<R>,
        state: RewardEngineState,
        predecessor: Option<Arc<dyn PredecessorLedger>>,
    ) -> BlockRewardResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            validator_set,
            staking,
            randomness,
            inflation: Arc::new(NoInflation),
            inner: RwLock::new(Inner {
                state,
                predecessor,
                events: Vec::new(),
            }),
        })
    }

    /// Replace the inflation policy.
    pub fn with_inflation_policy(mut self, policy: Arc<dyn InflationPolicy>) -> Self {
        self.inflation = policy;
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &BlockRewardConfig {
        &self.config
    }

    /// Copy of the current engine state.
    pub fn state(&self) -> RewardEngineState {
        self.inner.read().state.clone()
    }

    /// Encode the engine state for durable storage.
    pub fn export_state(&self) -> BlockRewardResult<Vec<u8>> {
        self.inner.read().state.encode()
    }

    /// Drain buffered events.
    pub fn take_events(&self) -> Vec<BlockRewardEvent> {
        std::mem::take(&mut self.inner.write().events)
    }

    // =========================================================================
    // AUTHORIZATION
    // =========================================================================

    fn ensure_caller(
        ctx: &CallContext,
        expected: &Address,
        role: CallerRole,
    ) -> BlockRewardResult<()> {
        if !ctx.is_caller(expected) {
            warn!(
                "[qc-18] Rejected {} call from {}",
                role,
                short_address(&ctx.caller)
            );
            return Err(BlockRewardError::UnauthorizedCaller {
                caller: ctx.caller,
                role,
            });
        }
        Ok(())
    }

    fn ensure_bridge(state: &RewardEngineState, ctx: &CallContext) -> BlockRewardResult<()> {
        if !state.bridges.is_allowed(&ctx.caller) {
            warn!(
                "[qc-18] Rejected bridge call from {}",
                short_address(&ctx.caller)
            );
            return Err(BlockRewardError::UnauthorizedCaller {
                caller: ctx.caller,
                role: CallerRole::Bridge,
            });
        }
        Ok(())
    }

    // =========================================================================
    // BLOCK CLOSE PLANNING
    // =========================================================================

    fn plan_block_close(
        &self,
        inner: &Inner,
        block: BlockNumber,
        benefactor: &Address,
    ) -> BlockRewardResult<(BlockClosePlan, BlockCloseOutcome)> {
        let state = &inner.state;
        let mut plan = BlockClosePlan::new(block);

        if !state.extra_receivers.is_initialized() {
            plan.initialize_queue = true;
            if let Some(predecessor) = &inner.predecessor {
                let minted_totally = predecessor.minted_totally()?;
                let by_bridge = state
                    .bridges
                    .bridges()
                    .iter()
                    .map(|bridge| Ok((*bridge, predecessor.minted_totally_by_bridge(bridge)?)))
                    .collect::<BlockRewardResult<Vec<_>>>()?;
                plan.ledger.add_migration(minted_totally, &by_bridge);
                info!(
                    "[qc-18] Migrating minting statistics from predecessor {}",
                    short_address(&predecessor.address())
                );
            }
        }

        let epoch = self.staking.staking_epoch()?;
        let end_block = self.staking.staking_epoch_end_block()?;

        plan.credit = self.plan_block_credit(state, epoch, benefactor)?;

        let mut extra_receivers_limit = self.config.extra_receivers_limit;
        let mut closed_epoch = None;

        if block == end_block {
            if epoch != 0 {
                let distribution = self.plan_distribution(state, &plan, epoch, end_block)?;
                if !distribution.is_empty() {
                    invariant_distribution_conserves(&distribution)?;
                    plan.distribution = Some(distribution);
                }
            }

            self.validator_set.new_validator_set()?;

            let next_epoch = epoch
                .checked_add(1)
                .ok_or_else(|| BlockRewardError::overflow("staking epoch"))?;
            self.plan_snapshots(state, &mut plan, next_epoch)?;
            plan.min_reward_percent = Some((next_epoch, self.config.validator_min_reward_percent));

            extra_receivers_limit = 0;
            closed_epoch = Some(epoch);
        }

        let drained = state.extra_receivers.peek(extra_receivers_limit);
        for entry in &drained {
            plan.ledger.add_mint(&state.ledger, block, entry)?;
        }

        let mut mints: Vec<NativeMint> = drained
            .iter()
            .map(|entry| NativeMint {
                receiver: entry.receiver,
                amount: entry.amount,
            })
            .collect();
        plan.drained = drained;

        if let Some(distribution) = &plan.distribution {
            if !distribution.distributed.is_zero() {
                mints.push(NativeMint {
                    receiver: self.config.engine_address,
                    amount: distribution.distributed,
                });
            }
        }

        let outcome = BlockCloseOutcome {
            mints,
            extra_receivers_limit,
            closed_epoch,
        };
        Ok((plan, outcome))
    }

    fn plan_block_credit(
        &self,
        state: &RewardEngineState,
        epoch: StakingEpoch,
        benefactor: &Address,
    ) -> BlockRewardResult<Option<BlockCredit>> {
        if epoch == 0 || self.validator_set.validator_set_apply_block()? == 0 {
            return Ok(None);
        }
        let Some(pool) = self.validator_set.pool_id_by_mining_address(benefactor)? else {
            debug!(
                "[qc-18] Benefactor {} has no pool, no block credit",
                short_address(benefactor)
            );
            return Ok(None);
        };
        if self.validator_set.is_validator_banned(pool)? {
            debug!("[qc-18] Pool {} is banned, no block credit", pool);
            return Ok(None);
        }
        let blocks_created = state
            .book
            .blocks_created(epoch, pool)
            .checked_add(1)
            .ok_or_else(|| BlockRewardError::overflow("blocks created"))?;
        Ok(Some(BlockCredit {
            epoch,
            pool,
            blocks_created,
        }))
    }

    fn plan_distribution(
        &self,
        state: &RewardEngineState,
        plan: &BlockClosePlan,
        epoch: StakingEpoch,
        end_block: BlockNumber,
    ) -> BlockRewardResult<NativeDistribution> {
        let validators = self.validator_set.validators()?;
        let fraction = self.fraction_for(end_block)?;
        let shares = self.shares_for(state, plan, epoch, &validators)?;
        let inflation = self
            .inflation
            .inflation_amount(epoch, &validators, &state.snapshots)?;

        let sources = EpochRewardSources {
            bridge_reward: state.bridge_native_reward,
            carryover: state.native_reward_undistributed,
            inflation,
        };
        debug!(
            "[qc-18] Epoch {} fraction {}/{}, share denominator {}",
            epoch, fraction.numerator, fraction.denominator, shares.denominator
        );
        plan_native_distribution(epoch, sources, &fraction, &validators, &shares)
    }

    fn fraction_for(&self, end_block: BlockNumber) -> BlockRewardResult<RewardShareFraction> {
        let timing = FinalizationTiming {
            epoch_start_block: self.staking.staking_epoch_start_block()?,
            epoch_end_block: end_block,
            apply_block: self.validator_set.validator_set_apply_block()?,
            max_validators: self.validator_set.max_validators()?,
        };
        reward_share_fraction(&timing)
    }

    fn shares_for(
        &self,
        state: &RewardEngineState,
        plan: &BlockClosePlan,
        epoch: StakingEpoch,
        validators: &[PoolId],
    ) -> BlockRewardResult<BlockProductionShares> {
        let productions = validators
            .iter()
            .map(|pool| {
                Ok(PoolProduction {
                    blocks_created: plan.blocks_created(&state.book, epoch, *pool),
                    validator_staked: state.snapshots.validator_staked(epoch, *pool),
                    banned: self.validator_set.is_validator_banned(*pool)?,
                })
            })
            .collect::<BlockRewardResult<Vec<_>>>()?;
        block_production_shares(&productions)
    }

    fn plan_snapshots(
        &self,
        state: &RewardEngineState,
        plan: &mut BlockClosePlan,
        next_epoch: StakingEpoch,
    ) -> BlockRewardResult<()> {
        let views = [
            self.validator_set.pending_validators()?,
            self.validator_set.validators()?,
            self.validator_set.validators_to_be_finalized()?,
        ];
        for pool in views.iter().flatten() {
            if state.snapshots.is_taken(next_epoch, *pool) || plan.has_snapshot(next_epoch, *pool) {
                continue;
            }
            let total_staked = self.staking.stake_amount_total(*pool)?;
            if total_staked.is_zero() {
                continue;
            }
            let validator_staked = self.staking.validator_stake_amount(*pool)?;
            plan.snapshots.push((
                next_epoch,
                *pool,
                StakeSnapshot::new(total_staked, validator_staked),
            ));
        }
        Ok(())
    }

    fn record_block_close(
        inner: &mut Inner,
        plan: &BlockClosePlan,
        outcome: &BlockCloseOutcome,
    ) {
        if plan.credit.is_some() {
            metrics::record_block_credited();
        }
        for entry in &plan.drained {
            metrics::record_minted(lossy(entry.amount));
            inner.events.push(BlockRewardEvent::NativeMinted {
                amount: entry.amount,
                receiver: entry.receiver,
                bridge: entry.bridge,
                block: plan.block,
            });
        }
        if !plan.drained.is_empty() {
            metrics::record_extra_drained(plan.drained.len() as u64);
        }
        if let Some(distribution) = &plan.distribution {
            let rewarded_pools = distribution
                .pool_rewards
                .iter()
                .filter(|(_, reward)| !reward.is_zero())
                .map(|(pool, _)| *pool)
                .collect::<Vec<_>>();
            info!(
                "[qc-18] Epoch {} rewards distributed: {} to {} pools, {} carried over",
                distribution.epoch,
                distribution.distributed,
                rewarded_pools.len(),
                distribution.undistributed
            );
            metrics::record_epoch_distributed(lossy(distribution.undistributed));
            inner.events.push(BlockRewardEvent::EpochRewardsDistributed {
                epoch: distribution.epoch,
                distributed: distribution.distributed,
                undistributed: distribution.undistributed,
                rewarded_pools,
            });
        }
        if let Some(epoch) = outcome.closed_epoch {
            info!(
                "[qc-18] Closed epoch {} at block {}, {} snapshots for epoch {}",
                epoch,
                plan.block,
                plan.snapshots.len(),
                epoch + 1
            );
        }
    }
}

fn lossy(amount: U256) -> f64 {
    if amount.bits() > 128 {
        f64::MAX
    } else {
        amount.low_u128() as f64
    }
}

impl<V, S, R> BlockRewardApi for BlockRewardService<V, S, R>
where
    V: ValidatorSetGateway,
    S: StakingGateway,
    R: RandomnessGateway,
{
    fn on_block_close(
        &self,
        ctx: &CallContext,
        benefactors: &[Address],
        kinds: &[u16],
    ) -> BlockRewardResult<BlockCloseOutcome> {
        let mut inner = self.inner.write();
        Self::ensure_caller(ctx, &self.config.system_address, CallerRole::System)?;

        let benefactor = match (benefactors, kinds) {
            ([benefactor], [kind])
                if RewardKind::from_code(*kind) == Some(RewardKind::BlockAuthor) =>
            {
                benefactor
            }
            _ => {
                warn!(
                    "[qc-18] Block {}: unexpected benefactors ({}) or kinds ({:?}), nothing minted",
                    ctx.block_number,
                    benefactors.len(),
                    kinds
                );
                return Ok(BlockCloseOutcome::empty());
            }
        };
        if !inner.state.is_initialized() {
            warn!(
                "[qc-18] Block {}: engine not initialized, nothing minted",
                ctx.block_number
            );
            return Ok(BlockCloseOutcome::empty());
        }

        let planned = self
            .randomness
            .on_finish_collect_round()
            .and_then(|()| self.plan_block_close(&inner, ctx.block_number, benefactor));
        let (plan, outcome) = match planned {
            Ok(planned) => planned,
            Err(err) => {
                if err.is_fatal() {
                    error!(
                        "[qc-18] Block {} close aborted, state untouched: {}",
                        ctx.block_number, err
                    );
                }
                return Err(err);
            }
        };
        Self::record_block_close(&mut inner, &plan, &outcome);
        plan.commit(&mut inner.state);

        debug_assert!(invariant_queue_size(&inner.state.extra_receivers));
        metrics::set_queue_size(inner.state.extra_receivers.size());
        debug!(
            "[qc-18] Block {} closed: {} mints, drain limit {}",
            ctx.block_number,
            outcome.mints.len(),
            outcome.extra_receivers_limit
        );
        Ok(outcome)
    }

    fn add_bridge_native_fee_receivers(
        &self,
        ctx: &CallContext,
        amount: U256,
    ) -> BlockRewardResult<()> {
        let mut inner = self.inner.write();
        Self::ensure_bridge(&inner.state, ctx)?;
        if amount.is_zero() {
            return Err(BlockRewardError::ZeroAmount);
        }
        let cumulative = inner
            .state
            .bridge_native_reward
            .checked_add(amount)
            .ok_or_else(|| BlockRewardError::overflow("bridge native reward"))?;
        inner.state.bridge_native_reward = cumulative;
        inner.events.push(BlockRewardEvent::BridgeNativeRewardAdded {
            amount,
            cumulative,
            bridge: ctx.caller,
        });
        debug!(
            "[qc-18] Bridge {} added native fee {}, accumulated {}",
            short_address(&ctx.caller),
            amount,
            cumulative
        );
        Ok(())
    }

    fn add_extra_receiver(
        &self,
        ctx: &CallContext,
        amount: U256,
        receiver: Address,
    ) -> BlockRewardResult<()> {
        let mut inner = self.inner.write();
        Self::ensure_bridge(&inner.state, ctx)?;
        inner.state.extra_receivers.enqueue(ExtraReceiver {
            amount,
            receiver,
            bridge: ctx.caller,
        })?;
        inner.events.push(BlockRewardEvent::ExtraReceiverAdded {
            amount,
            receiver,
            bridge: ctx.caller,
        });
        metrics::record_extra_enqueued();
        metrics::set_queue_size(inner.state.extra_receivers.size());
        debug!(
            "[qc-18] Extra receiver {} queued for {} (queue size {})",
            short_address(&receiver),
            amount,
            inner.state.extra_receivers.size()
        );
        Ok(())
    }

    fn set_bridges_allowed(&self, ctx: &CallContext, bridges: &[Address]) -> BlockRewardResult<()> {
        let mut inner = self.inner.write();
        Self::ensure_caller(ctx, &self.config.owner_address, CallerRole::Owner)?;
        inner.state.bridges.replace(bridges)?;
        inner.events.push(BlockRewardEvent::BridgesAllowedSet {
            bridges: bridges.to_vec(),
        });
        info!("[qc-18] Allowed bridges set ({} entries)", bridges.len());
        Ok(())
    }

    fn initialize(
        &self,
        ctx: &CallContext,
        validator_set_address: Address,
        predecessor: Option<Arc<dyn PredecessorLedger>>,
    ) -> BlockRewardResult<()> {
        let mut inner = self.inner.write();
        Self::ensure_caller(ctx, &self.config.owner_address, CallerRole::Owner)?;
        if inner.state.is_initialized() {
            return Err(BlockRewardError::AlreadyInitialized);
        }
        if is_zero_address(&validator_set_address) {
            return Err(BlockRewardError::ZeroAddress {
                field: "validator_set_address",
            });
        }

        let epoch = self.staking.staking_epoch()?;
        let min_percent = self.config.validator_min_reward_percent;

        let predecessor_address = predecessor.as_ref().map(|p| p.address());
        inner.state.validator_set_address = Some(validator_set_address);
        inner.state.book.set_validator_min_reward_percent(0, min_percent);
        inner
            .state
            .book
            .set_validator_min_reward_percent(epoch, min_percent);
        inner.state.predecessor_address = predecessor_address;
        inner.predecessor = predecessor;
        inner.events.push(BlockRewardEvent::Initialized {
            validator_set: validator_set_address,
            predecessor: predecessor_address,
        });
        info!(
            "[qc-18] Initialized with validator set {} at epoch {} (min validator reward {}%)",
            short_address(&validator_set_address),
            epoch,
            min_percent
        );
        Ok(())
    }

    fn clear_blocks_created(&self, ctx: &CallContext) -> BlockRewardResult<()> {
        let mut inner = self.inner.write();
        let Some(validator_set_address) = inner.state.validator_set_address else {
            return Err(BlockRewardError::NotInitialized);
        };
        Self::ensure_caller(ctx, &validator_set_address, CallerRole::ValidatorSet)?;

        let epoch = self.staking.staking_epoch()?;
        let validators = self.validator_set.validators()?;
        for pool in &validators {
            inner.state.book.clear_blocks_created(epoch, *pool);
        }
        debug!(
            "[qc-18] Cleared block counters of {} validators for epoch {}",
            validators.len(),
            epoch
        );
        Ok(())
    }

    fn current_native_reward_to_distribute(&self) -> BlockRewardResult<U256> {
        let inner = self.inner.read();
        let epoch = self.staking.staking_epoch()?;
        let validators = self.validator_set.validators()?;
        let inflation = self
            .inflation
            .inflation_amount(epoch, &validators, &inner.state.snapshots)?;
        EpochRewardSources {
            bridge_reward: inner.state.bridge_native_reward,
            carryover: inner.state.native_reward_undistributed,
            inflation,
        }
        .total()
    }

    fn epoch_pool_native_reward(&self, epoch: StakingEpoch, pool: PoolId) -> U256 {
        self.inner.read().state.book.pool_reward(epoch, pool)
    }

    fn epochs_pool_got_reward_for(&self, pool: PoolId) -> Vec<StakingEpoch> {
        self.inner
            .read()
            .state
            .book
            .epochs_pool_got_reward_for(pool)
            .to_vec()
    }

    fn epochs_to_claim_reward_from(
        &self,
        pool: PoolId,
        staker: &Address,
    ) -> BlockRewardResult<Vec<StakingEpoch>> {
        let rewarded = self.epochs_pool_got_reward_for(pool);
        let is_delegator = self.validator_set.pool_id_by_staking_address(staker)? != Some(pool);

        let (first_epoch, last_epoch) = if is_delegator {
            let first = self.staking.stake_first_epoch(pool, staker)?;
            if first == 0 {
                return Ok(Vec::new());
            }
            (first, self.staking.stake_last_epoch(pool, staker)?)
        } else {
            (0, 0)
        };

        let mut claimable = Vec::new();
        for epoch in rewarded {
            if is_delegator {
                if epoch < first_epoch {
                    continue;
                }
                if last_epoch != 0 && last_epoch <= epoch {
                    break;
                }
            }
            if !self.staking.reward_was_taken(pool, staker, epoch)? {
                claimable.push(epoch);
            }
        }
        Ok(claimable)
    }

    fn extra_receivers_queue_size(&self) -> u64 {
        self.inner.read().state.extra_receivers.size()
    }

    fn minted_totally(&self) -> U256 {
        self.inner.read().state.ledger.minted_totally()
    }

    fn minted_totally_by_bridge(&self, bridge: &Address) -> U256 {
        self.inner.read().state.ledger.minted_totally_by_bridge(bridge)
    }

    fn minted_for_account(&self, account: &Address) -> U256 {
        self.inner.read().state.ledger.minted_for_account(account)
    }

    fn minted_for_account_in_block(&self, account: &Address, block: BlockNumber) -> U256 {
        self.inner
            .read()
            .state
            .ledger
            .minted_for_account_in_block(account, block)
    }

    fn minted_in_block(&self, block: BlockNumber) -> U256 {
        self.inner.read().state.ledger.minted_in_block(block)
    }

    fn blocks_created(&self, epoch: StakingEpoch, pool: PoolId) -> u64 {
        self.inner.read().state.book.blocks_created(epoch, pool)
    }

    fn snapshot(&self, epoch: StakingEpoch, pool: PoolId) -> StakeSnapshot {
        self.inner.read().state.snapshots.get(epoch, pool)
    }

    fn validator_min_reward_percent(&self, epoch: StakingEpoch) -> u64 {
        self.inner
            .read()
            .state
            .book
            .validator_min_reward_percent(epoch)
    }

    fn bridge_native_reward(&self) -> U256 {
        self.inner.read().state.bridge_native_reward
    }

    fn native_reward_undistributed(&self) -> U256 {
        self.inner.read().state.native_reward_undistributed
    }

    fn last_distributed_reward(&self) -> U256 {
        self.inner.read().state.last_distributed_reward
    }

    fn bridges_allowed(&self) -> Vec<Address> {
        self.inner.read().state.bridges.bridges().to_vec()
    }

    fn validator_reward_percent(&self, pool: PoolId) -> BlockRewardResult<U256> {
        if !self.validator_set.is_validator(pool)? {
            return Ok(U256::zero());
        }
        let epoch = self.staking.staking_epoch()?;
        let inner = self.inner.read();
        let snapshot = inner.state.snapshots.get(epoch, pool);
        validator_reward_percent(
            inner.state.book.validator_min_reward_percent(epoch),
            snapshot.validator_staked,
            snapshot.total_staked,
            self.config.reward_percent_multiplier,
        )
    }

    fn reward_share_fraction(
        &self,
        epoch_end_block: BlockNumber,
    ) -> BlockRewardResult<RewardShareFraction> {
        self.fraction_for(epoch_end_block)
    }

    fn block_production_shares(
        &self,
        epoch: StakingEpoch,
        validators: &[PoolId],
    ) -> BlockRewardResult<(Vec<u64>, u64)> {
        let inner = self.inner.read();
        let plan = BlockClosePlan::default();
        let shares = self.shares_for(&inner.state, &plan, epoch, validators)?;
        Ok((shares.numerators, shares.denominator))
    }

    fn pool_rewards(
        &self,
        total: U256,
        epoch: StakingEpoch,
        validators: &[PoolId],
    ) -> BlockRewardResult<Vec<U256>> {
        let inner = self.inner.read();
        let plan = BlockClosePlan::default();
        let shares = self.shares_for(&inner.state, &plan, epoch, validators)?;
        pool_rewards(total, &shares)
    }

    fn validator_share(
        &self,
        epoch: StakingEpoch,
        validator_staked: U256,
        total_staked: U256,
        pool_reward: U256,
    ) -> BlockRewardResult<U256> {
        let min_percent = self.validator_min_reward_percent(epoch);
        validator_share(min_percent, validator_staked, total_staked, pool_reward)
    }

    fn delegator_share(
        &self,
        epoch: StakingEpoch,
        delegator_staked: U256,
        validator_staked: U256,
        total_staked: U256,
        pool_reward: U256,
    ) -> BlockRewardResult<U256> {
        let min_percent = self.validator_min_reward_percent(epoch);
        delegator_share(
            min_percent,
            delegator_staked,
            validator_staked,
            total_staked,
            pool_reward,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryStaking, InMemoryValidatorSet, RecordingRandomness};

    const SYSTEM: Address = [0xff; 20];
    const OWNER: Address = [0x01; 20];
    const VALIDATOR_SET: Address = [0x05; 20];
    const BRIDGE: Address = [0xbb; 20];

    type TestService =
        BlockRewardService<InMemoryValidatorSet, InMemoryStaking, RecordingRandomness>;

    fn service() -> (TestService, Arc<InMemoryValidatorSet>, Arc<InMemoryStaking>) {
        let validator_set = Arc::new(InMemoryValidatorSet::new(3));
        let staking = Arc::new(InMemoryStaking::new(1, 1, 10));
        let service = BlockRewardService::new(
            BlockRewardConfig::default(),
            validator_set.clone(),
            staking.clone(),
            Arc::new(RecordingRandomness::new()),
        )
        .unwrap();
        (service, validator_set, staking)
    }

    fn owner(block: BlockNumber) -> CallContext {
        CallContext::new(OWNER, block)
    }

    #[test]
    fn test_initialize_once() {
        let (service, _, _) = service();
        service.initialize(&owner(1), VALIDATOR_SET, None).unwrap();
        assert!(matches!(
            service.initialize(&owner(1), VALIDATOR_SET, None),
            Err(BlockRewardError::AlreadyInitialized)
        ));
        assert_eq!(service.take_events().len(), 1);
        assert!(service.take_events().is_empty());
    }

    #[test]
    fn test_initialize_rejects_zero_and_non_owner() {
        let (service, _, _) = service();
        assert!(matches!(
            service.initialize(&owner(1), [0u8; 20], None),
            Err(BlockRewardError::ZeroAddress { .. })
        ));
        let err = service
            .initialize(&CallContext::new(BRIDGE, 1), VALIDATOR_SET, None)
            .unwrap_err();
        assert!(err.is_authorization());
        assert!(!service.state().is_initialized());
    }

    #[test]
    fn test_initialize_records_min_reward_percent() {
        let validator_set = Arc::new(InMemoryValidatorSet::new(3));
        let staking = Arc::new(InMemoryStaking::new(3, 21, 30));
        let service: TestService = BlockRewardService::new(
            BlockRewardConfig::default(),
            validator_set,
            staking,
            Arc::new(RecordingRandomness::new()),
        )
        .unwrap();
        service.initialize(&owner(21), VALIDATOR_SET, None).unwrap();

        assert_eq!(service.validator_min_reward_percent(0), 20);
        assert_eq!(service.validator_min_reward_percent(3), 20);
        assert_eq!(service.validator_min_reward_percent(2), 0);

        // 10 of 100 staked by the validator: the 20% floor applies
        let pool_reward = U256::from(1000);
        let validator = service
            .validator_share(3, U256::from(10), U256::from(100), pool_reward)
            .unwrap();
        let delegator = service
            .delegator_share(3, U256::from(9), U256::from(10), U256::from(100), pool_reward)
            .unwrap();
        assert_eq!(validator, U256::from(200));
        assert_eq!(delegator, U256::from(80));
    }

    #[test]
    fn test_uninitialized_block_close_is_empty() {
        let (service, _, _) = service();
        let outcome = service
            .on_block_close(&CallContext::new(SYSTEM, 3), &[[0x11; 20]], &[0])
            .unwrap();
        assert!(outcome.is_empty());
        assert!(!service.state().extra_receivers.is_initialized());
    }

    #[test]
    fn test_bad_shapes_are_absorbed() {
        let (service, _, _) = service();
        service.initialize(&owner(1), VALIDATOR_SET, None).unwrap();
        let ctx = CallContext::new(SYSTEM, 3);
        assert!(service.on_block_close(&ctx, &[], &[]).unwrap().is_empty());
        assert!(service
            .on_block_close(&ctx, &[[1u8; 20], [2u8; 20]], &[0, 0])
            .unwrap()
            .is_empty());
        assert!(service
            .on_block_close(&ctx, &[[1u8; 20]], &[1])
            .unwrap()
            .is_empty());
        assert!(!service.state().extra_receivers.is_initialized());
    }

    #[test]
    fn test_bridge_fee_accumulates() {
        let (service, _, _) = service();
        service.set_bridges_allowed(&owner(1), &[BRIDGE]).unwrap();
        let bridge = CallContext::new(BRIDGE, 2);
        service
            .add_bridge_native_fee_receivers(&bridge, U256::from(30))
            .unwrap();
        service
            .add_bridge_native_fee_receivers(&bridge, U256::from(12))
            .unwrap();
        assert_eq!(service.bridge_native_reward(), U256::from(42));
        assert!(matches!(
            service.add_bridge_native_fee_receivers(&bridge, U256::zero()),
            Err(BlockRewardError::ZeroAmount)
        ));

        let events = service.take_events();
        assert!(matches!(
            events.last(),
            Some(BlockRewardEvent::BridgeNativeRewardAdded { cumulative, .. })
                if *cumulative == U256::from(42)
        ));
    }

    #[test]
    fn test_clear_blocks_created_requires_validator_set() {
        let (service, validator_set, _) = service();
        assert!(matches!(
            service.clear_blocks_created(&CallContext::new(VALIDATOR_SET, 2)),
            Err(BlockRewardError::NotInitialized)
        ));

        service.initialize(&owner(1), VALIDATOR_SET, None).unwrap();
        validator_set.add_pool(1, [0x11; 20], [0x21; 20]);
        validator_set.set_validators(vec![1]);
        validator_set.set_apply_block(1);
        service
            .on_block_close(&CallContext::new(SYSTEM, 2), &[[0x11; 20]], &[0])
            .unwrap();
        assert_eq!(service.blocks_created(1, 1), 1);

        assert!(service
            .clear_blocks_created(&CallContext::new(OWNER, 3))
            .unwrap_err()
            .is_authorization());
        service
            .clear_blocks_created(&CallContext::new(VALIDATOR_SET, 3))
            .unwrap();
        assert_eq!(service.blocks_created(1, 1), 0);
    }

    #[test]
    fn test_export_and_restore() {
        let (service, validator_set, staking) = service();
        service.initialize(&owner(1), VALIDATOR_SET, None).unwrap();
        service.set_bridges_allowed(&owner(1), &[BRIDGE]).unwrap();
        let bytes = service.export_state().unwrap();

        let restored = BlockRewardService::restore(
            BlockRewardConfig::default(),
            validator_set,
            staking,
            Arc::new(RecordingRandomness::new()),
            &bytes,
            None,
        )
        .unwrap();
        assert_eq!(restored.state(), service.state());
        assert_eq!(restored.bridges_allowed(), vec![BRIDGE]);
    }

    #[test]
    fn test_lossy_conversion() {
        assert_eq!(lossy(U256::from(5)), 5.0);
        assert_eq!(lossy(U256::MAX), f64::MAX);
    }
}
