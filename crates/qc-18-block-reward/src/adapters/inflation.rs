//! Inflation policies

use crate::domain::SnapshotStore;
use crate::error::{BlockRewardError, BlockRewardResult};
use crate::ports::outbound::InflationPolicy;
use shared_types::{PoolId, StakingEpoch, U256};

/// Fixed-point scale of [`SnapshotStakeInflation`] rates (1.0 = 10^18).
pub const RATE_SCALE: u64 = 1_000_000_000_000_000_000;

/// No inflation: the epoch total is bridge fees plus carryover.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInflation;

impl InflationPolicy for NoInflation {
    fn inflation_amount(
        &self,
        _epoch: StakingEpoch,
        _validators: &[PoolId],
        _snapshots: &SnapshotStore,
    ) -> BlockRewardResult<U256> {
        Ok(U256::zero())
    }
}

/// Per-epoch rate applied to the validators' snapshotted total stake.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotStakeInflation {
    rate_per_epoch: U256,
}

impl SnapshotStakeInflation {
    /// Rate in `RATE_SCALE` fixed point (e.g. `RATE_SCALE / 100` = 1%).
    pub fn new(rate_per_epoch: U256) -> Self {
        Self { rate_per_epoch }
    }

    /// Rate expressed in basis points.
    pub fn from_basis_points(bps: u64) -> Self {
        Self::new(U256::from(RATE_SCALE) * U256::from(bps) / U256::from(10_000u64))
    }
}

impl InflationPolicy for SnapshotStakeInflation {
    fn inflation_amount(
        &self,
        epoch: StakingEpoch,
        validators: &[PoolId],
        snapshots: &SnapshotStore,
    ) -> BlockRewardResult<U256> {
        let staked = validators
            .iter()
            .try_fold(U256::zero(), |acc, pool| {
                acc.checked_add(snapshots.total_staked(epoch, *pool))
            })
            .ok_or_else(|| BlockRewardError::overflow("inflation stake sum"))?;
        staked
            .checked_mul(self.rate_per_epoch)
            .map(|product| product / U256::from(RATE_SCALE))
            .ok_or_else(|| BlockRewardError::overflow("inflation amount"))
    }
}
