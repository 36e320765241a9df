//! # Stake Snapshot Store
//!
//! Per-epoch, per-pool stake amounts captured at the epoch boundary.
//! A key becomes immutable once a non-zero total has been recorded.

use super::value_objects::StakeSnapshot;
use serde::{Deserialize, Serialize};
use shared_types::{PoolId, StakingEpoch, U256};
use std::collections::BTreeMap;

/// Write-once store of stake snapshots keyed by `(epoch, pool)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStore {
    snapshots: BTreeMap<(StakingEpoch, PoolId), StakeSnapshot>,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot unless one is already taken for the key.
    ///
    /// Returns `true` if the snapshot was written. A zero total is never
    /// written, so the key stays absent and may be captured later.
    pub fn record(&mut self, epoch: StakingEpoch, pool: PoolId, snapshot: StakeSnapshot) -> bool {
        if !snapshot.is_taken() || self.is_taken(epoch, pool) {
            return false;
        }
        self.snapshots.insert((epoch, pool), snapshot);
        true
    }

    /// True if a non-zero snapshot exists for the key.
    pub fn is_taken(&self, epoch: StakingEpoch, pool: PoolId) -> bool {
        self.snapshots
            .get(&(epoch, pool))
            .is_some_and(StakeSnapshot::is_taken)
    }

    /// Snapshot for the key, or the zero snapshot if absent.
    pub fn get(&self, epoch: StakingEpoch, pool: PoolId) -> StakeSnapshot {
        self.snapshots
            .get(&(epoch, pool))
            .copied()
            .unwrap_or_default()
    }

    /// Captured total stake of `pool` in `epoch`.
    pub fn total_staked(&self, epoch: StakingEpoch, pool: PoolId) -> U256 {
        self.get(epoch, pool).total_staked
    }

    /// Captured validator self-stake of `pool` in `epoch`.
    pub fn validator_staked(&self, epoch: StakingEpoch, pool: PoolId) -> U256 {
        self.get(epoch, pool).validator_staked
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
