//! # Engine State
//!
//! All state exclusively owned by the reward engine, serializable as a whole
//! so a host can keep it in durable storage.

use super::bridge_allow_list::BridgeAllowList;
use super::extra_queue::ExtraReceiverQueue;
use super::minting_ledger::MintingLedger;
use super::reward_book::RewardBook;
use super::snapshot_store::SnapshotStore;
use crate::error::{BlockRewardError, BlockRewardResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, U256};

/// Complete reward engine state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEngineState {
    /// Validator-set collaborator address, set once by `initialize`.
    pub validator_set_address: Option<Address>,
    /// Predecessor engine whose minting totals are migrated once.
    pub predecessor_address: Option<Address>,
    /// Stake snapshots per `(epoch, pool)`.
    pub snapshots: SnapshotStore,
    /// Pending bridge mints.
    pub extra_receivers: ExtraReceiverQueue,
    /// Cumulative mint counters.
    pub ledger: MintingLedger,
    /// Allowed bridges.
    pub bridges: BridgeAllowList,
    /// Block counters and committed pool rewards.
    pub book: RewardBook,
    /// Fee reward accumulated from bridges since the last distribution.
    pub bridge_native_reward: U256,
    /// Dust carried into the next epoch's total.
    pub native_reward_undistributed: U256,
    /// Reward handed to pools at the last epoch close.
    pub last_distributed_reward: U256,
}

impl RewardEngineState {
    /// Create a fresh, uninitialized state.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the validator-set collaborator is known.
    pub fn is_initialized(&self) -> bool {
        self.validator_set_address.is_some()
    }

    /// Encode with bincode.
    pub fn encode(&self) -> BlockRewardResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| BlockRewardError::StateCodec {
            reason: e.to_string(),
        })
    }

    /// Decode from bincode.
    pub fn decode(bytes: &[u8]) -> BlockRewardResult<Self> {
        bincode::deserialize(bytes).map_err(|e| BlockRewardError::StateCodec {
            reason: e.to_string(),
        })
    }
}
