//! # Block Reward Events
//!
//! Events emitted by the engine. They are buffered in the service and
//! drained by the host with `take_events()`.

use serde::{Deserialize, Serialize};
use shared_types::{Address, BlockNumber, PoolId, StakingEpoch, U256};

/// Events published by the block reward subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockRewardEvent {
    /// Engine wired to its validator set.
    Initialized {
        /// Validator-set collaborator address.
        validator_set: Address,
        /// Predecessor engine, if any.
        predecessor: Option<Address>,
    },

    /// Allowed bridge list replaced.
    BridgesAllowedSet {
        /// New allow-list.
        bridges: Vec<Address>,
    },

    /// Bridge fee accumulated into the next epoch's reward.
    BridgeNativeRewardAdded {
        /// Amount added.
        amount: U256,
        /// Accumulated bridge reward after the addition.
        cumulative: U256,
        /// Bridge that paid the fee.
        bridge: Address,
    },

    /// Extra receiver enqueued.
    ExtraReceiverAdded {
        /// Amount to mint.
        amount: U256,
        /// Receiving account.
        receiver: Address,
        /// Requesting bridge.
        bridge: Address,
    },

    /// Extra receiver drained and minted.
    NativeMinted {
        /// Amount minted.
        amount: U256,
        /// Receiving account.
        receiver: Address,
        /// Requesting bridge.
        bridge: Address,
        /// Block in which the mint happened.
        block: BlockNumber,
    },

    /// Epoch rewards committed to pools.
    EpochRewardsDistributed {
        /// Closed epoch.
        epoch: StakingEpoch,
        /// Total distributed to pools.
        distributed: U256,
        /// Carryover into the next epoch.
        undistributed: U256,
        /// Pools with a non-zero reward.
        rewarded_pools: Vec<PoolId>,
    },
}

impl BlockRewardEvent {
    /// Short event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialized { .. } => "Initialized",
            Self::BridgesAllowedSet { .. } => "BridgesAllowedSet",
            Self::BridgeNativeRewardAdded { .. } => "BridgeNativeRewardAdded",
            Self::ExtraReceiverAdded { .. } => "ExtraReceiverAdded",
            Self::NativeMinted { .. } => "NativeMinted",
            Self::EpochRewardsDistributed { .. } => "EpochRewardsDistributed",
        }
    }
}
