//! # Domain Value Objects
//!
//! Immutable value types exchanged between the engine, its algorithms and
//! the consensus engine.

use serde::{Deserialize, Serialize};
use shared_types::{Address, PoolId, StakingEpoch, U256};

/// Reward kind code supplied with each benefactor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardKind {
    /// Reward for the block author.
    BlockAuthor,
    /// Reward for an uncle block author.
    Uncle,
    /// Reward for an empty step.
    EmptyStep,
    /// Reward requested by an external contract.
    External,
}

impl RewardKind {
    /// Decode a consensus kind code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::BlockAuthor),
            1 => Some(Self::Uncle),
            2 => Some(Self::EmptyStep),
            3 => Some(Self::External),
            _ => None,
        }
    }
}

/// Stake amounts of one pool captured for one epoch.
///
/// A snapshot with zero `total_staked` is treated as absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeSnapshot {
    /// Validator self-stake plus all delegator stakes.
    pub total_staked: U256,
    /// Validator self-stake.
    pub validator_staked: U256,
}

impl StakeSnapshot {
    /// Create a snapshot.
    pub fn new(total_staked: U256, validator_staked: U256) -> Self {
        Self {
            total_staked,
            validator_staked,
        }
    }

    /// True once a non-zero total has been captured.
    pub fn is_taken(&self) -> bool {
        !self.total_staked.is_zero()
    }

    /// Stake held by delegators (never negative).
    pub fn delegators_staked(&self) -> U256 {
        self.total_staked.saturating_sub(self.validator_staked)
    }
}

/// Pending mint requested by a bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraReceiver {
    /// Amount of native coins to mint.
    pub amount: U256,
    /// Account receiving the coins.
    pub receiver: Address,
    /// Bridge that requested the mint.
    pub bridge: Address,
}

/// One mint instruction returned to the consensus engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeMint {
    /// Account to credit.
    pub receiver: Address,
    /// Amount to mint.
    pub amount: U256,
}

/// Result of a block close.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCloseOutcome {
    /// Mint instructions in order: drained extra receivers, then the
    /// engine's own distributed epoch reward (if any).
    pub mints: Vec<NativeMint>,
    /// Extra receiver drain limit applied to this block.
    pub extra_receivers_limit: usize,
    /// Epoch whose end block this was, if the block closed an epoch.
    pub closed_epoch: Option<StakingEpoch>,
}

impl BlockCloseOutcome {
    /// Outcome for a rejected or degenerate block close.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when nothing is to be minted.
    pub fn is_empty(&self) -> bool {
        self.mints.is_empty()
    }

    /// Split into parallel receiver/amount lists.
    pub fn into_parts(self) -> (Vec<Address>, Vec<U256>) {
        self.mints.into_iter().map(|m| (m.receiver, m.amount)).unzip()
    }
}

/// Fraction of the epoch reward eligible for distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardShareFraction {
    /// Blocks between real finalization and epoch end (inclusive).
    pub numerator: u64,
    /// Blocks between ideal finalization and epoch end (inclusive).
    pub denominator: u64,
}

impl RewardShareFraction {
    /// Nothing distributable (finalization never happened).
    pub const NONE: Self = Self {
        numerator: 0,
        denominator: 1,
    };

    /// True when nothing can be distributed.
    pub fn is_zero(&self) -> bool {
        self.numerator == 0 || self.denominator == 0
    }

    /// True when finalization was prompt.
    pub fn is_full(&self) -> bool {
        self.denominator != 0 && self.numerator == self.denominator
    }
}

/// Block production shares of the validators of one epoch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProductionShares {
    /// Per-validator numerators, aligned with the validator list.
    pub numerators: Vec<u64>,
    /// Sum of all numerators.
    pub denominator: u64,
}

/// Native reward planned for one epoch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeDistribution {
    /// Epoch being closed.
    pub epoch: StakingEpoch,
    /// Bridge reward + carryover + inflation.
    pub total_reward: U256,
    /// Part of `total_reward` eligible after the finalization penalty.
    pub reward_to_distribute: U256,
    /// Reward per validator pool (zero entries included).
    pub pool_rewards: Vec<(PoolId, U256)>,
    /// Sum of `pool_rewards`.
    pub distributed: U256,
    /// Carryover into the next epoch (`total_reward - distributed`).
    pub undistributed: U256,
}

impl NativeDistribution {
    /// True when the epoch had nothing to distribute at all.
    pub fn is_empty(&self) -> bool {
        self.total_reward.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_kind_codes() {
        assert_eq!(RewardKind::from_code(0), Some(RewardKind::BlockAuthor));
        assert_eq!(RewardKind::from_code(3), Some(RewardKind::External));
        assert_eq!(RewardKind::from_code(9), None);
    }

    #[test]
    fn test_snapshot_delegators_staked_saturates() {
        let snapshot = StakeSnapshot::new(U256::from(10), U256::from(30));
        assert_eq!(snapshot.delegators_staked(), U256::zero());
        assert!(snapshot.is_taken());
        assert!(!StakeSnapshot::default().is_taken());
    }

    #[test]
    fn test_outcome_into_parts() {
        let outcome = BlockCloseOutcome {
            mints: vec![
                NativeMint {
                    receiver: [1u8; 20],
                    amount: U256::from(5),
                },
                NativeMint {
                    receiver: [2u8; 20],
                    amount: U256::from(7),
                },
            ],
            extra_receivers_limit: 100,
            closed_epoch: None,
        };
        let (receivers, amounts) = outcome.into_parts();
        assert_eq!(receivers, vec![[1u8; 20], [2u8; 20]]);
        assert_eq!(amounts, vec![U256::from(5), U256::from(7)]);
    }

    #[test]
    fn test_fraction_flags() {
        assert!(RewardShareFraction::NONE.is_zero());
        let full = RewardShareFraction {
            numerator: 10,
            denominator: 10,
        };
        assert!(full.is_full());
        assert!(!full.is_zero());
    }
}
