//! # Block Production Shares
//!
//! Each validator's share of the epoch reward is its block count, provided
//! it was snapshotted with a non-zero self-stake and is not banned.

use crate::domain::BlockProductionShares;
use crate::error::{BlockRewardError, BlockRewardResult};
use serde::{Deserialize, Serialize};
use shared_types::U256;

/// Per-validator input for share computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolProduction {
    /// Blocks created during the epoch.
    pub blocks_created: u64,
    /// Snapshotted validator self-stake for the epoch.
    pub validator_staked: U256,
    /// Whether the validator is currently banned.
    pub banned: bool,
}

impl PoolProduction {
    /// Share numerator of this validator.
    pub fn share(&self) -> u64 {
        if self.validator_staked.is_zero() || self.banned {
            0
        } else {
            self.blocks_created
        }
    }
}

/// Compute the block production shares of an epoch's validators.
pub fn block_production_shares(
    pools: &[PoolProduction],
) -> BlockRewardResult<BlockProductionShares> {
    let numerators: Vec<u64> = pools.iter().map(PoolProduction::share).collect();
    let denominator = numerators
        .iter()
        .try_fold(0u64, |acc, n| acc.checked_add(*n))
        .ok_or_else(|| BlockRewardError::overflow("block share denominator"))?;

    Ok(BlockProductionShares {
        numerators,
        denominator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(blocks: u64, stake: u64, banned: bool) -> PoolProduction {
        PoolProduction {
            blocks_created: blocks,
            validator_staked: U256::from(stake),
            banned,
        }
    }

    #[test]
    fn test_shares_follow_block_counts() {
        let shares = block_production_shares(&[pool(3, 10, false), pool(1, 10, false)]).unwrap();
        assert_eq!(shares.numerators, vec![3, 1]);
        assert_eq!(shares.denominator, 4);
    }

    #[test]
    fn test_unsnapshotted_and_banned_get_nothing() {
        let shares = block_production_shares(&[
            pool(5, 0, false),
            pool(7, 10, true),
            pool(2, 10, false),
        ])
        .unwrap();
        assert_eq!(shares.numerators, vec![0, 0, 2]);
        assert_eq!(shares.denominator, 2);
    }

    #[test]
    fn test_no_validators() {
        let shares = block_production_shares(&[]).unwrap();
        assert!(shares.numerators.is_empty());
        assert_eq!(shares.denominator, 0);
    }

    #[test]
    fn test_denominator_overflow() {
        let result = block_production_shares(&[pool(u64::MAX, 1, false), pool(1, 1, false)]);
        assert!(matches!(
            result,
            Err(BlockRewardError::ArithmeticOverflow { .. })
        ));
    }
}
