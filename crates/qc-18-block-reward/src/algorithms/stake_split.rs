//! # Validator / Delegator Split
//!
//! Splits a pool's reward by stake, but guarantees the validator at least
//! `min_percent` of it. When the guarantee applies, the remaining
//! `100 - min_percent` is split among delegators only.

use crate::error::{BlockRewardError, BlockRewardResult};
use shared_types::U256;

const HUNDRED: u64 = 100;

fn mul(a: U256, b: U256, context: &'static str) -> BlockRewardResult<U256> {
    a.checked_mul(b)
        .ok_or_else(|| BlockRewardError::overflow(context))
}

/// True if the validator's stake already earns more than `min_percent`.
///
/// `validator_staked * (100 - min) > delegators_staked * min`
fn exceeds_minimum(
    validator_staked: U256,
    total_staked: U256,
    min_percent: u64,
) -> BlockRewardResult<bool> {
    let delegators_staked = total_staked.saturating_sub(validator_staked);
    let validator_side = mul(
        validator_staked,
        U256::from(HUNDRED.saturating_sub(min_percent)),
        "validator weight",
    )?;
    let delegator_side = mul(delegators_staked, U256::from(min_percent), "delegator weight")?;
    Ok(validator_side > delegator_side)
}

/// Validator's part of `pool_reward`.
pub fn validator_share(
    min_percent: u64,
    validator_staked: U256,
    total_staked: U256,
    pool_reward: U256,
) -> BlockRewardResult<U256> {
    if validator_staked.is_zero() || total_staked.is_zero() {
        return Ok(U256::zero());
    }
    if exceeds_minimum(validator_staked, total_staked, min_percent)? {
        Ok(mul(pool_reward, validator_staked, "validator share")? / total_staked)
    } else {
        Ok(mul(pool_reward, U256::from(min_percent), "validator share")? / U256::from(HUNDRED))
    }
}

/// One delegator's part of `pool_reward`.
pub fn delegator_share(
    min_percent: u64,
    delegator_staked: U256,
    validator_staked: U256,
    total_staked: U256,
    pool_reward: U256,
) -> BlockRewardResult<U256> {
    if delegator_staked.is_zero() || validator_staked.is_zero() || total_staked.is_zero() {
        return Ok(U256::zero());
    }
    if exceeds_minimum(validator_staked, total_staked, min_percent)? {
        return Ok(mul(pool_reward, delegator_staked, "delegator share")? / total_staked);
    }

    let delegators_staked = total_staked.saturating_sub(validator_staked);
    if delegators_staked.is_zero() {
        return Ok(U256::zero());
    }
    let numerator = mul(
        mul(pool_reward, delegator_staked, "delegator share")?,
        U256::from(HUNDRED.saturating_sub(min_percent)),
        "delegator share",
    )?;
    let denominator = mul(delegators_staked, U256::from(HUNDRED), "delegator share")?;
    Ok(numerator / denominator)
}

/// Validator's effective share of its pool's reward, scaled by `multiplier`
/// (`multiplier` = 100%).
pub fn validator_reward_percent(
    min_percent: u64,
    validator_staked: U256,
    total_staked: U256,
    multiplier: u64,
) -> BlockRewardResult<U256> {
    if total_staked.is_zero() {
        return Ok(U256::zero());
    }
    let multiplier = U256::from(multiplier);
    if exceeds_minimum(validator_staked, total_staked, min_percent)? {
        let scaled = mul(multiplier, validator_staked, "validator reward percent")?;
        Ok(mul(scaled, U256::from(HUNDRED), "validator reward percent")? / total_staked)
    } else {
        mul(multiplier, U256::from(min_percent), "validator reward percent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(n: u64) -> U256 {
        U256::from(n)
    }

    #[test]
    fn test_clamped_split() {
        assert_eq!(validator_share(20, u(10), u(100), u(1000)).unwrap(), u(200));
        assert_eq!(delegator_share(20, u(9), u(10), u(100), u(1000)).unwrap(), u(80));
    }

    #[test]
    fn test_proportional_split() {
        assert_eq!(validator_share(20, u(60), u(100), u(1000)).unwrap(), u(600));
        assert_eq!(delegator_share(20, u(10), u(60), u(100), u(1000)).unwrap(), u(100));
    }

    #[test]
    fn test_boundary_is_clamped() {
        // 20 * 80 == 80 * 20: not strictly greater, so the minimum applies
        assert_eq!(validator_share(20, u(20), u(100), u(1000)).unwrap(), u(200));
        assert_eq!(delegator_share(20, u(40), u(20), u(100), u(1000)).unwrap(), u(400));
    }

    #[test]
    fn test_degenerate_stakes() {
        assert_eq!(validator_share(20, u(0), u(100), u(1000)).unwrap(), u(0));
        assert_eq!(validator_share(20, u(10), u(0), u(1000)).unwrap(), u(0));
        assert_eq!(delegator_share(20, u(0), u(10), u(100), u(1000)).unwrap(), u(0));
        assert_eq!(delegator_share(20, u(5), u(0), u(100), u(1000)).unwrap(), u(0));
        assert_eq!(delegator_share(20, u(5), u(10), u(0), u(1000)).unwrap(), u(0));
    }

    #[test]
    fn test_validator_only_pool_takes_everything() {
        assert_eq!(validator_share(20, u(50), u(50), u(999)).unwrap(), u(999));
    }

    #[test]
    fn test_validator_reward_percent() {
        assert_eq!(
            validator_reward_percent(20, u(60), u(100), 1_000_000).unwrap(),
            u(60_000_000)
        );
        assert_eq!(
            validator_reward_percent(20, u(10), u(100), 1_000_000).unwrap(),
            u(20_000_000)
        );
        assert_eq!(validator_reward_percent(20, u(10), u(0), 1_000_000).unwrap(), u(0));
    }

    #[test]
    fn test_overflow_is_reported() {
        let result = validator_share(20, U256::MAX, U256::MAX, U256::MAX);
        assert!(matches!(
            result,
            Err(BlockRewardError::ArithmeticOverflow { .. })
        ));
    }
}
