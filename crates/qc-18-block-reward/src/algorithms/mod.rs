//! # Algorithms Module
//!
//! Pure reward math of the block reward subsystem. Nothing here reads or
//! writes engine state; the service gathers the inputs.

pub mod block_shares;
pub mod distribution;
pub mod reward_share;
pub mod stake_split;

pub use block_shares::{block_production_shares, PoolProduction};
pub use distribution::{eligible_reward, plan_native_distribution, pool_rewards, EpochRewardSources};
pub use reward_share::{reward_share_fraction, FinalizationTiming};
pub use stake_split::{delegator_share, validator_reward_percent, validator_share};
