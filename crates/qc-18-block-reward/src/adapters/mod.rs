//! Adapters for the Block Reward subsystem
//!
//! - in_memory: Validator set, staking, randomness and predecessor kept in memory
//! - inflation: Inflation policies

pub mod in_memory;
pub mod inflation;

pub use in_memory::{InMemoryStaking, InMemoryValidatorSet, RecordingRandomness, StaticPredecessor};
pub use inflation::{NoInflation, SnapshotStakeInflation, RATE_SCALE};
