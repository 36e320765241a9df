//! # QC-18 Block Reward
//!
//! Reward accounting for the proof-of-stake consensus engine.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Once per block the consensus engine calls `on_block_close`, which:
//! - credits block production to the author's pool
//! - at the epoch end block, distributes the epoch reward between pools,
//!   rotates the validator set and snapshots stake for the next epoch
//! - drains bridge-requested extra mints and updates the minting ledger
//!
//! and returns the `(receiver, amount)` list the engine must mint.
//!
//! ## Block Close Flow
//!
//! ```text
//!  consensus ──► on_block_close(ctx, [author], [kind])
//!                   │
//!                   ├─ caller == system? ─────────── no ──► Err(Unauthorized)
//!                   ├─ one author, kind 0, initialized? ── no ──► Ok(empty)
//!                   ├─ randomness.on_finish_collect_round()
//!                   ├─ plan: queue init + migration (first close)
//!                   │        block credit
//!                   │        epoch end? distribute, rotate, snapshot, limit = 0
//!                   │        drain ≤ limit, ledger updates
//!                   └─ commit plan ──► BlockCloseOutcome { mints, .. }
//! ```
//!
//! ## Reward Split
//!
//! | Step | Formula |
//! |------|---------|
//! | Epoch total | bridge fees + carryover + inflation |
//! | Distributable | total × real window / ideal window |
//! | Pool reward | distributable × blocks(pool) / blocks(all) |
//! | Validator | stake-proportional, at least `min_percent` |
//! | Delegators | stake-proportional, or the rest when clamped |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-block-reward/
//! ├── domain/          # Stores, engine state, block close plan, invariants
//! ├── algorithms/      # Reward share fraction, block shares, distribution, split
//! ├── ports/           # API trait + collaborator traits
//! ├── adapters/        # In-memory collaborators, inflation policies
//! ├── config.rs        # BlockRewardConfig
//! ├── events.rs        # BlockRewardEvent
//! ├── metrics.rs       # Optional Prometheus metrics
//! └── service.rs       # BlockRewardService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    InMemoryStaking, InMemoryValidatorSet, NoInflation, RecordingRandomness,
    SnapshotStakeInflation, StaticPredecessor,
};
pub use algorithms::{
    block_production_shares, delegator_share, plan_native_distribution, pool_rewards,
    reward_share_fraction, validator_reward_percent, validator_share, EpochRewardSources,
    FinalizationTiming, PoolProduction,
};
pub use config::BlockRewardConfig;
pub use domain::{
    BlockCloseOutcome, BlockProductionShares, ExtraReceiver, NativeDistribution, NativeMint,
    RewardEngineState, RewardKind, RewardShareFraction, StakeSnapshot,
};
pub use error::{BlockRewardError, BlockRewardResult, CallerRole};
pub use events::BlockRewardEvent;
pub use ports::{
    BlockRewardApi, InflationPolicy, PredecessorLedger, RandomnessGateway, StakingGateway,
    ValidatorSetGateway,
};
pub use service::BlockRewardService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
