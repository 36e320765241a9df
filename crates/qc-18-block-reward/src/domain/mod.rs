//! Domain module for the Block Reward subsystem
//!
//! ## Stores
//! - snapshot_store: Write-once stake snapshots per (epoch, pool)
//! - extra_queue: FIFO of bridge-requested mints
//! - minting_ledger: Cumulative mint counters with staged updates
//! - bridge_allow_list: Owner-managed bridge registry
//! - reward_book: Block counters and committed pool rewards
//!
//! ## Engine
//! - state: Complete engine state
//! - plan: Staged writes of one block close
//! - invariants: Business rules

pub mod bridge_allow_list;
pub mod extra_queue;
pub mod invariants;
pub mod minting_ledger;
pub mod plan;
pub mod reward_book;
pub mod snapshot_store;
pub mod state;
pub mod value_objects;

pub use bridge_allow_list::BridgeAllowList;
pub use extra_queue::ExtraReceiverQueue;
pub use minting_ledger::{LedgerUpdate, MintingLedger};
pub use plan::{BlockClosePlan, BlockCredit};
pub use reward_book::RewardBook;
pub use snapshot_store::SnapshotStore;
pub use state::RewardEngineState;
pub use value_objects::{
    BlockCloseOutcome, BlockProductionShares, ExtraReceiver, NativeDistribution, NativeMint,
    RewardKind, RewardShareFraction, StakeSnapshot,
};
