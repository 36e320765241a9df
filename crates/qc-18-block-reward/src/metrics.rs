//! # Block Reward Metrics
//!
//! Prometheus metrics for monitoring reward accounting.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-block-reward = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `block_reward_blocks_credited_total` - Counter of block production credits
//! - `block_reward_epochs_distributed_total` - Counter of epoch distributions
//! - `block_reward_extra_receivers_enqueued_total` - Counter of enqueued extra receivers
//! - `block_reward_extra_receivers_drained_total` - Counter of drained extra receivers
//! - `block_reward_minted_total` - Counter of native coins minted (lossy f64)
//! - `block_reward_extra_queue_size` - Gauge of pending extra receivers
//! - `block_reward_undistributed` - Gauge of the carryover (lossy f64)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter, register_gauge, register_int_counter, Counter, Gauge, IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Blocks credited to validator pools
    pub static ref BLOCKS_CREDITED: IntCounter = register_int_counter!(
        "block_reward_blocks_credited_total",
        "Total number of block production credits"
    )
    .expect("Failed to create BLOCKS_CREDITED metric");

    /// Epochs whose reward was distributed
    pub static ref EPOCHS_DISTRIBUTED: IntCounter = register_int_counter!(
        "block_reward_epochs_distributed_total",
        "Total number of epoch reward distributions"
    )
    .expect("Failed to create EPOCHS_DISTRIBUTED metric");

    /// Extra receivers enqueued by bridges
    pub static ref EXTRA_ENQUEUED: IntCounter = register_int_counter!(
        "block_reward_extra_receivers_enqueued_total",
        "Total number of extra receivers enqueued"
    )
    .expect("Failed to create EXTRA_ENQUEUED metric");

    /// Extra receivers drained into mints
    pub static ref EXTRA_DRAINED: IntCounter = register_int_counter!(
        "block_reward_extra_receivers_drained_total",
        "Total number of extra receivers drained"
    )
    .expect("Failed to create EXTRA_DRAINED metric");

    /// Native coins minted
    pub static ref MINTED: Counter = register_counter!(
        "block_reward_minted_total",
        "Total native coins minted through the engine"
    )
    .expect("Failed to create MINTED metric");

    /// Pending extra receivers
    pub static ref QUEUE_SIZE: Gauge = register_gauge!(
        "block_reward_extra_queue_size",
        "Number of pending extra receivers"
    )
    .expect("Failed to create QUEUE_SIZE metric");

    /// Carryover into the next epoch
    pub static ref UNDISTRIBUTED: Gauge = register_gauge!(
        "block_reward_undistributed",
        "Native reward carried into the next epoch"
    )
    .expect("Failed to create UNDISTRIBUTED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a block production credit
#[cfg(feature = "metrics")]
pub fn record_block_credited() {
    BLOCKS_CREDITED.inc();
}

/// Record an epoch distribution with its carryover
#[cfg(feature = "metrics")]
pub fn record_epoch_distributed(undistributed: f64) {
    EPOCHS_DISTRIBUTED.inc();
    UNDISTRIBUTED.set(undistributed);
}

/// Record an enqueued extra receiver
#[cfg(feature = "metrics")]
pub fn record_extra_enqueued() {
    EXTRA_ENQUEUED.inc();
}

/// Record drained extra receivers
#[cfg(feature = "metrics")]
pub fn record_extra_drained(count: u64) {
    EXTRA_DRAINED.inc_by(count);
}

/// Record native coins minted
#[cfg(feature = "metrics")]
pub fn record_minted(amount: f64) {
    MINTED.inc_by(amount);
}

/// Update the queue size gauge
#[cfg(feature = "metrics")]
pub fn set_queue_size(size: u64) {
    QUEUE_SIZE.set(size as f64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_block_credited() {}

#[cfg(not(feature = "metrics"))]
pub fn record_epoch_distributed(_undistributed: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_extra_enqueued() {}

#[cfg(not(feature = "metrics"))]
pub fn record_extra_drained(_count: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_minted(_amount: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn set_queue_size(_size: u64) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_noop_when_disabled() {
        record_block_credited();
        record_epoch_distributed(3.0);
        record_extra_enqueued();
        record_extra_drained(2);
        record_minted(100.0);
        set_queue_size(4);
    }
}
