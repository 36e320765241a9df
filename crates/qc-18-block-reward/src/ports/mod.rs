//! Ports module for the Block Reward subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::BlockRewardApi;
pub use outbound::{
    InflationPolicy, PredecessorLedger, RandomnessGateway, StakingGateway, ValidatorSetGateway,
};
