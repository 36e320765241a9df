//! Error types for the Block Reward subsystem

use shared_types::{short_address, Address};
use std::fmt;
use thiserror::Error;

/// Role a privileged entry point is reserved for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallerRole {
    /// The consensus engine closing a block.
    System,
    /// The engine owner (admin surface).
    Owner,
    /// An allow-listed bridge.
    Bridge,
    /// The validator-set collaborator.
    ValidatorSet,
}

impl fmt::Display for CallerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::System => "system",
            Self::Owner => "owner",
            Self::Bridge => "bridge",
            Self::ValidatorSet => "validator-set",
        };
        f.write_str(name)
    }
}

/// Block reward errors
#[derive(Debug, Error)]
pub enum BlockRewardError {
    /// Caller does not hold the role required by the entry point
    #[error("Unauthorized caller {} for {role} entry point", short_address(.caller))]
    UnauthorizedCaller {
        /// Address that made the call
        caller: Address,
        /// Role the entry point requires
        role: CallerRole,
    },

    /// Amount must be non-zero
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// Address must be non-zero
    #[error("Zero address not allowed for {field}")]
    ZeroAddress {
        /// Name of the rejected argument
        field: &'static str,
    },

    /// Same bridge listed twice in an allow-list update
    #[error("Duplicate bridge address {}", short_address(.bridge))]
    DuplicateBridge {
        /// Bridge that appeared more than once
        bridge: Address,
    },

    /// Engine already initialized
    #[error("Engine already initialized")]
    AlreadyInitialized,

    /// Engine has no validator-set collaborator yet
    #[error("Engine not initialized")]
    NotInitialized,

    /// Extra receiver queue has not been set up by a block close yet
    #[error("Extra receiver queue not initialized")]
    QueueNotInitialized,

    /// Checked arithmetic overflowed (modeling invariant violation)
    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow {
        /// Computation that overflowed
        context: &'static str,
    },

    /// A computed result broke an accounting invariant
    #[error("Invariant violated: {invariant}")]
    InvariantViolation {
        /// Invariant that failed
        invariant: &'static str,
    },

    /// A collaborator call failed
    #[error("Collaborator failure: {reason}")]
    Collaborator {
        /// Failure reported by the collaborator
        reason: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// State could not be encoded or decoded
    #[error("State codec error: {reason}")]
    StateCodec {
        /// Underlying codec failure
        reason: String,
    },
}

impl BlockRewardError {
    /// Shorthand for an overflow in `context`.
    pub fn overflow(context: &'static str) -> Self {
        Self::ArithmeticOverflow { context }
    }

    /// Check if error is an authorization failure
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::UnauthorizedCaller { .. })
    }

    /// Check if error is a rejected input (caller may fix and retry)
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            Self::ZeroAmount
                | Self::ZeroAddress { .. }
                | Self::DuplicateBridge { .. }
                | Self::AlreadyInitialized
                | Self::NotInitialized
                | Self::QueueNotInitialized
        )
    }

    /// Check if error is fatal (block close must abort)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ArithmeticOverflow { .. }
                | Self::InvariantViolation { .. }
                | Self::Collaborator { .. }
        )
    }
}

/// Result type for block reward operations
pub type BlockRewardResult<T> = Result<T, BlockRewardError>;
