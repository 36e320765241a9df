//! # `CallContext` Envelope
//!
//! Every engine entry point receives a `CallContext` describing who is
//! calling and at which block. Privileged operations check the caller
//! against an injected role address, never against ambient global state.

use serde::{Deserialize, Serialize};

use crate::entities::{Address, BlockNumber};

/// Caller identity and chain position for a single engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// The address invoking the entry point. Sole source of identity.
    pub caller: Address,
    /// Number of the block the call executes in.
    pub block_number: BlockNumber,
}

impl CallContext {
    /// Create a new call context.
    pub fn new(caller: Address, block_number: BlockNumber) -> Self {
        Self {
            caller,
            block_number,
        }
    }

    /// Returns true if the caller matches `expected`.
    #[must_use]
    pub fn is_caller(&self, expected: &Address) -> bool {
        self.caller == *expected
    }
}
