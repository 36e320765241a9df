//! Bridge allow-list

use crate::error::{BlockRewardError, BlockRewardResult};
use serde::{Deserialize, Serialize};
use shared_types::{is_zero_address, Address};

/// Addresses permitted to call bridge-only entry points.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeAllowList {
    bridges: Vec<Address>,
}

impl BridgeAllowList {
    /// Create an empty allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list. The previous allowance is cleared first; on a
    /// rejected input the list is left unchanged.
    pub fn replace(&mut self, bridges: &[Address]) -> BlockRewardResult<()> {
        for (i, bridge) in bridges.iter().enumerate() {
            if is_zero_address(bridge) {
                return Err(BlockRewardError::ZeroAddress { field: "bridge" });
            }
            if bridges[..i].contains(bridge) {
                return Err(BlockRewardError::DuplicateBridge { bridge: *bridge });
            }
        }
        self.bridges.clear();
        self.bridges.extend_from_slice(bridges);
        Ok(())
    }

    /// True if `address` is allowed.
    pub fn is_allowed(&self, address: &Address) -> bool {
        self.bridges.contains(address)
    }

    /// Allowed bridges in insertion order.
    pub fn bridges(&self) -> &[Address] {
        &self.bridges
    }
}
