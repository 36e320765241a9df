//! # Core Identifiers
//!
//! Fixed-width identifiers shared by the reward engine, its collaborators and
//! the simulation tooling.

// Re-export U256 from primitive-types for all native-coin amounts
pub use primitive_types::U256;

/// A 20-byte account address.
pub type Address = [u8; 20];

/// The all-zero address. Never a valid caller, receiver or bridge.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Height of a block in the chain.
pub type BlockNumber = u64;

/// Staking epoch number, assigned by the staking subsystem.
///
/// Epoch 0 is the bootstrap epoch and never pays rewards.
pub type StakingEpoch = u64;

/// Identifier of a validator/candidate pool, stable across epochs.
pub type PoolId = u64;

/// Returns true for the all-zero address.
pub fn is_zero_address(address: &Address) -> bool {
    *address == ZERO_ADDRESS
}

/// Shorten an address for log output (`0xabcd..ef01`).
pub fn short_address(address: &Address) -> String {
    format!(
        "0x{:02x}{:02x}..{:02x}{:02x}",
        address[0], address[1], address[18], address[19]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address() {
        assert!(is_zero_address(&ZERO_ADDRESS));
        assert!(!is_zero_address(&[1u8; 20]));
    }

    #[test]
    fn test_short_address() {
        let mut addr = [0u8; 20];
        addr[0] = 0xab;
        addr[19] = 0x01;
        assert_eq!(short_address(&addr), "0xab00..0001");
    }

    #[test]
    fn test_u256_reexport_roundtrip() {
        let amount = U256::from(1_000_000u64);
        let bytes = bincode::serialize(&amount).unwrap();
        let decoded: U256 = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, amount);
    }
}
