//! Configuration types for the block reward engine

use crate::domain::invariants::invariant_valid_percent;
use crate::error::{BlockRewardError, BlockRewardResult};
use serde::{Deserialize, Deserializer};
use shared_types::{is_zero_address, Address};
use tracing::{info, warn};

/// Entries drained from the extra receiver queue per regular block.
pub const DEFAULT_EXTRA_RECEIVERS_LIMIT: usize = 100;

/// Minimum share of a pool's reward guaranteed to its validator.
pub const DEFAULT_VALIDATOR_MIN_REWARD_PERCENT: u64 = 20;

/// Fixed-point scale for `validator_reward_percent` results.
pub const DEFAULT_REWARD_PERCENT_MULTIPLIER: u64 = 1_000_000;

/// Runtime configuration for the reward engine
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BlockRewardConfig {
    /// Address of the consensus engine allowed to close blocks
    #[serde(deserialize_with = "deserialize_hex_address")]
    pub system_address: Address,

    /// Owner allowed to use the admin surface
    #[serde(deserialize_with = "deserialize_hex_address")]
    pub owner_address: Address,

    /// Address receiving the per-epoch distributed native reward
    #[serde(deserialize_with = "deserialize_hex_address")]
    pub engine_address: Address,

    /// Extra receivers drained per non-rotation block
    pub extra_receivers_limit: usize,

    /// Minimum validator reward percent recorded for every epoch
    pub validator_min_reward_percent: u64,

    /// Scale applied to `validator_reward_percent` results
    pub reward_percent_multiplier: u64,
}

impl Default for BlockRewardConfig {
    fn default() -> Self {
        Self {
            system_address: [0xff; 20],
            owner_address: [0x01; 20],
            engine_address: [0x02; 20],
            extra_receivers_limit: DEFAULT_EXTRA_RECEIVERS_LIMIT,
            validator_min_reward_percent: DEFAULT_VALIDATOR_MIN_REWARD_PERCENT,
            reward_percent_multiplier: DEFAULT_REWARD_PERCENT_MULTIPLIER,
        }
    }
}

impl BlockRewardConfig {
    /// Parse a JSON configuration document. Missing fields keep defaults.
    pub fn from_json_str(json: &str) -> BlockRewardResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BlockRewardError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `QC_REWARD_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        if let Some(address) = env_address("QC_REWARD_SYSTEM_ADDRESS") {
            self.system_address = address;
            info!("[qc-18] Loaded system address from environment");
        }
        if let Some(address) = env_address("QC_REWARD_OWNER_ADDRESS") {
            self.owner_address = address;
            info!("[qc-18] Loaded owner address from environment");
        }
        if let Some(address) = env_address("QC_REWARD_ENGINE_ADDRESS") {
            self.engine_address = address;
        }
        if let Ok(limit) = std::env::var("QC_REWARD_EXTRA_LIMIT") {
            match limit.parse() {
                Ok(l) => self.extra_receivers_limit = l,
                Err(_) => warn!("[qc-18] QC_REWARD_EXTRA_LIMIT is not a number: {}", limit),
            }
        }
        if let Ok(percent) = std::env::var("QC_REWARD_MIN_PERCENT") {
            match percent.parse() {
                Ok(p) => self.validator_min_reward_percent = p,
                Err(_) => warn!("[qc-18] QC_REWARD_MIN_PERCENT is not a number: {}", percent),
            }
        }
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> BlockRewardResult<()> {
        for (field, address) in [
            ("system_address", &self.system_address),
            ("owner_address", &self.owner_address),
            ("engine_address", &self.engine_address),
        ] {
            if is_zero_address(address) {
                return Err(BlockRewardError::ZeroAddress { field });
            }
        }
        if !invariant_valid_percent(self.validator_min_reward_percent) {
            return Err(BlockRewardError::InvalidConfig(format!(
                "validator_min_reward_percent must be <= 100, got {}",
                self.validator_min_reward_percent
            )));
        }
        if self.reward_percent_multiplier == 0 {
            return Err(BlockRewardError::InvalidConfig(
                "reward_percent_multiplier must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a 20-byte hex address (with or without `0x`).
pub fn parse_address(value: &str) -> Option<Address> {
    let bytes = hex::decode(value.trim().trim_start_matches("0x")).ok()?;
    bytes.try_into().ok()
}

fn deserialize_hex_address<'de, D>(deserializer: D) -> Result<Address, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_address(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid address: {}", value)))
}

fn env_address(key: &str) -> Option<Address> {
    let value = std::env::var(key).ok()?;
    let parsed = parse_address(&value);
    if parsed.is_none() {
        warn!("[qc-18] {} must be a 20-byte hex address", key);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BlockRewardConfig::default();
        assert_eq!(config.extra_receivers_limit, 100);
        assert_eq!(config.validator_min_reward_percent, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_keeps_defaults() {
        let config = BlockRewardConfig::from_json_str(r#"{"extra_receivers_limit": 7}"#).unwrap();
        assert_eq!(config.extra_receivers_limit, 7);
        assert_eq!(
            config.validator_min_reward_percent,
            DEFAULT_VALIDATOR_MIN_REWARD_PERCENT
        );
    }

    #[test]
    fn test_from_json_hex_addresses() {
        let json = r#"{"system_address": "0x0000000000000000000000000000000000000abc"}"#;
        let config = BlockRewardConfig::from_json_str(json).unwrap();
        assert_eq!(config.system_address[18], 0x0a);
        assert_eq!(config.system_address[19], 0xbc);
    }

    #[test]
    fn test_invalid_percent_rejected() {
        let result = BlockRewardConfig::from_json_str(r#"{"validator_min_reward_percent": 101}"#);
        assert!(matches!(result, Err(BlockRewardError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_system_address_rejected() {
        let config = BlockRewardConfig {
            system_address: [0u8; 20],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BlockRewardError::ZeroAddress {
                field: "system_address"
            })
        ));
    }

    #[test]
    fn test_parse_address() {
        let parsed = parse_address("0x0102030405060708090a0b0c0d0e0f1011121314").unwrap();
        assert_eq!(parsed[0], 0x01);
        assert_eq!(parsed[19], 0x14);
        assert!(parse_address("0x1234").is_none());
        assert!(parse_address("zz02030405060708090a0b0c0d0e0f1011121314").is_none());
    }
}
