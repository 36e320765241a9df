//! # Minting Ledger
//!
//! Monotonic counters of minted native coins. Writes go through a staged
//! [`LedgerUpdate`]: every addition is overflow-checked while staging, and
//! applying the update can no longer fail.

use super::value_objects::ExtraReceiver;
use crate::error::{BlockRewardError, BlockRewardResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, BlockNumber, U256};
use std::collections::BTreeMap;

/// Cumulative mint counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintingLedger {
    minted_totally: U256,
    by_bridge: BTreeMap<Address, U256>,
    for_account: BTreeMap<Address, U256>,
    for_account_in_block: BTreeMap<(Address, BlockNumber), U256>,
    in_block: BTreeMap<BlockNumber, U256>,
}

impl MintingLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total minted across all time.
    pub fn minted_totally(&self) -> U256 {
        self.minted_totally
    }

    /// Total minted on behalf of `bridge`.
    pub fn minted_totally_by_bridge(&self, bridge: &Address) -> U256 {
        self.by_bridge.get(bridge).copied().unwrap_or_default()
    }

    /// Total minted to `account`.
    pub fn minted_for_account(&self, account: &Address) -> U256 {
        self.for_account.get(account).copied().unwrap_or_default()
    }

    /// Total minted to `account` within `block`.
    pub fn minted_for_account_in_block(&self, account: &Address, block: BlockNumber) -> U256 {
        self.for_account_in_block
            .get(&(*account, block))
            .copied()
            .unwrap_or_default()
    }

    /// Total minted within `block`.
    pub fn minted_in_block(&self, block: BlockNumber) -> U256 {
        self.in_block.get(&block).copied().unwrap_or_default()
    }

    /// Apply a staged update.
    pub fn apply(&mut self, update: LedgerUpdate) {
        if let Some(total) = update.minted_totally {
            self.minted_totally = total;
        }
        self.by_bridge.extend(update.by_bridge);
        self.for_account.extend(update.for_account);
        self.for_account_in_block.extend(update.for_account_in_block);
        self.in_block.extend(update.in_block);
    }
}

/// Staged ledger writes holding the resulting absolute counter values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerUpdate {
    minted_totally: Option<U256>,
    by_bridge: BTreeMap<Address, U256>,
    for_account: BTreeMap<Address, U256>,
    for_account_in_block: BTreeMap<(Address, BlockNumber), U256>,
    in_block: BTreeMap<BlockNumber, U256>,
}

impl LedgerUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage the one-time copy of a predecessor's totals.
    ///
    /// Overwrites the staged totals, so it must be staged before any mint.
    pub fn add_migration(&mut self, minted_totally: U256, by_bridge: &[(Address, U256)]) {
        self.minted_totally = Some(minted_totally);
        for (bridge, amount) in by_bridge {
            self.by_bridge.insert(*bridge, *amount);
        }
    }

    /// Stage the counters for one drained extra receiver.
    pub fn add_mint(
        &mut self,
        ledger: &MintingLedger,
        block: BlockNumber,
        entry: &ExtraReceiver,
    ) -> BlockRewardResult<()> {
        let amount = entry.amount;

        let total = self.minted_totally.unwrap_or(ledger.minted_totally);
        let total = checked(total, amount, "minted totally")?;

        let bridge = staged(&self.by_bridge, &entry.bridge, || {
            ledger.minted_totally_by_bridge(&entry.bridge)
        });
        let bridge = checked(bridge, amount, "minted by bridge")?;

        let account = staged(&self.for_account, &entry.receiver, || {
            ledger.minted_for_account(&entry.receiver)
        });
        let account = checked(account, amount, "minted for account")?;

        let key = (entry.receiver, block);
        let account_in_block = staged(&self.for_account_in_block, &key, || {
            ledger.minted_for_account_in_block(&entry.receiver, block)
        });
        let account_in_block = checked(account_in_block, amount, "minted for account in block")?;

        let in_block = staged(&self.in_block, &block, || ledger.minted_in_block(block));
        let in_block = checked(in_block, amount, "minted in block")?;

        self.minted_totally = Some(total);
        self.by_bridge.insert(entry.bridge, bridge);
        self.for_account.insert(entry.receiver, account);
        self.for_account_in_block.insert(key, account_in_block);
        self.in_block.insert(block, in_block);
        Ok(())
    }
}

fn staged<K: Ord>(map: &BTreeMap<K, U256>, key: &K, current: impl FnOnce() -> U256) -> U256 {
    map.get(key).copied().unwrap_or_else(current)
}

fn checked(value: U256, amount: U256, context: &'static str) -> BlockRewardResult<U256> {
    value
        .checked_add(amount)
        .ok_or_else(|| BlockRewardError::overflow(context))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRIDGE: Address = [0xbb; 20];
    const ALICE: Address = [0x0a; 20];
    const BOB: Address = [0x0b; 20];

    fn mint(receiver: Address, amount: u64) -> ExtraReceiver {
        ExtraReceiver {
            amount: U256::from(amount),
            receiver,
            bridge: BRIDGE,
        }
    }

    #[test]
    fn test_staged_mints_update_all_counters() {
        let mut ledger = MintingLedger::new();
        let mut update = LedgerUpdate::new();
        update.add_mint(&ledger, 10, &mint(ALICE, 5)).unwrap();
        update.add_mint(&ledger, 10, &mint(BOB, 7)).unwrap();
        update.add_mint(&ledger, 10, &mint(ALICE, 1)).unwrap();

        ledger.apply(update);
        assert_eq!(ledger.minted_totally(), U256::from(13));
        assert_eq!(ledger.minted_totally_by_bridge(&BRIDGE), U256::from(13));
        assert_eq!(ledger.minted_for_account(&ALICE), U256::from(6));
        assert_eq!(ledger.minted_for_account_in_block(&ALICE, 10), U256::from(6));
        assert_eq!(ledger.minted_in_block(10), U256::from(13));
        assert_eq!(ledger.minted_in_block(11), U256::zero());
    }

    #[test]
    fn test_counters_accumulate_across_updates() {
        let mut ledger = MintingLedger::new();
        for block in [1, 2] {
            let mut update = LedgerUpdate::new();
            update.add_mint(&ledger, block, &mint(ALICE, 4)).unwrap();
            ledger.apply(update);
        }
        assert_eq!(ledger.minted_for_account(&ALICE), U256::from(8));
        assert_eq!(ledger.minted_for_account_in_block(&ALICE, 2), U256::from(4));
    }

    #[test]
    fn test_migration_precedes_mints() {
        let mut ledger = MintingLedger::new();
        let mut update = LedgerUpdate::new();
        update.add_migration(U256::from(1_000), &[(BRIDGE, U256::from(600))]);
        update.add_mint(&ledger, 3, &mint(ALICE, 10)).unwrap();
        ledger.apply(update);

        assert_eq!(ledger.minted_totally(), U256::from(1_010));
        assert_eq!(ledger.minted_totally_by_bridge(&BRIDGE), U256::from(610));
    }

    #[test]
    fn test_overflow_leaves_ledger_untouched() {
        let mut ledger = MintingLedger::new();
        let mut update = LedgerUpdate::new();
        update.add_migration(U256::MAX, &[]);
        let result = update.add_mint(&ledger, 1, &mint(ALICE, 1));
        assert!(matches!(
            result,
            Err(BlockRewardError::ArithmeticOverflow { .. })
        ));
        assert_eq!(ledger, MintingLedger::new());

        ledger.apply(LedgerUpdate::new());
        assert_eq!(ledger.minted_totally(), U256::zero());
    }
}
