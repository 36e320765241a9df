//! # Extra Receiver Queue
//!
//! FIFO of bridge-requested mints. Cursors follow the two-cursor model
//! (`first`, `last`, empty when `last < first`) while the entries live in a
//! `VecDeque`, so `size() == last + 1 - first` always holds.

use super::value_objects::ExtraReceiver;
use crate::error::{BlockRewardError, BlockRewardResult};
use serde::{Deserialize, Serialize};
use shared_types::is_zero_address;
use std::collections::VecDeque;

/// Bounded-drain FIFO of pending extra receivers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraReceiverQueue {
    initialized: bool,
    first: u64,
    last: u64,
    entries: VecDeque<ExtraReceiver>,
}

impl ExtraReceiverQueue {
    /// Create an uninitialized queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cursors to `first = 1, last = 0`.
    ///
    /// Returns `false` if the queue was already initialized.
    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;
        self.first = 1;
        self.last = 0;
        self.entries.clear();
        true
    }

    /// True after the first block close.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Append an entry at `last + 1`.
    pub fn enqueue(&mut self, entry: ExtraReceiver) -> BlockRewardResult<()> {
        if !self.initialized {
            return Err(BlockRewardError::QueueNotInitialized);
        }
        if entry.amount.is_zero() {
            return Err(BlockRewardError::ZeroAmount);
        }
        if is_zero_address(&entry.receiver) {
            return Err(BlockRewardError::ZeroAddress { field: "receiver" });
        }
        self.last = self
            .last
            .checked_add(1)
            .ok_or_else(|| BlockRewardError::overflow("extra receiver cursor"))?;
        self.entries.push_back(entry);
        Ok(())
    }

    /// Pop the entry at `first`. Empty queues yield `None`.
    pub fn dequeue(&mut self) -> Option<ExtraReceiver> {
        let entry = self.entries.pop_front()?;
        self.first += 1;
        Some(entry)
    }

    /// Up to `limit` entries from the front, without removing them.
    pub fn peek(&self, limit: usize) -> Vec<ExtraReceiver> {
        self.entries.iter().take(limit).copied().collect()
    }

    /// Remove up to `count` entries from the front.
    pub fn pop_front_n(&mut self, count: usize) -> Vec<ExtraReceiver> {
        let mut popped = Vec::with_capacity(count.min(self.entries.len()));
        while popped.len() < count {
            match self.dequeue() {
                Some(entry) => popped.push(entry),
                None => break,
            }
        }
        popped
    }

    /// Number of pending entries (`0` before initialization).
    pub fn size(&self) -> u64 {
        if !self.initialized {
            return 0;
        }
        (self.last + 1).saturating_sub(self.first)
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor of the next entry to dequeue.
    pub fn first(&self) -> u64 {
        self.first
    }

    /// Cursor of the most recent entry.
    pub fn last(&self) -> u64 {
        self.last
    }
}
