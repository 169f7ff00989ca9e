//! Strongly-typed identifiers used across the ledger.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};

/// Identity of an externally-verifiable caller (owner or operator).
///
/// `Uuid::nil()` is the reserved zero identity: it can never become owner
/// or enter the authorized set, and item records never carry it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The reserved zero/null identity.
    pub fn zero() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_nil()
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PrincipalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<PrincipalId> for Uuid {
    fn from(value: PrincipalId) -> Self {
        value.0
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Identifier of an inventory item.
///
/// Item ids are dense, strictly increasing `u32` values issued once by
/// [`IdAllocator`] and never reused, even after removal. `0` is the reserved
/// "no such item" sentinel and is never issued.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl ItemId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for ItemId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Issues strictly increasing, never-reused item identifiers.
///
/// Starts at 1 (0 is the sentinel) and issues every id up to and including
/// `u32::MAX`. The counter is 64-bit internally so the last id is usable
/// and exhaustion is a distinct state, not a wrap. Never decremented, so a
/// removed item's id stays retired forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

const ID_SPACE_END: u64 = u32::MAX as u64 + 1;

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Resume issuing at `next`, e.g. after rehydrating a store whose ids
    /// were persisted elsewhere. `next` must be greater than every id
    /// already issued; values below 1 clamp to 1.
    pub fn starting_at(next: u32) -> Self {
        Self {
            next: u64::from(next.max(1)),
        }
    }

    /// Issue the next identifier.
    ///
    /// Fails with [`LedgerError::IdSpaceExhausted`] once the 32-bit space is
    /// spent; the counter must never wrap.
    pub fn allocate(&mut self) -> LedgerResult<ItemId> {
        if self.next >= ID_SPACE_END {
            return Err(LedgerError::IdSpaceExhausted);
        }
        let id = self.next as u32;
        self.next += 1;
        Ok(ItemId(id))
    }

    /// The id that would be issued next (exclusive upper bound for range
    /// scans; `u32::MAX + 1` once the space is spent).
    pub fn next_id(&self) -> u64 {
        self.next
    }

    /// Cumulative number of ids issued so far (= highest issued id).
    pub fn issued(&self) -> u32 {
        (self.next - 1) as u32
    }

    /// How many ids can still be issued.
    pub fn remaining(&self) -> u64 {
        ID_SPACE_END - self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
