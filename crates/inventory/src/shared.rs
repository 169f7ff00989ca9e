//! Thread-safe ledger handle.
//!
//! The engine itself is a plain single-threaded value; this wrapper puts it
//! behind one global `RwLock`, which is exactly the serialization model the
//! operation set needs:
//!
//! - every mutating operation takes the write lock, so each one appears to
//!   take effect instantaneously relative to all others (linearizability);
//! - reads take the read lock and may run concurrently with each other, but
//!   never observe state older than the last completed mutation, and never
//!   a half-applied batch;
//! - nothing blocks except on the lock itself; there is no IO inside.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use stockbook_core::{ItemId, LedgerResult, PrincipalId};
use stockbook_events::AuditSink;

use crate::item::Item;
use crate::ledger::InventoryLedger;

/// Cloneable, `Send + Sync` handle to a single authoritative ledger.
#[derive(Debug)]
pub struct SharedLedger<S: AuditSink> {
    inner: Arc<RwLock<InventoryLedger<S>>>,
}

impl<S: AuditSink> Clone for SharedLedger<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: AuditSink> SharedLedger<S> {
    pub fn new(owner: PrincipalId, sink: S) -> LedgerResult<Self> {
        Ok(Self {
            inner: Arc::new(RwLock::new(InventoryLedger::new(owner, sink)?)),
        })
    }

    // A poisoned lock means a panic inside a guard holder. Ledger operations
    // are panic-free by construction, so recover the inner value rather than
    // propagating an error the caller cannot act on.
    fn write(&self) -> RwLockWriteGuard<'_, InventoryLedger<S>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, InventoryLedger<S>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Inventory operations ────────────────────────────────────────────

    pub fn add_item(
        &self,
        caller: PrincipalId,
        name: &str,
        quantity: u128,
        price: u128,
    ) -> LedgerResult<ItemId> {
        self.write().add_item(caller, name, quantity, price)
    }

    pub fn add_items(
        &self,
        caller: PrincipalId,
        names: &[&str],
        quantities: &[u128],
        prices: &[u128],
    ) -> LedgerResult<Vec<ItemId>> {
        self.write().add_items(caller, names, quantities, prices)
    }

    pub fn sell_item(&self, caller: PrincipalId, id: ItemId, quantity: u128) -> LedgerResult<()> {
        self.write().sell_item(caller, id, quantity)
    }

    pub fn sell_items(
        &self,
        caller: PrincipalId,
        ids: &[ItemId],
        quantities: &[u128],
    ) -> LedgerResult<()> {
        self.write().sell_items(caller, ids, quantities)
    }

    pub fn update_item(
        &self,
        caller: PrincipalId,
        id: ItemId,
        name: &str,
        quantity: u128,
        price: u128,
    ) -> LedgerResult<()> {
        self.write().update_item(caller, id, name, quantity, price)
    }

    pub fn replenish_stock(
        &self,
        caller: PrincipalId,
        id: ItemId,
        add_quantity: u128,
    ) -> LedgerResult<()> {
        self.write().replenish_stock(caller, id, add_quantity)
    }

    pub fn remove_item(&self, caller: PrincipalId, id: ItemId) -> LedgerResult<()> {
        self.write().remove_item(caller, id)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn get_item(&self, id: ItemId) -> LedgerResult<Item> {
        self.read().get_item(id)
    }

    pub fn total_items(&self) -> u32 {
        self.read().total_items()
    }

    pub fn is_out_of_stock(&self, id: ItemId) -> LedgerResult<bool> {
        self.read().is_out_of_stock(id)
    }

    pub fn check_low_stock(&self, threshold: u128, start: u32, limit: u32) -> Vec<ItemId> {
        self.read().check_low_stock(threshold, start, limit)
    }

    pub fn owner(&self) -> PrincipalId {
        self.read().owner()
    }

    pub fn is_authorized(&self, principal: PrincipalId) -> bool {
        self.read().is_authorized(principal)
    }

    pub fn is_paused(&self) -> bool {
        self.read().is_paused()
    }

    // ── Access control ──────────────────────────────────────────────────

    pub fn authorize_user(&self, caller: PrincipalId, target: PrincipalId) -> LedgerResult<()> {
        self.write().authorize_user(caller, target)
    }

    pub fn batch_authorize_users(
        &self,
        caller: PrincipalId,
        targets: &[PrincipalId],
    ) -> LedgerResult<()> {
        self.write().batch_authorize_users(caller, targets)
    }

    pub fn deauthorize_user(&self, caller: PrincipalId, target: PrincipalId) -> LedgerResult<()> {
        self.write().deauthorize_user(caller, target)
    }

    pub fn transfer_ownership(
        &self,
        caller: PrincipalId,
        new_owner: PrincipalId,
    ) -> LedgerResult<()> {
        self.write().transfer_ownership(caller, new_owner)
    }

    pub fn pause(&self, caller: PrincipalId) -> LedgerResult<()> {
        self.write().pause(caller)
    }

    pub fn unpause(&self, caller: PrincipalId) -> LedgerResult<()> {
        self.write().unpause(caller)
    }
}
