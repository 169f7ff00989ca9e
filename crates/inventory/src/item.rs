use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockbook_core::{IdAllocator, ItemId, LedgerError, LedgerResult, PrincipalId};

/// A live stock-keeping record.
///
/// The id is assigned once and immutable. Liveness is slot presence in the
/// store: a removed item's id reports not-found forever, since the allocator
/// never reissues it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    quantity: u128,
    price: u128,
    added_by: PrincipalId,
    /// Seconds since epoch, truncated to 32 bits (good until 2106).
    created_at: u32,
}

impl Item {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u128 {
        self.quantity
    }

    pub fn price(&self) -> u128 {
        self.price
    }

    pub fn added_by(&self) -> PrincipalId {
        self.added_by
    }

    pub fn created_at(&self) -> u32 {
        self.created_at
    }
}

/// Mapping from item id to record, enforcing record-level invariants.
///
/// Not authorization-aware: gating callers is the ledger's job. Quantities
/// use checked arithmetic throughout; a sell that would underflow or a
/// replenish that would overflow rejects the sub-operation without touching
/// the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStore {
    items: HashMap<ItemId, Item>,
    allocator: IdAllocator,
}

impl ItemStore {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            allocator: IdAllocator::new(),
        }
    }

    /// Record-level validation shared by `create` and `update`.
    ///
    /// Exposed so batch callers can pre-validate every entry before the
    /// first id is allocated (all-or-nothing batches consume no ids on
    /// failure).
    pub fn validate(name: &str, quantity: u128, price: u128) -> LedgerResult<()> {
        if name.trim().is_empty() {
            return Err(LedgerError::EmptyName);
        }
        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity);
        }
        if price == 0 {
            return Err(LedgerError::InvalidPrice);
        }
        Ok(())
    }

    /// Allocate an id and write a new live record.
    pub fn create(
        &mut self,
        name: &str,
        quantity: u128,
        price: u128,
        added_by: PrincipalId,
        created_at: u32,
    ) -> LedgerResult<ItemId> {
        Self::validate(name, quantity, price)?;
        let id = self.allocator.allocate()?;
        self.items.insert(
            id,
            Item {
                id,
                name: name.to_string(),
                quantity,
                price,
                added_by,
                created_at,
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: ItemId) -> LedgerResult<&Item> {
        self.items.get(&id).ok_or(LedgerError::ItemNotFound(id.as_u32()))
    }

    fn get_mut(&mut self, id: ItemId) -> LedgerResult<&mut Item> {
        self.items.get_mut(&id).ok_or(LedgerError::ItemNotFound(id.as_u32()))
    }

    /// Deduct sold stock. Returns the remaining quantity.
    pub fn deduct(&mut self, id: ItemId, quantity: u128) -> LedgerResult<u128> {
        let item = self.get_mut(id)?;
        let remaining = item.quantity.checked_sub(quantity).ok_or(
            LedgerError::InsufficientStock {
                available: item.quantity,
                requested: quantity,
            },
        )?;
        item.quantity = remaining;
        Ok(remaining)
    }

    /// Add replenished stock. Returns the new total.
    pub fn restock(&mut self, id: ItemId, quantity: u128) -> LedgerResult<u128> {
        let item = self.get_mut(id)?;
        let total = item
            .quantity
            .checked_add(quantity)
            .ok_or(LedgerError::QuantityOverflow)?;
        item.quantity = total;
        Ok(total)
    }

    /// Write back a staged quantity computed by a batch commit.
    ///
    /// Callers must have validated the value against this record already;
    /// this is the commit half of pre-validate-then-commit.
    pub(crate) fn set_quantity(&mut self, id: ItemId, quantity: u128) -> LedgerResult<()> {
        self.get_mut(id)?.quantity = quantity;
        Ok(())
    }

    /// Full overwrite of the mutable fields, same validation as `create`.
    pub fn update(
        &mut self,
        id: ItemId,
        name: &str,
        quantity: u128,
        price: u128,
    ) -> LedgerResult<()> {
        Self::validate(name, quantity, price)?;
        let item = self.get_mut(id)?;
        item.name = name.to_string();
        item.quantity = quantity;
        item.price = price;
        Ok(())
    }

    /// Clear the record. The id stays retired.
    pub fn remove(&mut self, id: ItemId) -> LedgerResult<()> {
        self.items
            .remove(&id)
            .map(|_| ())
            .ok_or(LedgerError::ItemNotFound(id.as_u32()))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Cumulative ids ever issued, NOT the live-item count.
    pub fn total_created(&self) -> u32 {
        self.allocator.issued()
    }

    /// The id the allocator would issue next (exclusive upper bound for
    /// range scans).
    pub fn next_id(&self) -> u64 {
        self.allocator.next_id()
    }

    /// How many more items can be created before the id space is spent.
    pub fn remaining_ids(&self) -> u64 {
        self.allocator.remaining()
    }

    #[cfg(test)]
    pub(crate) fn with_allocator(allocator: IdAllocator) -> Self {
        Self {
            items: HashMap::new(),
            allocator,
        }
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}
