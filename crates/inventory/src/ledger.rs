use std::collections::HashMap;

use chrono::Utc;

use stockbook_auth::AccessControl;
use stockbook_core::{ItemId, LedgerError, LedgerResult, PrincipalId, epoch_secs};
use stockbook_events::{
    AuditEvent, AuditRecord, AuditSink, ItemAdded, ItemRemoved, ItemSold, ItemUpdated,
    OwnershipTransferred, Paused, StockReplenished, Unpaused, UserAuthorized, UserDeauthorized,
};

use crate::item::{Item, ItemStore};

/// Orchestrates [`AccessControl`] + [`ItemStore`] to implement the public
/// operation set, emitting one audit record per logical change.
///
/// Every mutating operation runs the authorization/pause gate before any
/// state is touched. Batch operations are all-or-nothing: entries are
/// validated against a staged view first and committed only when every entry
/// passed, so a failing batch leaves the store (and the audit trail) exactly
/// as it was.
///
/// Records are appended to the sink after the state change commits. A sink
/// failure at that point is an infrastructure fault: it is logged, never
/// un-commits state, and never fails the operation.
#[derive(Debug)]
pub struct InventoryLedger<S: AuditSink> {
    access: AccessControl,
    store: ItemStore,
    sink: S,
    next_sequence: u64,
}

impl<S: AuditSink> InventoryLedger<S> {
    /// Create an empty ledger owned by `owner`.
    pub fn new(owner: PrincipalId, sink: S) -> LedgerResult<Self> {
        Ok(Self {
            access: AccessControl::new(owner)?,
            store: ItemStore::new(),
            sink,
            next_sequence: 1,
        })
    }

    fn emit(&mut self, event: AuditEvent) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if let Err(err) = self.sink.append(AuditRecord::new(sequence, event)) {
            tracing::error!(sequence, ?err, "audit sink rejected record");
        }
    }

    fn emit_all(&mut self, events: Vec<AuditEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    // ── Inventory mutations ─────────────────────────────────────────────

    /// Create a single item.
    pub fn add_item(
        &mut self,
        caller: PrincipalId,
        name: &str,
        quantity: u128,
        price: u128,
    ) -> LedgerResult<ItemId> {
        self.access.require_authorized_and_live(caller)?;

        let now = Utc::now();
        let id = self.store.create(name, quantity, price, caller, epoch_secs(now))?;

        tracing::debug!(%id, %caller, "item added");
        self.emit(AuditEvent::ItemAdded(ItemAdded {
            item_id: id,
            name: name.to_string(),
            quantity,
            price,
            added_by: caller,
            occurred_at: now,
        }));
        Ok(id)
    }

    /// Create a batch of items from parallel sequences, all-or-nothing.
    ///
    /// Ids are assigned strictly sequentially in input order. If any entry
    /// fails validation the whole batch fails: no ids are consumed and no
    /// records are emitted.
    pub fn add_items(
        &mut self,
        caller: PrincipalId,
        names: &[&str],
        quantities: &[u128],
        prices: &[u128],
    ) -> LedgerResult<Vec<ItemId>> {
        self.access.require_authorized_and_live(caller)?;

        if names.len() != quantities.len() || names.len() != prices.len() {
            return Err(LedgerError::LengthMismatch);
        }

        // Validate every entry before the first id is allocated.
        for ((name, &quantity), &price) in names.iter().zip(quantities).zip(prices) {
            ItemStore::validate(name, quantity, price)?;
        }
        // The commit loop below must not be able to fail partway: a batch
        // that cannot fit in the remaining id space fails here, whole.
        if names.len() as u64 > self.store.remaining_ids() {
            return Err(LedgerError::IdSpaceExhausted);
        }

        let now = Utc::now();
        let created_at = epoch_secs(now);
        let mut ids = Vec::with_capacity(names.len());
        let mut events = Vec::with_capacity(names.len());

        for ((name, &quantity), &price) in names.iter().zip(quantities).zip(prices) {
            let id = self.store.create(name, quantity, price, caller, created_at)?;
            ids.push(id);
            events.push(AuditEvent::ItemAdded(ItemAdded {
                item_id: id,
                name: name.to_string(),
                quantity,
                price,
                added_by: caller,
                occurred_at: now,
            }));
        }

        tracing::debug!(count = ids.len(), %caller, "item batch added");
        self.emit_all(events);
        Ok(ids)
    }

    /// Deduct sold stock from one item.
    pub fn sell_item(
        &mut self,
        caller: PrincipalId,
        id: ItemId,
        quantity: u128,
    ) -> LedgerResult<()> {
        self.access.require_authorized_and_live(caller)?;

        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity);
        }
        let remaining = self.store.deduct(id, quantity)?;

        tracing::debug!(%id, quantity, remaining, "item sold");
        self.emit(AuditEvent::ItemSold(ItemSold {
            item_id: id,
            quantity_sold: quantity,
            remaining,
            sold_by: caller,
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    /// Sell a batch, all-or-nothing.
    ///
    /// Entries are applied in input order against a staged view of the
    /// affected quantities (so the same id may appear more than once and
    /// later entries see earlier deductions). If any entry fails, nothing
    /// is written back, including entries that had already passed.
    pub fn sell_items(
        &mut self,
        caller: PrincipalId,
        ids: &[ItemId],
        quantities: &[u128],
    ) -> LedgerResult<()> {
        self.access.require_authorized_and_live(caller)?;

        if ids.len() != quantities.len() {
            return Err(LedgerError::LengthMismatch);
        }

        let now = Utc::now();
        let mut staged: HashMap<ItemId, u128> = HashMap::new();
        let mut events = Vec::with_capacity(ids.len());

        for (&id, &quantity) in ids.iter().zip(quantities) {
            if quantity == 0 {
                return Err(LedgerError::InvalidQuantity);
            }
            let available = match staged.get(&id) {
                Some(&q) => q,
                None => self.store.get(id)?.quantity(),
            };
            let remaining = available
                .checked_sub(quantity)
                .ok_or(LedgerError::InsufficientStock {
                    available,
                    requested: quantity,
                })?;
            staged.insert(id, remaining);
            events.push(AuditEvent::ItemSold(ItemSold {
                item_id: id,
                quantity_sold: quantity,
                remaining,
                sold_by: caller,
                occurred_at: now,
            }));
        }

        // Every entry passed; write the staged quantities back.
        for (id, remaining) in staged {
            self.store.set_quantity(id, remaining)?;
        }

        tracing::debug!(count = ids.len(), %caller, "item batch sold");
        self.emit_all(events);
        Ok(())
    }

    /// Full overwrite of an item's mutable fields.
    pub fn update_item(
        &mut self,
        caller: PrincipalId,
        id: ItemId,
        name: &str,
        quantity: u128,
        price: u128,
    ) -> LedgerResult<()> {
        self.access.require_authorized_and_live(caller)?;
        self.store.update(id, name, quantity, price)?;

        tracing::debug!(%id, %caller, "item updated");
        self.emit(AuditEvent::ItemUpdated(ItemUpdated {
            item_id: id,
            name: name.to_string(),
            quantity,
            price,
            updated_by: caller,
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    /// Add stock to an existing item.
    pub fn replenish_stock(
        &mut self,
        caller: PrincipalId,
        id: ItemId,
        add_quantity: u128,
    ) -> LedgerResult<()> {
        self.access.require_authorized_and_live(caller)?;

        if add_quantity == 0 {
            return Err(LedgerError::InvalidQuantity);
        }
        let new_total = self.store.restock(id, add_quantity)?;

        tracing::debug!(%id, added = add_quantity, new_total, "stock replenished");
        self.emit(AuditEvent::StockReplenished(StockReplenished {
            item_id: id,
            added: add_quantity,
            new_total,
            replenished_by: caller,
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    /// Clear an item's record. Owner-only; the id stays retired.
    pub fn remove_item(&mut self, caller: PrincipalId, id: ItemId) -> LedgerResult<()> {
        if !self.access.is_owner(caller) {
            return Err(LedgerError::NotOwner);
        }
        if self.access.is_paused() {
            return Err(LedgerError::Paused);
        }
        self.store.remove(id)?;

        tracing::debug!(%id, "item removed");
        self.emit(AuditEvent::ItemRemoved(ItemRemoved {
            item_id: id,
            removed_by: caller,
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    // ── Reads (no authorization required) ───────────────────────────────

    /// Existence-gated view of one item.
    pub fn get_item(&self, id: ItemId) -> LedgerResult<Item> {
        self.store.get(id).cloned()
    }

    /// Cumulative number of ids ever issued (= highest issued id).
    ///
    /// This is NOT the number of live items: removals do not decrease it.
    /// Preserved as-is from the reference behavior.
    pub fn total_items(&self) -> u32 {
        self.store.total_created()
    }

    pub fn is_out_of_stock(&self, id: ItemId) -> LedgerResult<bool> {
        Ok(self.store.get(id)?.quantity() == 0)
    }

    /// Scan the half-open id range `[start, min(start + limit, next_id))`
    /// for live items at or below `threshold`, in ascending id order.
    ///
    /// `start + limit` overflowing the id space clamps to `next_id`;
    /// a `start` below 1 is clamped to 1 (0 is the sentinel).
    pub fn check_low_stock(&self, threshold: u128, start: u32, limit: u32) -> Vec<ItemId> {
        // 64-bit window arithmetic: start + limit cannot wrap.
        let end = (u64::from(start) + u64::from(limit)).min(self.store.next_id());

        let mut ids = Vec::new();
        // Id 0 is the sentinel and never issued.
        for raw in u64::from(start.max(1))..end {
            let id = ItemId(raw as u32);
            if let Ok(item) = self.store.get(id) {
                if item.quantity() <= threshold {
                    ids.push(id);
                }
            }
        }
        ids
    }

    pub fn owner(&self) -> PrincipalId {
        self.access.owner()
    }

    pub fn is_authorized(&self, principal: PrincipalId) -> bool {
        self.access.is_authorized(principal)
    }

    pub fn is_paused(&self) -> bool {
        self.access.is_paused()
    }

    // ── Access-control mutations ────────────────────────────────────────

    /// Add `target` to the operator allow-list. Owner-only.
    pub fn authorize_user(
        &mut self,
        caller: PrincipalId,
        target: PrincipalId,
    ) -> LedgerResult<()> {
        self.access.authorize(caller, target)?;

        tracing::debug!(%target, "user authorized");
        self.emit(AuditEvent::UserAuthorized(UserAuthorized {
            user: target,
            authorized_by: caller,
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    /// Best-effort bulk authorize. Owner-only; bad entries are skipped
    /// silently and one record is emitted per principal actually added.
    pub fn batch_authorize_users(
        &mut self,
        caller: PrincipalId,
        targets: &[PrincipalId],
    ) -> LedgerResult<()> {
        let added = self.access.batch_authorize(caller, targets)?;
        let now = Utc::now();

        tracing::debug!(added = added.len(), skipped = targets.len() - added.len(), "batch authorize");
        let events = added
            .into_iter()
            .map(|user| {
                AuditEvent::UserAuthorized(UserAuthorized {
                    user,
                    authorized_by: caller,
                    occurred_at: now,
                })
            })
            .collect();
        self.emit_all(events);
        Ok(())
    }

    /// Remove `target` from the allow-list. Owner-only.
    pub fn deauthorize_user(
        &mut self,
        caller: PrincipalId,
        target: PrincipalId,
    ) -> LedgerResult<()> {
        self.access.deauthorize(caller, target)?;

        tracing::debug!(%target, "user deauthorized");
        self.emit(AuditEvent::UserDeauthorized(UserDeauthorized {
            user: target,
            deauthorized_by: caller,
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    /// Atomically transfer ownership; the new owner is auto-authorized.
    pub fn transfer_ownership(
        &mut self,
        caller: PrincipalId,
        new_owner: PrincipalId,
    ) -> LedgerResult<()> {
        let previous = self.access.transfer_ownership(caller, new_owner)?;

        tracing::debug!(%previous, %new_owner, "ownership transferred");
        self.emit(AuditEvent::OwnershipTransferred(OwnershipTransferred {
            previous_owner: previous,
            new_owner,
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    /// Engage the pause switch. Owner-only, idempotent; a record is emitted
    /// only on an actual transition.
    pub fn pause(&mut self, caller: PrincipalId) -> LedgerResult<()> {
        if self.access.pause(caller)? {
            tracing::debug!("ledger paused");
            self.emit(AuditEvent::Paused(Paused {
                paused_by: caller,
                occurred_at: Utc::now(),
            }));
        }
        Ok(())
    }

    /// Release the pause switch. Owner-only, idempotent.
    pub fn unpause(&mut self, caller: PrincipalId) -> LedgerResult<()> {
        if self.access.unpause(caller)? {
            tracing::debug!("ledger unpaused");
            self.emit(AuditEvent::Unpaused(Unpaused {
                unpaused_by: caller,
                occurred_at: Utc::now(),
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use stockbook_core::IdAllocator;
    use stockbook_events::InMemoryAuditLog;

    type TestLedger = InventoryLedger<Arc<InMemoryAuditLog>>;

    fn ledger() -> (TestLedger, PrincipalId, Arc<InMemoryAuditLog>) {
        let owner = PrincipalId::new();
        let sink = Arc::new(InMemoryAuditLog::new());
        let ledger = InventoryLedger::new(owner, Arc::clone(&sink)).unwrap();
        (ledger, owner, sink)
    }

    fn ledger_with_store(store: ItemStore) -> (TestLedger, PrincipalId, Arc<InMemoryAuditLog>) {
        let owner = PrincipalId::new();
        let sink = Arc::new(InMemoryAuditLog::new());
        let ledger = InventoryLedger {
            access: AccessControl::new(owner).unwrap(),
            store,
            sink: Arc::clone(&sink),
            next_sequence: 1,
        };
        (ledger, owner, sink)
    }

    #[test]
    fn add_item_assigns_id_and_emits_record() {
        let (mut ledger, owner, sink) = ledger();

        let id = ledger.add_item(owner, "widget", 10, 250).unwrap();
        assert_eq!(id, ItemId(1));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence(), 1);
        match records[0].event() {
            AuditEvent::ItemAdded(e) => {
                assert_eq!(e.item_id, id);
                assert_eq!(e.name, "widget");
                assert_eq!(e.quantity, 10);
                assert_eq!(e.price, 250);
                assert_eq!(e.added_by, owner);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unauthorized_caller_is_rejected_before_any_change() {
        let (mut ledger, _owner, sink) = ledger();
        let outsider = PrincipalId::new();

        assert_eq!(
            ledger.add_item(outsider, "widget", 1, 1),
            Err(LedgerError::NotAuthorized)
        );
        assert_eq!(ledger.total_items(), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn authorized_operator_can_mutate() {
        let (mut ledger, owner, _) = ledger();
        let operator = PrincipalId::new();
        ledger.authorize_user(owner, operator).unwrap();

        let id = ledger.add_item(operator, "widget", 5, 100).unwrap();
        ledger.sell_item(operator, id, 2).unwrap();
        assert_eq!(ledger.get_item(id).unwrap().quantity(), 3);
    }

    #[test]
    fn add_items_assigns_sequential_ids_in_input_order() {
        let (mut ledger, owner, sink) = ledger();

        let ids = ledger
            .add_items(owner, &["a", "b", "c"], &[1, 2, 3], &[10, 20, 30])
            .unwrap();
        assert_eq!(ids, vec![ItemId(1), ItemId(2), ItemId(3)]);

        let names: Vec<String> = sink
            .records()
            .iter()
            .map(|r| match r.event() {
                AuditEvent::ItemAdded(e) => e.name.clone(),
                other => panic!("unexpected event: {other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn add_items_with_one_invalid_entry_commits_nothing() {
        let (mut ledger, owner, sink) = ledger();
        ledger.add_item(owner, "seed", 1, 1).unwrap();
        let before = ledger.total_items();
        let records_before = sink.len();

        assert_eq!(
            ledger.add_items(owner, &["a", "", "c"], &[1, 2, 3], &[10, 20, 30]),
            Err(LedgerError::EmptyName)
        );
        assert_eq!(
            ledger.add_items(owner, &["a", "b"], &[1, 0], &[10, 20]),
            Err(LedgerError::InvalidQuantity)
        );

        // No ids consumed, no records emitted.
        assert_eq!(ledger.total_items(), before);
        assert_eq!(sink.len(), records_before);
    }

    #[test]
    fn add_items_past_the_id_space_commits_nothing() {
        let store = ItemStore::with_allocator(IdAllocator::starting_at(u32::MAX));
        let (mut ledger, owner, sink) = ledger_with_store(store);
        let before = ledger.total_items();

        // Two valid entries, one id left: the batch must fail whole,
        // consuming no ids and emitting nothing.
        assert_eq!(
            ledger.add_items(owner, &["a", "b"], &[1, 1], &[1, 1]),
            Err(LedgerError::IdSpaceExhausted)
        );
        assert_eq!(ledger.total_items(), before);
        assert!(sink.is_empty());

        // A batch that exactly fits still succeeds, using the last id.
        let ids = ledger.add_items(owner, &["a"], &[1], &[1]).unwrap();
        assert_eq!(ids, vec![ItemId(u32::MAX)]);
        assert_eq!(
            ledger.add_item(owner, "b", 1, 1),
            Err(LedgerError::IdSpaceExhausted)
        );
    }

    #[test]
    fn add_items_rejects_length_mismatch() {
        let (mut ledger, owner, _) = ledger();
        assert_eq!(
            ledger.add_items(owner, &["a", "b"], &[1], &[10, 20]),
            Err(LedgerError::LengthMismatch)
        );
        assert_eq!(
            ledger.add_items(owner, &["a"], &[1], &[]),
            Err(LedgerError::LengthMismatch)
        );
    }

    #[test]
    fn sell_item_deducts_and_reports_remaining() {
        let (mut ledger, owner, sink) = ledger();
        let id = ledger.add_item(owner, "widget", 10, 1).unwrap();

        ledger.sell_item(owner, id, 4).unwrap();
        assert_eq!(ledger.get_item(id).unwrap().quantity(), 6);

        match sink.records().last().unwrap().event() {
            AuditEvent::ItemSold(e) => {
                assert_eq!(e.quantity_sold, 4);
                assert_eq!(e.remaining, 6);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        assert_eq!(
            ledger.sell_item(owner, id, 7),
            Err(LedgerError::InsufficientStock {
                available: 6,
                requested: 7
            })
        );
        assert_eq!(ledger.sell_item(owner, id, 0), Err(LedgerError::InvalidQuantity));
    }

    #[test]
    fn sell_items_rolls_back_already_applied_entries() {
        let (mut ledger, owner, sink) = ledger();
        let a = ledger.add_item(owner, "a", 5, 1).unwrap();
        let b = ledger.add_item(owner, "b", 1, 1).unwrap();
        let records_before = sink.len();

        // Entry for `a` would succeed alone; the failure on `b` aborts both.
        assert_eq!(
            ledger.sell_items(owner, &[a, b], &[3, 2]),
            Err(LedgerError::InsufficientStock {
                available: 1,
                requested: 2
            })
        );
        assert_eq!(ledger.get_item(a).unwrap().quantity(), 5);
        assert_eq!(ledger.get_item(b).unwrap().quantity(), 1);
        assert_eq!(sink.len(), records_before);
    }

    #[test]
    fn sell_items_later_entries_see_earlier_deductions_of_same_id() {
        let (mut ledger, owner, _) = ledger();
        let id = ledger.add_item(owner, "widget", 5, 1).unwrap();

        assert_eq!(
            ledger.sell_items(owner, &[id, id], &[3, 3]),
            Err(LedgerError::InsufficientStock {
                available: 2,
                requested: 3
            })
        );
        assert_eq!(ledger.get_item(id).unwrap().quantity(), 5);

        ledger.sell_items(owner, &[id, id], &[3, 2]).unwrap();
        assert_eq!(ledger.get_item(id).unwrap().quantity(), 0);
        assert!(ledger.is_out_of_stock(id).unwrap());
    }

    #[test]
    fn update_item_overwrites_and_requires_existence() {
        let (mut ledger, owner, _) = ledger();
        let id = ledger.add_item(owner, "widget", 5, 1).unwrap();

        ledger.update_item(owner, id, "cog", 7, 42).unwrap();
        let item = ledger.get_item(id).unwrap();
        assert_eq!(item.name(), "cog");
        assert_eq!(item.quantity(), 7);
        assert_eq!(item.price(), 42);

        assert_eq!(
            ledger.update_item(owner, ItemId(99), "x", 1, 1),
            Err(LedgerError::ItemNotFound(99))
        );
    }

    #[test]
    fn replenish_stock_adds_and_emits_new_total() {
        let (mut ledger, owner, sink) = ledger();
        let id = ledger.add_item(owner, "widget", 5, 1).unwrap();

        assert_eq!(
            ledger.replenish_stock(owner, id, 0),
            Err(LedgerError::InvalidQuantity)
        );
        ledger.replenish_stock(owner, id, 10).unwrap();

        match sink.records().last().unwrap().event() {
            AuditEvent::StockReplenished(e) => {
                assert_eq!(e.added, 10);
                assert_eq!(e.new_total, 15);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn remove_item_is_owner_only_and_id_is_never_reused() {
        let (mut ledger, owner, _) = ledger();
        let operator = PrincipalId::new();
        ledger.authorize_user(owner, operator).unwrap();
        let id = ledger.add_item(owner, "widget", 5, 1).unwrap();

        // Authorized but not owner.
        assert_eq!(ledger.remove_item(operator, id), Err(LedgerError::NotOwner));

        ledger.remove_item(owner, id).unwrap();
        assert_eq!(ledger.get_item(id), Err(LedgerError::ItemNotFound(1)));

        let next = ledger.add_item(owner, "gadget", 1, 1).unwrap();
        assert_ne!(next, id);
        assert_eq!(next, ItemId(2));
    }

    #[test]
    fn total_items_counts_cumulative_allocations() {
        let (mut ledger, owner, _) = ledger();
        let a = ledger.add_item(owner, "a", 1, 1).unwrap();
        ledger.add_item(owner, "b", 1, 1).unwrap();
        ledger.remove_item(owner, a).unwrap();

        // Removals do not decrease the counter.
        assert_eq!(ledger.total_items(), 2);
    }

    #[test]
    fn check_low_stock_scans_exact_window() {
        let (mut ledger, owner, _) = ledger();
        ledger
            .add_items(
                owner,
                &["one", "two", "three", "four"],
                &[3, 10, 1, 5],
                &[1, 1, 1, 1],
            )
            .unwrap();
        // Id 3 at quantity 0 via a sale, to cover the boundary.
        ledger.sell_item(owner, ItemId(3), 1).unwrap();

        // Only ids 1..=3 are in range; id 4 (quantity 5) is out of range.
        assert_eq!(
            ledger.check_low_stock(5, 1, 3),
            vec![ItemId(1), ItemId(3)]
        );
        // Widening the window picks up id 4 at the threshold.
        assert_eq!(
            ledger.check_low_stock(5, 1, 4),
            vec![ItemId(1), ItemId(3), ItemId(4)]
        );
    }

    #[test]
    fn check_low_stock_clamps_range_and_skips_removed() {
        let (mut ledger, owner, _) = ledger();
        ledger
            .add_items(owner, &["a", "b", "c"], &[1, 1, 1], &[1, 1, 1])
            .unwrap();
        ledger.remove_item(owner, ItemId(2)).unwrap();

        // start + limit overflowing the id space clamps to next_id.
        assert_eq!(
            ledger.check_low_stock(5, 1, u32::MAX),
            vec![ItemId(1), ItemId(3)]
        );
        // Window entirely past the issued range.
        assert!(ledger.check_low_stock(5, 10, 5).is_empty());
        // Sentinel start clamps to 1.
        assert_eq!(
            ledger.check_low_stock(5, 0, u32::MAX),
            vec![ItemId(1), ItemId(3)]
        );
    }

    #[test]
    fn admin_operations_are_owner_only() {
        let (mut ledger, owner, _) = ledger();
        let operator = PrincipalId::new();
        ledger.authorize_user(owner, operator).unwrap();

        assert_eq!(
            ledger.authorize_user(operator, PrincipalId::new()),
            Err(LedgerError::NotOwner)
        );
        assert_eq!(
            ledger.transfer_ownership(operator, PrincipalId::new()),
            Err(LedgerError::NotOwner)
        );
        assert_eq!(ledger.pause(operator), Err(LedgerError::NotOwner));
        assert_eq!(ledger.unpause(operator), Err(LedgerError::NotOwner));
    }

    #[test]
    fn transfer_ownership_auto_authorizes_new_owner() {
        let (mut ledger, owner, sink) = ledger();
        let next = PrincipalId::new();

        ledger.transfer_ownership(owner, next).unwrap();
        assert_eq!(ledger.owner(), next);

        // New owner can mutate immediately.
        ledger.add_item(next, "widget", 1, 1).unwrap();
        // Old owner lost implicit authorization.
        assert_eq!(
            ledger.add_item(owner, "widget", 1, 1),
            Err(LedgerError::NotAuthorized)
        );

        assert!(sink.records().iter().any(|r| matches!(
            r.event(),
            AuditEvent::OwnershipTransferred(e)
                if e.previous_owner == owner && e.new_owner == next
        )));
    }

    #[test]
    fn pause_blocks_mutations_but_not_reads() {
        let (mut ledger, owner, _) = ledger();
        let id = ledger.add_item(owner, "widget", 5, 1).unwrap();

        ledger.pause(owner).unwrap();

        assert_eq!(
            ledger.add_item(owner, "x", 1, 1),
            Err(LedgerError::Paused)
        );
        assert_eq!(ledger.sell_item(owner, id, 1), Err(LedgerError::Paused));
        assert_eq!(
            ledger.sell_items(owner, &[id], &[1]),
            Err(LedgerError::Paused)
        );
        assert_eq!(
            ledger.update_item(owner, id, "x", 1, 1),
            Err(LedgerError::Paused)
        );
        assert_eq!(
            ledger.replenish_stock(owner, id, 1),
            Err(LedgerError::Paused)
        );
        assert_eq!(ledger.remove_item(owner, id), Err(LedgerError::Paused));

        // Reads still succeed.
        assert_eq!(ledger.get_item(id).unwrap().quantity(), 5);
        assert_eq!(ledger.total_items(), 1);
        assert!(!ledger.is_out_of_stock(id).unwrap());
        assert_eq!(ledger.check_low_stock(10, 1, 10), vec![id]);

        ledger.unpause(owner).unwrap();
        ledger.sell_item(owner, id, 1).unwrap();
    }

    #[test]
    fn pause_transitions_emit_exactly_one_record_each() {
        let (mut ledger, owner, sink) = ledger();

        ledger.pause(owner).unwrap();
        ledger.pause(owner).unwrap();
        ledger.unpause(owner).unwrap();
        ledger.unpause(owner).unwrap();

        let pauses = sink
            .records()
            .iter()
            .filter(|r| matches!(r.event(), AuditEvent::Paused(_) | AuditEvent::Unpaused(_)))
            .count();
        assert_eq!(pauses, 2);
    }

    #[test]
    fn batch_authorize_emits_one_record_per_added_user() {
        let (mut ledger, owner, sink) = ledger();
        let a = PrincipalId::new();
        let b = PrincipalId::new();
        ledger.authorize_user(owner, a).unwrap();
        let before = sink.len();

        ledger
            .batch_authorize_users(owner, &[a, PrincipalId::zero(), b])
            .unwrap();

        assert_eq!(sink.len(), before + 1);
        assert!(matches!(
            sink.records().last().unwrap().event(),
            AuditEvent::UserAuthorized(e) if e.user == b
        ));
    }

    #[test]
    fn audit_sequence_is_gapless_and_ordered() {
        let (mut ledger, owner, sink) = ledger();
        let id = ledger.add_item(owner, "widget", 10, 1).unwrap();
        ledger.sell_item(owner, id, 2).unwrap();
        ledger.replenish_stock(owner, id, 1).unwrap();
        ledger.update_item(owner, id, "cog", 4, 2).unwrap();
        ledger.remove_item(owner, id).unwrap();

        let seqs: Vec<u64> = sink.records().iter().map(|r| r.sequence()).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);

        let types: Vec<&str> = sink.records().iter().map(|r| r.event().event_type()).collect();
        assert_eq!(
            types,
            vec![
                "stockbook.item.added",
                "stockbook.item.sold",
                "stockbook.item.stock_replenished",
                "stockbook.item.updated",
                "stockbook.item.removed",
            ]
        );
    }

    proptest! {
        /// Cumulative sold stock never exceeds added + replenished stock;
        /// the live quantity always matches the checked model and never
        /// underflows, whatever the interleaving of sells and replenishes.
        #[test]
        fn stock_never_goes_negative(ops in prop::collection::vec((any::<bool>(), 1u128..50), 0..40)) {
            let (mut ledger, owner, _) = ledger();
            let id = ledger.add_item(owner, "widget", 25, 1).unwrap();
            let mut model: u128 = 25;

            for (is_sell, quantity) in ops {
                if is_sell {
                    match ledger.sell_item(owner, id, quantity) {
                        Ok(()) => {
                            prop_assert!(model >= quantity);
                            model -= quantity;
                        }
                        Err(LedgerError::InsufficientStock { available, requested }) => {
                            prop_assert_eq!(available, model);
                            prop_assert_eq!(requested, quantity);
                            prop_assert!(quantity > model);
                        }
                        Err(other) => return Err(TestCaseError::fail(format!("{other:?}"))),
                    }
                } else {
                    ledger.replenish_stock(owner, id, quantity).unwrap();
                    model += quantity;
                }
                prop_assert_eq!(ledger.get_item(id).unwrap().quantity(), model);
            }
        }

        /// A batch add with any invalid entry is a no-op, observable via
        /// `total_items` and the audit trail length.
        #[test]
        fn add_items_is_all_or_nothing(
            entries in prop::collection::vec(("[a-z]{0,6}", 0u128..5, 0u128..5), 1..10)
        ) {
            let (mut ledger, owner, sink) = ledger();
            let names: Vec<&str> = entries.iter().map(|(n, _, _)| n.as_str()).collect();
            let quantities: Vec<u128> = entries.iter().map(|(_, q, _)| *q).collect();
            let prices: Vec<u128> = entries.iter().map(|(_, _, p)| *p).collect();

            let all_valid = entries
                .iter()
                .all(|(n, q, p)| !n.trim().is_empty() && *q > 0 && *p > 0);

            let result = ledger.add_items(owner, &names, &quantities, &prices);

            if all_valid {
                prop_assert_eq!(result.unwrap().len(), entries.len());
                prop_assert_eq!(ledger.total_items() as usize, entries.len());
                prop_assert_eq!(sink.len(), entries.len());
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(ledger.total_items(), 0);
                prop_assert_eq!(sink.len(), 0);
            }
        }
    }
}
