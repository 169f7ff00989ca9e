use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{ItemId, PrincipalId};

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u128,
    pub price: u128,
    pub added_by: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemSold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSold {
    pub item_id: ItemId,
    pub quantity_sold: u128,
    pub remaining: u128,
    pub sold_by: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u128,
    pub price: u128,
    pub updated_by: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockReplenished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReplenished {
    pub item_id: ItemId,
    pub added: u128,
    pub new_total: u128,
    pub replenished_by: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub item_id: ItemId,
    pub removed_by: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: UserAuthorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAuthorized {
    pub user: PrincipalId,
    pub authorized_by: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: UserDeauthorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeauthorized {
    pub user: PrincipalId,
    pub deauthorized_by: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OwnershipTransferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous_owner: PrincipalId,
    pub new_owner: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Paused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paused {
    pub paused_by: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Unpaused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unpaused {
    pub unpaused_by: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Audit event emitted by the ledger, one per logical state change.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **append-only**, ordered by the operation that produced them
/// - the sole mechanism for external observers to reconstruct history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEvent {
    ItemAdded(ItemAdded),
    ItemSold(ItemSold),
    ItemUpdated(ItemUpdated),
    StockReplenished(StockReplenished),
    ItemRemoved(ItemRemoved),
    UserAuthorized(UserAuthorized),
    UserDeauthorized(UserDeauthorized),
    OwnershipTransferred(OwnershipTransferred),
    Paused(Paused),
    Unpaused(Unpaused),
}

impl AuditEvent {
    /// Stable event name/type identifier (e.g. "stockbook.item.added").
    pub fn event_type(&self) -> &'static str {
        match self {
            AuditEvent::ItemAdded(_) => "stockbook.item.added",
            AuditEvent::ItemSold(_) => "stockbook.item.sold",
            AuditEvent::ItemUpdated(_) => "stockbook.item.updated",
            AuditEvent::StockReplenished(_) => "stockbook.item.stock_replenished",
            AuditEvent::ItemRemoved(_) => "stockbook.item.removed",
            AuditEvent::UserAuthorized(_) => "stockbook.access.user_authorized",
            AuditEvent::UserDeauthorized(_) => "stockbook.access.user_deauthorized",
            AuditEvent::OwnershipTransferred(_) => "stockbook.access.ownership_transferred",
            AuditEvent::Paused(_) => "stockbook.access.paused",
            AuditEvent::Unpaused(_) => "stockbook.access.unpaused",
        }
    }

    /// When the event occurred (business time).
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AuditEvent::ItemAdded(e) => e.occurred_at,
            AuditEvent::ItemSold(e) => e.occurred_at,
            AuditEvent::ItemUpdated(e) => e.occurred_at,
            AuditEvent::StockReplenished(e) => e.occurred_at,
            AuditEvent::ItemRemoved(e) => e.occurred_at,
            AuditEvent::UserAuthorized(e) => e.occurred_at,
            AuditEvent::UserDeauthorized(e) => e.occurred_at,
            AuditEvent::OwnershipTransferred(e) => e.occurred_at,
            AuditEvent::Paused(e) => e.occurred_at,
            AuditEvent::Unpaused(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_are_stable_names() {
        let e = AuditEvent::ItemAdded(ItemAdded {
            item_id: ItemId(1),
            name: "widget".to_string(),
            quantity: 5,
            price: 100,
            added_by: PrincipalId::new(),
            occurred_at: Utc::now(),
        });
        assert_eq!(e.event_type(), "stockbook.item.added");
    }
}
