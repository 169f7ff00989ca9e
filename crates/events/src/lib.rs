//! `stockbook-events` — audit trail types and delivery (mechanics only).
//!
//! The ledger emits one audit event per logical state change; this crate
//! defines the event payloads, the ordered record envelope, and the sink
//! abstraction events are delivered through. It stores nothing durably
//! itself; durable retention is the sink implementor's concern.

pub mod event;
pub mod record;
pub mod sink;

pub use event::{
    AuditEvent, ItemAdded, ItemRemoved, ItemSold, ItemUpdated, OwnershipTransferred, Paused,
    StockReplenished, Unpaused, UserAuthorized, UserDeauthorized,
};
pub use record::AuditRecord;
pub use sink::{AuditSink, InMemoryAuditLog, InMemorySinkError, Subscription};
