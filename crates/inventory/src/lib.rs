//! `stockbook-inventory` — the transactional inventory ledger.
//!
//! A single authoritative store of stock-keeping records, mutated only
//! through a small set of atomic operations gated by the two-tier
//! access-control policy, with an audit record emitted per logical change.
//!
//! [`InventoryLedger`] is the single-threaded engine; [`SharedLedger`]
//! wraps it behind one global write lock for multi-threaded hosts.

pub mod item;
pub mod ledger;
pub mod shared;

pub use item::{Item, ItemStore};
pub use ledger::InventoryLedger;
pub use shared::SharedLedger;
