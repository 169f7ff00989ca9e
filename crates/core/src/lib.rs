//! `stockbook-core` — ledger foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the shared error taxonomy, and the coarse
//! timestamp representation used by item records.

pub mod error;
pub mod id;
pub mod time;

pub use error::{LedgerError, LedgerResult};
pub use id::{IdAllocator, ItemId, PrincipalId};
pub use time::epoch_secs;
