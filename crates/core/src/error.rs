//! Ledger error model.

use thiserror::Error;

/// Result type used across the ledger domain.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every variant is a deterministic, caller-correctable failure. Authorization
/// errors are always raised before any state is touched; validation and state
/// errors reject the whole call; business errors abort the enclosing batch.
/// Infrastructure concerns (lock poisoning, sink delivery) belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Caller is not the current owner (owner-only operation).
    #[error("caller is not the owner")]
    NotOwner,

    /// Caller is neither the owner nor in the authorized set.
    #[error("caller is not authorized")]
    NotAuthorized,

    /// The zero/null identity was supplied where a real principal is required.
    #[error("zero identity is not a valid principal")]
    ZeroIdentity,

    /// Authorization target is already in the authorized set.
    #[error("principal is already authorized")]
    AlreadyAuthorized,

    /// Deauthorization target is not in the authorized set.
    #[error("principal is not in the authorized set")]
    UserNotAuthorized,

    /// Ownership transfer target is already the owner.
    #[error("new owner is the current owner")]
    SameOwner,

    /// The owner cannot be removed from the authorized set.
    #[error("cannot deauthorize the owner")]
    CannotDeauthorizeOwner,

    /// All mutating operations are rejected while paused.
    #[error("ledger is paused")]
    Paused,

    /// Item name must be non-empty.
    #[error("item name cannot be empty")]
    EmptyName,

    /// Quantity must be strictly positive.
    #[error("quantity must be greater than zero")]
    InvalidQuantity,

    /// Price must be strictly positive.
    #[error("price must be greater than zero")]
    InvalidPrice,

    /// Parallel argument sequences of a batch call differ in length.
    #[error("batch argument lengths do not match")]
    LengthMismatch,

    /// No live item exists under the given identifier.
    #[error("item {0} not found")]
    ItemNotFound(u32),

    /// A sell would take stock below zero. Carries both sides so the caller
    /// can react (e.g. retry with a smaller quantity).
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: u128, requested: u128 },

    /// A replenish would exceed the maximum representable quantity.
    #[error("quantity overflow")]
    QuantityOverflow,

    /// The 32-bit item id space has been spent.
    #[error("item id space exhausted")]
    IdSpaceExhausted,
}
