//! Logging setup shared by hosts embedding the ledger.
//!
//! The ledger crates emit through `tracing` macros and never install a
//! subscriber themselves; whoever owns `main` (or a test binary) calls
//! [`init`] once.

/// Install process-wide logging. Harmless to call more than once.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filters, formatting).
pub mod tracing;
