//! `stockbook-auth` — two-tier access-control policy (pure, no IO).
//!
//! One exclusive owner, an allow-list of authorized operators, and a
//! process-wide pause switch. This crate answers yes/no authorization
//! questions and mutates the policy; it knows nothing about items or
//! audit delivery.

pub mod access;

pub use access::AccessControl;
