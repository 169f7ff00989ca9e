use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use stockbook_core::{LedgerError, LedgerResult, PrincipalId};

/// Owner identity, allow-list of authorized operators, and the pause flag.
///
/// Policy checks are pure:
/// - No IO
/// - No panics
/// - No business logic (the ledger decides *when* to ask)
///
/// Invariants: the owner is authorized for every authorized-only operation
/// even when absent from the explicit set; the zero identity can never be
/// owner or enter the set. Access-control operations themselves are *not*
/// gated by the pause flag (the owner must be able to unpause).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: PrincipalId,
    authorized: HashSet<PrincipalId>,
    paused: bool,
}

impl AccessControl {
    /// Create a policy with `owner` as the initial owner.
    ///
    /// Who becomes the first owner is the deployment harness's decision;
    /// the policy only refuses the zero identity.
    pub fn new(owner: PrincipalId) -> LedgerResult<Self> {
        if owner.is_zero() {
            return Err(LedgerError::ZeroIdentity);
        }
        Ok(Self {
            owner,
            authorized: HashSet::new(),
            paused: false,
        })
    }

    pub fn owner(&self) -> PrincipalId {
        self.owner
    }

    pub fn is_owner(&self, principal: PrincipalId) -> bool {
        principal == self.owner
    }

    /// True iff `principal` is the owner or in the allow-list.
    pub fn is_authorized(&self, principal: PrincipalId) -> bool {
        principal == self.owner || self.authorized.contains(&principal)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn require_owner(&self, caller: PrincipalId) -> LedgerResult<()> {
        if !self.is_owner(caller) {
            return Err(LedgerError::NotOwner);
        }
        Ok(())
    }

    /// Gate run by every mutating ledger operation, before any state change.
    pub fn require_authorized_and_live(&self, caller: PrincipalId) -> LedgerResult<()> {
        if !self.is_authorized(caller) {
            return Err(LedgerError::NotAuthorized);
        }
        if self.paused {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }

    /// Add `target` to the allow-list. Owner-only.
    pub fn authorize(&mut self, caller: PrincipalId, target: PrincipalId) -> LedgerResult<()> {
        self.require_owner(caller)?;
        if target.is_zero() {
            return Err(LedgerError::ZeroIdentity);
        }
        if self.authorized.contains(&target) {
            return Err(LedgerError::AlreadyAuthorized);
        }
        self.authorized.insert(target);
        Ok(())
    }

    /// Remove `target` from the allow-list. Owner-only; the owner itself
    /// cannot be deauthorized.
    pub fn deauthorize(&mut self, caller: PrincipalId, target: PrincipalId) -> LedgerResult<()> {
        self.require_owner(caller)?;
        if target == self.owner {
            return Err(LedgerError::CannotDeauthorizeOwner);
        }
        if !self.authorized.remove(&target) {
            return Err(LedgerError::UserNotAuthorized);
        }
        Ok(())
    }

    /// Best-effort bulk authorize. Owner-only.
    ///
    /// Entries that are the zero identity or already authorized are skipped
    /// silently; the call itself never fails past the owner check. Returns
    /// the principals actually added, in input order.
    pub fn batch_authorize(
        &mut self,
        caller: PrincipalId,
        targets: &[PrincipalId],
    ) -> LedgerResult<Vec<PrincipalId>> {
        self.require_owner(caller)?;

        let mut added = Vec::new();
        for &target in targets {
            if target.is_zero() || self.authorized.contains(&target) {
                continue;
            }
            self.authorized.insert(target);
            added.push(target);
        }
        Ok(added)
    }

    /// Atomically swap the owner; the new owner is granted explicit
    /// authorized status so it stays an operator even after a later
    /// transfer away. Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: PrincipalId,
        new_owner: PrincipalId,
    ) -> LedgerResult<PrincipalId> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(LedgerError::ZeroIdentity);
        }
        if new_owner == self.owner {
            return Err(LedgerError::SameOwner);
        }

        let previous = self.owner;
        self.owner = new_owner;
        self.authorized.insert(new_owner);
        Ok(previous)
    }

    /// Engage the pause switch. Owner-only, idempotent.
    ///
    /// Returns true iff the flag actually flipped (callers emit audit
    /// events only on a real transition).
    pub fn pause(&mut self, caller: PrincipalId) -> LedgerResult<bool> {
        self.require_owner(caller)?;
        let flipped = !self.paused;
        self.paused = true;
        Ok(flipped)
    }

    /// Release the pause switch. Owner-only, idempotent.
    pub fn unpause(&mut self, caller: PrincipalId) -> LedgerResult<bool> {
        self.require_owner(caller)?;
        let flipped = self.paused;
        self.paused = false;
        Ok(flipped)
    }
}
