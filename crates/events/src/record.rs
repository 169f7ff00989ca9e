use serde::{Deserialize, Serialize};

use crate::event::AuditEvent;

/// Envelope for an audit event, carrying its position in the trail.
///
/// This is the unit appended to a sink.
///
/// Notes:
/// - **Append-only**: `sequence` is monotonically increasing across the
///   whole ledger and assigned by the ledger at commit time.
/// - Observers may rely on `sequence` gaps never appearing and never
///   reordering; the trail is the only history surface the ledger exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    sequence: u64,
    event: AuditEvent,
}

impl AuditRecord {
    pub fn new(sequence: u64, event: AuditEvent) -> Self {
        Self { sequence, event }
    }

    /// Monotonically increasing position in the audit trail.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn event(&self) -> &AuditEvent {
        &self.event
    }

    pub fn into_event(self) -> AuditEvent {
        self.event
    }
}
