//! Audit delivery abstraction (mechanics only).
//!
//! A sink is where the ledger hands off audit records after a state change
//! commits. The contract is intentionally lightweight:
//!
//! - **Transport-agnostic**: in-memory channels, a database table, a message
//!   queue; the ledger does not care.
//! - **Ordered**: records arrive in sequence order; the ledger appends them
//!   from inside its serialization point.
//! - **No querying**: the ledger never reads history back; reconstruction is
//!   entirely the consumer's business.
//!
//! Append failures are surfaced to the caller. Since the state change has
//! already committed by the time a record is appended, the ledger treats a
//! failed append as an infrastructure fault to report, not a reason to
//! un-commit.

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use crate::record::AuditRecord;

/// A subscription to the audit record stream.
///
/// Each subscription gets a copy of every record appended after it was
/// created (broadcast semantics). Designed for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<AuditRecord>,
}

impl Subscription {
    pub fn new(receiver: Receiver<AuditRecord>) -> Self {
        Self { receiver }
    }

    /// Block until the next record is available.
    pub fn recv(&self) -> Result<AuditRecord, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a record without blocking.
    pub fn try_recv(&self) -> Result<AuditRecord, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a record.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<AuditRecord, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Durable, ordered audit log consumer boundary.
pub trait AuditSink: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    /// Append one record to the trail.
    fn append(&self, record: AuditRecord) -> Result<(), Self::Error>;

    /// Subscribe to records appended from now on.
    fn subscribe(&self) -> Subscription;
}

impl<S> AuditSink for Arc<S>
where
    S: AuditSink + ?Sized,
{
    type Error = S::Error;

    fn append(&self, record: AuditRecord) -> Result<(), Self::Error> {
        (**self).append(record)
    }

    fn subscribe(&self) -> Subscription {
        (**self).subscribe()
    }
}

#[derive(Debug)]
pub enum InMemorySinkError {
    /// Append failed due to internal lock poisoning.
    Poisoned,
}

/// In-memory audit log for tests/dev.
///
/// - No IO / no async
/// - Retains the full ordered trail (inspectable via [`records`])
/// - Best-effort fan-out to subscribers
///
/// [`records`]: InMemoryAuditLog::records
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
    subscribers: Mutex<Vec<mpsc::Sender<AuditRecord>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the trail so far, in append order.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for InMemoryAuditLog {
    type Error = InMemorySinkError;

    fn append(&self, record: AuditRecord) -> Result<(), Self::Error> {
        {
            let mut records = self.records.lock().map_err(|_| InMemorySinkError::Poisoned)?;
            records.push(record.clone());
        }

        let mut subs = self.subscribers.lock().map_err(|_| InMemorySinkError::Poisoned)?;

        // Drop any dead subscribers while fanning out.
        subs.retain(|tx| tx.send(record.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned we still return a subscription;
        // it just won't receive records until the process restarts.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AuditEvent, Paused};
    use chrono::Utc;
    use stockbook_core::PrincipalId;

    fn record(seq: u64) -> AuditRecord {
        AuditRecord::new(
            seq,
            AuditEvent::Paused(Paused {
                paused_by: PrincipalId::new(),
                occurred_at: Utc::now(),
            }),
        )
    }

    #[test]
    fn retains_records_in_append_order() {
        let log = InMemoryAuditLog::new();
        log.append(record(1)).unwrap();
        log.append(record(2)).unwrap();

        let seqs: Vec<u64> = log.records().iter().map(|r| r.sequence()).collect();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[test]
    fn subscribers_receive_records_appended_after_subscribe() {
        let log = InMemoryAuditLog::new();
        log.append(record(1)).unwrap();

        let sub = log.subscribe();
        log.append(record(2)).unwrap();

        assert_eq!(sub.try_recv().unwrap().sequence(), 2);
        assert!(sub.try_recv().is_err());
    }
}
