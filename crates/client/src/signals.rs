//! Cross-window signals.
//!
//! Several windows (or CLI processes) share one [`Storage`]. When a payment
//! or refund completes in one of them, the others need to refresh. A
//! publisher appends the event to a short log under one storage key with the
//! next id from a persisted counter; every listener polls the log and sees
//! each signal at most once, however often the log is re-read.
//!
//! Publishing is read-modify-write with no cross-process lock, so storage is
//! last-writer-wins. Two processes publishing at once can both take id N;
//! each signal also carries a random nonce, and a listener keyed on
//! `(id, nonce)` still delivers the later one. If both writes land before
//! any listener polls, the overwritten signal is lost.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ev_market_core::PaymentId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::{Storage, StorageError};

/// Storage key holding the signal log.
pub const SIGNALS_STORAGE_KEY: &str = "evtb_signals";

/// Signals kept in the log.
pub const SIGNAL_LOG_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalKind {
    PaymentCompleted {
        payment_id: PaymentId,
        amount: Option<Decimal>,
    },
    RefundCompleted {
        payment_id: PaymentId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub id: u64,
    /// Tells apart signals that raced for the same id.
    #[serde(default)]
    pub nonce: Uuid,
    pub kind: SignalKind,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SignalLog {
    last_id: u64,
    #[serde(default)]
    signals: Vec<Signal>,
}

/// Publishes and reads signals through shared storage.
#[derive(Clone)]
pub struct SignalBus {
    storage: Arc<dyn Storage>,
}

impl SignalBus {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn read_log(&self) -> Result<SignalLog, StorageError> {
        match self.storage.get(SIGNALS_STORAGE_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable signal log");
                SignalLog::default()
            })),
            None => Ok(SignalLog::default()),
        }
    }

    /// Publish a signal and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or written.
    pub fn publish(&self, kind: SignalKind) -> Result<Signal, StorageError> {
        let mut log = self.read_log()?;
        let newest = log.signals.iter().map(|s| s.id).max().unwrap_or(0);
        let id = log.last_id.max(newest) + 1;

        let signal = Signal {
            id,
            nonce: Uuid::new_v4(),
            kind,
            published_at: Utc::now(),
        };
        log.last_id = id;
        log.signals.push(signal.clone());
        let excess = log.signals.len().saturating_sub(SIGNAL_LOG_CAPACITY);
        log.signals.drain(..excess);

        self.storage
            .set(SIGNALS_STORAGE_KEY, &serde_json::to_string(&log)?)?;
        debug!(signal_id = id, "Signal published");
        Ok(signal)
    }

    /// Listener that receives only signals published from now on.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn listen(&self) -> Result<SignalListener, StorageError> {
        let log = self.read_log()?;
        let newest = log.signals.iter().map(|s| s.id).max().unwrap_or(0);
        let mut listener = self.listen_after(log.last_id.max(newest));
        listener.delivered = log
            .signals
            .iter()
            .filter(|s| s.id == listener.last_seen)
            .map(|s| s.nonce)
            .collect();
        Ok(listener)
    }

    /// Listener that receives every logged signal with an id above
    /// `last_seen`.
    #[must_use]
    pub fn listen_after(&self, last_seen: u64) -> SignalListener {
        SignalListener {
            bus: self.clone(),
            last_seen,
            delivered: HashSet::new(),
        }
    }
}

/// One window's view of the signal log.
pub struct SignalListener {
    bus: SignalBus,
    last_seen: u64,
    /// Nonces already returned with id `last_seen`.
    delivered: HashSet<Uuid>,
}

impl SignalListener {
    /// Signals not yet returned by this listener, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn poll(&mut self) -> Result<Vec<Signal>, StorageError> {
        let log = self.bus.read_log()?;
        let mut fresh: Vec<Signal> = log
            .signals
            .into_iter()
            .filter(|s| {
                s.id > self.last_seen
                    || (s.id == self.last_seen && !self.delivered.contains(&s.nonce))
            })
            .collect();
        fresh.sort_by_key(|s| (s.id, s.nonce));
        fresh.dedup_by_key(|s| (s.id, s.nonce));

        if let Some(last) = fresh.last() {
            if last.id > self.last_seen {
                self.last_seen = last.id;
                self.delivered.clear();
            }
            let newest = self.last_seen;
            self.delivered
                .extend(fresh.iter().filter(|s| s.id == newest).map(|s| s.nonce));
        }
        Ok(fresh)
    }

    #[must_use]
    pub const fn last_seen(&self) -> u64 {
        self.last_seen
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn paid(id: i64) -> SignalKind {
        SignalKind::PaymentCompleted {
            payment_id: PaymentId::new(id),
            amount: Some(Decimal::from(1_000)),
        }
    }

    #[test]
    fn test_each_signal_delivered_once() {
        let storage = Arc::new(MemoryStorage::new());
        let bus = SignalBus::new(storage);
        let mut window_a = bus.listen().unwrap();
        let mut window_b = bus.listen().unwrap();

        bus.publish(paid(1)).unwrap();
        bus.publish(SignalKind::RefundCompleted {
            payment_id: PaymentId::new(1),
        })
        .unwrap();

        let a = window_a.poll().unwrap();
        assert_eq!(a.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(window_a.poll().unwrap().is_empty());

        assert_eq!(window_b.poll().unwrap().len(), 2);
    }

    #[test]
    fn test_new_listener_ignores_history() {
        let bus = SignalBus::new(Arc::new(MemoryStorage::new()));
        bus.publish(paid(1)).unwrap();

        let mut late = bus.listen().unwrap();
        assert!(late.poll().unwrap().is_empty());
        bus.publish(paid(2)).unwrap();
        assert_eq!(late.poll().unwrap()[0].kind, paid(2));
    }

    #[test]
    fn test_redelivered_id_is_deduplicated() {
        let storage = Arc::new(MemoryStorage::new());
        let bus = SignalBus::new(storage.clone());
        let mut listener = bus.listen_after(0);
        let signal = bus.publish(paid(5)).unwrap();

        // Another publisher writes the same event again
        let mut log: SignalLog =
            serde_json::from_str(&storage.get(SIGNALS_STORAGE_KEY).unwrap().unwrap()).unwrap();
        log.signals.push(signal.clone());
        storage
            .set(SIGNALS_STORAGE_KEY, &serde_json::to_string(&log).unwrap())
            .unwrap();

        assert_eq!(listener.poll().unwrap(), vec![signal]);
        assert!(listener.poll().unwrap().is_empty());
    }

    #[test]
    fn test_racing_publishers_with_same_id_both_delivered() {
        let shared = Arc::new(MemoryStorage::new());
        let bus = SignalBus::new(shared.clone());
        let mut listener = bus.listen().unwrap();

        // The other process read the log before this one wrote to it
        let other_view = Arc::new(MemoryStorage::new());

        let first = bus.publish(paid(1)).unwrap();
        assert_eq!(listener.poll().unwrap(), vec![first.clone()]);

        let second = SignalBus::new(other_view.clone()).publish(paid(2)).unwrap();
        assert_eq!(second.id, first.id);
        shared
            .set(
                SIGNALS_STORAGE_KEY,
                &other_view.get(SIGNALS_STORAGE_KEY).unwrap().unwrap(),
            )
            .unwrap();

        assert_eq!(listener.poll().unwrap(), vec![second]);
        assert!(listener.poll().unwrap().is_empty());
        assert_eq!(listener.last_seen(), first.id);
    }

    #[test]
    fn test_log_is_bounded_and_ids_monotonic() {
        let storage = Arc::new(MemoryStorage::new());
        let bus = SignalBus::new(storage.clone());
        for i in 0..30 {
            bus.publish(paid(i)).unwrap();
        }

        let log: SignalLog =
            serde_json::from_str(&storage.get(SIGNALS_STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(log.signals.len(), SIGNAL_LOG_CAPACITY);
        assert_eq!(log.last_id, 30);
        assert_eq!(log.signals.first().unwrap().id, 11);

        // A second bus on the same storage continues the sequence
        let other = SignalBus::new(storage);
        assert_eq!(other.publish(paid(99)).unwrap().id, 31);
    }
}
