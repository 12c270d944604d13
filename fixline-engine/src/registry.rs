/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Correlation registry backing `expect`.
//!
//! Each pending wait owns a set of substring filters and a one-shot
//! channel. Inbound messages are offered to pending entries in
//! registration order; the first entry with a filter contained in the raw
//! message text receives it and is removed. A message is delivered to at
//! most one entry.

use fixline_core::message::Message;
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;

/// Filters of one pending wait.
pub type Filters = SmallVec<[String; 4]>;

#[derive(Debug)]
struct Pending {
    filters: Filters,
    tx: oneshot::Sender<Message>,
}

impl Pending {
    fn matches(&self, raw: &str) -> bool {
        self.filters.iter().any(|filter| raw.contains(filter.as_str()))
    }
}

/// Registry of pending `expect` calls, keyed by a monotonically
/// increasing id so iteration order is registration order.
#[derive(Debug, Default)]
pub struct CorrelationRegistry {
    next_id: AtomicU64,
    pending: Mutex<BTreeMap<u64, Pending>>,
}

impl CorrelationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a wait for the first message containing any of `filters`.
    ///
    /// Returns the entry id and the receiving end of its channel.
    pub fn register<S: AsRef<str>>(&self, filters: &[S]) -> (u64, oneshot::Receiver<Message>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let filters = filters.iter().map(|f| f.as_ref().to_owned()).collect();
        self.pending.lock().insert(id, Pending { filters, tx });
        (id, rx)
    }

    /// Offers `message` to the pending entries.
    ///
    /// Returns true if an entry took it.
    pub fn dispatch(&self, message: &Message) -> bool {
        let mut pending = self.pending.lock();
        let Some(id) = pending
            .iter()
            .find(|(_, entry)| entry.matches(message.raw()))
            .map(|(id, _)| *id)
        else {
            return false;
        };
        match pending.remove(&id) {
            // a waiter that already gave up counts as a miss
            Some(entry) => entry.tx.send(message.clone()).is_ok(),
            None => false,
        }
    }

    /// Removes the entry `id` if it is still registered.
    pub fn remove(&self, id: u64) -> bool {
        self.pending.lock().remove(&id).is_some()
    }

    /// Returns the number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec_report() -> Message {
        Message::parse("8=FIX.4.2|35=8|150=A|37=XYZ|")
    }

    #[test]
    fn test_dispatch_matches_any_filter() {
        let registry = CorrelationRegistry::new();
        let (_, mut rx) = registry.register(&["35=9", "150=A"]);

        assert!(registry.dispatch(&exec_report()));
        assert_eq!(rx.try_recv().unwrap().get("37"), Some("XYZ"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dispatch_no_match() {
        let registry = CorrelationRegistry::new();
        let (_, mut rx) = registry.register(&["35=9"]);

        assert!(!registry.dispatch(&exec_report()));
        assert!(rx.try_recv().is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_dispatch_fifo_single_delivery() {
        let registry = CorrelationRegistry::new();
        let (_, mut first) = registry.register(&["35=8"]);
        let (_, mut second) = registry.register(&["150=A"]);

        assert!(registry.dispatch(&exec_report()));
        assert!(first.try_recv().is_ok());
        assert!(second.try_recv().is_err());
        assert_eq!(registry.len(), 1);

        assert!(registry.dispatch(&exec_report()));
        assert!(second.try_recv().is_ok());
    }

    #[test]
    fn test_remove() {
        let registry = CorrelationRegistry::new();
        let (id, _rx) = registry.register(&["35=8"]);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(!registry.dispatch(&exec_report()));
    }

    #[test]
    fn test_dropped_receiver_consumes_entry() {
        let registry = CorrelationRegistry::new();
        let (_, rx) = registry.register(&["35=8"]);
        drop(rx);

        assert!(!registry.dispatch(&exec_report()));
        assert!(registry.is_empty());
    }
}
