//! Thread-safe pending-transaction queue.
//!
//! [`TransactionQueue`] uses interior mutability ([`Mutex`]) so that any
//! thread — background computation, a UI callback — can submit work with
//! only `&self`. The mode manager is the single consumer: it drains the
//! queue once per frame on the main thread and appends everything to the
//! journal in submission order.

use std::fmt;

use parking_lot::Mutex;

use super::transaction::Transaction;

/// A thread-safe queue for submitting [`Transaction`]s from any thread.
///
/// Multiple producers, single consumer. FIFO order is preserved per
/// producer; no ordering is guaranteed across concurrent producers.
pub struct TransactionQueue {
    queue: Mutex<Vec<Transaction>>,
}

impl TransactionQueue {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Enqueues a transaction. Callable from `&self` on any thread.
    pub fn push(&self, transaction: Transaction) {
        self.queue.lock().push(transaction);
    }

    /// Drains all queued transactions, returning them in submission order.
    pub fn drain(&self) -> Vec<Transaction> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Returns `true` if there are no queued transactions.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Number of queued transactions.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

impl Default for TransactionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransactionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.queue.lock().len();
        f.debug_struct("TransactionQueue")
            .field("pending", &len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn push_and_drain() {
        let queue = TransactionQueue::new();
        queue.push(Transaction::exec_only("First", || {}));
        queue.push(Transaction::exec_only("Second", || {}));

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message(), "First");
        assert_eq!(drained[1].message(), "Second");
    }

    #[test]
    fn drain_empties_queue() {
        let queue = TransactionQueue::new();
        queue.push(Transaction::default());
        let _ = queue.drain();
        assert!(queue.is_empty());
        assert_eq!(queue.drain().len(), 0);
    }

    #[test]
    fn len_reflects_state() {
        let queue = TransactionQueue::new();
        assert_eq!(queue.len(), 0);
        queue.push(Transaction::default());
        queue.push(Transaction::default());
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn concurrent_producers_all_arrive() {
        let queue = Arc::new(TransactionQueue::new());
        let executed = Arc::new(AtomicI32::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                let executed = executed.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let executed = executed.clone();
                        queue.push(Transaction::exec_only("Background edit", move || {
                            executed.fetch_add(1, Ordering::SeqCst);
                        }));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let drained = queue.drain();
        assert_eq!(drained.len(), 100);
        for transaction in &drained {
            transaction.exec();
        }
        assert_eq!(executed.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn debug_impl() {
        let queue = TransactionQueue::new();
        queue.push(Transaction::default());
        let debug = format!("{queue:?}");
        assert!(debug.contains("TransactionQueue"));
        assert!(debug.contains("pending"));
    }
}
