//! Reversible units of editor work.
//!
//! A [`Transaction`] pairs an action with its inverse and a human-readable
//! message. Transactions are recorded in the [`Journal`](super::Journal),
//! which is the only place they are ever executed.
//!
//! Closures are stored behind [`Arc`], so cloning a transaction duplicates
//! the handles without running anything. A transaction may also carry an
//! opaque [`DocumentRef`] so the external document backend can locate the
//! scene node and property the closures mutate; this crate never looks
//! inside it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque reference into the external document backend.
///
/// Carried untouched by the journal. Only the backend that created it
/// knows what the node is; `token` names the property the owning
/// transaction mutates.
#[derive(Clone)]
pub struct DocumentRef {
    node: Arc<dyn Any + Send + Sync>,
    token: String,
}

impl DocumentRef {
    /// Wraps a backend node handle and a property token.
    pub fn new(node: Arc<dyn Any + Send + Sync>, token: impl Into<String>) -> Self {
        Self {
            node,
            token: token.into(),
        }
    }

    /// The backend node handle, to be downcast by the backend itself.
    pub fn node(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.node
    }

    /// The property token on the node.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentRef")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

type TransactionFn = Arc<dyn Fn() + Send + Sync>;

fn noop() -> TransactionFn {
    Arc::new(|| {})
}

/// An executable, undoable unit of editor work.
///
/// Once constructed, the `exec` and `undo` closures are immutable. Undo
/// defaults to a no-op for operations that cannot be reversed (see
/// [`exec_only`](Self::exec_only)).
///
/// # Example
///
/// ```
/// use vermilion_core::journal::Transaction;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicI32, Ordering};
///
/// let value = Arc::new(AtomicI32::new(0));
/// let (a, b) = (value.clone(), value.clone());
/// let t = Transaction::new(
///     "Increment value",
///     move || { a.fetch_add(1, Ordering::SeqCst); },
///     move || { b.fetch_sub(1, Ordering::SeqCst); },
/// );
/// t.exec();
/// assert_eq!(value.load(Ordering::SeqCst), 1);
/// t.undo();
/// assert_eq!(value.load(Ordering::SeqCst), 0);
/// ```
#[derive(Clone)]
pub struct Transaction {
    message: String,
    exec: TransactionFn,
    undo: TransactionFn,
    document: Option<DocumentRef>,
}

impl Transaction {
    /// Creates a transaction from an action and its inverse.
    pub fn new(
        message: impl Into<String>,
        exec: impl Fn() + Send + Sync + 'static,
        undo: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            exec: Arc::new(exec),
            undo: Arc::new(undo),
            document: None,
        }
    }

    /// Creates a transaction whose undo is a no-op.
    pub fn exec_only(message: impl Into<String>, exec: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            message: message.into(),
            exec: Arc::new(exec),
            undo: noop(),
            document: None,
        }
    }

    /// Attaches an opaque document-backend reference.
    pub fn with_document(mut self, document: DocumentRef) -> Self {
        self.document = Some(document);
        self
    }

    /// A short, human-readable description for display in the edit menu.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The document-backend reference, if any.
    pub fn document(&self) -> Option<&DocumentRef> {
        self.document.as_ref()
    }

    /// Runs the forward action.
    pub fn exec(&self) {
        (self.exec)();
    }

    /// Runs the inverse action.
    pub fn undo(&self) {
        (self.undo)();
    }
}

impl Default for Transaction {
    /// An empty transaction: no message, both closures no-ops.
    ///
    /// Used by the journal's root sentinel.
    fn default() -> Self {
        Self {
            message: String::new(),
            exec: noop(),
            undo: noop(),
            document: None,
        }
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("message", &self.message)
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    fn counting(value: &Arc<AtomicI32>) -> Transaction {
        let (up, down) = (value.clone(), value.clone());
        Transaction::new(
            "Count",
            move || {
                up.fetch_add(1, Ordering::SeqCst);
            },
            move || {
                down.fetch_sub(1, Ordering::SeqCst);
            },
        )
    }

    #[test]
    fn exec_and_undo_run_closures() {
        let value = Arc::new(AtomicI32::new(0));
        let t = counting(&value);
        t.exec();
        t.exec();
        assert_eq!(value.load(Ordering::SeqCst), 2);
        t.undo();
        assert_eq!(value.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clone_does_not_execute() {
        let value = Arc::new(AtomicI32::new(0));
        let t = counting(&value);
        let copy = t.clone();
        assert_eq!(value.load(Ordering::SeqCst), 0);
        copy.exec();
        assert_eq!(value.load(Ordering::SeqCst), 1);
        assert_eq!(copy.message(), t.message());
    }

    #[test]
    fn exec_only_undo_is_noop() {
        let value = Arc::new(AtomicI32::new(0));
        let inner = value.clone();
        let t = Transaction::exec_only("Bump", move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        t.exec();
        t.undo();
        assert_eq!(value.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_is_inert() {
        let t = Transaction::default();
        t.exec();
        t.undo();
        assert!(t.message().is_empty());
        assert!(t.document().is_none());
    }

    #[test]
    fn document_ref_is_opaque_payload() {
        let node: Arc<dyn Any + Send + Sync> = Arc::new(42_u64);
        let t = Transaction::exec_only("Set radius", || {})
            .with_document(DocumentRef::new(node, "radius"));
        let doc = t.document().unwrap();
        assert_eq!(doc.token(), "radius");
        assert_eq!(doc.node().downcast_ref::<u64>(), Some(&42));
    }
}
