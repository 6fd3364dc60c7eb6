//! The branching history tree.
//!
//! Nodes live in a slot arena and are addressed by copyable [`NodeId`]
//! handles; `next`, `sibling` and `parent` links are plain ids, so there
//! is no ownership cycle to manage. A node's continuations are its `next`
//! link plus the sibling chain hanging off that node; a node's own
//! `sibling` chain holds the alternate continuations recorded from the
//! same parent.
//!
//! Two mutations shape history:
//!
//! - [`append`](Journal::append) extends the active line. Any previously
//!   recorded future of the current node — including forked branches —
//!   is freed first, so an append never leaves orphans behind.
//! - [`fork`](Journal::fork) records an alternate continuation without
//!   destroying anything; the old branch stays reachable as a sibling.
//!
//! The arena keeps a live-slot counter that [`validate`](Journal::validate)
//! compares against a reachability walk from the root, catching leaks and
//! dangling links.

use std::fmt;

use super::transaction::Transaction;

/// Stable handle to a journal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

struct JournalNode {
    transaction: Transaction,
    next: Option<NodeId>,
    sibling: Option<NodeId>,
    parent: Option<NodeId>,
}

/// A tree of transactions supporting linear append, branching fork,
/// truncation, and consistency validation.
///
/// The journal always contains at least the root sentinel node, which
/// holds an inert [`Transaction`] and marks the state before the first
/// recorded operation. `current` starts at the root.
///
/// # Example
///
/// ```
/// use vermilion_core::journal::{Journal, Transaction};
///
/// let mut journal = Journal::new();
/// journal.append(Transaction::exec_only("Add cube", || {}));
/// journal.append(Transaction::exec_only("Move cube", || {}));
/// assert_eq!(journal.undo_count(), 2);
///
/// // Record an alternate continuation; "Move cube" stays reachable.
/// journal.fork(Transaction::exec_only("Scale cube", || {}));
/// assert!(journal.validate());
/// ```
pub struct Journal {
    slots: Vec<Option<JournalNode>>,
    free: Vec<u32>,
    root: NodeId,
    current: NodeId,
    live: usize,
}

impl Journal {
    /// Creates a journal containing only the root sentinel.
    pub fn new() -> Self {
        let root = JournalNode {
            transaction: Transaction::default(),
            next: None,
            sibling: None,
            parent: None,
        };
        Self {
            slots: vec![Some(root)],
            free: Vec::new(),
            root: NodeId(0),
            current: NodeId(0),
            live: 1,
        }
    }

    /// The root sentinel.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node the next append/fork will extend from.
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// The transaction stored at `id`, or `None` if the id is not live.
    pub fn transaction(&self, id: NodeId) -> Option<&Transaction> {
        self.node(id).map(|node| &node.transaction)
    }

    /// The continuation link of `id`.
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.next)
    }

    /// The sibling link of `id` (the next alternate branch from the same
    /// parent).
    pub fn sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.sibling)
    }

    /// The parent link of `id`. `None` for the root and for branches
    /// forked directly at the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Number of live nodes, including the root sentinel.
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// Runs `transaction` and records it as the continuation of the
    /// current node.
    ///
    /// If the current node already had a future, that entire subtree —
    /// the old continuation and every branch forked from it — is freed
    /// first: appending past history discards the abandoned future. The
    /// new node becomes current.
    pub fn append(&mut self, transaction: Transaction) -> NodeId {
        transaction.exec();
        self.truncate_future(self.current);
        let id = self.alloc(transaction, Some(self.current));
        if let Some(node) = self.node_mut(self.current) {
            node.next = Some(id);
        }
        self.current = id;
        id
    }

    /// Runs `transaction` and records it as an alternate continuation.
    ///
    /// The new node is linked at the end of the current node's sibling
    /// chain, so earlier forks stay reachable; nothing is destroyed. The
    /// new branch becomes current, while the old current remains the
    /// branch a later [`redo`](Self::redo) from the shared parent would
    /// take first.
    pub fn fork(&mut self, transaction: Transaction) -> NodeId {
        transaction.exec();
        let parent = self.node(self.current).and_then(|node| node.parent);
        let id = self.alloc(transaction, parent);
        let mut tail = self.current;
        while let Some(sibling) = self.node(tail).and_then(|node| node.sibling) {
            tail = sibling;
        }
        if let Some(node) = self.node_mut(tail) {
            node.sibling = Some(id);
        }
        self.current = id;
        id
    }

    /// Detaches `id`, with its entire subtree, from whichever chain
    /// references it — without freeing anything.
    ///
    /// Used when a node must be relocated rather than destroyed; the
    /// counterpart is [`attach`](Self::attach). Returns `false` for the
    /// root, an id that is not live, or a node that is already detached.
    ///
    /// While a subtree is detached, [`validate`](Self::validate) reports
    /// a mismatch by design. `current` must not point into the detached
    /// subtree; that is a caller contract, not a checked error.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || self.node(id).is_none() {
            return false;
        }
        let Some((referrer, via_next)) = self.referrer(id) else {
            return false;
        };
        let sibling = self.node(id).and_then(|node| node.sibling);
        if let Some(node) = self.node_mut(referrer) {
            if via_next {
                node.next = sibling;
            } else {
                node.sibling = sibling;
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.sibling = None;
            node.parent = None;
        }
        true
    }

    /// Relocates a previously [`remove`](Self::remove)d node under
    /// `parent`.
    ///
    /// The node becomes `parent`'s continuation when that slot is free,
    /// otherwise an alternate branch at the end of the existing
    /// continuation's sibling chain — nothing is destroyed either way.
    /// Returns `false` when either id is not live, when `id` is the root
    /// or still attached, or when `parent` lies inside `id`'s own subtree.
    pub fn attach(&mut self, parent: NodeId, id: NodeId) -> bool {
        if id == self.root || self.node(id).is_none() || self.node(parent).is_none() {
            return false;
        }
        if self.referrer(id).is_some() || self.subtree_contains(id, parent) {
            return false;
        }
        match self.node(parent).and_then(|node| node.next) {
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.next = Some(id);
                }
            }
            Some(head) => {
                let mut tail = head;
                while let Some(sibling) = self.node(tail).and_then(|node| node.sibling) {
                    tail = sibling;
                }
                if let Some(node) = self.node_mut(tail) {
                    node.sibling = Some(id);
                }
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = Some(parent);
        }
        true
    }

    /// Walks the tree from the root and checks consistency.
    ///
    /// Returns `false` when the reachable-node count differs from the
    /// arena's live count (a leak or a dangling link — including a
    /// subtree detached by [`remove`](Self::remove) and not yet
    /// re-attached), or when `current` is unreachable. Failures are also
    /// logged; recovery is up to the caller.
    pub fn validate(&self) -> bool {
        let mut reachable = 0usize;
        let mut saw_current = false;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                log::warn!("journal node {id:?} is referenced but not live");
                return false;
            };
            reachable += 1;
            if id == self.current {
                saw_current = true;
            }
            if let Some(next) = node.next {
                stack.push(next);
            }
            if let Some(sibling) = node.sibling {
                stack.push(sibling);
            }
        }
        if reachable != self.live {
            log::warn!(
                "journal has {} live nodes but {reachable} reachable from the root",
                self.live
            );
            return false;
        }
        if !saw_current {
            log::warn!("journal current node is unreachable from the root");
            return false;
        }
        true
    }

    /// Steps back to the current node's parent, running the departed
    /// node's undo.
    ///
    /// Returns `false` at the root sentinel, where there is nothing to
    /// undo. A branch forked directly at the root steps back to the root.
    pub fn undo(&mut self) -> bool {
        if self.current == self.root {
            return false;
        }
        let Some(node) = self.node(self.current) else {
            return false;
        };
        let parent = node.parent;
        node.transaction.undo();
        self.current = parent.unwrap_or(self.root);
        true
    }

    /// Steps into the primary continuation of the current node, running
    /// its transaction again. Returns `false` at the tip of the branch.
    pub fn redo(&mut self) -> bool {
        self.redo_branch(0)
    }

    /// Steps into the `n`-th continuation of the current node, running
    /// its transaction.
    ///
    /// Index 0 is the primary line; 1.. are forks in creation order (see
    /// [`branches`](Self::branches)). Returns `false` when no such
    /// continuation exists.
    pub fn redo_branch(&mut self, n: usize) -> bool {
        let Some(id) = self.branches().nth(n) else {
            return false;
        };
        if let Some(node) = self.node(id) {
            node.transaction.exec();
        }
        self.current = id;
        true
    }

    /// Ids of the continuations available from the current node: the
    /// primary line first, then forks in creation order.
    pub fn branches(&self) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.node(self.current).and_then(|node| node.next);
        std::iter::successors(first, move |id| {
            self.node(*id).and_then(|node| node.sibling)
        })
    }

    /// Messages of the transactions on the active line, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        let start = (self.current != self.root).then_some(self.current);
        std::iter::successors(start, move |id| {
            self.node(*id)
                .and_then(|node| node.parent)
                .filter(|parent| *parent != self.root)
        })
        .filter_map(move |id| self.node(id).map(|node| node.transaction.message()))
    }

    /// Messages of the continuations available from the current node, in
    /// [`branches`](Self::branches) order.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.branches()
            .filter_map(move |id| self.node(id).map(|node| node.transaction.message()))
    }

    /// Number of transactions on the active line (undo steps available).
    pub fn undo_count(&self) -> usize {
        self.undo_descriptions().count()
    }

    fn node(&self, id: NodeId) -> Option<&JournalNode> {
        self.slots.get(id.index()).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut JournalNode> {
        self.slots.get_mut(id.index()).and_then(|slot| slot.as_mut())
    }

    fn alloc(&mut self, transaction: Transaction, parent: Option<NodeId>) -> NodeId {
        let node = JournalNode {
            transaction,
            next: None,
            sibling: None,
            parent,
        };
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId((self.slots.len() - 1) as u32)
            }
        }
    }

    /// Frees everything reachable from `id`'s continuation link: the old
    /// future and every branch forked from it.
    fn truncate_future(&mut self, id: NodeId) {
        if let Some(next) = self.node_mut(id).and_then(|node| node.next.take()) {
            self.free_subtree(next);
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.slots[id.index()].take() {
                self.live -= 1;
                self.free.push(id.0);
                if let Some(next) = node.next {
                    stack.push(next);
                }
                if let Some(sibling) = node.sibling {
                    stack.push(sibling);
                }
            }
        }
    }

    /// Finds the node whose `next` (true) or `sibling` (false) link
    /// references `id`.
    fn referrer(&self, id: NodeId) -> Option<(NodeId, bool)> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let node = slot.as_ref()?;
            if node.next == Some(id) {
                Some((NodeId(index as u32), true))
            } else if node.sibling == Some(id) {
                Some((NodeId(index as u32), false))
            } else {
                None
            }
        })
    }

    fn subtree_contains(&self, id: NodeId, target: NodeId) -> bool {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if let Some(node) = self.node(id) {
                if let Some(next) = node.next {
                    stack.push(next);
                }
                if let Some(sibling) = node.sibling {
                    stack.push(sibling);
                }
            }
        }
        false
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("node_count", &self.live)
            .field("undo_count", &self.undo_count())
            .field("current", &self.current)
            .finish()
    }
}
