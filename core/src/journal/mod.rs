//! Branching transaction journal.
//!
//! This module records every model-mutating operation of the editor as a
//! [`Transaction`] in a tree-shaped [`Journal`]:
//!
//! - [`Transaction`] — an executable, undoable unit of work with a
//!   human-readable message
//! - [`Journal`] — the history tree; appending extends the active line
//!   (discarding abandoned futures), forking opens an alternate branch
//! - [`NodeId`] — stable handle to a journal node
//! - [`TransactionQueue`] — thread-safe queue for submitting transactions
//!   from any thread; drained once per frame by the mode manager
//!
//! # Undo and redo
//!
//! There are no separate undo/redo stacks. Walking the journal's current
//! position toward the root undoes one transaction per step; walking into
//! a continuation redoes it, and picking a different continuation switches
//! to another branch of history. See [`Journal::undo`], [`Journal::redo`]
//! and [`Journal::redo_branch`].

mod queue;
mod transaction;
mod tree;

pub use queue::TransactionQueue;
pub use transaction::{DocumentRef, Transaction};
pub use tree::{Journal, NodeId};
