// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched native operations.
//!
//! A [`Transaction`] accumulates the add/remove operations produced by one
//! reconciliation pass. It is opened lazily on the first queued operation and
//! handed to [`TransactionHost::commit`](crate::backend::TransactionHost::commit)
//! as a single atomic batch. The host later reports a [`Completion`] naming
//! the transaction, which the owning container uses to clear its in-flight
//! marker.

use alloc::vec::Vec;

use crate::stage::{ContainerId, HandleId, NodeId};

/// Identifies a transaction issued by a [`TransactionHost`](crate::backend::TransactionHost).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub u64);

/// Which native transaction host a container talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostScope {
    /// The top-level host owned by the hosting activity.
    Root,
    /// The child-scoped host of a screen handle, used by nested containers.
    Child(HandleId),
}

/// A single queued native operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionOp {
    /// Attach `handle` at the end of `container`, rendering into `view`.
    Add {
        /// Native node of the container the handle is added to.
        container: NodeId,
        /// The handle being attached.
        handle: HandleId,
        /// Native node of the handle's screen.
        view: NodeId,
    },
    /// Detach `handle` from whichever container it is attached to.
    Remove {
        /// The handle being detached.
        handle: HandleId,
    },
}

/// An open batch of native operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    id: TransactionId,
    owner: ContainerId,
    scope: HostScope,
    reordering_allowed: bool,
    ops: Vec<TransactionOp>,
}

impl Transaction {
    /// Opens an empty transaction owned by `owner`.
    #[must_use]
    pub fn new(id: TransactionId, owner: ContainerId, scope: HostScope) -> Self {
        Self {
            id,
            owner,
            scope,
            reordering_allowed: false,
            ops: Vec::new(),
        }
    }

    /// Lets the host reorder and coalesce operations while executing.
    #[must_use]
    pub fn with_reordering_allowed(mut self, allowed: bool) -> Self {
        self.reordering_allowed = allowed;
        self
    }

    /// Queues an attach.
    pub fn add(&mut self, container: NodeId, handle: HandleId, view: NodeId) {
        self.ops.push(TransactionOp::Add {
            container,
            handle,
            view,
        });
    }

    /// Queues a detach.
    pub fn remove(&mut self, handle: HandleId) {
        self.ops.push(TransactionOp::Remove { handle });
    }

    /// Returns the transaction id.
    #[must_use]
    pub const fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the container that opened this transaction.
    #[must_use]
    pub const fn owner(&self) -> ContainerId {
        self.owner
    }

    /// Returns the host scope the transaction targets.
    #[must_use]
    pub const fn scope(&self) -> HostScope {
        self.scope
    }

    /// Returns whether the host may reorder operations.
    #[must_use]
    pub const fn reordering_allowed(&self) -> bool {
        self.reordering_allowed
    }

    /// Returns the queued operations in order.
    #[must_use]
    pub fn ops(&self) -> &[TransactionOp] {
        &self.ops
    }

    /// Returns `true` if nothing has been queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns the completion record the host reports once executed.
    #[must_use]
    pub const fn completion(&self) -> Completion {
        Completion {
            transaction: self.id,
            owner: self.owner,
        }
    }
}

/// Reported by the host when a committed transaction has executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Completion {
    /// The transaction that finished.
    pub transaction: TransactionId,
    /// The container that committed it.
    pub owner: ContainerId,
}
