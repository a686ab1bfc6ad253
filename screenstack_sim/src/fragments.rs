// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fragment manager model.
//!
//! Every [`HostScope`] gets its own ordered list of added handles. Committed
//! transactions wait in a FIFO queue until the scope is flushed; executing an
//! add appends the screen's view to the container node, executing a remove
//! takes it out again through [`remove_child_view`]. A child scope is
//! destroyed once the handle that owns it is no longer added.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use screenstack_core::backend::{InputMethod, ViewHierarchy, remove_child_view};
use screenstack_core::stage::{HandleId, NodeId};
use screenstack_core::transaction::{
    Completion, HostScope, Transaction, TransactionId, TransactionOp,
};

use crate::views::ViewTree;

/// One executed operation, as recorded in the op log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoggedOp {
    /// The transaction the op belonged to.
    pub transaction: TransactionId,
    /// The scope it executed in.
    pub scope: HostScope,
    /// The operation.
    pub op: TransactionOp,
}

/// Where an added handle's view was placed.
#[derive(Clone, Copy, Debug)]
struct Placement {
    container: NodeId,
    view: NodeId,
}

/// In-memory fragment manager covering every scope of one activity.
#[derive(Clone, Debug, Default)]
pub struct FragmentManager {
    next_transaction: u64,
    added: BTreeMap<HostScope, Vec<HandleId>>,
    placements: HashMap<HandleId, Placement>,
    pending: VecDeque<Transaction>,
    destroyed: BTreeSet<HostScope>,
    log: Vec<LoggedOp>,
    begun: u64,
    committed: Vec<TransactionId>,
}

impl FragmentManager {
    /// Creates a manager with no scopes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh transaction id.
    pub fn begin(&mut self) -> TransactionId {
        self.next_transaction += 1;
        self.begun += 1;
        TransactionId(self.next_transaction)
    }

    /// Queues a transaction for later execution.
    pub fn enqueue(&mut self, transaction: Transaction) {
        self.committed.push(transaction.id());
        self.pending.push_back(transaction);
    }

    /// Executes every queued transaction of `scope`, in commit order.
    pub fn execute_pending(
        &mut self,
        scope: HostScope,
        views: &mut ViewTree,
        input: &mut dyn InputMethod,
    ) -> Vec<Completion> {
        let (run, keep): (VecDeque<_>, VecDeque<_>) =
            self.pending.drain(..).partition(|t| t.scope() == scope);
        self.pending = keep;
        run.into_iter()
            .map(|t| self.execute(t, views, input))
            .collect()
    }

    /// Executes every queued transaction, in commit order.
    pub fn execute_all(
        &mut self,
        views: &mut ViewTree,
        input: &mut dyn InputMethod,
    ) -> Vec<Completion> {
        let mut completions = Vec::new();
        while let Some(transaction) = self.pending.pop_front() {
            completions.push(self.execute(transaction, views, input));
        }
        completions
    }

    /// Executes a transaction immediately.
    ///
    /// # Panics
    ///
    /// Panics if the transaction adds a handle that is already added, which
    /// a real fragment manager rejects with an exception.
    pub fn execute(
        &mut self,
        transaction: Transaction,
        views: &mut ViewTree,
        input: &mut dyn InputMethod,
    ) -> Completion {
        let scope = transaction.scope();
        for &op in transaction.ops() {
            match op {
                TransactionOp::Add {
                    container,
                    handle,
                    view,
                } => {
                    assert!(
                        !self.is_added(handle),
                        "fragment {handle:?} is already added"
                    );
                    self.added.entry(scope).or_default().push(handle);
                    self.placements
                        .insert(handle, Placement { container, view });
                    views.detach(view);
                    views.append_child(container, view);
                }
                TransactionOp::Remove { handle } => {
                    let Some(list) = self.added.get_mut(&scope) else {
                        continue;
                    };
                    let Some(position) = list.iter().position(|&h| h == handle) else {
                        continue;
                    };
                    list.remove(position);
                    if let Some(placement) = self.placements.remove(&handle)
                        && let Some(index) = views.index_of(placement.container, placement.view)
                    {
                        _ = remove_child_view(views, input, placement.container, index);
                    }
                }
            }
            self.log.push(LoggedOp {
                transaction: transaction.id(),
                scope,
                op,
            });
        }

        for op in transaction.ops() {
            if let TransactionOp::Remove { handle } = *op
                && !self.is_added(handle)
            {
                self.destroy_scope(HostScope::Child(handle));
            }
        }
        transaction.completion()
    }

    /// Returns whether `handle` is added in any scope.
    #[must_use]
    pub fn is_added(&self, handle: HandleId) -> bool {
        self.added.values().any(|list| list.contains(&handle))
    }

    /// Returns the handles added in `scope`, in the order they were added.
    #[must_use]
    pub fn added(&self, scope: HostScope) -> Vec<HandleId> {
        self.added.get(&scope).cloned().unwrap_or_default()
    }

    /// Marks `scope` as torn down and forgets its handles.
    pub fn destroy_scope(&mut self, scope: HostScope) {
        if let Some(list) = self.added.remove(&scope) {
            for handle in list {
                self.placements.remove(&handle);
            }
        }
        self.destroyed.insert(scope);
    }

    /// Returns whether `scope` has been torn down.
    #[must_use]
    pub fn is_destroyed(&self, scope: HostScope) -> bool {
        self.destroyed.contains(&scope)
    }

    /// Makes the host believe `handle` is added in `scope` without it being
    /// placed anywhere, as left behind by a restored or foreign fragment.
    pub fn inject_added(&mut self, scope: HostScope, handle: HandleId) {
        self.added.entry(scope).or_default().push(handle);
    }

    /// Returns every executed op in order.
    #[must_use]
    pub fn log(&self) -> &[LoggedOp] {
        &self.log
    }

    /// Clears the op log.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Returns the number of transactions begun.
    #[must_use]
    pub fn begun(&self) -> u64 {
        self.begun
    }

    /// Returns the ids of asynchronously committed transactions in order.
    #[must_use]
    pub fn committed(&self) -> &[TransactionId] {
        &self.committed
    }

    /// Returns the number of committed transactions not yet executed.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
