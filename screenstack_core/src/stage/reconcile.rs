// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reconciliation pass.
//!
//! A pass compares the container's logical list with the handles the host
//! reports as added and queues the difference into one transaction:
//!
//! 1. Every handle the host has added in the container's scope starts out as
//!    an orphan candidate.
//! 2. Listed handles that are inactive but added are removed. Every listed
//!    handle leaves the candidate set.
//! 3. Remaining candidates whose screen no longer belongs to a container,
//!    or that are no longer their screen's current handle, are removed.
//! 4. The pass is *transitioning* when no listed screen is on top.
//! 5. Active handles not yet added are appended. Once one has been appended,
//!    every later active handle that was already added is removed and
//!    re-added so list order stays native z-order.
//! 6. The transaction is committed.
//!
//! The host answers `is_added` from its own state, which does not reflect
//! operations queued in this pass. Pending work for the scope is flushed
//! before the pass starts so those answers are current.

use alloc::collections::BTreeSet;

use crate::backend::Platform;
use crate::error::StageError;
use crate::trace::{CommitEvent, UpdatePassEvent};
use crate::transaction::{HostScope, Transaction};

use super::id::{ContainerId, HandleId, ScreenId};
use super::store::{ActivityState, Stage};

#[derive(Clone, Copy, Debug, Default)]
struct PassCounts {
    attached: u32,
    detached: u32,
    moved: u32,
    orphans: u32,
}

impl Stage {
    /// Runs a reconciliation pass if the container is dirty, attached, and
    /// knows its host.
    pub(crate) fn update_if_needed(
        &mut self,
        container: ContainerId,
        platform: &mut dyn Platform,
    ) -> Result<(), StageError> {
        let state = self.container(container);
        if !state.needs_update || !state.is_attached {
            return Ok(());
        }
        let Some(scope) = state.host else {
            return Ok(());
        };
        self.container_mut(container).needs_update = false;
        let result = self.on_update(container, scope, platform);
        self.settle_pass(container, result)
    }

    /// A failed pass leaves the container dirty with a fresh request posted.
    fn settle_pass(
        &mut self,
        container: ContainerId,
        result: Result<(), StageError>,
    ) -> Result<(), StageError> {
        if result.is_err() {
            self.mark_updated(container);
        }
        result
    }

    fn on_update(
        &mut self,
        container: ContainerId,
        scope: HostScope,
        platform: &mut dyn Platform,
    ) -> Result<(), StageError> {
        for completion in platform.host().execute_pending(scope) {
            self.transaction_completed(completion);
        }
        self.perform_update(container, scope, platform)?;
        self.notify_container_update(container, platform);
        Ok(())
    }

    fn perform_update(
        &mut self,
        container: ContainerId,
        scope: HostScope,
        platform: &mut dyn Platform,
    ) -> Result<(), StageError> {
        let mut counts = PassCounts::default();
        let handles = self.container(container).handles.clone();
        let mut candidates: BTreeSet<HandleId> =
            platform.host().added_handles(scope).into_iter().collect();

        for &handle in &handles {
            if self.handle_state(handle) == ActivityState::Inactive
                && platform.host().is_added(handle)
            {
                self.transaction_mut(container, platform)?.remove(handle);
                counts.detached += 1;
            }
            candidates.remove(&handle);
        }

        for handle in candidates {
            if self.is_orphan(handle) {
                self.transaction_mut(container, platform)?.remove(handle);
                counts.orphans += 1;
            }
        }

        let transitioning = self.top_screen(container).is_none();
        let node = self.container(container).view;

        let mut added_before = false;
        for &handle in &handles {
            let screen = self.handle_screen[handle.idx as usize];
            let active = self.activity_state[screen.idx as usize].is_active();
            if active {
                let view = self.screen_view[screen.idx as usize];
                if !platform.host().is_added(handle) {
                    added_before = true;
                    self.transaction_mut(container, platform)?
                        .add(node, handle, view);
                    counts.attached += 1;
                } else if added_before {
                    let transaction = self.transaction_mut(container, platform)?;
                    transaction.remove(handle);
                    transaction.add(node, handle, view);
                    counts.moved += 1;
                }
            }
            self.set_transitioning(screen, transitioning, platform);
        }

        self.tracer.update_pass(&UpdatePassEvent {
            container,
            attached: counts.attached,
            detached: counts.detached,
            moved: counts.moved,
            orphans: counts.orphans,
            transitioning,
        });
        self.try_commit(container, platform);
        Ok(())
    }

    fn handle_state(&self, handle: HandleId) -> ActivityState {
        let screen = self.handle_screen[handle.idx as usize];
        self.activity_state[screen.idx as usize]
    }

    /// A handle the host still holds but nothing logically owns.
    fn is_orphan(&self, handle: HandleId) -> bool {
        if self.handle_owner(handle).is_none() {
            return true;
        }
        let screen = self.handle_screen[handle.idx as usize];
        self.screen_handle[screen.idx as usize] != Some(handle)
    }

    /// Returns the open transaction, beginning one on the host if needed.
    fn transaction_mut(
        &mut self,
        container: ContainerId,
        platform: &mut dyn Platform,
    ) -> Result<&mut Transaction, StageError> {
        let reordering = self.config.reordering_allowed;
        let state = self.container_mut(container);
        let scope = state.host.ok_or(StageError::NoTransactionHost)?;
        Ok(state.pending.get_or_insert_with(|| {
            let id = platform.host().begin_transaction(scope);
            Transaction::new(id, container, scope).with_reordering_allowed(reordering)
        }))
    }

    /// Commits the open transaction, if any, and records it as in flight.
    fn try_commit(&mut self, container: ContainerId, platform: &mut dyn Platform) {
        let state = self.container_mut(container);
        let Some(transaction) = state.pending.take() else {
            return;
        };
        state.in_flight = Some(transaction.id());

        #[expect(
            clippy::cast_possible_truncation,
            reason = "a pass queues at most two ops per handle"
        )]
        let ops = transaction.ops().len() as u32;
        self.tracer.commit(&CommitEvent {
            container,
            transaction: transaction.id(),
            ops,
            synchronous: false,
        });
        platform.host().commit(transaction);
    }

    fn set_transitioning(
        &mut self,
        screen: ScreenId,
        transitioning: bool,
        platform: &mut dyn Platform,
    ) {
        let i = screen.idx as usize;
        if self.transitioning[i] == transitioning {
            return;
        }
        self.transitioning[i] = transitioning;
        platform.set_screen_transitioning(screen, self.screen_view[i], transitioning);
    }

    fn notify_container_update(&self, container: ContainerId, platform: &mut dyn Platform) {
        let Some(top) = self.top_screen(container) else {
            return;
        };
        if let Some(handle) = self.screen_handle[top.idx as usize] {
            platform.on_container_update(handle, top);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;
    use crate::backend::FrameScheduler;
    use crate::stage::NodeId;
    use crate::timing::{CallbackQueue, FrameRequest};

    #[derive(Clone, Default)]
    struct Posted(Rc<RefCell<Vec<(CallbackQueue, FrameRequest)>>>);

    impl FrameScheduler for Posted {
        fn post_frame_callback(&mut self, queue: CallbackQueue, request: FrameRequest) {
            self.0.borrow_mut().push((queue, request));
        }
    }

    #[test]
    fn failed_pass_stays_dirty_and_reposts() {
        let mut stage = Stage::default();
        let posted = Posted::default();
        let c = stage.create_container(NodeId(1), Box::new(posted.clone()));

        let result = stage.settle_pass(c, Err(StageError::NoTransactionHost));
        assert_eq!(result, Err(StageError::NoTransactionHost));
        assert!(stage.needs_update(c));
        assert_eq!(
            *posted.0.borrow(),
            [(CallbackQueue::NativeAnimated, FrameRequest::update(c))]
        );
    }

    #[test]
    fn successful_pass_stays_clean() {
        let mut stage = Stage::default();
        let posted = Posted::default();
        let c = stage.create_container(NodeId(1), Box::new(posted.clone()));

        assert_eq!(stage.settle_pass(c, Ok(())), Ok(()));
        assert!(!stage.needs_update(c));
        assert!(posted.0.borrow().is_empty());
    }
}
