// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attaching containers to and detaching them from the native tree.

use alloc::vec::Vec;

use crate::backend::{NodeKind, Platform, remove_child_view};
use crate::error::StageError;
use crate::trace::{CommitEvent, KeyboardDismissEvent, MountEvent, UnmountEvent};
use crate::transaction::{HostScope, Transaction};

use super::id::{ContainerId, NodeId};
use super::store::Stage;

impl Stage {
    /// Called when the container's native node enters a window.
    ///
    /// Resolves which transaction host the container talks to by walking up
    /// the native tree to the nearest screen or root view, then runs a
    /// reconciliation pass right away.
    ///
    /// # Errors
    ///
    /// - [`StageError::ParentScreenWithoutHandle`] if the nearest screen has
    ///   no handle yet.
    /// - [`StageError::UnsupportedHostingActivity`] if the root view cannot
    ///   host fragments.
    /// - [`StageError::NotUnderRootView`] if the walk reached the top of the
    ///   tree without a root view.
    pub fn on_attached(
        &mut self,
        container: ContainerId,
        platform: &mut dyn Platform,
    ) -> Result<(), StageError> {
        let node = self.container(container).view;
        let scope = self.resolve_host(container, node, platform)?;

        let state = self.container_mut(container);
        state.is_attached = true;
        state.needs_update = true;
        state.host = Some(scope);
        self.tracer.mount(&MountEvent { container, scope });
        self.update_if_needed(container, platform)
    }

    fn resolve_host(
        &mut self,
        container: ContainerId,
        node: NodeId,
        platform: &mut dyn Platform,
    ) -> Result<HostScope, StageError> {
        let views = platform.views();
        let mut current = node;
        let kind = loop {
            match views.parent(current) {
                Some(parent) => {
                    current = parent;
                    match views.classify(parent) {
                        NodeKind::View => {}
                        kind => break Some(kind),
                    }
                }
                None => break None,
            }
        };

        match kind {
            Some(NodeKind::Screen(screen)) => {
                let handle = self
                    .screen_handle(screen)
                    .ok_or(StageError::ParentScreenWithoutHandle(screen))?;
                self.container_mut(container).parent_handle = Some(handle);
                self.register_child_container(handle, container);
                Ok(HostScope::Child(handle))
            }
            Some(NodeKind::Root {
                fragment_host: true,
            }) => Ok(HostScope::Root),
            Some(NodeKind::Root {
                fragment_host: false,
            }) => Err(StageError::UnsupportedHostingActivity),
            Some(NodeKind::View) | None => Err(StageError::NotUnderRootView),
        }
    }

    /// Called when the container's native node leaves its window.
    ///
    /// Flushes the host's pending work for this container's scope, then
    /// synchronously removes every handle the host still holds for the
    /// container and force-removes all native children so a reattach starts
    /// clean. Pending adds run first so none of them lands after the
    /// removal.
    pub fn on_detached(&mut self, container: ContainerId, platform: &mut dyn Platform) {
        let state = self.container(container);
        let host = state.host;
        let node = state.view;

        let mut removed_handles = 0;
        if let Some(scope) = host
            && !platform.host().is_destroyed(scope)
        {
            for completion in platform.host().execute_pending(scope) {
                self.transaction_completed(completion);
            }
            removed_handles = self.remove_my_handles(container, scope, platform);
        }

        let state = self.container_mut(container);
        let parent = state.parent_handle.take();
        state.is_attached = false;
        if let Some(parent) = parent {
            self.unregister_child_container(parent, container);
        }

        let dismiss = self.config.dismiss_keyboard_on_focused_removal;
        let (views, input) = platform.views_and_input();
        let count = views.child_count(node);
        for index in (0..count).rev() {
            if !dismiss {
                views.remove_child_at(node, index);
                continue;
            }
            let child = views.child_at(node, index);
            let focused = child.is_some() && views.focused_child(node) == child;
            let result = remove_child_view(views, input, node, index);
            if focused {
                self.tracer.keyboard_dismiss(&KeyboardDismissEvent {
                    container: node,
                    succeeded: result.is_ok(),
                });
            }
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "child counts are far below u32::MAX"
        )]
        let removed_views = count as u32;
        self.tracer.unmount(&UnmountEvent {
            container,
            removed_handles,
            removed_views,
        });
    }

    /// Commits a synchronous removal of every added handle whose screen
    /// belongs to `container`. Returns how many were removed.
    fn remove_my_handles(
        &mut self,
        container: ContainerId,
        scope: HostScope,
        platform: &mut dyn Platform,
    ) -> u32 {
        let mine: Vec<_> = platform
            .host()
            .added_handles(scope)
            .into_iter()
            .filter(|&h| self.handle_owner(h) == Some(container))
            .collect();
        if mine.is_empty() {
            return 0;
        }

        let id = platform.host().begin_transaction(scope);
        let mut transaction = Transaction::new(id, container, scope)
            .with_reordering_allowed(self.config.reordering_allowed);
        for &handle in &mine {
            transaction.remove(handle);
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "handle counts are far below u32::MAX"
        )]
        let ops = mine.len() as u32;
        self.tracer.commit(&CommitEvent {
            container,
            transaction: id,
            ops,
            synchronous: true,
        });
        platform.host().commit_now(transaction);
        ops
    }
}
