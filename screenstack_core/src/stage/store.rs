// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena storage for screens, handles, and containers, plus the container
//! mutation API.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::backend::FrameScheduler;
use crate::config::StageConfig;
use crate::error::StageError;
use crate::trace::{TraceSink, Tracer};
use crate::transaction::{HostScope, Transaction, TransactionId};

use super::id::{ContainerId, HandleId, NodeId, ScreenId};
use super::slots::Slots;

/// Where a screen sits relative to the top of its container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActivityState {
    /// Not visible; the reconciler keeps it detached.
    #[default]
    Inactive,
    /// Attached below the top screen, or animating in or out.
    TransitioningOrBelowTop,
    /// The settled top screen.
    OnTop,
}

impl ActivityState {
    /// Returns `true` for every state except [`Inactive`](Self::Inactive).
    #[inline]
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

/// Per-container state.
pub(crate) struct ContainerState {
    /// Native node of the container.
    pub(crate) view: NodeId,
    /// Ordered handles; order is native z-order.
    pub(crate) handles: Vec<HandleId>,
    pub(crate) needs_update: bool,
    pub(crate) is_attached: bool,
    pub(crate) layout_enqueued: bool,
    /// Set while nested inside another screen's handle.
    pub(crate) parent_handle: Option<HandleId>,
    /// Resolved on attach; `None` until then.
    pub(crate) host: Option<HostScope>,
    /// Open, uncommitted transaction.
    pub(crate) pending: Option<Transaction>,
    /// Latest committed transaction not yet reported complete.
    pub(crate) in_flight: Option<TransactionId>,
    pub(crate) scheduler: Box<dyn FrameScheduler>,
}

impl fmt::Debug for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerState")
            .field("view", &self.view)
            .field("handles", &self.handles)
            .field("needs_update", &self.needs_update)
            .field("is_attached", &self.is_attached)
            .field("layout_enqueued", &self.layout_enqueued)
            .field("parent_handle", &self.parent_handle)
            .field("host", &self.host)
            .field("pending", &self.pending)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

/// Arena of screens, handles, and containers.
///
/// Screens and handles are stored in struct-of-arrays layout; containers,
/// which carry a boxed scheduler and an open transaction, are stored one
/// struct per slot. Freed slots are recycled and generation counters make
/// stale ids panic on use.
#[derive(Debug)]
pub struct Stage {
    pub(crate) config: StageConfig,

    // -- Screens --
    pub(crate) screen_slots: Slots,
    pub(crate) activity_state: Vec<ActivityState>,
    pub(crate) screen_view: Vec<NodeId>,
    pub(crate) screen_container: Vec<Option<ContainerId>>,
    pub(crate) screen_handle: Vec<Option<HandleId>>,
    pub(crate) transitioning: Vec<bool>,

    // -- Handles --
    pub(crate) handle_slots: Slots,
    pub(crate) handle_screen: Vec<ScreenId>,
    pub(crate) child_containers: Vec<Vec<ContainerId>>,

    // -- Containers --
    pub(crate) container_slots: Slots,
    pub(crate) containers: Vec<Option<ContainerState>>,

    // -- Diagnostics --
    pub(crate) tracer: Tracer,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(StageConfig::default())
    }
}

impl Stage {
    /// Creates an empty stage.
    #[must_use]
    pub fn new(config: StageConfig) -> Self {
        Self {
            config,
            screen_slots: Slots::default(),
            activity_state: Vec::new(),
            screen_view: Vec::new(),
            screen_container: Vec::new(),
            screen_handle: Vec::new(),
            transitioning: Vec::new(),
            handle_slots: Slots::default(),
            handle_screen: Vec::new(),
            child_containers: Vec::new(),
            container_slots: Slots::default(),
            containers: Vec::new(),
            tracer: Tracer::none(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Installs a trace sink, replacing any previous one.
    ///
    /// Events are only delivered when the `trace` feature is enabled.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    // -- Screen API --

    /// Creates an inactive screen rendering into `view`.
    pub fn create_screen(&mut self, view: NodeId) -> ScreenId {
        let slot = self.screen_slots.alloc();
        let i = slot.idx as usize;
        if slot.reused {
            self.activity_state[i] = ActivityState::Inactive;
            self.screen_view[i] = view;
            self.screen_container[i] = None;
            self.screen_handle[i] = None;
            self.transitioning[i] = false;
        } else {
            self.activity_state.push(ActivityState::Inactive);
            self.screen_view.push(view);
            self.screen_container.push(None);
            self.screen_handle.push(None);
            self.transitioning.push(false);
        }
        ScreenId {
            idx: slot.idx,
            generation: slot.generation,
        }
    }

    /// Destroys a screen.
    ///
    /// A screen outside any container has no live handle, so nothing else
    /// needs releasing.
    ///
    /// # Panics
    ///
    /// Panics if the id is stale or the screen still belongs to a container.
    pub fn destroy_screen(&mut self, id: ScreenId) {
        self.validate_screen(id);
        assert!(
            self.screen_container[id.idx as usize].is_none(),
            "cannot destroy a screen that still belongs to a container"
        );
        self.screen_slots.free(id.idx);
    }

    /// Returns whether the id refers to a live screen.
    #[must_use]
    pub fn is_screen_alive(&self, id: ScreenId) -> bool {
        self.screen_slots.is_live(id.idx, id.generation)
    }

    /// Returns the activity state of a screen.
    #[must_use]
    pub fn activity_state(&self, id: ScreenId) -> ActivityState {
        self.validate_screen(id);
        self.activity_state[id.idx as usize]
    }

    /// Sets the activity state of a screen.
    ///
    /// If the state changed and the screen belongs to a container, that
    /// container is marked dirty.
    pub fn set_activity_state(&mut self, id: ScreenId, state: ActivityState) {
        self.validate_screen(id);
        if self.activity_state[id.idx as usize] == state {
            return;
        }
        self.activity_state[id.idx as usize] = state;
        if let Some(container) = self.screen_container[id.idx as usize] {
            self.mark_updated(container);
        }
    }

    /// Returns the container currently holding a screen.
    #[must_use]
    pub fn screen_container(&self, id: ScreenId) -> Option<ContainerId> {
        self.validate_screen(id);
        self.screen_container[id.idx as usize]
    }

    /// Reassigns a screen's owning container.
    ///
    /// This only updates the back-reference; callers that change what a
    /// container holds must mark it dirty themselves.
    pub fn set_screen_container(&mut self, id: ScreenId, container: Option<ContainerId>) {
        self.validate_screen(id);
        self.screen_container[id.idx as usize] = container;
    }

    /// Returns the current handle of a screen.
    #[must_use]
    pub fn screen_handle(&self, id: ScreenId) -> Option<HandleId> {
        self.validate_screen(id);
        self.screen_handle[id.idx as usize]
    }

    /// Returns the native view of a screen.
    #[must_use]
    pub fn screen_view(&self, id: ScreenId) -> NodeId {
        self.validate_screen(id);
        self.screen_view[id.idx as usize]
    }

    /// Returns whether the last reconciliation pass saw a transition settling.
    #[must_use]
    pub fn is_transitioning(&self, id: ScreenId) -> bool {
        self.validate_screen(id);
        self.transitioning[id.idx as usize]
    }

    // -- Handle API --

    /// Returns whether the id refers to a live handle.
    #[must_use]
    pub fn is_handle_alive(&self, id: HandleId) -> bool {
        self.handle_slots.is_live(id.idx, id.generation)
    }

    /// Returns the number of live handles.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        self.handle_slots.live_count()
    }

    /// Returns the screen a handle adapts.
    #[must_use]
    pub fn handle_screen(&self, id: HandleId) -> ScreenId {
        self.validate_handle(id);
        self.handle_screen[id.idx as usize]
    }

    /// Returns the containers nested beneath a handle.
    #[must_use]
    pub fn child_containers(&self, id: HandleId) -> &[ContainerId] {
        self.validate_handle(id);
        &self.child_containers[id.idx as usize]
    }

    pub(crate) fn register_child_container(&mut self, handle: HandleId, container: ContainerId) {
        let children = &mut self.child_containers[handle.idx as usize];
        if !children.contains(&container) {
            children.push(container);
        }
    }

    pub(crate) fn unregister_child_container(&mut self, handle: HandleId, container: ContainerId) {
        if self.is_handle_alive(handle) {
            self.child_containers[handle.idx as usize].retain(|&c| c != container);
        }
    }

    /// Returns the owning container of the handle's screen, or `None` when
    /// the handle or its screen no longer exists.
    pub(crate) fn handle_owner(&self, handle: HandleId) -> Option<ContainerId> {
        if !self.is_handle_alive(handle) {
            return None;
        }
        let screen = self.handle_screen[handle.idx as usize];
        if !self.is_screen_alive(screen) {
            return None;
        }
        self.screen_container[screen.idx as usize]
    }

    fn create_handle(&mut self, screen: ScreenId) -> HandleId {
        let slot = self.handle_slots.alloc();
        if slot.reused {
            self.handle_screen[slot.idx as usize] = screen;
            self.child_containers[slot.idx as usize].clear();
        } else {
            self.handle_screen.push(screen);
            self.child_containers.push(Vec::new());
        }
        HandleId {
            idx: slot.idx,
            generation: slot.generation,
        }
    }

    /// Releases a handle that left its container's list.
    ///
    /// The host may still report the id as added; a dead handle has no
    /// owner, so the next pass detaches it as an orphan.
    fn release_handle(&mut self, handle: HandleId) -> ScreenId {
        let i = handle.idx as usize;
        let screen = self.handle_screen[i];
        self.screen_container[screen.idx as usize] = None;
        if self.screen_handle[screen.idx as usize] == Some(handle) {
            self.screen_handle[screen.idx as usize] = None;
        }
        self.child_containers[i].clear();
        self.handle_slots.free(handle.idx);
        screen
    }

    // -- Container API --

    /// Creates a detached container whose native node is `view`.
    ///
    /// `scheduler` receives this container's frame requests.
    pub fn create_container(
        &mut self,
        view: NodeId,
        scheduler: Box<dyn FrameScheduler>,
    ) -> ContainerId {
        let slot = self.container_slots.alloc();
        let state = ContainerState {
            view,
            handles: Vec::new(),
            needs_update: false,
            is_attached: false,
            layout_enqueued: false,
            parent_handle: None,
            host: None,
            pending: None,
            in_flight: None,
            scheduler,
        };
        if slot.reused {
            self.containers[slot.idx as usize] = Some(state);
        } else {
            self.containers.push(Some(state));
        }
        ContainerId {
            idx: slot.idx,
            generation: slot.generation,
        }
    }

    /// Destroys a detached container, releasing every screen it holds and
    /// freeing their handles.
    ///
    /// # Panics
    ///
    /// Panics if the id is stale or the container is still attached.
    pub fn destroy_container(&mut self, id: ContainerId) {
        let state = self.container(id);
        assert!(!state.is_attached, "cannot destroy an attached container");
        let parent = state.parent_handle;
        let handles = core::mem::take(&mut self.container_mut(id).handles);
        for handle in handles {
            self.release_handle(handle);
        }
        if let Some(parent) = parent {
            self.unregister_child_container(parent, id);
        }
        self.containers[id.idx as usize] = None;
        self.container_slots.free(id.idx);
    }

    /// Returns whether the id refers to a live container.
    #[must_use]
    pub fn is_container_alive(&self, id: ContainerId) -> bool {
        self.container_slots.is_live(id.idx, id.generation)
    }

    /// Wraps `screen` in a new handle and inserts it at `index`.
    ///
    /// # Errors
    ///
    /// - [`StageError::IndexOutOfBounds`] if `index > screen_count`.
    /// - [`StageError::ScreenAlreadyMounted`] if the screen belongs to a
    ///   container.
    ///
    /// # Panics
    ///
    /// Panics if either id is stale.
    pub fn add_screen(
        &mut self,
        container: ContainerId,
        screen: ScreenId,
        index: usize,
    ) -> Result<HandleId, StageError> {
        self.validate_screen(screen);
        let len = self.container(container).handles.len();
        if index > len {
            return Err(StageError::IndexOutOfBounds { index, len });
        }
        if self.screen_container[screen.idx as usize].is_some() {
            return Err(StageError::ScreenAlreadyMounted(screen));
        }

        let handle = self.create_handle(screen);
        self.screen_handle[screen.idx as usize] = Some(handle);
        self.container_mut(container).handles.insert(index, handle);
        self.screen_container[screen.idx as usize] = Some(container);
        self.mark_updated(container);
        Ok(handle)
    }

    /// Removes the screen at `index` and returns it.
    ///
    /// The screen's handle is freed; a re-add wraps it in a new one.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::IndexOutOfBounds`] if `index >= screen_count`.
    pub fn remove_screen_at(
        &mut self,
        container: ContainerId,
        index: usize,
    ) -> Result<ScreenId, StageError> {
        let len = self.container(container).handles.len();
        if index >= len {
            return Err(StageError::IndexOutOfBounds { index, len });
        }
        let handle = self.container_mut(container).handles.remove(index);
        let screen = self.release_handle(handle);
        self.mark_updated(container);
        Ok(screen)
    }

    /// Removes every screen from the container.
    pub fn remove_all_screens(&mut self, container: ContainerId) {
        let handles = core::mem::take(&mut self.container_mut(container).handles);
        for handle in handles {
            self.release_handle(handle);
        }
        self.mark_updated(container);
    }

    /// Returns the number of screens in the container.
    #[must_use]
    pub fn screen_count(&self, container: ContainerId) -> usize {
        self.container(container).handles.len()
    }

    /// Returns the screen at `index`, if in bounds.
    #[must_use]
    pub fn screen_at(&self, container: ContainerId, index: usize) -> Option<ScreenId> {
        self.container(container)
            .handles
            .get(index)
            .map(|h| self.handle_screen[h.idx as usize])
    }

    /// Returns an iterator over the container's screens in list order.
    pub fn screens(&self, container: ContainerId) -> impl Iterator<Item = ScreenId> + '_ {
        self.container(container)
            .handles
            .iter()
            .map(|h| self.handle_screen[h.idx as usize])
    }

    /// Returns the container's handles in list order.
    #[must_use]
    pub fn handles(&self, container: ContainerId) -> &[HandleId] {
        &self.container(container).handles
    }

    /// Returns whether `handle` is in the container's list.
    #[must_use]
    pub fn has_screen(&self, container: ContainerId, handle: HandleId) -> bool {
        self.container(container).handles.contains(&handle)
    }

    /// Returns the first screen, in list order, that is [`ActivityState::OnTop`].
    #[must_use]
    pub fn top_screen(&self, container: ContainerId) -> Option<ScreenId> {
        self.screens(container)
            .find(|s| self.activity_state[s.idx as usize] == ActivityState::OnTop)
    }

    /// Returns the native node of the container.
    #[must_use]
    pub fn container_view(&self, container: ContainerId) -> NodeId {
        self.container(container).view
    }

    /// Returns whether the container is nested beneath a screen handle.
    #[must_use]
    pub fn is_nested(&self, container: ContainerId) -> bool {
        self.container(container).parent_handle.is_some()
    }

    /// Returns the handle the container is nested beneath.
    #[must_use]
    pub fn parent_handle(&self, container: ContainerId) -> Option<HandleId> {
        self.container(container).parent_handle
    }

    /// Returns whether the container is live in the native tree.
    #[must_use]
    pub fn is_attached(&self, container: ContainerId) -> bool {
        self.container(container).is_attached
    }

    /// Returns whether a reconciliation pass is owed.
    #[must_use]
    pub fn needs_update(&self, container: ContainerId) -> bool {
        self.container(container).needs_update
    }

    /// Returns the host scope resolved on attach.
    #[must_use]
    pub fn host_scope(&self, container: ContainerId) -> Option<HostScope> {
        self.container(container).host
    }

    /// Returns the committed transaction that has not yet completed.
    #[must_use]
    pub fn in_flight_transaction(&self, container: ContainerId) -> Option<TransactionId> {
        self.container(container).in_flight
    }

    /// Lets a nested container's owner propagate a dirty signal.
    pub fn notify_child_update(&mut self, container: ContainerId) {
        self.mark_updated(container);
    }

    // -- Internal helpers --

    /// Panics if the id is stale.
    pub(crate) fn validate_screen(&self, id: ScreenId) {
        assert!(
            self.is_screen_alive(id),
            "stale ScreenId: {id:?} (current gen: {})",
            self.screen_slots.current_generation(id.idx)
        );
    }

    /// Panics if the id is stale.
    pub(crate) fn validate_handle(&self, id: HandleId) {
        assert!(
            self.is_handle_alive(id),
            "stale HandleId: {id:?} (current gen: {})",
            self.handle_slots.current_generation(id.idx)
        );
    }

    /// Returns the container state, panicking if the id is stale.
    pub(crate) fn container(&self, id: ContainerId) -> &ContainerState {
        match self.containers.get(id.idx as usize) {
            Some(Some(state)) if self.is_container_alive(id) => state,
            _ => panic!(
                "stale ContainerId: {id:?} (current gen: {})",
                self.container_slots.current_generation(id.idx)
            ),
        }
    }

    /// Returns the container state mutably, panicking if the id is stale.
    pub(crate) fn container_mut(&mut self, id: ContainerId) -> &mut ContainerState {
        let alive = self.is_container_alive(id);
        let generation = self.container_slots.current_generation(id.idx);
        match self.containers.get_mut(id.idx as usize) {
            Some(Some(state)) if alive => state,
            _ => panic!("stale ContainerId: {id:?} (current gen: {generation})"),
        }
    }
}
