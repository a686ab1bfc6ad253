// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the engine.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Stage`](crate::stage::Stage) calls at each step of a container's life.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] owns an optional boxed [`TraceSink`]. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! A sink installed on the stage is owned by it. To inspect recorded events
//! afterwards, install an `Rc<RefCell<S>>` and keep a clone: the shared
//! pointer forwards every event to `S`.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use crate::stage::{ContainerId, NodeId};
use crate::timing::FrameCallbackKind;
use crate::transaction::{HostScope, TransactionId};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a frame callback is delivered to a live container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCallbackEvent {
    /// Frame counter of the tick that fired the callback.
    pub frame_index: u64,
    /// Frame start time of that tick, in nanoseconds.
    pub frame_time_nanos: u64,
    /// The container the callback belongs to.
    pub container: ContainerId,
    /// Which pass was requested.
    pub kind: FrameCallbackKind,
}

/// Emitted after a reconciliation pass has queued its operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdatePassEvent {
    /// The reconciled container.
    pub container: ContainerId,
    /// Handles newly attached.
    pub attached: u32,
    /// Inactive handles detached.
    pub detached: u32,
    /// Handles moved to the front to restore z-order.
    pub moved: u32,
    /// Orphaned handles detached by the safety pass.
    pub orphans: u32,
    /// Whether no screen was on top (a transition is still settling).
    pub transitioning: bool,
}

/// Emitted when a container commits its open transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitEvent {
    /// The committing container.
    pub container: ContainerId,
    /// The committed transaction.
    pub transaction: TransactionId,
    /// Number of queued operations.
    pub ops: u32,
    /// Whether the commit was synchronous (teardown path).
    pub synchronous: bool,
}

/// Emitted when the host reports a finished transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionEvent {
    /// The owning container.
    pub container: ContainerId,
    /// The finished transaction.
    pub transaction: TransactionId,
    /// `false` when a newer commit had already superseded it.
    pub cleared_in_flight: bool,
}

/// Emitted when a container finds its transaction host on attach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MountEvent {
    /// The attached container.
    pub container: ContainerId,
    /// The host scope it will use.
    pub scope: HostScope,
}

/// Emitted when a container is detached from the native tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnmountEvent {
    /// The detached container.
    pub container: ContainerId,
    /// Handles force-removed from the host.
    pub removed_handles: u32,
    /// Native child views force-removed.
    pub removed_views: u32,
}

/// Emitted after a deferred layout pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutEvent {
    /// The laid-out container.
    pub container: ContainerId,
    /// Container width.
    pub width: f64,
    /// Container height.
    pub height: f64,
    /// Number of native children laid out.
    pub children: u32,
}

/// Emitted when the keyboard workaround ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardDismissEvent {
    /// The container whose focused child was removed.
    pub container: NodeId,
    /// Whether the platform accepted the dismissal.
    pub succeeded: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame callback reaches a live container.
    fn on_frame_callback(&mut self, e: &FrameCallbackEvent) {
        _ = e;
    }

    /// Called after a reconciliation pass.
    fn on_update_pass(&mut self, e: &UpdatePassEvent) {
        _ = e;
    }

    /// Called when a transaction is committed.
    fn on_commit(&mut self, e: &CommitEvent) {
        _ = e;
    }

    /// Called when a transaction completion is routed to its container.
    fn on_completion(&mut self, e: &CompletionEvent) {
        _ = e;
    }

    /// Called when a container attaches and resolves its host.
    fn on_mount(&mut self, e: &MountEvent) {
        _ = e;
    }

    /// Called when a container detaches.
    fn on_unmount(&mut self, e: &UnmountEvent) {
        _ = e;
    }

    /// Called after a layout pass.
    fn on_layout(&mut self, e: &LayoutEvent) {
        _ = e;
    }

    /// Called after the keyboard workaround ran.
    fn on_keyboard_dismiss(&mut self, e: &KeyboardDismissEvent) {
        _ = e;
    }
}

impl<S: TraceSink + ?Sized> TraceSink for Rc<RefCell<S>> {
    fn on_frame_callback(&mut self, e: &FrameCallbackEvent) {
        self.borrow_mut().on_frame_callback(e);
    }

    fn on_update_pass(&mut self, e: &UpdatePassEvent) {
        self.borrow_mut().on_update_pass(e);
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.borrow_mut().on_commit(e);
    }

    fn on_completion(&mut self, e: &CompletionEvent) {
        self.borrow_mut().on_completion(e);
    }

    fn on_mount(&mut self, e: &MountEvent) {
        self.borrow_mut().on_mount(e);
    }

    fn on_unmount(&mut self, e: &UnmountEvent) {
        self.borrow_mut().on_unmount(e);
    }

    fn on_layout(&mut self, e: &LayoutEvent) {
        self.borrow_mut().on_layout(e);
    }

    fn on_keyboard_dismiss(&mut self, e: &KeyboardDismissEvent) {
        self.borrow_mut().on_keyboard_dismiss(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional boxed [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing and
/// an installed sink is dropped immediately. When **on**, each method checks
/// the inner `Option` (one branch) before dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$meta:meta])* $name:ident, $method:ident, $event:ty) => {
        $(#[$meta])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    dispatch!(
        /// Emits a [`FrameCallbackEvent`].
        frame_callback, on_frame_callback, FrameCallbackEvent
    );
    dispatch!(
        /// Emits an [`UpdatePassEvent`].
        update_pass, on_update_pass, UpdatePassEvent
    );
    dispatch!(
        /// Emits a [`CommitEvent`].
        commit, on_commit, CommitEvent
    );
    dispatch!(
        /// Emits a [`CompletionEvent`].
        completion, on_completion, CompletionEvent
    );
    dispatch!(
        /// Emits a [`MountEvent`].
        mount, on_mount, MountEvent
    );
    dispatch!(
        /// Emits an [`UnmountEvent`].
        unmount, on_unmount, UnmountEvent
    );
    dispatch!(
        /// Emits a [`LayoutEvent`].
        layout, on_layout, LayoutEvent
    );
    dispatch!(
        /// Emits a [`KeyboardDismissEvent`].
        keyboard_dismiss, on_keyboard_dismiss, KeyboardDismissEvent
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
