// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame callback model.
//!
//! The engine never waits on a timer. Instead, each container owns an
//! injected [`FrameScheduler`](crate::backend::FrameScheduler) and posts a
//! [`FrameRequest`] to it whenever it needs to run on the next display
//! refresh. The platform later hands the request back to
//! [`Stage::do_frame`](crate::stage::Stage::do_frame) together with the
//! [`FrameTick`] that fired it.
//!
//! # Queues
//!
//! Within one frame, callbacks run queue by queue in [`CallbackQueue::ALL`]
//! order. View operations from the host's component tree are applied on
//! [`CallbackQueue::DispatchUi`]; posting reconciliation on
//! [`CallbackQueue::NativeAnimated`] makes it run right after them in the
//! *same* frame instead of one frame later.

use crate::stage::ContainerId;

/// A frame opportunity delivered by the platform's display-refresh source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameTick {
    /// Monotonically increasing frame counter.
    pub frame_index: u64,
    /// Frame start time in nanoseconds on the platform's monotonic clock.
    pub frame_time_nanos: u64,
}

/// Ordered callback queues of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CallbackQueue {
    /// Host view-tree operations (create/update/remove views).
    DispatchUi,
    /// Runs right after [`DispatchUi`](Self::DispatchUi) in the same frame.
    NativeAnimated,
    /// Timers and event dispatch.
    TimersEvents,
    /// Idle work at the end of the frame.
    Idle,
}

impl CallbackQueue {
    /// All queues in the order they run within a frame.
    pub const ALL: [Self; 4] = [
        Self::DispatchUi,
        Self::NativeAnimated,
        Self::TimersEvents,
        Self::Idle,
    ];

    /// Returns the position of this queue in [`ALL`](Self::ALL).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::DispatchUi => 0,
            Self::NativeAnimated => 1,
            Self::TimersEvents => 2,
            Self::Idle => 3,
        }
    }
}

/// What a container wants to run when its frame callback fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameCallbackKind {
    /// Reconcile the screen list against the native hierarchy.
    Update,
    /// Re-measure and re-layout the container and its native children.
    Layout,
}

/// A single-shot frame callback request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest {
    /// The container that posted the request.
    pub container: ContainerId,
    /// Which pass to run.
    pub kind: FrameCallbackKind,
}

impl FrameRequest {
    /// A reconciliation request for `container`.
    #[must_use]
    pub const fn update(container: ContainerId) -> Self {
        Self {
            container,
            kind: FrameCallbackKind::Update,
        }
    }

    /// A layout request for `container`.
    #[must_use]
    pub const fn layout(container: ContainerId) -> Self {
        Self {
            container,
            kind: FrameCallbackKind::Layout,
        }
    }
}
