// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator contracts for platform integrations.
//!
//! The engine splits platform-specific work into a handful of narrow traits.
//! A platform integration provides:
//!
//! - **Transaction host** — Implements [`TransactionHost`] over the native
//!   fragment/transaction API. Knows which handles are currently added and
//!   executes committed batches.
//!
//! - **Frame scheduler** — Implements [`FrameScheduler`] over the display
//!   refresh source (e.g. `Choreographer`). One boxed scheduler is injected
//!   per container, so there is no process-wide frame state.
//!
//! - **View hierarchy** — Implements [`ViewHierarchy`]: parent lookup,
//!   tagged [`NodeKind`] classification, child enumeration and removal,
//!   focus, and measure/layout.
//!
//! - **Input method** — Implements [`InputMethod`] for the best-effort
//!   keyboard dismissal workaround.
//!
//! - **Platform** — Implements [`Platform`] to lend all of the above to a
//!   single [`Stage`](crate::stage::Stage) call and to receive the
//!   per-screen hooks.
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_frame(tick: FrameTick) {
//!     for queue in CallbackQueue::ALL {
//!         for request in scheduler.take(queue) {
//!             stage.do_frame(request, tick, &mut platform)?;
//!         }
//!     }
//!     // Later, when the host finishes executing committed work:
//!     for completion in platform.execute_all_pending() {
//!         stage.transaction_completed(completion);
//!     }
//! }
//! ```

use alloc::vec::Vec;

use kurbo::{Rect, Size};

use crate::error::DismissError;
use crate::stage::{HandleId, NodeId, ScreenId};
use crate::timing::{CallbackQueue, FrameRequest};
use crate::transaction::{Completion, HostScope, Transaction, TransactionId};

/// The native fragment/transaction API.
pub trait TransactionHost {
    /// Opens a new transaction against `scope` and returns its id.
    fn begin_transaction(&mut self, scope: HostScope) -> TransactionId;

    /// Commits asynchronously, allowing state loss. The host reports a
    /// [`Completion`] once the batch has executed.
    fn commit(&mut self, transaction: Transaction);

    /// Executes the batch synchronously, allowing state loss.
    fn commit_now(&mut self, transaction: Transaction);

    /// Executes every pending transaction of `scope` and returns their
    /// completions in execution order.
    fn execute_pending(&mut self, scope: HostScope) -> Vec<Completion>;

    /// Returns whether the host currently considers `handle` added.
    fn is_added(&self, handle: HandleId) -> bool;

    /// Returns every handle currently added within `scope`.
    fn added_handles(&self, scope: HostScope) -> Vec<HandleId>;

    /// Returns whether the host for `scope` has been torn down.
    fn is_destroyed(&self, scope: HostScope) -> bool;
}

/// The display-refresh callback API.
///
/// A request fires once. Callers guard against posting the same request twice
/// before it has been consumed.
pub trait FrameScheduler {
    /// Asks for `request` to be delivered on the next frame in `queue`.
    fn post_frame_callback(&mut self, queue: CallbackQueue, request: FrameRequest);
}

/// Classification of a native node, replacing runtime downcasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The root of a native view tree.
    Root {
        /// Whether the hosting activity can own fragments.
        fragment_host: bool,
    },
    /// The native view of a screen.
    Screen(ScreenId),
    /// Any other view.
    View,
}

/// The native view tree.
pub trait ViewHierarchy {
    /// Returns the parent of `node`, if any.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Classifies `node`.
    fn classify(&self, node: NodeId) -> NodeKind;

    /// Returns the number of native children of `node`.
    fn child_count(&self, node: NodeId) -> usize;

    /// Returns the child of `node` at `index`.
    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId>;

    /// Returns the direct child of `node` that holds or contains input focus.
    fn focused_child(&self, node: NodeId) -> Option<NodeId>;

    /// Removes the child of `node` at `index`.
    fn remove_child_at(&mut self, node: NodeId, index: usize);

    /// Returns the current frame of `node` in its parent's coordinates.
    fn frame(&self, node: NodeId) -> Rect;

    /// Measures `node` at exactly `size`.
    fn measure(&mut self, node: NodeId, size: Size);

    /// Places `node` at `frame`.
    fn layout(&mut self, node: NodeId, frame: Rect);
}

/// The soft keyboard service.
pub trait InputMethod {
    /// Hides the soft keyboard attached to the window containing `node`.
    ///
    /// # Errors
    ///
    /// Returns [`DismissError`] when the platform refused. Callers treat this
    /// as best effort.
    fn hide_soft_input(&mut self, node: NodeId) -> Result<(), DismissError>;
}

/// Lends the platform collaborators to one [`Stage`](crate::stage::Stage) call.
pub trait Platform {
    /// The transaction host.
    fn host(&mut self) -> &mut dyn TransactionHost;

    /// The native view tree.
    fn views(&mut self) -> &mut dyn ViewHierarchy;

    /// The soft keyboard service.
    fn input(&mut self) -> &mut dyn InputMethod;

    /// The view tree and the keyboard service together, for
    /// [`remove_child_view`].
    fn views_and_input(&mut self) -> (&mut dyn ViewHierarchy, &mut dyn InputMethod);

    /// Called on the top screen's handle after each reconciliation pass.
    fn on_container_update(&mut self, handle: HandleId, screen: ScreenId) {
        _ = (handle, screen);
    }

    /// Called when the reconciler flips a screen's transitioning flag.
    fn set_screen_transitioning(&mut self, screen: ScreenId, view: NodeId, transitioning: bool) {
        _ = (screen, view, transitioning);
    }
}

/// Removes the child of `parent` at `index`, dismissing the soft keyboard
/// first if that child holds input focus.
///
/// Removing a focused view clears focus but can leave the keyboard open on
/// some platform versions. Both container teardown and hosts executing
/// remove operations should go through this function.
///
/// # Errors
///
/// Returns [`DismissError`] if the keyboard could not be dismissed. The child
/// is removed regardless.
pub fn remove_child_view(
    views: &mut dyn ViewHierarchy,
    input: &mut dyn InputMethod,
    parent: NodeId,
    index: usize,
) -> Result<(), DismissError> {
    let child = views.child_at(parent, index);
    let mut result = Ok(());
    if child.is_some() && views.focused_child(parent) == child {
        result = input.hide_soft_input(parent);
    }
    views.remove_child_at(parent, index);
    result
}
