// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Configuration errors mean the engine was mounted somewhere the framework
//! does not support; they are reported immediately and never retried, since
//! continuing would leave the native hierarchy inconsistent. Misuse of stale
//! ids panics instead (see [`Stage`](crate::stage::Stage)).

use crate::stage::ScreenId;

/// Errors returned by [`Stage`](crate::stage::Stage) operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// Walking up from the container reached the top of the native tree
    /// without finding a root view or a screen.
    #[error("screen container is not attached under a root view")]
    NotUnderRootView,
    /// The root view is not hosted by an activity that can own fragments.
    #[error("root view is not hosted by a fragment-capable activity")]
    UnsupportedHostingActivity,
    /// The ancestor screen has no handle, so there is no child host to borrow.
    #[error("parent screen {0:?} does not have its handle attached")]
    ParentScreenWithoutHandle(ScreenId),
    /// A transaction was requested before any transaction host was set.
    #[error("no transaction host is set when creating a transaction")]
    NoTransactionHost,
    /// A list index was outside the container's bounds.
    #[error("index {index} is out of bounds for a container holding {len} screens")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The container's screen count at the time.
        len: usize,
    },
    /// The screen already belongs to a container.
    #[error("screen {0:?} already belongs to a container")]
    ScreenAlreadyMounted(ScreenId),
}

/// Best-effort failure to dismiss the soft keyboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, thiserror::Error)]
#[error("soft keyboard could not be dismissed")]
pub struct DismissError;
