// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stage configuration.

use crate::timing::CallbackQueue;

/// Configuration for a [`Stage`](crate::stage::Stage).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageConfig {
    /// Queue used for reconciliation requests.
    pub update_queue: CallbackQueue,
    /// Queue used for deferred layout requests.
    pub layout_queue: CallbackQueue,
    /// Whether transactions let the host reorder and coalesce operations.
    pub reordering_allowed: bool,
    /// Whether removing a focused native child first dismisses the soft
    /// keyboard.
    pub dismiss_keyboard_on_focused_removal: bool,
}

impl StageConfig {
    /// Default configuration for Android (fragment manager + `Choreographer`).
    ///
    /// Both passes run on [`CallbackQueue::NativeAnimated`] so they land in
    /// the same frame as the view operations that triggered them.
    #[must_use]
    pub const fn android() -> Self {
        Self {
            update_queue: CallbackQueue::NativeAnimated,
            layout_queue: CallbackQueue::NativeAnimated,
            reordering_allowed: true,
            dismiss_keyboard_on_focused_removal: true,
        }
    }

    /// Configuration for hosts that execute operations strictly in order and
    /// have no soft keyboard.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            update_queue: CallbackQueue::NativeAnimated,
            layout_queue: CallbackQueue::NativeAnimated,
            reordering_allowed: false,
            dismiss_keyboard_on_focused_removal: false,
        }
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self::android()
    }
}
