// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Soft keyboard model.

use screenstack_core::backend::InputMethod;
use screenstack_core::error::DismissError;
use screenstack_core::stage::NodeId;

/// A soft keyboard that counts dismissals and can be told to refuse them.
#[derive(Clone, Debug, Default)]
pub struct SoftKeyboard {
    /// Whether the keyboard is on screen.
    pub visible: bool,
    /// When set, every dismissal fails and the keyboard stays up.
    pub refuse: bool,
    dismissals: Vec<NodeId>,
}

impl SoftKeyboard {
    /// Creates a hidden keyboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the window node of every dismissal attempt, in order.
    #[must_use]
    pub fn dismissals(&self) -> &[NodeId] {
        &self.dismissals
    }
}

impl InputMethod for SoftKeyboard {
    fn hide_soft_input(&mut self, node: NodeId) -> Result<(), DismissError> {
        self.dismissals.push(node);
        if self.refuse {
            return Err(DismissError);
        }
        self.visible = false;
        Ok(())
    }
}
