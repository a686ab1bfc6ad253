// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic in-memory platform for screenstack.
//!
//! Everything a [`Stage`] talks to is modelled in plain data so container
//! behaviour can be driven frame by frame and inspected afterwards:
//!
//! - [`views::ViewTree`] — native view tree with focus and recorded
//!   measure/layout calls.
//! - [`keyboard::SoftKeyboard`] — soft keyboard that can refuse dismissal.
//! - [`fragments::FragmentManager`] — per-scope added lists, a FIFO commit
//!   queue, destroyed scopes, and an op log.
//! - [`choreographer::Choreographer`] — ordered callback queues and a fake
//!   frame clock.
//!
//! [`Sim`] bundles them with a stage and a fragment-capable root view.

pub mod choreographer;
pub mod fragments;
pub mod keyboard;
pub mod platform;
pub mod views;

#[cfg(test)]
mod scenarios;

use kurbo::Rect;
use screenstack_core::backend::{NodeKind, ViewHierarchy};
use screenstack_core::config::StageConfig;
use screenstack_core::error::StageError;
use screenstack_core::stage::{ActivityState, ContainerId, NodeId, ScreenId, Stage};
use screenstack_core::timing::FrameTick;

use crate::choreographer::Choreographer;
use crate::platform::SimPlatform;

/// Frame given to the root view and to every new container.
pub const WINDOW_FRAME: Rect = Rect::new(0.0, 0.0, 360.0, 640.0);

/// A stage wired to an in-memory platform.
#[derive(Debug)]
pub struct Sim {
    /// The engine under test.
    pub stage: Stage,
    /// The in-memory platform.
    pub platform: SimPlatform,
    /// The frame source shared by every container.
    pub choreographer: Choreographer,
    /// The root view.
    pub root: NodeId,
}

impl Default for Sim {
    fn default() -> Self {
        Self::new(StageConfig::default())
    }
}

impl Sim {
    /// Creates a sim whose root view is hosted by a fragment-capable
    /// activity.
    #[must_use]
    pub fn new(config: StageConfig) -> Self {
        Self::with_root(config, true)
    }

    /// Creates a sim whose root view may or may not be fragment-capable.
    #[must_use]
    pub fn with_root(config: StageConfig, fragment_host: bool) -> Self {
        let mut platform = SimPlatform::new();
        let root = platform.views.create_root(fragment_host, WINDOW_FRAME);
        Self {
            stage: Stage::new(config),
            platform,
            choreographer: Choreographer::new(),
            root,
        }
    }

    /// Creates a detached container whose native node is a new child of
    /// `parent`.
    pub fn add_container(&mut self, parent: NodeId) -> ContainerId {
        let view = self.platform.views.create_view(Some(parent));
        self.platform.views.set_frame(view, WINDOW_FRAME);
        self.stage
            .create_container(view, self.choreographer.scheduler())
    }

    /// Creates a screen with its own, not yet placed, native view.
    pub fn add_screen_node(&mut self) -> ScreenId {
        let view = self.platform.views.create_view(None);
        let screen = self.stage.create_screen(view);
        self.platform.views.set_kind(view, NodeKind::Screen(screen));
        screen
    }

    /// Creates a screen, appends it to `container`, and sets its state.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Stage::add_screen`].
    pub fn push(
        &mut self,
        container: ContainerId,
        state: ActivityState,
    ) -> Result<ScreenId, StageError> {
        let screen = self.add_screen_node();
        let index = self.stage.screen_count(container);
        self.stage.add_screen(container, screen, index)?;
        self.stage.set_activity_state(screen, state);
        Ok(screen)
    }

    /// Attaches `container` to the window.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Stage::on_attached`].
    pub fn attach(&mut self, container: ContainerId) -> Result<(), StageError> {
        self.stage.on_attached(container, &mut self.platform)
    }

    /// Detaches `container` from the window.
    pub fn detach(&mut self, container: ContainerId) {
        self.stage.on_detached(container, &mut self.platform);
    }

    /// Runs one frame.
    ///
    /// # Errors
    ///
    /// Propagates the first error a frame callback reports.
    pub fn frame(&mut self) -> Result<FrameTick, StageError> {
        self.choreographer
            .run_frame(&mut self.stage, &mut self.platform)
    }

    /// Returns the screens whose views are native children of `container`,
    /// in native z-order.
    #[must_use]
    pub fn native_screens(&self, container: ContainerId) -> Vec<ScreenId> {
        let node = self.stage.container_view(container);
        self.platform
            .views
            .children(node)
            .iter()
            .filter_map(|&child| match self.platform.views.classify(child) {
                NodeKind::Screen(screen) => Some(screen),
                _ => None,
            })
            .collect()
    }
}
