// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Platform`] bundle lent to the stage.

use screenstack_core::backend::{InputMethod, Platform, TransactionHost, ViewHierarchy};
use screenstack_core::stage::{HandleId, NodeId, ScreenId};
use screenstack_core::transaction::{Completion, HostScope, Transaction, TransactionId};

use crate::fragments::FragmentManager;
use crate::keyboard::SoftKeyboard;
use crate::views::ViewTree;

/// In-memory platform: view tree, soft keyboard, and fragment manager.
///
/// Also records the per-screen hooks the stage fires.
#[derive(Clone, Debug, Default)]
pub struct SimPlatform {
    /// The native view tree.
    pub views: ViewTree,
    /// The soft keyboard.
    pub keyboard: SoftKeyboard,
    /// The fragment manager.
    pub fragments: FragmentManager,
    container_updates: Vec<(HandleId, ScreenId)>,
    transitions: Vec<(ScreenId, NodeId, bool)>,
}

impl SimPlatform {
    /// Creates an empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes every committed transaction across all scopes.
    pub fn execute_all_pending(&mut self) -> Vec<Completion> {
        self.fragments
            .execute_all(&mut self.views, &mut self.keyboard)
    }

    /// Returns every `on_container_update` call in order.
    #[must_use]
    pub fn container_updates(&self) -> &[(HandleId, ScreenId)] {
        &self.container_updates
    }

    /// Returns every `set_screen_transitioning` call in order.
    #[must_use]
    pub fn transitions(&self) -> &[(ScreenId, NodeId, bool)] {
        &self.transitions
    }
}

impl TransactionHost for SimPlatform {
    fn begin_transaction(&mut self, scope: HostScope) -> TransactionId {
        _ = scope;
        self.fragments.begin()
    }

    fn commit(&mut self, transaction: Transaction) {
        self.fragments.enqueue(transaction);
    }

    fn commit_now(&mut self, transaction: Transaction) {
        self.fragments
            .execute(transaction, &mut self.views, &mut self.keyboard);
    }

    fn execute_pending(&mut self, scope: HostScope) -> Vec<Completion> {
        self.fragments
            .execute_pending(scope, &mut self.views, &mut self.keyboard)
    }

    fn is_added(&self, handle: HandleId) -> bool {
        self.fragments.is_added(handle)
    }

    fn added_handles(&self, scope: HostScope) -> Vec<HandleId> {
        self.fragments.added(scope)
    }

    fn is_destroyed(&self, scope: HostScope) -> bool {
        self.fragments.is_destroyed(scope)
    }
}

impl Platform for SimPlatform {
    fn host(&mut self) -> &mut dyn TransactionHost {
        self
    }

    fn views(&mut self) -> &mut dyn ViewHierarchy {
        &mut self.views
    }

    fn input(&mut self) -> &mut dyn InputMethod {
        &mut self.keyboard
    }

    fn views_and_input(&mut self) -> (&mut dyn ViewHierarchy, &mut dyn InputMethod) {
        (&mut self.views, &mut self.keyboard)
    }

    fn on_container_update(&mut self, handle: HandleId, screen: ScreenId) {
        self.container_updates.push((handle, screen));
    }

    fn set_screen_transitioning(&mut self, screen: ScreenId, view: NodeId, transitioning: bool) {
        self.transitions.push((screen, view, transitioning));
    }
}
