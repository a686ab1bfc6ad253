// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end container scenarios.

use kurbo::{Rect, Size};
use screenstack_core::backend::ViewHierarchy;
use screenstack_core::config::StageConfig;
use screenstack_core::error::StageError;
use screenstack_core::stage::{ActivityState, ContainerId, HandleId, ScreenId};
use screenstack_core::transaction::{HostScope, TransactionId, TransactionOp};

use crate::{Sim, WINDOW_FRAME};

use ActivityState::{Inactive, OnTop, TransitioningOrBelowTop};

fn attached_sim() -> (Sim, ContainerId) {
    let mut sim = Sim::default();
    let c = sim.add_container(sim.root);
    sim.attach(c).unwrap();
    (sim, c)
}

fn handle(sim: &Sim, screen: ScreenId) -> HandleId {
    sim.stage.screen_handle(screen).unwrap()
}

fn last_transaction(sim: &Sim) -> TransactionId {
    *sim.platform.fragments.committed().last().unwrap()
}

fn ops_of(sim: &Sim, transaction: TransactionId) -> Vec<TransactionOp> {
    sim.platform
        .fragments
        .log()
        .iter()
        .filter(|l| l.transaction == transaction)
        .map(|l| l.op)
        .collect()
}

fn remove(h: HandleId) -> TransactionOp {
    TransactionOp::Remove { handle: h }
}

fn add(sim: &Sim, c: ContainerId, screen: ScreenId) -> TransactionOp {
    TransactionOp::Add {
        container: sim.stage.container_view(c),
        handle: handle(sim, screen),
        view: sim.stage.screen_view(screen),
    }
}

// -- Attach state and z-order -----------------------------------------------

#[test]
fn active_screens_attach_in_list_order() {
    let (mut sim, c) = attached_sim();
    let a = sim.push(c, TransitioningOrBelowTop).unwrap();
    let b = sim.push(c, TransitioningOrBelowTop).unwrap();
    let d = sim.push(c, OnTop).unwrap();
    sim.frame().unwrap();

    assert_eq!(sim.native_screens(c), vec![a, b, d]);
    assert_eq!(sim.platform.fragments.committed().len(), 1);
    for s in [a, b, d] {
        assert!(sim.platform.fragments.is_added(handle(&sim, s)));
    }
}

#[test]
fn inactive_screens_are_detached() {
    let (mut sim, c) = attached_sim();
    let a = sim.push(c, OnTop).unwrap();
    let b = sim.push(c, Inactive).unwrap();
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(c), vec![a]);
    assert!(!sim.platform.fragments.is_added(handle(&sim, b)));

    sim.stage.set_activity_state(a, Inactive);
    sim.stage.set_activity_state(b, OnTop);
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(c), vec![b]);
    assert!(!sim.platform.fragments.is_added(handle(&sim, a)));
}

#[test]
fn second_pass_without_changes_queues_nothing() {
    let (mut sim, c) = attached_sim();
    sim.push(c, OnTop).unwrap();
    sim.push(c, TransitioningOrBelowTop).unwrap();
    sim.frame().unwrap();
    let begun = sim.platform.fragments.begun();
    let logged = sim.platform.fragments.log().len();

    sim.stage.notify_child_update(c);
    sim.frame().unwrap();
    assert_eq!(sim.platform.fragments.begun(), begun);
    assert_eq!(sim.platform.fragments.log().len(), logged);
    assert!(!sim.stage.needs_update(c));
}

#[test]
fn activating_middle_screen_moves_later_ones_to_front() {
    let (mut sim, c) = attached_sim();
    let a = sim.push(c, OnTop).unwrap();
    let b = sim.push(c, Inactive).unwrap();
    let d = sim.push(c, OnTop).unwrap();
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(c), vec![a, d]);

    sim.stage.set_activity_state(b, OnTop);
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(c), vec![a, b, d]);
    let hd = handle(&sim, d);
    assert_eq!(
        ops_of(&sim, last_transaction(&sim)),
        vec![add(&sim, c, b), remove(hd), add(&sim, c, d)]
    );
}

#[test]
fn inserting_at_front_restores_z_order() {
    let (mut sim, c) = attached_sim();
    let b = sim.push(c, OnTop).unwrap();
    let d = sim.push(c, TransitioningOrBelowTop).unwrap();
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(c), vec![b, d]);

    let a = sim.add_screen_node();
    sim.stage.add_screen(c, a, 0).unwrap();
    sim.stage.set_activity_state(a, TransitioningOrBelowTop);
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(c), vec![a, b, d]);
}

#[test]
fn top_screen_receives_container_updates() {
    let mut sim = Sim::default();
    let c = sim.add_container(sim.root);
    let a = sim.push(c, TransitioningOrBelowTop).unwrap();
    let b = sim.push(c, TransitioningOrBelowTop).unwrap();
    sim.attach(c).unwrap();

    let (va, vb) = (sim.stage.screen_view(a), sim.stage.screen_view(b));
    assert_eq!(
        sim.platform.transitions(),
        &[(a, va, true), (b, vb, true)]
    );
    assert!(sim.stage.is_transitioning(a));
    assert!(sim.platform.container_updates().is_empty());

    sim.frame().unwrap();
    sim.stage.set_activity_state(b, OnTop);
    sim.frame().unwrap();
    assert_eq!(
        sim.platform.transitions()[2..],
        [(a, va, false), (b, vb, false)]
    );
    assert_eq!(
        sim.platform.container_updates().last(),
        Some(&(handle(&sim, b), b))
    );
}

// -- Scheduling -------------------------------------------------------------

#[test]
fn mutations_coalesce_into_one_request() {
    let (mut sim, c) = attached_sim();
    sim.push(c, OnTop).unwrap();
    sim.push(c, OnTop).unwrap();
    sim.push(c, Inactive).unwrap();
    assert_eq!(sim.choreographer.pending_len(), 1);

    sim.frame().unwrap();
    assert_eq!(sim.choreographer.pending_len(), 0);
    assert_eq!(sim.platform.fragments.committed().len(), 1);
}

#[test]
fn detached_container_waits_for_attach() {
    let mut sim = Sim::default();
    let c = sim.add_container(sim.root);
    let a = sim.push(c, OnTop).unwrap();
    sim.frame().unwrap();
    assert_eq!(sim.platform.fragments.begun(), 0);
    assert!(sim.stage.needs_update(c));

    sim.attach(c).unwrap();
    assert_eq!(sim.stage.host_scope(c), Some(HostScope::Root));
    assert!(sim.stage.in_flight_transaction(c).is_some());
    assert_eq!(sim.platform.fragments.pending_len(), 1);

    sim.frame().unwrap();
    assert_eq!(sim.stage.in_flight_transaction(c), None);
    assert_eq!(sim.native_screens(c), vec![a]);
}

#[test]
fn requests_for_destroyed_containers_are_ignored() {
    let mut sim = Sim::default();
    let c = sim.add_container(sim.root);
    sim.push(c, OnTop).unwrap();
    sim.stage.destroy_container(c);
    sim.frame().unwrap();
    assert_eq!(sim.platform.fragments.begun(), 0);
}

// -- Orphans ----------------------------------------------------------------

#[test]
fn removed_screen_is_detached_as_orphan() {
    let (mut sim, c) = attached_sim();
    let a = sim.push(c, OnTop).unwrap();
    sim.frame().unwrap();
    let ha = handle(&sim, a);

    assert_eq!(sim.stage.remove_screen_at(c, 0), Ok(a));
    sim.frame().unwrap();
    assert!(sim.native_screens(c).is_empty());
    assert!(!sim.platform.fragments.is_added(ha));
}

#[test]
fn destroyed_screen_handle_is_detached_as_orphan() {
    let (mut sim, c) = attached_sim();
    let a = sim.push(c, OnTop).unwrap();
    sim.frame().unwrap();
    let ha = handle(&sim, a);

    sim.stage.remove_screen_at(c, 0).unwrap();
    sim.stage.destroy_screen(a);
    sim.frame().unwrap();
    assert!(!sim.stage.is_handle_alive(ha));
    assert!(!sim.platform.fragments.is_added(ha));
    assert!(
        sim.platform
            .views
            .children(sim.stage.container_view(c))
            .is_empty()
    );
}

#[test]
fn readded_screen_replaces_its_old_handle() {
    let (mut sim, c) = attached_sim();
    let a = sim.push(c, OnTop).unwrap();
    sim.frame().unwrap();
    let old = handle(&sim, a);

    sim.stage.remove_screen_at(c, 0).unwrap();
    let new = sim.stage.add_screen(c, a, 0).unwrap();
    sim.frame().unwrap();

    assert_ne!(old, new);
    assert!(!sim.platform.fragments.is_added(old));
    assert!(sim.platform.fragments.is_added(new));
    assert_eq!(sim.native_screens(c), vec![a]);
}

#[test]
fn screens_of_other_containers_are_not_orphans() {
    let (mut sim, c1) = attached_sim();
    let c2 = sim.add_container(sim.root);
    sim.attach(c2).unwrap();
    let a = sim.push(c1, OnTop).unwrap();
    let x = sim.push(c2, OnTop).unwrap();
    sim.frame().unwrap();

    sim.stage.notify_child_update(c1);
    sim.stage.notify_child_update(c2);
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(c1), vec![a]);
    assert_eq!(sim.native_screens(c2), vec![x]);
}

// -- Detach -----------------------------------------------------------------

#[test]
fn detach_removes_own_handles_and_children() {
    let (mut sim, c1) = attached_sim();
    let c2 = sim.add_container(sim.root);
    sim.attach(c2).unwrap();
    sim.push(c1, TransitioningOrBelowTop).unwrap();
    let b = sim.push(c1, OnTop).unwrap();
    let x = sim.push(c2, OnTop).unwrap();
    sim.frame().unwrap();

    // A handle the host tracks whose screen is gone.
    let stray = sim.add_screen_node();
    let stray_handle = sim.stage.add_screen(c1, stray, 2).unwrap();
    sim.stage.remove_screen_at(c1, 2).unwrap();
    sim.stage.destroy_screen(stray);
    sim.platform
        .fragments
        .inject_added(HostScope::Root, stray_handle);

    let view_b = sim.stage.screen_view(b);
    sim.platform.views.focus(Some(view_b));
    sim.platform.keyboard.visible = true;

    sim.detach(c1);
    let node = sim.stage.container_view(c1);
    assert!(!sim.stage.is_attached(c1));
    assert!(sim.platform.views.children(node).is_empty());
    assert_eq!(
        sim.platform.fragments.added(HostScope::Root),
        vec![handle(&sim, x), stray_handle]
    );
    assert_eq!(sim.platform.keyboard.dismissals(), &[node]);
    assert!(!sim.platform.keyboard.visible);
    assert_eq!(sim.native_screens(c2), vec![x]);

    // The pending update for the detached container does nothing.
    sim.frame().unwrap();
    assert!(sim.platform.views.children(node).is_empty());
}

#[test]
fn detach_removes_leftover_children_without_keyboard_workaround_when_disabled() {
    let mut sim = Sim::new(StageConfig::strict());
    let c = sim.add_container(sim.root);
    sim.attach(c).unwrap();
    sim.push(c, OnTop).unwrap();
    sim.frame().unwrap();

    let node = sim.stage.container_view(c);
    let leftover = sim.platform.views.create_view(Some(node));
    sim.platform.views.focus(Some(leftover));

    sim.detach(c);
    assert!(sim.platform.views.children(node).is_empty());
    assert!(sim.platform.keyboard.dismissals().is_empty());
}

#[test]
fn reattach_starts_clean() {
    let (mut sim, c) = attached_sim();
    let a = sim.push(c, OnTop).unwrap();
    sim.frame().unwrap();
    sim.detach(c);
    assert!(sim.native_screens(c).is_empty());

    sim.attach(c).unwrap();
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(c), vec![a]);
}

#[test]
fn detach_runs_pending_adds_before_removing_handles() {
    let mut sim = Sim::default();
    let c = sim.add_container(sim.root);
    let a = sim.push(c, OnTop).unwrap();
    sim.attach(c).unwrap();
    assert_eq!(sim.platform.fragments.pending_len(), 1);
    let ha = handle(&sim, a);

    sim.detach(c);
    assert_eq!(sim.platform.fragments.pending_len(), 0);
    assert!(sim.platform.fragments.added(HostScope::Root).is_empty());
    assert!(!sim.platform.fragments.is_added(ha));
    assert_eq!(sim.stage.in_flight_transaction(c), None);
    assert!(sim.native_screens(c).is_empty());

    sim.attach(c).unwrap();
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(c), vec![a]);
}

#[test]
fn detach_tolerates_listed_handles_the_host_does_not_track() {
    let (mut sim, c) = attached_sim();
    let a = sim.push(c, OnTop).unwrap();
    let b = sim.push(c, Inactive).unwrap();
    sim.frame().unwrap();
    // Listed but never reconciled.
    let d = sim.push(c, OnTop).unwrap();
    let (ha, hb, hd) = (handle(&sim, a), handle(&sim, b), handle(&sim, d));
    assert!(!sim.platform.fragments.is_added(hb));
    assert!(!sim.platform.fragments.is_added(hd));

    sim.detach(c);
    let removals: Vec<TransactionOp> = sim
        .platform
        .fragments
        .log()
        .iter()
        .map(|l| l.op)
        .filter(|op| matches!(op, TransactionOp::Remove { .. }))
        .collect();
    assert_eq!(removals, vec![remove(ha)]);
    assert!(sim.platform.fragments.added(HostScope::Root).is_empty());
    assert!(sim.native_screens(c).is_empty());
    assert_eq!(sim.stage.handles(c), &[ha, hb, hd]);
}

// -- Keyboard ---------------------------------------------------------------

#[test]
fn refused_dismissal_still_removes_child() {
    let (mut sim, c) = attached_sim();
    let a = sim.push(c, TransitioningOrBelowTop).unwrap();
    let b = sim.push(c, OnTop).unwrap();
    sim.frame().unwrap();

    sim.platform.keyboard.refuse = true;
    sim.platform.keyboard.visible = true;
    sim.platform.views.focus(Some(sim.stage.screen_view(b)));
    sim.stage.set_activity_state(b, Inactive);
    sim.stage.set_activity_state(a, OnTop);
    sim.frame().unwrap();

    assert_eq!(sim.native_screens(c), vec![a]);
    assert_eq!(sim.platform.keyboard.dismissals().len(), 1);
    assert!(sim.platform.keyboard.visible);
}

#[test]
fn unfocused_removal_leaves_keyboard_alone() {
    let (mut sim, c) = attached_sim();
    let a = sim.push(c, OnTop).unwrap();
    let b = sim.push(c, OnTop).unwrap();
    sim.frame().unwrap();

    sim.platform.views.focus(Some(sim.stage.screen_view(a)));
    sim.stage.set_activity_state(b, Inactive);
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(c), vec![a]);
    assert!(sim.platform.keyboard.dismissals().is_empty());
}

// -- Nesting ----------------------------------------------------------------

#[test]
fn nested_containers_reconcile_independently() {
    let (mut sim, outer) = attached_sim();
    let p = sim.push(outer, OnTop).unwrap();
    sim.frame().unwrap();
    let hp = handle(&sim, p);

    let inner = sim.add_container(sim.stage.screen_view(p));
    sim.attach(inner).unwrap();
    assert!(sim.stage.is_nested(inner));
    assert_eq!(sim.stage.parent_handle(inner), Some(hp));
    assert_eq!(sim.stage.host_scope(inner), Some(HostScope::Child(hp)));
    assert_eq!(sim.stage.child_containers(hp), &[inner]);

    let q = sim.push(inner, OnTop).unwrap();
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(inner), vec![q]);
    assert_eq!(
        sim.platform.fragments.added(HostScope::Child(hp)),
        vec![handle(&sim, q)]
    );
    assert_eq!(sim.platform.fragments.added(HostScope::Root), vec![hp]);

    let r = sim.push(outer, OnTop).unwrap();
    sim.stage.set_activity_state(p, TransitioningOrBelowTop);
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(outer), vec![p, r]);
    assert_eq!(sim.native_screens(inner), vec![q]);
    let child_ops = sim
        .platform
        .fragments
        .log()
        .iter()
        .filter(|l| l.scope == HostScope::Child(hp))
        .count();
    assert_eq!(child_ops, 1);
}

#[test]
fn nested_detach_skips_destroyed_host() {
    let (mut sim, outer) = attached_sim();
    let p = sim.push(outer, OnTop).unwrap();
    sim.frame().unwrap();
    let hp = handle(&sim, p);
    let inner = sim.add_container(sim.stage.screen_view(p));
    sim.attach(inner).unwrap();
    sim.push(inner, OnTop).unwrap();
    sim.frame().unwrap();

    sim.stage.set_activity_state(p, Inactive);
    sim.frame().unwrap();
    assert!(sim.platform.fragments.is_destroyed(HostScope::Child(hp)));

    let begun = sim.platform.fragments.begun();
    sim.detach(inner);
    assert_eq!(sim.platform.fragments.begun(), begun);
    assert!(sim.stage.child_containers(hp).is_empty());
    assert!(!sim.stage.is_nested(inner));
    assert!(sim.native_screens(inner).is_empty());
}

// -- Configuration errors ---------------------------------------------------

#[test]
fn root_without_fragment_host_is_rejected() {
    let mut sim = Sim::with_root(StageConfig::default(), false);
    let c = sim.add_container(sim.root);
    assert_eq!(sim.attach(c), Err(StageError::UnsupportedHostingActivity));
    assert!(!sim.stage.is_attached(c));
    assert_eq!(sim.stage.host_scope(c), None);
}

#[test]
fn container_outside_root_is_rejected() {
    let mut sim = Sim::default();
    let loose = sim.platform.views.create_view(None);
    let c = sim.add_container(loose);
    assert_eq!(sim.attach(c), Err(StageError::NotUnderRootView));
    assert!(!sim.stage.is_attached(c));
}

#[test]
fn parent_screen_without_handle_is_rejected() {
    let mut sim = Sim::default();
    let s = sim.add_screen_node();
    let view = sim.stage.screen_view(s);
    sim.platform.views.append_child(sim.root, view);
    let c = sim.add_container(view);
    assert_eq!(sim.attach(c), Err(StageError::ParentScreenWithoutHandle(s)));
    assert!(!sim.stage.is_attached(c));
    assert!(!sim.stage.is_nested(c));
    assert_eq!(sim.stage.host_scope(c), None);
}

#[test]
fn failed_attach_leaves_pending_work_for_a_later_attach() {
    let mut sim = Sim::default();
    let loose = sim.platform.views.create_view(None);
    let c = sim.add_container(loose);
    let a = sim.push(c, OnTop).unwrap();
    assert_eq!(sim.attach(c), Err(StageError::NotUnderRootView));
    sim.frame().unwrap();
    assert_eq!(sim.platform.fragments.begun(), 0);
    assert!(sim.stage.needs_update(c));

    sim.platform.views.append_child(sim.root, loose);
    sim.attach(c).unwrap();
    sim.frame().unwrap();
    assert_eq!(sim.native_screens(c), vec![a]);
}

// -- Layout -----------------------------------------------------------------

#[test]
fn layout_pass_fills_children() {
    let (mut sim, c) = attached_sim();
    let node = sim.stage.container_view(c);
    let frame = Rect::new(0.0, 80.0, 360.0, 720.0);
    sim.platform.views.set_frame(node, frame);
    let a = sim.push(c, OnTop).unwrap();
    sim.frame().unwrap();
    sim.platform.views.clear_records();

    sim.stage.request_layout(c);
    sim.stage.request_layout(c);
    sim.frame().unwrap();

    let view_a = sim.stage.screen_view(a);
    let size = Size::new(360.0, 640.0);
    assert_eq!(
        sim.platform.views.measures(),
        &[(node, size), (view_a, size)]
    );
    assert_eq!(
        sim.platform.views.layouts(),
        &[(node, frame), (view_a, WINDOW_FRAME)]
    );
    assert_eq!(sim.platform.views.frame(view_a), WINDOW_FRAME);
}

#[test]
fn layout_after_detach_is_skipped() {
    let (mut sim, c) = attached_sim();
    sim.stage.request_layout(c);
    sim.detach(c);
    sim.frame().unwrap();
    assert!(sim.platform.views.layouts().is_empty());

    sim.stage.request_layout(c);
    assert_eq!(sim.choreographer.pending_len(), 1);
}
