// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed in-memory event recording.
//!
//! [`EventLog`] implements [`TraceSink`] and keeps every event as a
//! [`LoggedEvent`], stamped with the frame time of the most recent frame
//! callback. Install it behind an `Rc<RefCell<_>>` to read it back after the
//! stage has taken ownership of the sink.

use screenstack_core::trace::{
    CommitEvent, CompletionEvent, FrameCallbackEvent, KeyboardDismissEvent, LayoutEvent,
    MountEvent, TraceSink, UnmountEvent, UpdatePassEvent,
};

/// A recorded engine event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraceEvent {
    /// A [`FrameCallbackEvent`].
    FrameCallback(FrameCallbackEvent),
    /// An [`UpdatePassEvent`].
    UpdatePass(UpdatePassEvent),
    /// A [`CommitEvent`].
    Commit(CommitEvent),
    /// A [`CompletionEvent`].
    Completion(CompletionEvent),
    /// A [`MountEvent`].
    Mount(MountEvent),
    /// An [`UnmountEvent`].
    Unmount(UnmountEvent),
    /// A [`LayoutEvent`].
    Layout(LayoutEvent),
    /// A [`KeyboardDismissEvent`].
    KeyboardDismiss(KeyboardDismissEvent),
}

impl TraceEvent {
    /// Forwards this event to `sink`.
    pub fn dispatch(&self, sink: &mut dyn TraceSink) {
        match self {
            Self::FrameCallback(e) => sink.on_frame_callback(e),
            Self::UpdatePass(e) => sink.on_update_pass(e),
            Self::Commit(e) => sink.on_commit(e),
            Self::Completion(e) => sink.on_completion(e),
            Self::Mount(e) => sink.on_mount(e),
            Self::Unmount(e) => sink.on_unmount(e),
            Self::Layout(e) => sink.on_layout(e),
            Self::KeyboardDismiss(e) => sink.on_keyboard_dismiss(e),
        }
    }
}

/// An event with the time of the frame it happened in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoggedEvent {
    /// Frame start time in nanoseconds; zero before the first frame.
    pub frame_time_nanos: u64,
    /// The event.
    pub event: TraceEvent,
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<LoggedEvent>,
    now: u64,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in order.
    #[must_use]
    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    /// Returns the commit events in order.
    pub fn commits(&self) -> impl Iterator<Item = &CommitEvent> {
        self.events.iter().filter_map(|l| match &l.event {
            TraceEvent::Commit(e) => Some(e),
            _ => None,
        })
    }

    /// Returns the update-pass events in order.
    pub fn update_passes(&self) -> impl Iterator<Item = &UpdatePassEvent> {
        self.events.iter().filter_map(|l| match &l.event {
            TraceEvent::UpdatePass(e) => Some(e),
            _ => None,
        })
    }

    /// Drops every recorded event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Feeds every recorded event to `sink`, in order.
    pub fn replay(&self, sink: &mut dyn TraceSink) {
        for logged in &self.events {
            logged.event.dispatch(sink);
        }
    }

    fn push(&mut self, event: TraceEvent) {
        self.events.push(LoggedEvent {
            frame_time_nanos: self.now,
            event,
        });
    }
}

impl TraceSink for EventLog {
    fn on_frame_callback(&mut self, e: &FrameCallbackEvent) {
        self.now = e.frame_time_nanos;
        self.push(TraceEvent::FrameCallback(*e));
    }

    fn on_update_pass(&mut self, e: &UpdatePassEvent) {
        self.push(TraceEvent::UpdatePass(*e));
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.push(TraceEvent::Commit(*e));
    }

    fn on_completion(&mut self, e: &CompletionEvent) {
        self.push(TraceEvent::Completion(*e));
    }

    fn on_mount(&mut self, e: &MountEvent) {
        self.push(TraceEvent::Mount(*e));
    }

    fn on_unmount(&mut self, e: &UnmountEvent) {
        self.push(TraceEvent::Unmount(*e));
    }

    fn on_layout(&mut self, e: &LayoutEvent) {
        self.push(TraceEvent::Layout(*e));
    }

    fn on_keyboard_dismiss(&mut self, e: &KeyboardDismissEvent) {
        self.push(TraceEvent::KeyboardDismiss(*e));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use screenstack_core::stage::ActivityState;
    use screenstack_core::transaction::HostScope;
    use screenstack_sim::Sim;
    use screenstack_sim::choreographer::FRAME_INTERVAL_NANOS;

    use super::*;

    fn traced_sim() -> (Sim, Rc<RefCell<EventLog>>) {
        let mut sim = Sim::default();
        let log = Rc::new(RefCell::new(EventLog::new()));
        sim.stage.set_trace_sink(Box::new(Rc::clone(&log)));
        (sim, log)
    }

    #[test]
    fn records_a_full_pass() {
        let (mut sim, log) = traced_sim();
        let c = sim.add_container(sim.root);
        sim.attach(c).unwrap();
        sim.push(c, ActivityState::OnTop).unwrap();
        sim.push(c, ActivityState::Inactive).unwrap();
        sim.frame().unwrap();

        let log = log.borrow();
        assert!(matches!(
            log.events()[0].event,
            TraceEvent::Mount(MountEvent {
                scope: HostScope::Root,
                ..
            })
        ));
        let passes: Vec<_> = log.update_passes().collect();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[1].attached, 1);
        assert_eq!(passes[1].detached, 0);
        assert!(!passes[1].transitioning);

        let commits: Vec<_> = log.commits().collect();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].ops, 1);
        assert!(!commits[0].synchronous);

        let completion = log.events().iter().find_map(|l| match l.event {
            TraceEvent::Completion(e) => Some(e),
            _ => None,
        });
        assert_eq!(
            completion.map(|e| (e.transaction, e.cleared_in_flight)),
            Some((commits[0].transaction, true))
        );
    }

    #[test]
    fn events_carry_frame_time() {
        let (mut sim, log) = traced_sim();
        let c = sim.add_container(sim.root);
        sim.attach(c).unwrap();
        sim.frame().unwrap();
        sim.push(c, ActivityState::OnTop).unwrap();
        sim.frame().unwrap();

        let log = log.borrow();
        let last = log.events().last().unwrap();
        assert!(matches!(last.event, TraceEvent::Completion(_)));
        assert_eq!(last.frame_time_nanos, FRAME_INTERVAL_NANOS);
    }

    #[test]
    fn detach_records_synchronous_commit_and_unmount() {
        let (mut sim, log) = traced_sim();
        let c = sim.add_container(sim.root);
        sim.attach(c).unwrap();
        sim.push(c, ActivityState::OnTop).unwrap();
        sim.push(c, ActivityState::OnTop).unwrap();
        sim.frame().unwrap();
        log.borrow_mut().clear();

        sim.detach(c);
        let log = log.borrow();
        let commits: Vec<_> = log.commits().collect();
        assert_eq!(commits.len(), 1);
        assert!(commits[0].synchronous);
        assert_eq!(commits[0].ops, 2);
        assert!(matches!(
            log.events().last().map(|l| l.event),
            Some(TraceEvent::Unmount(UnmountEvent {
                removed_handles: 2,
                removed_views: 0,
                ..
            }))
        ));
    }
}
