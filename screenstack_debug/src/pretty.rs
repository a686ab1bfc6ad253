// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use screenstack_core::timing::FrameCallbackKind;
use screenstack_core::trace::{
    CommitEvent, CompletionEvent, FrameCallbackEvent, KeyboardDismissEvent, LayoutEvent,
    MountEvent, TraceSink, UnmountEvent, UpdatePassEvent,
};
use screenstack_core::transaction::HostScope;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn kind_name(kind: FrameCallbackKind) -> &'static str {
    match kind {
        FrameCallbackKind::Update => "update",
        FrameCallbackKind::Layout => "layout",
    }
}

fn scope_name(scope: HostScope) -> String {
    match scope {
        HostScope::Root => "root".into(),
        HostScope::Child(handle) => format!("child({handle:?})"),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_callback(&mut self, e: &FrameCallbackEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] #{} at {:.1}µs {:?} {}",
            e.frame_index,
            e.frame_time_nanos as f64 / 1000.0,
            e.container,
            kind_name(e.kind),
        );
    }

    fn on_update_pass(&mut self, e: &UpdatePassEvent) {
        let _ = writeln!(
            self.writer,
            "[update] {:?} attached={} detached={} moved={} orphans={}{}",
            e.container,
            e.attached,
            e.detached,
            e.moved,
            e.orphans,
            if e.transitioning { " transitioning" } else { "" },
        );
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        let mode = if e.synchronous { "now" } else { "async" };
        let _ = writeln!(
            self.writer,
            "[commit] {:?} tx={} ops={} {mode}",
            e.container, e.transaction.0, e.ops,
        );
    }

    fn on_completion(&mut self, e: &CompletionEvent) {
        let outcome = if e.cleared_in_flight {
            "cleared"
        } else {
            "stale"
        };
        let _ = writeln!(
            self.writer,
            "[complete] {:?} tx={} {outcome}",
            e.container, e.transaction.0,
        );
    }

    fn on_mount(&mut self, e: &MountEvent) {
        let _ = writeln!(
            self.writer,
            "[mount] {:?} host={}",
            e.container,
            scope_name(e.scope),
        );
    }

    fn on_unmount(&mut self, e: &UnmountEvent) {
        let _ = writeln!(
            self.writer,
            "[unmount] {:?} handles={} views={}",
            e.container, e.removed_handles, e.removed_views,
        );
    }

    fn on_layout(&mut self, e: &LayoutEvent) {
        let _ = writeln!(
            self.writer,
            "[layout] {:?} {}x{} children={}",
            e.container, e.width, e.height, e.children,
        );
    }

    fn on_keyboard_dismiss(&mut self, e: &KeyboardDismissEvent) {
        let outcome = if e.succeeded { "ok" } else { "REFUSED" };
        let _ = writeln!(
            self.writer,
            "[keyboard] dismiss in {:?} {outcome}",
            e.container,
        );
    }
}
