// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] takes events recorded by an [`EventLog`](crate::log::EventLog)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//! Each container gets its own track (`tid` is the container's slot index).
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use screenstack_core::transaction::HostScope;

use crate::log::{LoggedEvent, TraceEvent};

/// Exports logged events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of instant events, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Timestamps are the frame start times in microseconds.
pub fn export(events: &[LoggedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let mut out: Vec<Value> = Vec::with_capacity(events.len());

    for logged in events {
        let ts = logged.frame_time_nanos as f64 / 1000.0;
        let value = match logged.event {
            TraceEvent::FrameCallback(e) => json!({
                "ph": "i",
                "name": format!("{:?}", e.kind),
                "cat": "Frame",
                "ts": ts,
                "pid": 0,
                "tid": e.container.index(),
                "s": "t",
                "args": {
                    "frame_index": e.frame_index,
                }
            }),
            TraceEvent::UpdatePass(e) => json!({
                "ph": "i",
                "name": "UpdatePass",
                "cat": "Reconcile",
                "ts": ts,
                "pid": 0,
                "tid": e.container.index(),
                "s": "t",
                "args": {
                    "attached": e.attached,
                    "detached": e.detached,
                    "moved": e.moved,
                    "orphans": e.orphans,
                    "transitioning": e.transitioning,
                }
            }),
            TraceEvent::Commit(e) => json!({
                "ph": "i",
                "name": commit_name(e.synchronous),
                "cat": "Transaction",
                "ts": ts,
                "pid": 0,
                "tid": e.container.index(),
                "s": "t",
                "args": {
                    "transaction": e.transaction.0,
                    "ops": e.ops,
                }
            }),
            TraceEvent::Completion(e) => json!({
                "ph": "i",
                "name": "Completion",
                "cat": "Transaction",
                "ts": ts,
                "pid": 0,
                "tid": e.container.index(),
                "s": "t",
                "args": {
                    "transaction": e.transaction.0,
                    "cleared_in_flight": e.cleared_in_flight,
                }
            }),
            TraceEvent::Mount(e) => json!({
                "ph": "i",
                "name": "Mount",
                "cat": "Lifecycle",
                "ts": ts,
                "pid": 0,
                "tid": e.container.index(),
                "s": "t",
                "args": {
                    "host": scope_value(e.scope),
                }
            }),
            TraceEvent::Unmount(e) => json!({
                "ph": "i",
                "name": "Unmount",
                "cat": "Lifecycle",
                "ts": ts,
                "pid": 0,
                "tid": e.container.index(),
                "s": "t",
                "args": {
                    "removed_handles": e.removed_handles,
                    "removed_views": e.removed_views,
                }
            }),
            TraceEvent::Layout(e) => json!({
                "ph": "i",
                "name": "Layout",
                "cat": "Layout",
                "ts": ts,
                "pid": 0,
                "tid": e.container.index(),
                "s": "t",
                "args": {
                    "width": e.width,
                    "height": e.height,
                    "children": e.children,
                }
            }),
            TraceEvent::KeyboardDismiss(e) => json!({
                "ph": "i",
                "name": "KeyboardDismiss",
                "cat": "Input",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "p",
                "args": {
                    "node": e.container.0,
                    "succeeded": e.succeeded,
                }
            }),
        };
        out.push(value);
    }

    serde_json::to_writer_pretty(writer, &out)?;
    Ok(())
}

fn commit_name(synchronous: bool) -> &'static str {
    if synchronous { "CommitNow" } else { "Commit" }
}

/// `"root"`, or the slot index of the owning handle.
fn scope_value(scope: HostScope) -> Value {
    match scope {
        HostScope::Root => Value::from("root"),
        HostScope::Child(handle) => Value::from(handle.index()),
    }
}
