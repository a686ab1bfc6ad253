// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, event logging, and Chrome trace export for screenstack
//! diagnostics.
//!
//! This crate provides [`TraceSink`](screenstack_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`log::EventLog`] — typed in-memory recording, stamped with frame time,
//!   that can be replayed into another sink.
//! - [`chrome::export`] — writes Chrome Trace Event Format JSON from a log.

pub mod chrome;
pub mod log;
pub mod pretty;
