// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-stack reconciliation with frame-batched native transactions.
//!
//! `screenstack_core` keeps a logical, ordered stack of *screens* in sync with
//! a platform's native view/fragment hierarchy. It is `no_std` compatible
//! (with `alloc`) and stores screens, handles, and containers in an arena
//! addressed by generational ids, so the screen ↔ container ↔ handle
//! back-references never form ownership cycles.
//!
//! # Architecture
//!
//! Mutations mark a container dirty; the container's injected
//! [`FrameScheduler`](backend::FrameScheduler) delivers a request on the next
//! display frame, and the reconciler turns the difference between the logical
//! list and the host's attached set into a single native transaction:
//!
//! ```text
//!   add_screen / remove_screen_at / set_activity_state
//!       │
//!       ▼
//!   mark_updated ──► FrameScheduler::post_frame_callback(FrameRequest)
//!                                           │
//!                 ┌─────────────────────────┘
//!                 ▼
//!   Stage::do_frame ──► perform_update ──► Transaction ──► TransactionHost::commit
//!                                                               │
//!                 ┌─────────────────────────────────────────────┘
//!                 ▼
//!   Completion ──► Stage::transaction_completed
//! ```
//!
//! **[`stage`]** — The arena ([`Stage`](stage::Stage)) holding screens,
//! handles, and containers, plus the mutation API, the reconciler, and the
//! attach/detach lifecycle.
//!
//! **[`backend`]** — Collaborator traits that platform integrations
//! implement: transaction host, frame scheduler, view hierarchy, and input
//! method.
//!
//! **[`transaction`]** — The batched operation list committed once per pass.
//!
//! **[`timing`]** — Frame ticks, callback queues, and frame requests.
//!
//! **[`config`]** — [`StageConfig`](config::StageConfig) presets.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! engine instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod error;
pub mod stage;
pub mod timing;
pub mod trace;
pub mod transaction;
