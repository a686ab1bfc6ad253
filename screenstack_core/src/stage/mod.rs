// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The screen/handle/container arena and the reconciliation engine.
//!
//! A [`Stage`] stores three kinds of entities, each addressed by a
//! generational id that goes stale when its slot is freed:
//!
//! - **Screens** ([`ScreenId`]) — a navigable unit with an
//!   [`ActivityState`], the native view it renders into, and a non-owning
//!   back-reference to the container currently holding it.
//! - **Handles** ([`HandleId`]) — the adapter the native host attaches
//!   ("fragment"). A fresh handle is created every time a screen is added to
//!   a container; the handle also records the containers nested beneath it.
//! - **Containers** ([`ContainerId`]) — an ordered list of handles (list
//!   order is native z-order), a dirty flag, the attach state, the resolved
//!   host scope, and at most one open and one in-flight transaction.
//!
//! # Passes
//!
//! Mutations only mark a container dirty. The container's frame scheduler
//! later delivers a request to [`Stage::do_frame`], which runs at most one
//! reconciliation pass per frame (see `reconcile.rs`) or a deferred layout
//! pass (see `frame.rs`). Attaching and detaching a container to the native
//! tree is handled in `mount.rs`.

mod frame;
mod id;
mod mount;
mod reconcile;
mod slots;
mod store;

pub use id::{ContainerId, HandleId, NodeId, ScreenId};
pub use store::{ActivityState, Stage};
