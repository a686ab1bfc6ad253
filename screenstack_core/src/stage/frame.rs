// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame callback plumbing: dirty marking, deferred layout, and completion
//! routing.

use kurbo::{Point, Rect};

use crate::backend::Platform;
use crate::error::StageError;
use crate::timing::{FrameCallbackKind, FrameRequest, FrameTick};
use crate::trace::{CompletionEvent, FrameCallbackEvent, LayoutEvent};
use crate::transaction::Completion;

use super::id::ContainerId;
use super::store::Stage;

impl Stage {
    /// Marks a container dirty, posting an update request on the clean to
    /// dirty transition only.
    pub(crate) fn mark_updated(&mut self, container: ContainerId) {
        let queue = self.config.update_queue;
        let state = self.container_mut(container);
        if state.needs_update {
            return;
        }
        state.needs_update = true;
        state
            .scheduler
            .post_frame_callback(queue, FrameRequest::update(container));
    }

    /// Asks for the container and its native children to be measured and
    /// laid out on the next frame.
    ///
    /// Native children added outside the host's own layout pass would
    /// otherwise keep a zero frame until something else triggers a layout.
    /// Repeated calls before the callback fires post only once.
    pub fn request_layout(&mut self, container: ContainerId) {
        let queue = self.config.layout_queue;
        let state = self.container_mut(container);
        if state.layout_enqueued {
            return;
        }
        state.layout_enqueued = true;
        state
            .scheduler
            .post_frame_callback(queue, FrameRequest::layout(container));
    }

    /// Runs a frame callback previously posted by a container.
    ///
    /// Requests for containers destroyed since posting are ignored.
    ///
    /// # Errors
    ///
    /// Propagates configuration errors from the reconciliation pass.
    pub fn do_frame(
        &mut self,
        request: FrameRequest,
        tick: FrameTick,
        platform: &mut dyn Platform,
    ) -> Result<(), StageError> {
        let container = request.container;
        if !self.is_container_alive(container) {
            return Ok(());
        }
        self.tracer.frame_callback(&FrameCallbackEvent {
            frame_index: tick.frame_index,
            frame_time_nanos: tick.frame_time_nanos,
            container,
            kind: request.kind,
        });
        match request.kind {
            FrameCallbackKind::Update => self.update_if_needed(container, platform),
            FrameCallbackKind::Layout => {
                self.layout_pass(container, platform);
                Ok(())
            }
        }
    }

    fn layout_pass(&mut self, container: ContainerId, platform: &mut dyn Platform) {
        let state = self.container_mut(container);
        state.layout_enqueued = false;
        if !state.is_attached {
            return;
        }
        let node = state.view;

        let views = platform.views();
        let frame = views.frame(node);
        let size = frame.size();
        views.measure(node, size);
        views.layout(node, frame);

        let children = views.child_count(node);
        let fill = Rect::from_origin_size(Point::ORIGIN, size);
        for index in 0..children {
            if let Some(child) = views.child_at(node, index) {
                views.measure(child, size);
                views.layout(child, fill);
            }
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "child counts are far below u32::MAX"
        )]
        let children = children as u32;
        self.tracer.layout(&LayoutEvent {
            container,
            width: size.width,
            height: size.height,
            children,
        });
    }

    /// Routes a completion reported by the transaction host.
    ///
    /// The owner's in-flight marker is cleared only if it still names this
    /// transaction; a completion for a superseded commit, or for a destroyed
    /// container, changes nothing.
    pub fn transaction_completed(&mut self, completion: Completion) {
        let container = completion.owner;
        if !self.is_container_alive(container) {
            return;
        }
        let state = self.container_mut(container);
        let cleared = state.in_flight == Some(completion.transaction);
        if cleared {
            state.in_flight = None;
        }
        self.tracer.completion(&CompletionEvent {
            container,
            transaction: completion.transaction,
            cleared_in_flight: cleared,
        });
    }
}
