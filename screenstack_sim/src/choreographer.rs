// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame clock and callback queues.

use std::cell::RefCell;
use std::rc::Rc;

use screenstack_core::backend::FrameScheduler;
use screenstack_core::error::StageError;
use screenstack_core::stage::Stage;
use screenstack_core::timing::{CallbackQueue, FrameRequest, FrameTick};

use crate::platform::SimPlatform;

/// Nominal 60 Hz frame interval.
pub const FRAME_INTERVAL_NANOS: u64 = 16_666_667;

#[derive(Debug, Default)]
struct Queues {
    queues: [Vec<FrameRequest>; 4],
    frame_index: u64,
}

/// A fake display-refresh source shared by every container of a stage.
///
/// Each container gets its own [`scheduler`](Self::scheduler) handle; all
/// handles post into the same queues. [`run_frame`](Self::run_frame) runs the
/// queues in [`CallbackQueue::ALL`] order. Requests posted while a queue runs
/// land in a later queue of the same frame, or in the next frame if their
/// queue has already run.
#[derive(Clone, Debug, Default)]
pub struct Choreographer {
    inner: Rc<RefCell<Queues>>,
}

#[derive(Debug)]
struct Poster(Rc<RefCell<Queues>>);

impl FrameScheduler for Poster {
    fn post_frame_callback(&mut self, queue: CallbackQueue, request: FrameRequest) {
        self.0.borrow_mut().queues[queue.index()].push(request);
    }
}

impl Choreographer {
    /// Creates a choreographer at frame zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a scheduler handle to inject into a container.
    #[must_use]
    pub fn scheduler(&self) -> Box<dyn FrameScheduler> {
        Box::new(Poster(Rc::clone(&self.inner)))
    }

    /// Returns the requests waiting in `queue`.
    #[must_use]
    pub fn pending(&self, queue: CallbackQueue) -> Vec<FrameRequest> {
        self.inner.borrow().queues[queue.index()].clone()
    }

    /// Returns the number of requests waiting across all queues.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.borrow().queues.iter().map(Vec::len).sum()
    }

    /// Returns the index the next frame will carry.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.inner.borrow().frame_index
    }

    /// Runs one frame, then lets the host execute everything committed
    /// during it and routes the completions back to the stage.
    ///
    /// # Errors
    ///
    /// Stops at the first configuration error a callback reports. Requests
    /// not yet run stay queued.
    pub fn run_frame(
        &self,
        stage: &mut Stage,
        platform: &mut SimPlatform,
    ) -> Result<FrameTick, StageError> {
        let tick = {
            let mut inner = self.inner.borrow_mut();
            let tick = FrameTick {
                frame_index: inner.frame_index,
                frame_time_nanos: inner.frame_index * FRAME_INTERVAL_NANOS,
            };
            inner.frame_index += 1;
            tick
        };

        for queue in CallbackQueue::ALL {
            let batch = std::mem::take(&mut self.inner.borrow_mut().queues[queue.index()]);
            let mut requests = batch.into_iter();
            while let Some(request) = requests.next() {
                if let Err(err) = stage.do_frame(request, tick, platform) {
                    let mut inner = self.inner.borrow_mut();
                    let rest = &mut inner.queues[queue.index()];
                    let posted = std::mem::take(rest);
                    rest.extend(requests);
                    rest.extend(posted);
                    return Err(err);
                }
            }
        }

        for completion in platform.execute_all_pending() {
            stage.transaction_completed(completion);
        }
        Ok(tick)
    }
}
