// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot allocation shared by the stage's arenas.

use alloc::vec::Vec;

/// A freshly allocated slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Slot {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
    /// `true` if the slot came from the free list and its columns must be
    /// overwritten rather than pushed.
    pub(crate) reused: bool,
}

/// Generation counters and a free list for one arena.
#[derive(Debug, Default)]
pub(crate) struct Slots {
    generation: Vec<u32>,
    live: Vec<bool>,
    free_list: Vec<u32>,
}

impl Slots {
    pub(crate) fn alloc(&mut self) -> Slot {
        if let Some(idx) = self.free_list.pop() {
            self.live[idx as usize] = true;
            Slot {
                idx,
                generation: self.generation[idx as usize],
                reused: true,
            }
        } else {
            let len = self.generation.len();
            assert!(len < u32::MAX as usize, "arena exceeds u32 slot range");
            #[expect(
                clippy::cast_possible_truncation,
                reason = "length is checked against u32::MAX above"
            )]
            let idx = len as u32;
            self.generation.push(0);
            self.live.push(true);
            Slot {
                idx,
                generation: 0,
                reused: false,
            }
        }
    }

    /// Frees `idx`, bumping its generation so outstanding ids go stale.
    pub(crate) fn free(&mut self, idx: u32) {
        self.generation[idx as usize] += 1;
        self.live[idx as usize] = false;
        self.free_list.push(idx);
    }

    pub(crate) fn is_live(&self, idx: u32, generation: u32) -> bool {
        (idx as usize) < self.generation.len()
            && self.live[idx as usize]
            && self.generation[idx as usize] == generation
    }

    /// Current generation of `idx`, or `u32::MAX` when out of range.
    pub(crate) fn current_generation(&self, idx: u32) -> u32 {
        self.generation
            .get(idx as usize)
            .copied()
            .unwrap_or(u32::MAX)
    }

    /// Number of live slots.
    pub(crate) fn live_count(&self) -> usize {
        self.live.iter().filter(|&&live| live).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_slot_is_reused_with_new_generation() {
        let mut slots = Slots::default();
        let a = slots.alloc();
        assert!(!a.reused);
        slots.free(a.idx);
        assert!(!slots.is_live(a.idx, a.generation));

        let b = slots.alloc();
        assert!(b.reused);
        assert_eq!(a.idx, b.idx);
        assert_ne!(a.generation, b.generation);
        assert!(slots.is_live(b.idx, b.generation));
    }

    #[test]
    fn live_count_skips_freed_slots() {
        let mut slots = Slots::default();
        let a = slots.alloc();
        slots.alloc();
        assert_eq!(slots.live_count(), 2);
        slots.free(a.idx);
        assert_eq!(slots.live_count(), 1);
    }
}
