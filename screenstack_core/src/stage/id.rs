// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen, handle, container, and native node identity types.

use core::fmt;

macro_rules! slot_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        ///
        /// Contains both a slot index and a generation counter so that stale
        /// ids can be detected after the slot is freed and reused.
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            /// Slot index into the stage's arrays.
            pub(crate) idx: u32,
            /// Generation counter; must match the stage's generation for this slot.
            pub(crate) generation: u32,
        }

        impl $name {
            /// Returns the raw slot index (for diagnostics only).
            #[inline]
            #[must_use]
            pub const fn index(self) -> u32 {
                self.idx
            }

            /// Returns the generation counter.
            #[inline]
            #[must_use]
            pub const fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "({}@gen{})"),
                    self.idx, self.generation
                )
            }
        }
    };
}

slot_id!(
    /// A handle to a screen in a [`Stage`](super::Stage).
    ScreenId
);

slot_id!(
    /// A handle to a screen adapter ("fragment") in a [`Stage`](super::Stage).
    HandleId
);

slot_id!(
    /// A handle to a screen container in a [`Stage`](super::Stage).
    ContainerId
);

/// An opaque reference to a node in the platform's native view tree.
///
/// Nodes are created and owned by the platform; the stage only stores them
/// and passes them back through the [`backend`](crate::backend) traits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}
