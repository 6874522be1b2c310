/// A stable reference to one node of a [`RingList`](crate::RingList).
///
/// A handle stops resolving once its node is removed, even if the slot is
/// later reused for another value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl Handle {
    /// Returns the raw slot index for debugging or external maps.
    pub fn as_raw(&self) -> usize {
        self.index
    }
}
