#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) generation: u32,
    /// Successor slot. Points at itself for a single-element ring.
    pub(crate) next: usize,
    pub(crate) value: Option<T>,
}

impl<T> Node<T> {
    /// Is this slot holding a value (not on the free list)?
    pub(crate) fn is_live(&self) -> bool {
        self.value.is_some()
    }
}
