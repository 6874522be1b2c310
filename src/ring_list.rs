use crate::{errors::RingListError, handle::Handle, node::Node};
use core::fmt;
use core::iter::FusedIterator;
use tracing::{debug, trace};

/// A circular singly-linked list whose nodes live in an index arena.
///
/// `tail`'s successor is always `head`. Freed slots go on a free list and are
/// reused by later pushes; their generation is bumped so stale handles never
/// resolve to the new occupant.
#[derive(Clone)]
pub struct RingList<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

/// Walks `remaining` slots from `cur` along successor links.
#[derive(Debug, Clone)]
struct Cursor {
    cur: Option<usize>,
    remaining: usize,
}

impl Cursor {
    fn advance<T>(&mut self, nodes: &[Node<T>]) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.cur?;
        self.cur = Some(nodes[id].next);
        self.remaining -= 1;
        Some(id)
    }
}

/// Iterator over values in ring order, from head through tail.
pub struct Iter<'a, T> {
    cursor: Cursor,
    list: &'a RingList<T>,
}

/// Iterator over `(Handle, &T)` in ring order.
pub struct IterHandles<'a, T> {
    cursor: Cursor,
    list: &'a RingList<T>,
}

impl<T> Default for RingList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RingList<T> {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the list empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle of the first node in ring order.
    pub fn head(&self) -> Option<Handle> {
        self.head.map(|id| self.handle_of(id))
    }

    /// Handle of the last node, whose successor is the head.
    pub fn tail(&self) -> Option<Handle> {
        self.tail.map(|id| self.handle_of(id))
    }

    /// Successor of a live node. The tail's successor is the head.
    pub fn next(&self, h: Handle) -> Option<Handle> {
        let id = self.resolve(h)?;
        Some(self.handle_of(self.nodes[id].next))
    }

    /// Append `value` as the new tail and return its handle.
    pub fn push(&mut self, value: T) -> Handle {
        let id = self.alloc(value);
        match (self.head, self.tail) {
            (Some(head), Some(tail)) => {
                self.nodes[id].next = head;
                self.nodes[tail].next = id;
            }
            _ => {
                self.nodes[id].next = id;
                self.head = Some(id);
            }
        }
        self.tail = Some(id);
        self.len += 1;

        trace!(index = id, len = self.len, "push");
        debug_assert!(self.ring_is_closed(), "ring must be closed after push");
        self.handle_of(id)
    }

    /// Get a reference by handle (if live).
    pub fn get(&self, h: Handle) -> Option<&T> {
        let id = self.resolve(h)?;
        self.nodes[id].value.as_ref()
    }

    /// Get a mutable reference by handle (if live).
    pub fn get_mut(&mut self, h: Handle) -> Option<&mut T> {
        let id = self.resolve(h)?;
        self.nodes[id].value.as_mut()
    }

    /// Call `visitor` on every value, head through tail.
    pub fn for_each(&self, mut visitor: impl FnMut(&T)) {
        for value in self.iter() {
            visitor(value);
        }
    }

    /// Call `visitor` on every value, head through tail, allowing in-place edits.
    pub fn for_each_mut(&mut self, mut visitor: impl FnMut(&mut T)) {
        let mut cursor = self.cursor();
        while let Some(id) = cursor.advance(&self.nodes) {
            if let Some(value) = self.nodes[id].value.as_mut() {
                visitor(value);
            }
        }
    }

    /// First node in ring order whose value satisfies `predicate`.
    pub fn find_by(&self, predicate: impl FnMut(&T) -> bool) -> Option<Handle> {
        self.find_index_by(predicate).map(|id| self.handle_of(id))
    }

    /// Mutable view of the first value satisfying `predicate`.
    pub fn find_by_mut(&mut self, predicate: impl FnMut(&T) -> bool) -> Option<&mut T> {
        let id = self.find_index_by(predicate)?;
        self.nodes[id].value.as_mut()
    }

    /// Predecessor of the first node satisfying `predicate`.
    ///
    /// When the head matches, its predecessor is the tail. A single-element
    /// list therefore returns the matching node itself.
    pub fn find_prev_by(&self, predicate: impl FnMut(&T) -> bool) -> Option<Handle> {
        self.find_prev_index_by(predicate).map(|id| self.handle_of(id))
    }

    /// Remove the node behind `h`, returning its value.
    pub fn remove_handle(&mut self, h: Handle) -> Result<T, RingListError> {
        let target = self.require_live(h)?;
        let prev = self.predecessor_of(target);
        Ok(self.unlink(prev, target))
    }

    /// Release every node, leaving the list empty.
    pub fn clear(&mut self) {
        let (Some(mut id), Some(tail)) = (self.head, self.tail) else {
            return;
        };
        let released = self.len;
        loop {
            let next = self.nodes[id].next;
            drop(self.release(id));
            if id == tail {
                break;
            }
            id = next;
        }
        self.head = None;
        self.tail = None;
        self.len = 0;

        debug!(released, "clear");
    }

    /// Iterate values in ring order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            cursor: self.cursor(),
            list: self,
        }
    }

    /// Iterate `(Handle, &T)` in ring order.
    pub fn iter_handles(&self) -> IterHandles<'_, T> {
        IterHandles {
            cursor: self.cursor(),
            list: self,
        }
    }

    fn cursor(&self) -> Cursor {
        Cursor {
            cur: self.head,
            remaining: self.len,
        }
    }

    fn handle_of(&self, id: usize) -> Handle {
        Handle {
            index: id,
            generation: self.nodes[id].generation,
        }
    }

    fn resolve(&self, h: Handle) -> Option<usize> {
        match self.nodes.get(h.index) {
            Some(n) if n.is_live() && n.generation == h.generation => Some(h.index),
            _ => None,
        }
    }

    fn require_live(&self, h: Handle) -> Result<usize, RingListError> {
        self.resolve(h).ok_or(RingListError::InvalidHandle)
    }

    fn alloc(&mut self, value: T) -> usize {
        if let Some(id) = self.free.pop() {
            let node = &mut self.nodes[id];
            debug_assert!(!node.is_live(), "free list holds a live node");
            node.value = Some(value);
            node.next = id;
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            generation: 0,
            next: id,
            value: Some(value),
        });
        id
    }

    fn release(&mut self, id: usize) -> T {
        let node = &mut self.nodes[id];
        let value = node.value.take().expect("live node has value");
        node.generation = node.generation.wrapping_add(1);
        node.next = id;
        self.free.push(id);
        value
    }

    fn find_index_by(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        let mut cursor = self.cursor();
        while let Some(id) = cursor.advance(&self.nodes) {
            if self.nodes[id].value.as_ref().is_some_and(&mut predicate) {
                return Some(id);
            }
        }
        None
    }

    fn find_prev_index_by(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        let (head, tail) = (self.head?, self.tail?);
        if self.nodes[head].value.as_ref().is_some_and(&mut predicate) {
            return Some(tail);
        }

        let mut prev = head;
        while prev != tail {
            let cur = self.nodes[prev].next;
            if self.nodes[cur].value.as_ref().is_some_and(&mut predicate) {
                return Some(prev);
            }
            prev = cur;
        }
        None
    }

    fn predecessor_of(&self, target: usize) -> usize {
        let mut prev = target;
        while self.nodes[prev].next != target {
            prev = self.nodes[prev].next;
        }
        prev
    }

    /// Unlink `target`, whose predecessor is `prev`, and free its slot.
    fn unlink(&mut self, prev: usize, target: usize) -> T {
        debug_assert_eq!(self.nodes[prev].next, target);

        if prev == target {
            self.head = None;
            self.tail = None;
        } else {
            let after = self.nodes[target].next;
            self.nodes[prev].next = after;
            if self.head == Some(target) {
                self.head = Some(after);
            }
            if self.tail == Some(target) {
                self.tail = Some(prev);
            }
        }
        self.len -= 1;
        let value = self.release(target);

        trace!(index = target, len = self.len, "remove");
        debug_assert!(self.ring_is_closed(), "ring must be closed after remove");
        value
    }

    fn swap_values(&mut self, a: usize, b: usize) {
        let taken = self.nodes[a].value.take();
        self.nodes[a].value = core::mem::replace(&mut self.nodes[b].value, taken);
    }

    /// Do head, tail, successor links and the free list agree with `len`?
    pub(crate) fn ring_is_closed(&self) -> bool {
        if self.nodes.len() != self.len + self.free.len() {
            return false;
        }
        match (self.head, self.tail) {
            (None, None) => self.len == 0,
            (Some(head), Some(tail)) => {
                if self.len == 0 || !self.nodes[head].is_live() {
                    return false;
                }
                let mut id = head;
                for _ in 1..self.len {
                    id = self.nodes[id].next;
                    if id == head || !self.nodes[id].is_live() {
                        return false;
                    }
                }
                id == tail && self.nodes[tail].next == head
            }
            _ => false,
        }
    }
}

impl<T: PartialEq> RingList<T> {
    /// First node in ring order holding `value`.
    pub fn find(&self, value: &T) -> Option<Handle> {
        self.find_by(|v| v == value)
    }

    /// Mutable view of the first value equal to `value`.
    pub fn find_mut(&mut self, value: &T) -> Option<&mut T> {
        self.find_by_mut(|v| v == value)
    }

    /// Predecessor of the first node holding `value`.
    pub fn find_prev(&self, value: &T) -> Option<Handle> {
        self.find_prev_by(|v| v == value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// Remove the first node holding `value`. Missing values are a no-op.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let prev = self.find_prev_index_by(|v| v == value)?;
        let target = self.nodes[prev].next;
        Some(self.unlink(prev, target))
    }
}

impl<T: PartialOrd> RingList<T> {
    /// Sort values in place by pairwise compare-and-swap.
    ///
    /// Every position is compared against each later position and the two
    /// values are swapped when the earlier one is smaller, so the result is
    /// in descending order. Links are never touched; only values move.
    pub fn bubble_sort(&mut self) {
        let (Some(head), Some(tail)) = (self.head, self.tail) else {
            return;
        };

        let mut swaps = 0usize;
        let mut i = head;
        while i != tail {
            let mut j = i;
            while j != tail {
                j = self.nodes[j].next;
                if self.nodes[i].value < self.nodes[j].value {
                    self.swap_values(i, j);
                    swaps += 1;
                }
            }
            i = self.nodes[i].next;
        }

        trace!(len = self.len, swaps, "bubble_sort");
    }
}

impl<T: PartialEq> PartialEq for RingList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for RingList<T> {}

/// Renders `[v1, v2, ..., vn]`; an empty list renders as `[]`.
impl<T: fmt::Display> fmt::Display for RingList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(value, f)?;
        }
        f.write_str("]")
    }
}

impl<T: fmt::Debug> fmt::Debug for RingList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for RingList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for RingList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a RingList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor.advance(&self.list.nodes)?;
        self.list.nodes[id].value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T> Iterator for IterHandles<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor.advance(&self.list.nodes)?;
        let value = self.list.nodes[id].value.as_ref()?;
        Some((self.list.handle_of(id), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl<T> ExactSizeIterator for IterHandles<'_, T> {}
impl<T> FusedIterator for IterHandles<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Clone>(list: &RingList<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[test]
    fn basic_usage() {
        let mut rl = RingList::new();
        let a = rl.push("A");
        let b = rl.push("B");
        let c = rl.push("C");

        assert_eq!(values(&rl), vec!["A", "B", "C"]);
        assert_eq!(rl.len(), 3);
        assert_eq!(rl.head(), Some(a));
        assert_eq!(rl.tail(), Some(c));
        assert_eq!(rl.next(c), Some(a));
        assert!(rl.ring_is_closed());

        // remove
        let v = rl.remove_handle(b).unwrap();
        assert_eq!(v, "B");
        assert_eq!(values(&rl), vec!["A", "C"]);
        assert!(rl.get(b).is_none());
        assert_eq!(rl.next(a), Some(c));
        assert_eq!(rl.len(), 2);
    }

    #[test]
    fn single_element_points_to_itself() {
        let mut rl = RingList::new();
        let h = rl.push(7);

        assert_eq!(rl.head(), rl.tail());
        assert_eq!(rl.next(h), Some(h));
        assert_eq!(rl.nodes[h.index].next, h.index);
        assert!(rl.ring_is_closed());
    }

    #[test]
    fn empty_list_is_inert() {
        let mut rl: RingList<i32> = RingList::new();

        assert!(rl.is_empty());
        assert_eq!(rl.head(), None);
        assert_eq!(rl.tail(), None);
        assert_eq!(rl.find(&1), None);
        assert_eq!(rl.find_by(|_| true), None);
        assert_eq!(rl.find_prev(&1), None);
        assert_eq!(rl.find_prev_by(|_| true), None);
        assert_eq!(rl.remove(&1), None);

        let mut visited = 0;
        rl.for_each(|_| visited += 1);
        rl.for_each_mut(|_| visited += 1);
        assert_eq!(visited, 0);

        rl.bubble_sort();
        rl.clear();
        assert_eq!(rl.to_string(), "[]");
        assert!(rl.ring_is_closed());
    }

    #[test]
    fn find_prev_of_head_wraps_to_tail() {
        let rl: RingList<i32> = [1, 2, 3].into_iter().collect();

        let prev = rl.find_prev(&1).unwrap();
        assert_eq!(Some(prev), rl.tail());
        assert_eq!(rl.get(prev), Some(&3));

        let prev = rl.find_prev(&3).unwrap();
        assert_eq!(rl.get(prev), Some(&2));
        assert_eq!(rl.find_prev(&4), None);
    }

    #[test]
    fn find_returns_first_match_in_ring_order() {
        let rl: RingList<i32> = [5, 8, 5, 9].into_iter().collect();

        let first = rl.find(&5).unwrap();
        assert_eq!(Some(first), rl.head());

        let even = rl.find_by(|v| v % 2 == 0).unwrap();
        assert_eq!(rl.get(even), Some(&8));
        assert!(rl.contains(&9));
        assert!(!rl.contains(&10));
    }

    #[test]
    fn find_mut_edits_in_place() {
        let mut rl: RingList<i32> = [1, 2, 3].into_iter().collect();

        *rl.find_mut(&2).unwrap() = 20;
        if let Some(v) = rl.find_by_mut(|v| *v > 2 && *v < 10) {
            *v *= 100;
        }
        assert_eq!(values(&rl), vec![1, 20, 300]);
    }

    #[test]
    fn remove_head_advances_head() {
        let mut rl: RingList<i32> = [1, 2, 3].into_iter().collect();
        let second = rl.find(&2).unwrap();

        assert_eq!(rl.remove(&1), Some(1));
        assert_eq!(rl.head(), Some(second));
        assert_eq!(rl.next(rl.tail().unwrap()), Some(second));
        assert!(rl.ring_is_closed());
    }

    #[test]
    fn remove_tail_retreats_tail() {
        let mut rl: RingList<i32> = [1, 2, 3].into_iter().collect();
        let second = rl.find(&2).unwrap();

        assert_eq!(rl.remove(&3), Some(3));
        assert_eq!(rl.tail(), Some(second));
        assert_eq!(rl.next(second), rl.head());
        assert!(rl.ring_is_closed());
    }

    #[test]
    fn remove_interior_splices() {
        let mut rl: RingList<i32> = [1, 2, 3, 4].into_iter().collect();

        assert_eq!(rl.remove(&3), Some(3));
        assert_eq!(values(&rl), vec![1, 2, 4]);
        assert_eq!(rl.remove(&42), None);
        assert_eq!(rl.len(), 3);
        assert!(rl.ring_is_closed());
    }

    #[test]
    fn remove_only_element_empties() {
        let mut rl = RingList::new();
        rl.push(10);

        assert_eq!(rl.remove(&10), Some(10));
        assert!(rl.is_empty());
        assert_eq!(rl.head(), None);
        assert_eq!(rl.tail(), None);
        assert!(rl.ring_is_closed());
    }

    #[test]
    fn stale_handle_after_slot_reuse() {
        let mut rl = RingList::new();
        let old = rl.push(1);
        rl.push(2);
        rl.remove_handle(old).unwrap();

        let new = rl.push(3);
        assert_eq!(new.as_raw(), old.as_raw(), "freed slot is reused");
        assert_ne!(new, old);
        assert_eq!(rl.get(old), None);
        assert_eq!(rl.next(old), None);
        assert_eq!(rl.remove_handle(old), Err(RingListError::InvalidHandle));
        assert_eq!(values(&rl), vec![2, 3]);
    }

    #[test]
    fn bubble_sort_orders_descending() {
        let mut rl: RingList<i32> = [3, 1, 2, 5].into_iter().collect();
        let handles: Vec<_> = rl.iter_handles().map(|(h, _)| h).collect();

        rl.bubble_sort();

        assert_eq!(values(&rl), vec![5, 3, 2, 1]);
        let after: Vec<_> = rl.iter_handles().map(|(h, _)| h).collect();
        assert_eq!(handles, after, "sorting moves values, not nodes");
        assert!(rl.ring_is_closed());
    }

    #[test]
    fn bubble_sort_is_idempotent() {
        let mut rl: RingList<i32> = [4, -2, 9, 0, 9].into_iter().collect();
        rl.bubble_sort();
        let once = values(&rl);
        rl.bubble_sort();

        assert_eq!(values(&rl), once);
        assert_eq!(once, vec![9, 9, 4, 0, -2]);
    }

    #[test]
    fn for_each_mut_visits_each_value_once() {
        let mut rl: RingList<i32> = [1, 2, 3].into_iter().collect();
        rl.for_each_mut(|v| *v *= 10);

        let mut seen = Vec::new();
        rl.for_each(|v| seen.push(*v));
        assert_eq!(seen, vec![10, 20, 30]);
    }

    #[test]
    fn clear_recycles_every_slot() {
        let mut rl: RingList<i32> = (0..5).collect();
        rl.clear();

        assert!(rl.is_empty());
        assert_eq!(rl.free.len(), 5);
        assert!(rl.ring_is_closed());

        rl.extend([7, 8]);
        assert_eq!(rl.nodes.len(), 5);
        assert_eq!(values(&rl), vec![7, 8]);
        assert!(rl.ring_is_closed());
    }

    #[test]
    fn render_formats() {
        let rl: RingList<i32> = [10, 2, -5].into_iter().collect();
        assert_eq!(rl.to_string(), "[10, 2, -5]");
        assert_eq!(format!("{rl:?}"), "[10, 2, -5]");

        let one: RingList<&str> = ["x"].into_iter().collect();
        assert_eq!(one.to_string(), "[x]");
    }

    #[test]
    fn iterators_report_exact_len() {
        let rl: RingList<u8> = (1..=4).collect();
        let mut it = rl.iter();
        assert_eq!(it.len(), 4);
        it.next();
        assert_eq!(it.len(), 3);
        assert_eq!(rl.iter_handles().count(), 4);
        assert_eq!((&rl).into_iter().sum::<u8>(), 10);
    }
}
