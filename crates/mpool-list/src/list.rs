//! Doubly-linked list over a flat slot table.
//!
//! Links are `u32` slot indices instead of pointers. A vacated slot goes on
//! `free_slots` and is handed out again by the next insert, with its
//! generation bumped so handles to the previous occupant go stale.

use std::fmt;
use std::iter::FusedIterator;
use std::ops::ControlFlow;

use crate::error::ListError;
use crate::id::{ListId, NodeId};

/// How a bounded [`List::iterate`] walk ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterOutcome {
    /// The walk visited the stop node.
    Completed,
    /// The visitor returned `ControlFlow::Break`.
    Stopped,
    /// The walk ran off the end of the list without meeting the stop node.
    MissedStop,
}

impl IterOutcome {
    /// `true` for [`Completed`](Self::Completed) and [`Stopped`](Self::Stopped).
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::MissedStop)
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

struct Slot<T> {
    /// `None` while the slot sits on the free-slot stack.
    value: Option<T>,
    generation: u32,
    prev: Option<u32>,
    next: Option<u32>,
}

/// An ordered, doubly-linked sequence of owned values.
///
/// Inserts at either end are O(1); inserting next to a known node is O(1);
/// removal by handle is O(1). Handles ([`NodeId`]) remain valid across any
/// number of unrelated inserts and removals.
pub struct List<T> {
    id: ListId,
    slots: Vec<Slot<T>>,
    /// Vacated slot indices. Capacity is kept `>= slots.len()` so pushing
    /// here never allocates.
    free_slots: Vec<u32>,
    first: Option<u32>,
    last: Option<u32>,
    len: usize,
}

impl<T> List<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            id: ListId::next(),
            slots: Vec::new(),
            free_slots: Vec::new(),
            first: None,
            last: None,
            len: 0,
        }
    }

    /// This list's unique identifier.
    pub fn id(&self) -> ListId {
        self.id
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle to the head node, if any.
    pub fn first(&self) -> Option<NodeId> {
        self.first.map(|idx| self.handle(idx))
    }

    /// Handle to the tail node, if any.
    pub fn last(&self) -> Option<NodeId> {
        self.last.map(|idx| self.handle(idx))
    }

    /// Whether `node` is a live node of this list.
    pub fn contains(&self, node: NodeId) -> bool {
        self.resolve(node).is_ok()
    }

    /// Shared access to a node's value.
    pub fn get(&self, node: NodeId) -> Option<&T> {
        let idx = self.resolve(node).ok()?;
        self.slots[idx as usize].value.as_ref()
    }

    /// Mutable access to a node's value.
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut T> {
        let idx = self.resolve(node).ok()?;
        self.slots[idx as usize].value.as_mut()
    }

    /// The node after `node`. `None` at the tail or for an invalid handle.
    pub fn next(&self, node: NodeId) -> Option<NodeId> {
        let idx = self.resolve(node).ok()?;
        self.slots[idx as usize].next.map(|i| self.handle(i))
    }

    /// The node before `node`. `None` at the head or for an invalid handle.
    pub fn prev(&self, node: NodeId) -> Option<NodeId> {
        let idx = self.resolve(node).ok()?;
        self.slots[idx as usize].prev.map(|i| self.handle(i))
    }

    /// Insert `value` at the tail.
    pub fn append(&mut self, value: T) -> Result<NodeId, ListError> {
        let idx = self.alloc_slot(value)?;
        self.link_between(self.last, None, idx);
        Ok(self.handle(idx))
    }

    /// Insert `value` at the head.
    pub fn prepend(&mut self, value: T) -> Result<NodeId, ListError> {
        let idx = self.alloc_slot(value)?;
        self.link_between(None, self.first, idx);
        Ok(self.handle(idx))
    }

    /// Insert `value` directly after `anchor`.
    ///
    /// With `anchor == None`, or when `anchor` is the tail, this is
    /// [`append`](Self::append).
    pub fn insert_after(&mut self, anchor: Option<NodeId>, value: T) -> Result<NodeId, ListError> {
        let Some(anchor) = anchor else {
            return self.append(value);
        };
        let at = self.resolve(anchor)?;
        let next = self.slots[at as usize].next;
        let idx = self.alloc_slot(value)?;
        self.link_between(Some(at), next, idx);
        Ok(self.handle(idx))
    }

    /// Insert `value` directly before `anchor`.
    ///
    /// With `anchor == None`, or when `anchor` is the head, this is
    /// [`prepend`](Self::prepend).
    pub fn insert_before(
        &mut self,
        anchor: Option<NodeId>,
        value: T,
    ) -> Result<NodeId, ListError> {
        let Some(anchor) = anchor else {
            return self.prepend(value);
        };
        let at = self.resolve(anchor)?;
        let prev = self.slots[at as usize].prev;
        let idx = self.alloc_slot(value)?;
        self.link_between(prev, Some(at), idx);
        Ok(self.handle(idx))
    }

    /// Unlink `node` and return its value.
    ///
    /// Fails with [`ListError::ForeignNode`] for a handle issued by another
    /// list and [`ListError::StaleNode`] for one already removed. The list
    /// is unchanged on failure.
    pub fn remove(&mut self, node: NodeId) -> Result<T, ListError> {
        let idx = self.resolve(node)?;
        let slot = &mut self.slots[idx as usize];
        let prev = slot.prev.take();
        let next = slot.next.take();
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);

        match prev {
            Some(p) => self.slots[p as usize].next = next,
            None => self.first = next,
        }
        match next {
            Some(n) => self.slots[n as usize].prev = prev,
            None => self.last = prev,
        }
        self.free_slots.push(idx);
        self.len -= 1;

        value.ok_or(ListError::StaleNode { node })
    }

    /// Remove every node. All outstanding handles become stale.
    pub fn clear(&mut self) {
        let mut cursor = self.first;
        while let Some(idx) = cursor {
            let slot = &mut self.slots[idx as usize];
            cursor = slot.next.take();
            slot.prev = None;
            slot.value = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_slots.push(idx);
        }
        self.first = None;
        self.last = None;
        self.len = 0;
    }

    /// Visit nodes from `start` to `stop` inclusive along `next` links.
    ///
    /// `start` defaults to the head and `stop` to the tail. The walk ends
    /// with [`IterOutcome::Stopped`] as soon as `visitor` breaks,
    /// [`IterOutcome::Completed`] once `stop` has been visited, or
    /// [`IterOutcome::MissedStop`] if the tail is passed without meeting
    /// `stop`. Invalid `start`/`stop` handles are reported before any
    /// node is visited.
    pub fn iterate<F>(
        &self,
        start: Option<NodeId>,
        stop: Option<NodeId>,
        visitor: F,
    ) -> Result<IterOutcome, ListError>
    where
        F: FnMut(NodeId, &T) -> ControlFlow<()>,
    {
        self.walk(start, stop, Direction::Forward, visitor)
    }

    /// Mirror of [`iterate`](Self::iterate) along `prev` links.
    ///
    /// `start` defaults to the tail and `stop` to the head.
    pub fn iterate_reverse<F>(
        &self,
        start: Option<NodeId>,
        stop: Option<NodeId>,
        visitor: F,
    ) -> Result<IterOutcome, ListError>
    where
        F: FnMut(NodeId, &T) -> ControlFlow<()>,
    {
        self.walk(start, stop, Direction::Backward, visitor)
    }

    /// Lazy iterator over `(handle, value)` pairs, head to tail.
    ///
    /// Double-ended: `.rev()` walks tail to head.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.first,
            back: self.last,
            remaining: self.len,
        }
    }

    fn walk<F>(
        &self,
        start: Option<NodeId>,
        stop: Option<NodeId>,
        direction: Direction,
        mut visitor: F,
    ) -> Result<IterOutcome, ListError>
    where
        F: FnMut(NodeId, &T) -> ControlFlow<()>,
    {
        let (head, tail) = match direction {
            Direction::Forward => (self.first, self.last),
            Direction::Backward => (self.last, self.first),
        };
        let begin = match start {
            Some(node) => Some(self.resolve(node)?),
            None => head,
        };
        let end = match stop {
            Some(node) => Some(self.resolve(node)?),
            None => tail,
        };

        let mut cursor = begin;
        while let Some(idx) = cursor {
            let slot = &self.slots[idx as usize];
            if let Some(value) = slot.value.as_ref() {
                if visitor(self.handle(idx), value).is_break() {
                    return Ok(IterOutcome::Stopped);
                }
            }
            if Some(idx) == end {
                return Ok(IterOutcome::Completed);
            }
            cursor = match direction {
                Direction::Forward => slot.next,
                Direction::Backward => slot.prev,
            };
        }

        // Only an empty list walked with default bounds gets here cleanly.
        if begin.is_none() && end.is_none() {
            Ok(IterOutcome::Completed)
        } else {
            Ok(IterOutcome::MissedStop)
        }
    }

    fn handle(&self, idx: u32) -> NodeId {
        NodeId {
            list: self.id,
            index: idx,
            generation: self.slots[idx as usize].generation,
        }
    }

    fn resolve(&self, node: NodeId) -> Result<u32, ListError> {
        if node.list != self.id {
            return Err(ListError::ForeignNode {
                node,
                list: self.id,
            });
        }
        match self.slots.get(node.index as usize) {
            Some(slot) if slot.generation == node.generation && slot.value.is_some() => {
                Ok(node.index)
            }
            _ => Err(ListError::StaleNode { node }),
        }
    }

    fn alloc_slot(&mut self, value: T) -> Result<u32, ListError> {
        if let Some(idx) = self.free_slots.pop() {
            self.slots[idx as usize].value = Some(value);
            return Ok(idx);
        }

        let idx = u32::try_from(self.slots.len()).map_err(|_| ListError::AllocationFailure)?;
        self.slots
            .try_reserve(1)
            .map_err(|_| ListError::AllocationFailure)?;
        // free_slots is empty here; reserve room to recycle every slot.
        self.free_slots
            .try_reserve(self.slots.len() + 1)
            .map_err(|_| ListError::AllocationFailure)?;
        self.slots.push(Slot {
            value: Some(value),
            generation: 0,
            prev: None,
            next: None,
        });
        Ok(idx)
    }

    fn link_between(&mut self, prev: Option<u32>, next: Option<u32>, idx: u32) {
        {
            let slot = &mut self.slots[idx as usize];
            slot.prev = prev;
            slot.next = next;
        }
        match prev {
            Some(p) => self.slots[p as usize].next = Some(idx),
            None => self.first = Some(idx),
        }
        match next {
            Some(n) => self.slots[n as usize].prev = Some(idx),
            None => self.last = Some(idx),
        }
        self.len += 1;
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|(_, v)| v)).finish()
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = (NodeId, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`List::iter`].
pub struct Iter<'a, T> {
    list: &'a List<T>,
    front: Option<u32>,
    back: Option<u32>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front?;
        let slot = &self.list.slots[idx as usize];
        self.front = slot.next;
        self.remaining -= 1;
        slot.value.as_ref().map(|v| (self.list.handle(idx), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back?;
        let slot = &self.list.slots[idx as usize];
        self.back = slot.prev;
        self.remaining -= 1;
        slot.value.as_ref().map(|v| (self.list.handle(idx), v))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Copy>(list: &List<T>) -> Vec<T> {
        list.iter().map(|(_, v)| *v).collect()
    }

    fn values_rev<T: Copy>(list: &List<T>) -> Vec<T> {
        list.iter().rev().map(|(_, v)| *v).collect()
    }

    #[test]
    fn new_list_is_empty() {
        let list: List<u32> = List::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.first().is_none());
        assert!(list.last().is_none());
    }

    #[test]
    fn append_preserves_insertion_order() {
        let mut list = List::new();
        for i in 0..5 {
            list.append(i).unwrap();
        }
        assert_eq!(values(&list), [0, 1, 2, 3, 4]);
        assert_eq!(values_rev(&list), [4, 3, 2, 1, 0]);
    }

    #[test]
    fn prepend_reverses_insertion_order() {
        let mut list = List::new();
        for i in 0..5 {
            list.prepend(i).unwrap();
        }
        assert_eq!(values(&list), [4, 3, 2, 1, 0]);
    }

    #[test]
    fn single_node_is_both_endpoints() {
        let mut list = List::new();
        let n = list.insert_before(None, 10).unwrap();
        assert_eq!(list.first(), Some(n));
        assert_eq!(list.last(), Some(n));
        assert!(list.next(n).is_none());
        assert!(list.prev(n).is_none());
    }

    #[test]
    fn insert_before_tail_keeps_tail() {
        let mut list = List::new();
        let tail = list.insert_before(None, 0).unwrap();
        let mut prev_inserted = None;
        for i in 1..5 {
            let old_prev = list.prev(tail);
            let n = list.insert_before(list.last(), i).unwrap();
            assert_eq!(list.next(n), Some(tail));
            assert_eq!(list.prev(tail), Some(n));
            assert_eq!(list.prev(n), old_prev);
            assert_eq!(list.last(), Some(tail));
            if let Some(p) = prev_inserted {
                assert_eq!(list.next(p), Some(n));
            }
            prev_inserted = Some(n);
        }
        assert_eq!(values(&list), [1, 2, 3, 4, 0]);
    }

    #[test]
    fn insert_after_head_keeps_head() {
        let mut list = List::new();
        let head = list.insert_after(None, 0).unwrap();
        for i in 1..5 {
            let old_next = list.next(head);
            let n = list.insert_after(list.first(), i).unwrap();
            assert_eq!(list.prev(n), Some(head));
            assert_eq!(list.next(head), Some(n));
            assert_eq!(list.next(n), old_next);
            assert_eq!(list.first(), Some(head));
        }
        assert_eq!(values(&list), [0, 4, 3, 2, 1]);
    }

    #[test]
    fn insert_after_tail_appends() {
        let mut list = List::new();
        let a = list.append(1).unwrap();
        let b = list.insert_after(Some(a), 2).unwrap();
        assert_eq!(list.last(), Some(b));
        assert_eq!(values(&list), [1, 2]);
    }

    #[test]
    fn insert_before_head_prepends() {
        let mut list = List::new();
        let a = list.append(2).unwrap();
        let b = list.insert_before(Some(a), 1).unwrap();
        assert_eq!(list.first(), Some(b));
        assert_eq!(values(&list), [1, 2]);
    }

    #[test]
    fn remove_middle_relinks_neighbours() {
        let mut list = List::new();
        let a = list.append('a').unwrap();
        let b = list.append('b').unwrap();
        let c = list.append('c').unwrap();
        assert_eq!(list.remove(b).unwrap(), 'b');
        assert_eq!(list.next(a), Some(c));
        assert_eq!(list.prev(c), Some(a));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn remove_endpoints_updates_first_and_last() {
        let mut list = List::new();
        let a = list.append(1).unwrap();
        let b = list.append(2).unwrap();
        let c = list.append(3).unwrap();

        list.remove(a).unwrap();
        assert_eq!(list.first(), Some(b));
        assert!(list.prev(b).is_none());

        list.remove(c).unwrap();
        assert_eq!(list.last(), Some(b));
        assert!(list.next(b).is_none());

        list.remove(b).unwrap();
        assert!(list.is_empty());
        assert!(list.first().is_none());
        assert!(list.last().is_none());
    }

    #[test]
    fn removed_handle_is_stale() {
        let mut list = List::new();
        let a = list.append(1).unwrap();
        list.remove(a).unwrap();
        assert!(matches!(list.remove(a), Err(ListError::StaleNode { .. })));
        assert!(list.get(a).is_none());
        assert!(!list.contains(a));
    }

    #[test]
    fn recycled_slot_does_not_revive_old_handle() {
        let mut list = List::new();
        let a = list.append(1).unwrap();
        list.remove(a).unwrap();
        let b = list.append(2).unwrap();
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(list.get(a).is_none());
        assert_eq!(list.get(b), Some(&2));
    }

    #[test]
    fn foreign_node_is_rejected() {
        let mut one = List::new();
        let mut two = List::new();
        let a = one.append(1).unwrap();
        two.append(1).unwrap();
        assert!(matches!(two.remove(a), Err(ListError::ForeignNode { .. })));
        assert!(matches!(
            two.insert_after(Some(a), 5),
            Err(ListError::ForeignNode { .. })
        ));
        assert_eq!(two.len(), 1);
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut list = List::new();
        let a = list.append(1).unwrap();
        *list.get_mut(a).unwrap() += 41;
        assert_eq!(list.get(a), Some(&42));
    }

    #[test]
    fn iterate_visits_all_by_default() {
        let mut list = List::new();
        for i in 0..4 {
            list.append(i).unwrap();
        }
        let mut seen = Vec::new();
        let outcome = list
            .iterate(None, None, |_, v| {
                seen.push(*v);
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(outcome, IterOutcome::Completed);
        assert_eq!(seen, [0, 1, 2, 3]);
    }

    #[test]
    fn iterate_stops_early_on_break() {
        let mut list = List::new();
        for i in 0..10 {
            list.append(i).unwrap();
        }
        let mut seen = Vec::new();
        let outcome = list
            .iterate(None, None, |_, v| {
                seen.push(*v);
                if *v == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(outcome, IterOutcome::Stopped);
        assert!(outcome.is_success());
        assert_eq!(seen, [0, 1, 2, 3]);
    }

    #[test]
    fn iterate_between_bounds_is_inclusive() {
        let mut list = List::new();
        let handles: Vec<_> = (0..6).map(|i| list.append(i).unwrap()).collect();
        let mut seen = Vec::new();
        let outcome = list
            .iterate(Some(handles[1]), Some(handles[4]), |_, v| {
                seen.push(*v);
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(outcome, IterOutcome::Completed);
        assert_eq!(seen, [1, 2, 3, 4]);
    }

    #[test]
    fn iterate_reports_missed_stop() {
        let mut list = List::new();
        let handles: Vec<_> = (0..4).map(|i| list.append(i).unwrap()).collect();
        // stop lies before start in forward order.
        let outcome = list
            .iterate(Some(handles[2]), Some(handles[0]), |_, _| {
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(outcome, IterOutcome::MissedStop);
        assert!(!outcome.is_success());
    }

    #[test]
    fn iterate_reverse_defaults_to_tail_first() {
        let mut list = List::new();
        let handles: Vec<_> = (0..5).map(|i| list.append(i).unwrap()).collect();
        let mut seen = Vec::new();
        let outcome = list
            .iterate_reverse(None, Some(handles[2]), |_, v| {
                seen.push(*v);
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(outcome, IterOutcome::Completed);
        assert_eq!(seen, [4, 3, 2]);
    }

    #[test]
    fn iterate_reverse_missed_stop() {
        let mut list = List::new();
        let handles: Vec<_> = (0..3).map(|i| list.append(i).unwrap()).collect();
        let outcome = list
            .iterate_reverse(Some(handles[0]), Some(handles[2]), |_, _| {
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(outcome, IterOutcome::MissedStop);
    }

    #[test]
    fn iterate_empty_list_completes_without_visiting() {
        let list: List<u8> = List::new();
        let mut calls = 0;
        let outcome = list
            .iterate(None, None, |_, _| {
                calls += 1;
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(outcome, IterOutcome::Completed);
        assert_eq!(calls, 0);
    }

    #[test]
    fn iterate_rejects_invalid_bounds_before_visiting() {
        let mut list = List::new();
        let a = list.append(1).unwrap();
        list.remove(a).unwrap();
        list.append(2).unwrap();
        let mut calls = 0;
        let result = list.iterate(Some(a), None, |_, _| {
            calls += 1;
            ControlFlow::Continue(())
        });
        assert!(matches!(result, Err(ListError::StaleNode { .. })));
        assert_eq!(calls, 0);
    }

    #[test]
    fn iter_is_double_ended_and_exact() {
        let mut list = List::new();
        for i in 0..6 {
            list.append(i).unwrap();
        }
        let mut it = list.iter();
        assert_eq!(it.len(), 6);
        assert_eq!(it.next().map(|(_, v)| *v), Some(0));
        assert_eq!(it.next_back().map(|(_, v)| *v), Some(5));
        assert_eq!(it.len(), 4);
        let middle: Vec<_> = it.map(|(_, v)| *v).collect();
        assert_eq!(middle, [1, 2, 3, 4]);
    }

    #[test]
    fn iter_handles_resolve_to_values() {
        let mut list = List::new();
        for i in 0..3 {
            list.append(i * 10).unwrap();
        }
        for (node, value) in &list {
            assert_eq!(list.get(node), Some(value));
        }
    }

    #[test]
    fn clear_stales_every_handle() {
        let mut list = List::new();
        let handles: Vec<_> = (0..4).map(|i| list.append(i).unwrap()).collect();
        list.clear();
        assert!(list.is_empty());
        for h in handles {
            assert!(!list.contains(h));
        }
        list.append(9).unwrap();
        assert_eq!(values(&list), [9]);
    }

    #[test]
    fn debug_lists_values_in_order() {
        let mut list = List::new();
        list.append(1).unwrap();
        list.append(2).unwrap();
        assert_eq!(format!("{list:?}"), "[1, 2]");
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::VecDeque;

        #[derive(Clone, Debug)]
        enum Op {
            Append(u16),
            Prepend(u16),
            InsertAfter(usize, u16),
            InsertBefore(usize, u16),
            Remove(usize),
        }

        fn arb_op() -> impl Strategy<Value = Op> {
            prop_oneof![
                any::<u16>().prop_map(Op::Append),
                any::<u16>().prop_map(Op::Prepend),
                (any::<usize>(), any::<u16>()).prop_map(|(i, v)| Op::InsertAfter(i, v)),
                (any::<usize>(), any::<u16>()).prop_map(|(i, v)| Op::InsertBefore(i, v)),
                any::<usize>().prop_map(Op::Remove),
            ]
        }

        proptest! {
            #[test]
            fn matches_vecdeque_model(ops in proptest::collection::vec(arb_op(), 1..64)) {
                let mut list = List::new();
                // Model holds (handle, value) in list order.
                let mut model: VecDeque<(NodeId, u16)> = VecDeque::new();

                for op in ops {
                    match op {
                        Op::Append(v) => {
                            let n = list.append(v).unwrap();
                            model.push_back((n, v));
                        }
                        Op::Prepend(v) => {
                            let n = list.prepend(v).unwrap();
                            model.push_front((n, v));
                        }
                        Op::InsertAfter(i, v) => {
                            if model.is_empty() {
                                let n = list.insert_after(None, v).unwrap();
                                model.push_back((n, v));
                            } else {
                                let pos = i % model.len();
                                let n = list.insert_after(Some(model[pos].0), v).unwrap();
                                model.insert(pos + 1, (n, v));
                            }
                        }
                        Op::InsertBefore(i, v) => {
                            if model.is_empty() {
                                let n = list.insert_before(None, v).unwrap();
                                model.push_front((n, v));
                            } else {
                                let pos = i % model.len();
                                let n = list.insert_before(Some(model[pos].0), v).unwrap();
                                model.insert(pos, (n, v));
                            }
                        }
                        Op::Remove(i) => {
                            if !model.is_empty() {
                                let pos = i % model.len();
                                let (n, v) = model.remove(pos).unwrap();
                                prop_assert_eq!(list.remove(n).unwrap(), v);
                            }
                        }
                    }

                    let forward: Vec<_> = list.iter().map(|(n, v)| (n, *v)).collect();
                    let expected: Vec<_> = model.iter().copied().collect();
                    prop_assert_eq!(&forward, &expected);
                    let mut backward: Vec<_> = list.iter().rev().map(|(n, v)| (n, *v)).collect();
                    backward.reverse();
                    prop_assert_eq!(&backward, &expected);
                    prop_assert_eq!(list.len(), model.len());
                    prop_assert_eq!(list.first(), model.front().map(|e| e.0));
                    prop_assert_eq!(list.last(), model.back().map(|e| e.0));
                }
            }
        }
    }
}
