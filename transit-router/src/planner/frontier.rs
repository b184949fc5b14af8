//! Min-priority frontier shared by the cost-ordered searches.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::domain::StopId;

#[derive(Debug, Clone, Copy)]
struct Entry {
    priority: f64,
    stop: StopId,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys so the max-heap pops the lowest priority,
        // and among equal priorities the lowest stop id.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.stop.cmp(&self.stop))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Open set keyed by priority, ties broken by stop id ascending.
///
/// A stop may be pushed several times with improving priorities; callers
/// skip stale entries by checking their closed set on pop.
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    heap: BinaryHeap<Entry>,
}

impl Frontier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, stop: StopId, priority: f64) {
        self.heap.push(Entry { priority, stop });
    }

    pub(crate) fn pop(&mut self) -> Option<(StopId, f64)> {
        self.heap.pop().map(|e| (e.stop, e.priority))
    }
}
