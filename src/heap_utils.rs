//! Fixed-capacity top-k tracking for nearest-neighbor candidates.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

/// One entry of a [`TopK`] set: a candidate paired with its distance.
#[derive(Debug)]
struct Candidate<P> {
    distance: OrderedFloat<f64>,
    item: P,
}

impl<P> PartialEq for Candidate<P> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl<P> Eq for Candidate<P> {}

impl<P> PartialOrd for Candidate<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for Candidate<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so ordering by distance keeps the worst
        // of the k best candidates at the root where it can be peeked and
        // evicted in O(log k).
        self.distance.cmp(&other.distance)
    }
}

/// Bounded collection of the `capacity` smallest-distance items seen so far.
///
/// Backed by a max-heap over distances: while the set is below capacity every
/// item is accepted, and at capacity a new item replaces the current worst
/// only if it is strictly closer.
#[derive(Debug)]
pub struct TopK<P> {
    capacity: usize,
    heap: BinaryHeap<Candidate<P>>,
}

impl<P> TopK<P> {
    pub fn new(capacity: usize) -> Self {
        TopK {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Offers a candidate to the set, evicting the current worst entry if the
    /// set is full and the new distance improves on it.
    pub fn insert_or_replace_worst(&mut self, distance: f64, item: P) {
        if self.capacity == 0 {
            return;
        }
        let candidate = Candidate {
            distance: OrderedFloat(distance),
            item,
        };
        if self.heap.len() < self.capacity {
            self.heap.push(candidate);
        } else if let Some(worst) = self.heap.peek() {
            if candidate.distance < worst.distance {
                self.heap.pop();
                self.heap.push(candidate);
            }
        }
    }

    /// Distance of the worst retained candidate, or `None` while the set is
    /// below capacity (an under-full set can never justify pruning).
    pub fn worst_distance(&self) -> Option<f64> {
        if self.heap.len() == self.capacity {
            self.heap.peek().map(|candidate| candidate.distance.0)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Consumes the set, returning the items sorted ascending by distance.
    pub fn into_sorted(self) -> Vec<P> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|candidate| candidate.item)
            .collect()
    }
}
