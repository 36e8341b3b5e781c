//! Bounded top-K candidate lists and the associative chunk merger.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

/// A single evaluated state: canonical energy plus the state code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candidate {
    /// Canonical QUBO energy (offset not yet applied).
    pub energy: f64,
    /// State code in `[0, 2^n)`.
    pub code: u64,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    /// Total order: ascending energy, ties broken by ascending state code.
    fn cmp(&self, other: &Self) -> Ordering {
        self.energy
            .total_cmp(&other.energy)
            .then(self.code.cmp(&other.code))
    }
}

/// Bounded container holding the K smallest candidates seen so far.
///
/// Backed by a max-heap ordered by `(energy, code)`, so the worst kept entry
/// is always at the root. Insertion at capacity admits a candidate only when
/// it orders strictly below the current worst, which makes the fold over any
/// partition of the state space associative and commutative: the final
/// content depends on the set of candidates offered, never on the order.
#[derive(Debug, Clone)]
pub struct TopKList {
    capacity: usize,
    heap: BinaryHeap<Candidate>,
}

impl TopKList {
    /// Creates an empty list with room for `capacity` candidates.
    pub fn new(capacity: usize) -> Self {
        // Pre-size only up to a point: K may legitimately be as large as a
        // whole chunk, and the heap grows on demand anyway.
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(1 << 16) + 1),
        }
    }

    /// Maximum number of candidates retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of candidates currently held.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True when no candidate has been offered yet.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The worst kept candidate once the list is full.
    ///
    /// `None` while the list is below capacity: every candidate is still
    /// admissible, so callers must treat the bound as `+inf`.
    pub fn admission_bound(&self) -> Option<Candidate> {
        if self.heap.len() < self.capacity {
            None
        } else {
            self.heap.peek().copied()
        }
    }

    /// Offers a candidate; returns whether it was kept.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(candidate);
            return true;
        }
        // At capacity: strict (energy, code) improvement over the worst.
        match self.heap.peek() {
            Some(worst) if candidate < *worst => {
                self.heap.pop();
                self.heap.push(candidate);
                true
            }
            _ => false,
        }
    }

    /// Folds another bounded list into this one.
    pub fn merge_from(&mut self, other: TopKList) {
        for candidate in other.heap {
            self.insert(candidate);
        }
    }

    /// Finalizes the list into an ascending `(energy, code)` vector.
    pub fn into_sorted(self) -> Vec<Candidate> {
        let mut candidates = self.heap.into_vec();
        candidates.sort_unstable();
        candidates
    }
}
