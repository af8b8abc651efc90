// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Tabu List

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// Bounded memory of recently accepted solutions.
///
/// Insertion order is kept in a ring for FIFO eviction; membership is a hash
/// lookup on the solution itself.
#[derive(Debug, Clone)]
pub struct TabuList<T: Hash + Eq + Clone> {
    order: VecDeque<T>,
    members: HashSet<T>,
    capacity: usize,
}

impl<T: Hash + Eq + Clone> TabuList<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, entry: &T) -> bool {
        self.members.contains(entry)
    }

    /// Record `entry`, evicting the oldest entries beyond capacity.
    /// Returns false if it was already present (order is left unchanged).
    pub fn push(&mut self, entry: T) -> bool {
        if self.capacity == 0 || self.members.contains(&entry) {
            return false;
        }
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        self.members.insert(entry.clone());
        self.order.push_back(entry);
        true
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}
