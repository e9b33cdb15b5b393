use crate::mutation::{Mutation, OpCode};
use serde::{Deserialize, Serialize};
use std::collections::hash_set;
use std::collections::HashSet;
use std::mem;

/// One staged entry awaiting duplication: the producing mutation's timestamp,
/// the operation code, and the payload bytes. Uniqueness is structural over
/// all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationTuple {
    pub timestamp: u64,
    pub code: OpCode,
    pub payload: Vec<u8>,
}

impl MutationTuple {
    /// Creates a tuple from its three components.
    pub fn new(timestamp: u64, code: OpCode, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp,
            code,
            payload: payload.into(),
        }
    }
}

/// De-duplicated accumulator drained by the duplication shipper. Inserting an
/// already-present tuple is a no-op; the set grows until taken.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MutationTupleSet {
    tuples: HashSet<MutationTuple>,
}

impl MutationTupleSet {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tuple; returns false when an equal tuple was already staged.
    pub fn insert(&mut self, tuple: MutationTuple) -> bool {
        self.tuples.insert(tuple)
    }

    /// True when the exact tuple is staged.
    pub fn contains(&self, tuple: &MutationTuple) -> bool {
        self.tuples.contains(tuple)
    }

    /// Number of staged tuples.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// True when nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Iterates staged tuples in arbitrary order.
    pub fn iter(&self) -> hash_set::Iter<'_, MutationTuple> {
        self.tuples.iter()
    }

    /// Takes every staged tuple, leaving the accumulator empty.
    pub fn take(&mut self) -> MutationTupleSet {
        mem::take(self)
    }
}

impl IntoIterator for MutationTupleSet {
    type Item = MutationTuple;
    type IntoIter = hash_set::IntoIter<MutationTuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.into_iter()
    }
}

impl<'a> IntoIterator for &'a MutationTupleSet {
    type Item = &'a MutationTuple;
    type IntoIter = hash_set::Iter<'a, MutationTuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}

/// Stages every materially significant update of a committed mutation.
///
/// Walks the update sequence in original order, skips heartbeats, and moves
/// each remaining payload (no copy) into `target` as a
/// `(timestamp, code, payload)` tuple. Exact duplicates collapse through the
/// accumulator's uniqueness rule. Non-heartbeat updates are never reordered
/// or dropped.
pub fn extract_committed_mutation(mutation: Mutation, target: &mut MutationTupleSet) {
    let timestamp = mutation.timestamp();
    for update in mutation.into_updates() {
        if update.code.is_heartbeat() {
            continue;
        }
        target.insert(MutationTuple::new(timestamp, update.code, update.payload));
    }
}
