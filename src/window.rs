use crate::mutation::{Ballot, Decree, Mutation};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Observer invoked synchronously as the committed frontier advances, exactly
/// once per decree, in strictly increasing decree order.
pub type CommitCallback = Box<dyn FnMut(Mutation)>;

/// Distinguishes a leader's live prepare from replay/duplication ingestion.
/// The window records the mode in its counters; admission rules are the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionMode {
    Active,
    Passive,
}

/// Rejection codes raised by the prepare window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("decree {decree} is at or below the committed frontier {committed}")]
    StaleDecree { decree: Decree, committed: Decree },
    #[error(
        "decree {decree} does not fit the window (committed {committed}, capacity {capacity})"
    )]
    OutOfWindow {
        decree: Decree,
        committed: Decree,
        capacity: usize,
    },
    #[error("slot for decree {decree} holds ballot {held}, incoming ballot {incoming} cannot replace it")]
    BallotNotGreater {
        decree: Decree,
        held: Ballot,
        incoming: Ballot,
    },
}

/// Counters exposed for observability snapshots.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowCounters {
    /// Distinct decrees admitted into an empty slot.
    pub admitted: u64,
    /// In-place replacements of an admitted slot by a higher ballot.
    pub replaced: u64,
    /// Decrees committed and handed to the callback.
    pub committed: u64,
    /// Admissions marked as passive (replay/duplication) ingestion.
    pub passive_admissions: u64,
}

/// Fixed-capacity sliding window over in-flight mutations, keyed by decree.
///
/// Slots move through EMPTY -> ADMITTED -> COMMITTED; a higher-ballot arrival
/// replaces an admitted slot in place. A decree never commits on its own
/// admission: the frontier advances over the contiguous run of admitted
/// decrees strictly below the highest admitted decree, so a slot stays open
/// to ballot replacement until later traffic pushes past it. Each committed
/// mutation is handed to the commit callback and its slot evicted.
pub struct PrepareWindow {
    committed: Decree,
    capacity: usize,
    slots: BTreeMap<Decree, Mutation>,
    committer: CommitCallback,
    counters: WindowCounters,
}

impl PrepareWindow {
    /// Creates a window whose committed frontier starts at `initial_decree`.
    pub fn new(initial_decree: Decree, capacity: usize, committer: CommitCallback) -> Self {
        Self {
            committed: initial_decree,
            capacity,
            slots: BTreeMap::new(),
            committer,
            counters: WindowCounters::default(),
        }
    }

    /// Admits a mutation into its decree slot.
    ///
    /// The decree must lie inside `(committed, committed + capacity]` and, if
    /// the slot is occupied, the incoming ballot must be strictly greater
    /// than the held one. Admission may synchronously commit previously
    /// buffered decrees that now sit strictly below the highest admitted
    /// decree; the highest admitted decree itself stays buffered until a
    /// later decree arrives.
    pub fn prepare(&mut self, mutation: Mutation, mode: IngestionMode) -> Result<(), WindowError> {
        let decree = mutation.decree();
        if decree <= self.committed {
            return Err(WindowError::StaleDecree {
                decree,
                committed: self.committed,
            });
        }
        if decree > self.committed.saturating_add(self.capacity as u64) {
            return Err(WindowError::OutOfWindow {
                decree,
                committed: self.committed,
                capacity: self.capacity,
            });
        }
        match self.slots.entry(decree) {
            Entry::Occupied(mut slot) => {
                let held = slot.get().ballot();
                if held >= mutation.ballot() {
                    return Err(WindowError::BallotNotGreater {
                        decree,
                        held,
                        incoming: mutation.ballot(),
                    });
                }
                self.counters.replaced += 1;
                debug!(decree, held, incoming = mutation.ballot(), "replaced slot with higher ballot");
                slot.insert(mutation);
            }
            Entry::Vacant(slot) => {
                slot.insert(mutation);
                self.counters.admitted += 1;
                if mode == IngestionMode::Passive {
                    self.counters.passive_admissions += 1;
                }
            }
        }
        self.advance_frontier();
        Ok(())
    }

    /// Returns the buffered mutation at `decree`, if any.
    pub fn get_mutation_by_decree(&self, decree: Decree) -> Option<&Mutation> {
        self.slots.get(&decree)
    }

    /// Highest decree known to be committed.
    pub fn last_committed_decree(&self) -> Decree {
        self.committed
    }

    /// Number of admitted, not yet committed decrees.
    pub fn in_flight(&self) -> usize {
        self.slots.len()
    }

    /// True when no mutation is buffered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Counter snapshot for observability.
    pub fn counters(&self) -> WindowCounters {
        self.counters
    }

    fn advance_frontier(&mut self) {
        let highest = match self.slots.keys().next_back() {
            Some(decree) => *decree,
            None => return,
        };
        while self.committed + 1 < highest {
            match self.slots.remove(&(self.committed + 1)) {
                Some(mutation) => {
                    self.committed += 1;
                    self.counters.committed += 1;
                    debug!(decree = self.committed, "committed decree, handing to extraction");
                    (self.committer)(mutation);
                }
                None => break,
            }
        }
    }
}
