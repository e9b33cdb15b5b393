use crate::config::{ConfigError, MutationBatchConfig};
use crate::extract::{extract_committed_mutation, MutationTupleSet};
use crate::mutation::{Ballot, Decree, Mutation};
use crate::telemetry::DuplicationCounters;
use crate::window::{IngestionMode, PrepareWindow, WindowError};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure surfaced by [`MutationBatch::add`]. Stale and superseded inputs
/// are successes, not errors; the only failure is a window rejection, kept as
/// a single coarse kind wrapping the collaborator's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("failed to add mutation [err: {code}, mutation decree: {decree}, ballot: {ballot}]")]
    InvalidInsertion {
        decree: Decree,
        ballot: Ballot,
        code: WindowError,
    },
}

/// Disposition of a successfully handled mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Admitted into the window (and possibly already committed).
    Admitted,
    /// Decree at or below the committed frontier; dropped without effect.
    Stale,
    /// A buffered entry at the same decree holds an equal or higher ballot;
    /// dropped without effect.
    Superseded,
}

/// Extraction target shared between the batch and the window's commit
/// callback. Single-writer model: `Rc<RefCell<_>>`, no locking.
#[derive(Default)]
struct ExtractSink {
    staged: MutationTupleSet,
    committed: u64,
    extracted_updates: u64,
    heartbeats_skipped: u64,
    duplicates_collapsed: u64,
}

impl ExtractSink {
    fn absorb(&mut self, mutation: Mutation) {
        let heartbeats = mutation
            .updates()
            .iter()
            .filter(|update| update.code.is_heartbeat())
            .count() as u64;
        let significant = mutation.updates().len() as u64 - heartbeats;
        let staged_before = self.staged.len() as u64;
        extract_committed_mutation(mutation, &mut self.staged);
        let inserted = self.staged.len() as u64 - staged_before;
        self.committed += 1;
        self.heartbeats_skipped += heartbeats;
        self.extracted_updates += significant;
        self.duplicates_collapsed += significant - inserted;
    }
}

/// Gatekeeper between unordered mutation input and the ordered commit
/// pipeline of one duplication stream.
///
/// Owns the prepare window and the staged tuple accumulator; filters stale
/// and superseded mutations, forwards the rest as passive ingestion, and
/// runs extraction from the window's commit callback.
pub struct MutationBatch {
    window: PrepareWindow,
    sink: Rc<RefCell<ExtractSink>>,
    admitted: u64,
    stale_ignored: u64,
    superseded_ignored: u64,
    rejected: u64,
}

impl MutationBatch {
    /// Builds the batch and its window, registering the extraction committer.
    pub fn new(config: MutationBatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sink = Rc::new(RefCell::new(ExtractSink::default()));
        let committer = {
            let sink = Rc::clone(&sink);
            Box::new(move |mutation: Mutation| {
                sink.borrow_mut().absorb(mutation);
            })
        };
        let window = PrepareWindow::new(config.start_decree, config.window_capacity, committer);
        Ok(Self {
            window,
            sink,
            admitted: 0,
            stale_ignored: 0,
            superseded_ignored: 0,
            rejected: 0,
        })
    }

    /// Filters and forwards one mutation.
    ///
    /// Stale decrees and equal-or-lower ballots at an occupied decree are
    /// idempotent drops returned as success. Admission may synchronously
    /// commit the contiguous run of decrees strictly below the highest
    /// admitted decree, staging their significant updates before this call
    /// returns; the highest admitted decree itself stays buffered, open to
    /// ballot supersession, until later traffic pushes past it. Window
    /// rejections are returned as [`BatchError::InvalidInsertion`] and never
    /// retried here.
    pub fn add(&mut self, mutation: Mutation) -> Result<AddOutcome, BatchError> {
        let decree = mutation.decree();
        let ballot = mutation.ballot();
        let committed = self.window.last_committed_decree();
        if decree <= committed {
            self.stale_ignored += 1;
            debug!(decree, ballot, committed, "ignoring stale mutation");
            return Ok(AddOutcome::Stale);
        }
        if let Some(buffered) = self.window.get_mutation_by_decree(decree) {
            if buffered.ballot() >= ballot {
                self.superseded_ignored += 1;
                debug!(
                    decree,
                    ballot,
                    held = buffered.ballot(),
                    "ignoring superseded mutation"
                );
                return Ok(AddOutcome::Superseded);
            }
        }
        match self.window.prepare(mutation, IngestionMode::Passive) {
            Ok(()) => {
                self.admitted += 1;
                Ok(AddOutcome::Admitted)
            }
            Err(code) => {
                self.rejected += 1;
                warn!(decree, ballot, %code, "prepare window rejected mutation");
                Err(BatchError::InvalidInsertion {
                    decree,
                    ballot,
                    code,
                })
            }
        }
    }

    /// Highest decree committed and extracted so far.
    pub fn last_committed_decree(&self) -> Decree {
        self.window.last_committed_decree()
    }

    /// Number of admitted, uncommitted decrees in the window.
    pub fn in_flight(&self) -> usize {
        self.window.in_flight()
    }

    /// Number of tuples currently staged for the shipper.
    pub fn staged_count(&self) -> usize {
        self.sink.borrow().staged.len()
    }

    /// True when at least one tuple is staged.
    pub fn has_staged(&self) -> bool {
        !self.sink.borrow().staged.is_empty()
    }

    /// Drains every staged tuple for the shipper, leaving the accumulator
    /// empty. Counters are unaffected by the drain.
    pub fn move_all_mutations(&mut self) -> MutationTupleSet {
        self.sink.borrow_mut().staged.take()
    }

    /// Counter snapshot merged across the batch, window, and extraction sink.
    pub fn counters(&self) -> DuplicationCounters {
        let sink = self.sink.borrow();
        DuplicationCounters {
            admitted: self.admitted,
            stale_ignored: self.stale_ignored,
            superseded_ignored: self.superseded_ignored,
            rejected: self.rejected,
            committed: sink.committed,
            extracted_updates: sink.extracted_updates,
            heartbeats_skipped: sink.heartbeats_skipped,
            duplicates_collapsed: sink.duplicates_collapsed,
        }
    }
}
