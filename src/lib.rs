//! Conflict-resolution and extraction core for cross-cluster log duplication.
//!
//! Each partition replica feeds an unordered, possibly duplicated stream of
//! write mutations into a [`MutationBatch`]. The batch drops stale and
//! superseded inputs, orders the rest through a fixed-capacity prepare
//! window, and stages every committed, non-heartbeat update into a
//! de-duplicated [`MutationTupleSet`] for the remote shipper to drain.

pub mod batch;
pub mod config;
pub mod extract;
pub mod mutation;
pub mod telemetry;
pub mod window;

pub use batch::{AddOutcome, BatchError, MutationBatch};
pub use config::{ConfigError, MutationBatchConfig, DEFAULT_WINDOW_CAPACITY};
pub use extract::{extract_committed_mutation, MutationTuple, MutationTupleSet};
pub use mutation::{Ballot, Decree, Mutation, MutationUpdate, OpCode};
pub use telemetry::DuplicationCounters;
pub use window::{CommitCallback, IngestionMode, PrepareWindow, WindowCounters, WindowError};
