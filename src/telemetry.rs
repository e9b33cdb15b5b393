use serde::Serialize;

/// Counter snapshot for one duplication stream, merged from the batch, the
/// prepare window, and the extraction sink.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DuplicationCounters {
    /// Mutations accepted into the window, whether into an empty slot or by
    /// replacing a lower ballot in place.
    pub admitted: u64,
    /// Mutations ignored because their decree was at or below the frontier.
    pub stale_ignored: u64,
    /// Mutations ignored because a buffered entry held an equal or higher
    /// ballot at the same decree.
    pub superseded_ignored: u64,
    /// Mutations the window rejected.
    pub rejected: u64,
    /// Decrees committed and handed to extraction.
    pub committed: u64,
    /// Non-heartbeat updates seen by extraction.
    pub extracted_updates: u64,
    /// Heartbeat updates skipped by extraction.
    pub heartbeats_skipped: u64,
    /// Extracted updates that collapsed into an already-staged tuple.
    pub duplicates_collapsed: u64,
}
