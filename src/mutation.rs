use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a write in a partition's ordered log. Strictly increasing
/// across committed entries.
pub type Decree = u64;

/// Leadership epoch number; at a fixed decree, higher dominates lower.
pub type Ballot = u64;

/// RPC write-operation code carried by a mutation update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpCode(pub u32);

impl OpCode {
    /// Heartbeat/no-op sentinel; carries no durable data and is never
    /// staged for duplication.
    pub const WRITE_EMPTY: OpCode = OpCode(0);
    /// Single-key write.
    pub const WRITE: OpCode = OpCode(1);
    /// Multi-key batched put.
    pub const MULTI_PUT: OpCode = OpCode(2);
    /// Multi-key batched remove.
    pub const MULTI_REMOVE: OpCode = OpCode(3);

    /// Returns true for the heartbeat sentinel.
    pub fn is_heartbeat(self) -> bool {
        self == Self::WRITE_EMPTY
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::WRITE_EMPTY => f.write_str("WRITE_EMPTY"),
            Self::WRITE => f.write_str("WRITE"),
            Self::MULTI_PUT => f.write_str("MULTI_PUT"),
            Self::MULTI_REMOVE => f.write_str("MULTI_REMOVE"),
            Self(code) => write!(f, "OP_{code}"),
        }
    }
}

/// One sub-operation of a mutation: an operation code plus its payload blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationUpdate {
    pub code: OpCode,
    pub payload: Vec<u8>,
}

impl MutationUpdate {
    /// Creates an update with the given code and payload bytes.
    pub fn new(code: OpCode, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            payload: payload.into(),
        }
    }

    /// Creates a heartbeat update (no durable payload).
    pub fn heartbeat() -> Self {
        Self::new(OpCode::WRITE_EMPTY, Vec::new())
    }
}

/// One write at a given log position and leadership epoch, carrying zero or
/// more sub-operations. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    decree: Decree,
    ballot: Ballot,
    timestamp: u64,
    updates: Vec<MutationUpdate>,
}

impl Mutation {
    /// Builds a mutation from its header fields and update sequence.
    pub fn new(
        decree: Decree,
        ballot: Ballot,
        timestamp: u64,
        updates: Vec<MutationUpdate>,
    ) -> Self {
        Self {
            decree,
            ballot,
            timestamp,
            updates,
        }
    }

    /// Log position of this write.
    pub fn decree(&self) -> Decree {
        self.decree
    }

    /// Leadership epoch the write was prepared under.
    pub fn ballot(&self) -> Ballot {
        self.ballot
    }

    /// Producer-assigned timestamp propagated into every staged tuple.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Sub-operations in their original order.
    pub fn updates(&self) -> &[MutationUpdate] {
        &self.updates
    }

    /// Consumes the mutation, yielding its updates with payload ownership.
    pub fn into_updates(self) -> Vec<MutationUpdate> {
        self.updates
    }
}
