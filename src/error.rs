use thiserror::Error;

use crate::config::AbortSeverity;
use crate::row::RelationId;

/// Errors surfaced by the interception engine.
///
/// `Tripped` is the one designed abnormal-termination path: callers must
/// propagate it without recovery so no further rows are processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrapError {
    #[error("monitored relation {relation} reached the output stream ({severity} abort)")]
    Tripped {
        severity: AbortSeverity,
        relation: RelationId,
    },

    /// Caller misuse: explain-only plans never execute, so they must never
    /// reach the interception pipeline.
    #[error("refusing to run an explain-only statement")]
    ExplainOnly,
}
