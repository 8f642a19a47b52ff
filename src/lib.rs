//! Row-stream interception stage for query execution pipelines.
//!
//! Sits between a pull-based row producer and its output sink. When a row
//! from the configured monitored (relation, column) pair is about to leave
//! the system, the engine either aborts the statement (or session) or
//! silently perturbs the monitored integer with bounded pseudorandom noise,
//! so bulk extraction of the true values yields plausible-looking garbage.

pub mod config;
pub mod engine;
pub mod error;
pub mod noise;
pub mod row;
pub mod stream;

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

pub use crate::config::{AbortSeverity, ConfigError, Response, TamperConfig};
pub use crate::engine::{
    BaselineRunner,
    Instrumentation,
    Operation,
    ScanDirection,
    Statement,
    StatementRunner,
    Termination,
    TrapRunner,
};
pub use crate::error::TrapError;
pub use crate::noise::{NoiseRange, Perturber};
pub use crate::row::{Datum, RelationId, Row, RowShape};
pub use crate::stream::{CollectSink, Projection, RowSink, RowSource, VecSource};

/// Process-wide configuration, for hosts that cannot thread one through
/// their pipeline construction. Written once at startup, read-only during
/// execution.
static INSTALLED: Lazy<RwLock<Option<Arc<TamperConfig>>>> = Lazy::new(|| RwLock::new(None));

/// Install the process-wide configuration, returning the shared handle.
pub fn install(config: TamperConfig) -> Arc<TamperConfig> {
    let shared = Arc::new(config);
    *INSTALLED.write() = Some(shared.clone());
    log::info!(
        "sqltrap: configuration installed ({})",
        if shared.is_active() { "armed" } else { "disarmed" }
    );
    shared
}

/// The currently installed configuration, if any.
pub fn installed() -> Option<Arc<TamperConfig>> {
    INSTALLED.read().clone()
}

/// Remove the installed configuration at module teardown.
pub fn uninstall() {
    *INSTALLED.write() = None;
}
