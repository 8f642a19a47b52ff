use std::sync::Arc;

use crate::config::TamperConfig;
use crate::engine::{ScanDirection, Statement, Termination, pump};
use crate::error::TrapError;

/// Something that can run one statement execution to completion.
/// Interceptors wrap each other through this seam, composed at
/// pipeline-construction time.
pub trait StatementRunner {
    fn run(&mut self, stmt: &mut Statement<'_>) -> Result<Termination, TrapError>;
}

/// The unmodified pipeline: start the sink, pump rows untouched, shut the
/// sink down.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineRunner;

impl StatementRunner for BaselineRunner {
    fn run(&mut self, stmt: &mut Statement<'_>) -> Result<Termination, TrapError> {
        run_pipeline(stmt, None)
    }
}

/// Interception stage wrapped around the previously installed runner.
///
/// With an active configuration it becomes the effective row-emission
/// engine for the statement; disarmed, it delegates to the wrapped runner
/// as if it had never been installed. `into_inner` restores the wrapped
/// runner exactly at teardown.
pub struct TrapRunner<N> {
    config: Arc<TamperConfig>,
    next: N,
}

impl<N: StatementRunner> TrapRunner<N> {
    pub fn new(config: TamperConfig, next: N) -> Self {
        Self::with_shared(Arc::new(config), next)
    }

    /// Wrap an already-shared configuration, e.g. the process-wide one.
    pub fn with_shared(config: Arc<TamperConfig>, next: N) -> Self {
        if let Some(relation) = config.monitored_relation()
            && config.is_active()
        {
            log::info!(
                "sqltrap: armed for relation {relation} column {}",
                config.monitored_column()
            );
        }
        Self { config, next }
    }

    pub fn config(&self) -> &TamperConfig {
        &self.config
    }

    /// Unwrap, handing back the previously installed runner.
    pub fn into_inner(self) -> N {
        self.next
    }
}

impl<N: StatementRunner> StatementRunner for TrapRunner<N> {
    fn run(&mut self, stmt: &mut Statement<'_>) -> Result<Termination, TrapError> {
        if !self.config.is_active() {
            return self.next.run(stmt);
        }
        run_pipeline(stmt, Some(&self.config))
    }
}

/// The hook body shared by both runners: consumer startup/shutdown,
/// instrumentation bracketing, and the pump call itself.
fn run_pipeline(
    stmt: &mut Statement<'_>,
    policy: Option<&TamperConfig>,
) -> Result<Termination, TrapError> {
    // Tampering must never occur for plans that do not actually execute.
    if stmt.explain_only {
        return Err(TrapError::ExplainOnly);
    }

    if let Some(instr) = stmt.instrument.as_mut() {
        instr.start();
    }

    stmt.processed = 0;
    let emit = stmt.emits_rows();

    if emit {
        stmt.sink.startup(stmt.operation, &stmt.shape);
    }

    let result = if matches!(stmt.direction, ScanDirection::NoMovement) {
        Ok(Termination::NoMovement)
    } else {
        pump(stmt, policy, emit)
    };

    // The bracket closes on the abort path too; the abort is a returned
    // error, not unwinding.
    if let Some(instr) = stmt.instrument.as_mut() {
        instr.stop(stmt.processed);
    }

    let term = result?;

    // Not reached after an abort.
    if emit {
        stmt.sink.shutdown();
    }

    Ok(term)
}
