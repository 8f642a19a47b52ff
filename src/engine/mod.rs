pub mod instrument;
pub mod pump;
pub mod runner;

pub use instrument::Instrumentation;
pub use pump::pump;
pub use runner::{BaselineRunner, StatementRunner, TrapRunner};

use crate::row::RowShape;
use crate::stream::{Projection, RowSink, RowSource};

/// Kind of statement driving the row stream. Only read operations are
/// subject to tampering; write operations pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn is_read(self) -> bool {
        matches!(self, Operation::Select)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    Forward,
    Backward,
    /// The plan is not driven at all; the pipeline still starts and shuts
    /// down the sink.
    NoMovement,
}

/// Why the tamper loop stopped. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The producer ran out of rows.
    Exhausted,
    /// The sink declined a row.
    SinkClosed,
    /// The forwarded-row quota was reached.
    QuotaReached,
    /// A `NoMovement` scan skipped the loop entirely.
    NoMovement,
}

/// Descriptor for one statement execution: the producer/consumer pair plus
/// the controls the pipeline honors. The processed-row counter stays
/// readable here after the run, including after an abort.
pub struct Statement<'a> {
    pub source: &'a mut dyn RowSource,
    pub sink: &'a mut dyn RowSink,
    pub operation: Operation,
    pub direction: ScanDirection,
    /// Rows to forward before stopping early; 0 = unbounded.
    pub quota: u64,
    /// Write operation carrying a RETURNING clause, so rows are emitted.
    pub has_returning: bool,
    pub explain_only: bool,
    pub shape: RowShape,
    pub projection: Option<&'a dyn Projection>,
    pub instrument: Option<Instrumentation>,
    /// Rows seen by the loop for read operations, observable after the run.
    pub processed: u64,
}

impl<'a> Statement<'a> {
    pub fn new(
        source: &'a mut dyn RowSource,
        sink: &'a mut dyn RowSink,
        operation: Operation,
    ) -> Self {
        Self {
            source,
            sink,
            operation,
            direction: ScanDirection::Forward,
            quota: 0,
            has_returning: false,
            explain_only: false,
            shape: RowShape::default(),
            projection: None,
            instrument: None,
            processed: 0,
        }
    }

    pub fn direction(mut self, direction: ScanDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn quota(mut self, quota: u64) -> Self {
        self.quota = quota;
        self
    }

    pub fn returning(mut self) -> Self {
        self.has_returning = true;
        self
    }

    pub fn explain_only(mut self) -> Self {
        self.explain_only = true;
        self
    }

    pub fn shape(mut self, shape: RowShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn projection(mut self, projection: &'a dyn Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn instrumented(mut self) -> Self {
        self.instrument = Some(Instrumentation::default());
        self
    }

    /// Whether this statement emits rows to the sink.
    pub fn emits_rows(&self) -> bool {
        self.operation.is_read() || self.has_returning
    }
}
