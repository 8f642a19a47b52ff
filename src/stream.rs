//! Producer and consumer seams the engine is interposed between, plus the
//! in-memory implementations used by embedding hosts and the test suite.

use std::collections::VecDeque;

use crate::engine::Operation;
use crate::row::{Row, RowShape};

/// Pull-based row producer (the plan side).
pub trait RowSource {
    /// Next row, or `None` once the stream is exhausted.
    fn pull(&mut self) -> Option<Row>;

    /// Release the producer's resources. Idempotence is not required of
    /// implementations; the engine calls this at most once per statement.
    fn release(&mut self);

    /// True when the caller may rewind this producer after the run, in
    /// which case the engine leaves its resources alive.
    fn may_rewind(&self) -> bool {
        false
    }
}

/// Push-based row consumer (the destination side).
pub trait RowSink {
    fn startup(&mut self, operation: Operation, shape: &RowShape);

    /// Deliver one row. Returning false means the destination has closed
    /// its channel and no more rows should be sent.
    fn receive(&mut self, row: Row) -> bool;

    fn shutdown(&mut self);
}

/// Optional projection applied to every pulled row before inspection,
/// e.g. to strip housekeeping columns so attribute positions line up.
pub trait Projection {
    fn project(&self, row: Row) -> Row;
}

/// `RowSource` backed by a queue of prepared rows.
#[derive(Debug, Default)]
pub struct VecSource {
    rows: VecDeque<Row>,
    release_count: u32,
    rewindable: bool,
}

impl VecSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into(),
            release_count: 0,
            rewindable: false,
        }
    }

    pub fn rewindable(mut self) -> Self {
        self.rewindable = true;
        self
    }

    pub fn released(&self) -> bool {
        self.release_count > 0
    }

    pub fn release_count(&self) -> u32 {
        self.release_count
    }

    /// Rows not yet pulled.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl RowSource for VecSource {
    fn pull(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    fn release(&mut self) {
        self.release_count += 1;
    }

    fn may_rewind(&self) -> bool {
        self.rewindable
    }
}

/// `RowSink` collecting everything it receives, optionally declining
/// after a fixed number of rows.
#[derive(Debug, Default)]
pub struct CollectSink {
    rows: Vec<Row>,
    capacity: Option<usize>,
    started: bool,
    shut_down: bool,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept at most `capacity` rows; `receive` declines once full.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn shut_down(&self) -> bool {
        self.shut_down
    }
}

impl RowSink for CollectSink {
    fn startup(&mut self, _operation: Operation, _shape: &RowShape) {
        self.started = true;
    }

    fn receive(&mut self, row: Row) -> bool {
        self.rows.push(row);
        match self.capacity {
            Some(capacity) => self.rows.len() < capacity,
            None => true,
        }
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
    }
}
