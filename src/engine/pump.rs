use crate::config::{Response, TamperConfig};
use crate::engine::{Statement, Termination};
use crate::error::TrapError;
use crate::noise::Perturber;
use crate::row::{Datum, Row};

/// Per-statement loop state. Owned by one `pump` invocation and discarded
/// at exit; never shared across statements.
#[derive(Debug, Default)]
struct ExecutionContext {
    forwarded: u64,
    released: bool,
}

/// Drive row production to completion or early termination, applying the
/// tamper policy to matching rows.
///
/// `emit` controls whether surviving rows are forwarded to the sink.
/// Returns how the loop stopped, or `TrapError::Tripped` when a monitored
/// row is met in abort mode. The statement's processed counter reflects
/// every row the loop completed, tampered or not.
pub fn pump(
    stmt: &mut Statement<'_>,
    policy: Option<&TamperConfig>,
    emit: bool,
) -> Result<Termination, TrapError> {
    // Seeded once per invocation, paid even when no row ever matches.
    let mut perturber = Perturber::for_statement(
        policy.map(TamperConfig::noise_range).unwrap_or_default(),
    );
    let mut ctx = ExecutionContext::default();

    let term = loop {
        let Some(pulled) = stmt.source.pull() else {
            stmt.source.release();
            ctx.released = true;
            break Termination::Exhausted;
        };

        // Housekeeping columns are stripped before inspection so the
        // monitored position lines up with the emitted shape.
        let mut row = match stmt.projection {
            Some(projection) => projection.project(pulled),
            None => pulled,
        };

        if stmt.operation.is_read() {
            if let Some(cfg) = policy
                && cfg.matches(row.relation)
            {
                match cfg.configured_response() {
                    Response::Abort(severity) => {
                        stmt.source.release();
                        log::warn!(
                            "sqltrap: monitored relation {} reached the output stream, \
                             aborting {severity}",
                            row.relation
                        );
                        return Err(TrapError::Tripped {
                            severity,
                            relation: row.relation,
                        });
                    }
                    Response::Corrupt => {
                        corrupt(&mut row, cfg.monitored_column(), &mut perturber);
                    }
                }
            }

            // Write operations count their own events downstream.
            stmt.processed += 1;
        }

        if emit {
            let accepted = stmt.sink.receive(row);
            ctx.forwarded += 1;
            if !accepted {
                break Termination::SinkClosed;
            }
        }

        if stmt.quota != 0 && ctx.forwarded >= stmt.quota {
            break Termination::QuotaReached;
        }
    };

    if !ctx.released && !stmt.source.may_rewind() {
        stmt.source.release();
    }

    Ok(term)
}

/// Replace the integer at the monitored 1-based position with a perturbed
/// copy. Null, out-of-range, and non-integer slots pass through untouched;
/// this path never fails.
fn corrupt(row: &mut Row, column: u32, perturber: &mut Perturber) {
    let Some(slot) = row.attr(column) else {
        return;
    };
    if slot.is_null() {
        return;
    }
    let Some(original) = slot.as_int() else {
        return;
    };

    let tampered = perturber.perturb(original);
    row.set_attr(column, Datum::Int(tampered));
    log::trace!(
        "sqltrap: perturbed relation {} column {column} ({original} -> {tampered})",
        row.relation
    );
}
