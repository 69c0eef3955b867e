//! Worked-time aggregation over raw time entries.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::error::Diagnostic;
use crate::models::TimeEntry;

/// Sums net worked hours (gross duration minus break) for entries whose
/// *start* falls within `[range_start, range_end)`. An entry whose break
/// exceeds its gross duration contributes zero and is reported as a
/// data-integrity warning, never a fatal error.
pub fn worked_hours<'a>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
    range_start: NaiveDateTime,
    range_end: NaiveDateTime,
) -> (Decimal, Vec<Diagnostic>) {
    let mut total = Decimal::ZERO;
    let mut diagnostics = Vec::new();

    for entry in entries {
        if entry.start < range_start || entry.start >= range_end {
            continue;
        }
        let gross_minutes = (entry.end - entry.start).num_minutes();
        let break_minutes = i64::from(entry.break_minutes);
        if break_minutes > gross_minutes {
            warn!(
                "Entry {} on {}: break ({} min) exceeds gross duration ({} min); clamping to zero",
                entry.id,
                entry.start.date(),
                break_minutes,
                gross_minutes
            );
            diagnostics.push(Diagnostic::NegativeBreak {
                entry_id: entry.id.clone(),
                date: entry.start.date(),
            });
            continue;
        }
        total += Decimal::from(gross_minutes - break_minutes) / dec!(60);
    }

    (total, diagnostics)
}
