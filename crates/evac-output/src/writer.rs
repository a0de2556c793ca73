//! The `OutputWriter` trait implemented by backend writers.

use crate::{CurvePointRow, ExitTimeRow, MetricsRow, OutputResult, TickSummaryRow};

/// Sink for run results.
///
/// Per-tick and per-person rows arrive through
/// [`RunOutputObserver`][crate::RunOutputObserver] while the run is going;
/// metrics and curves are written once it has finished.
pub trait OutputWriter {
    fn write_exit_times(&mut self, rows: &[ExitTimeRow]) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()>;

    fn write_curve(&mut self, rows: &[CurvePointRow]) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
