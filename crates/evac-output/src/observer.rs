//! `RunOutputObserver<W>`: bridges `EngineObserver` to an `OutputWriter`.

use evac_agent::EvacuatingAgent;
use evac_sim::{EngineObserver, ExitEvent, RunOutcome, TickStats};

use crate::row::{CurvePointRow, ExitTimeRow, MetricsRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// An [`EngineObserver`] that streams exit times and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After the run returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct RunOutputObserver<W: OutputWriter> {
    writer:             W,
    run:                String,
    tick_duration_secs: f64,
    last_error:         Option<OutputError>,
}

impl<W: OutputWriter> RunOutputObserver<W> {
    /// Observer labelling its metrics and curve rows with `run`.
    pub fn new(writer: W, run: impl Into<String>, tick_duration_secs: f64) -> Self {
        Self {
            writer,
            run: run.into(),
            tick_duration_secs,
            last_error: None,
        }
    }

    /// Write the metrics row and curve of the finished run.
    pub fn record_outcome(&mut self, outcome: &RunOutcome) {
        let result = self.writer.write_metrics(&MetricsRow::new(self.run.as_str(), outcome));
        self.store_err(result);
        let result = self.writer.write_curve(&CurvePointRow::from_outcome(&self.run, outcome));
        self.store_err(result);
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer and hand it back, or the first error seen.
    pub fn finish(mut self) -> OutputResult<W> {
        if let Some(e) = self.last_error.take() {
            return Err(e);
        }
        self.writer.finish()?;
        Ok(self.writer)
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> EngineObserver for RunOutputObserver<W> {
    fn on_tick_end(&mut self, stats: &TickStats) {
        let row = TickSummaryRow::new(stats, self.tick_duration_secs);
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_evacuation(&mut self, event: &ExitEvent, agent: &EvacuatingAgent) {
        let result = self.writer.write_exit_times(&[ExitTimeRow::new(event, agent)]);
        self.store_err(result);
    }
}
