//! CSV output backend.
//!
//! Creates four files in the output directory:
//! - `exit_times.csv`
//! - `tick_summaries.csv`
//! - `metrics.csv`
//! - `curve.csv`

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{CurvePointRow, ExitTimeRow, MetricsRow, OutputResult, TickSummaryRow};

/// Writes run output to four CSV files.
pub struct CsvWriter {
    exit_times: Writer<File>,
    summaries:  Writer<File>,
    metrics:    Writer<File>,
    curve:      Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the four files, and write the headers.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let mut exit_times = Writer::from_path(dir.join("exit_times.csv"))?;
        exit_times.write_record(["agent_id", "exit_id", "exit_time_secs", "category", "age", "retargets"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["tick", "time_secs", "moving", "waiting", "evacuated", "served", "live_exits"])?;

        let mut metrics = Writer::from_path(dir.join("metrics.csv"))?;
        metrics.write_record([
            "run", "population", "evacuated", "remaining", "ticks", "live_exits",
            "makespan_secs", "mean_secs", "p50_secs", "p90_secs",
        ])?;

        let mut curve = Writer::from_path(dir.join("curve.csv"))?;
        curve.write_record(["run", "time_secs", "evacuated", "percent"])?;

        Ok(Self {
            exit_times,
            summaries,
            metrics,
            curve,
            finished: false,
        })
    }
}

/// Empty cell for a missing value.
fn opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_exit_times(&mut self, rows: &[ExitTimeRow]) -> OutputResult<()> {
        for row in rows {
            self.exit_times.write_record(&[
                row.agent_id.to_string(),
                row.exit_id.to_string(),
                row.exit_time_secs.to_string(),
                row.category.to_string(),
                row.age.to_string(),
                row.retargets.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.time_secs.to_string(),
            row.moving.to_string(),
            row.waiting.to_string(),
            row.evacuated.to_string(),
            row.served.to_string(),
            row.live_exits.to_string(),
        ])?;
        Ok(())
    }

    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()> {
        self.metrics.write_record(&[
            row.run.clone(),
            row.population.to_string(),
            row.evacuated.to_string(),
            row.remaining.to_string(),
            row.ticks.to_string(),
            row.live_exits.to_string(),
            opt(row.makespan_secs),
            opt(row.mean_secs),
            opt(row.p50_secs),
            opt(row.p90_secs),
        ])?;
        Ok(())
    }

    fn write_curve(&mut self, rows: &[CurvePointRow]) -> OutputResult<()> {
        for row in rows {
            self.curve.write_record(&[
                row.run.clone(),
                row.time_secs.to_string(),
                row.evacuated.to_string(),
                row.percent.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.exit_times.flush()?;
        self.summaries.flush()?;
        self.metrics.flush()?;
        self.curve.flush()?;
        Ok(())
    }
}
