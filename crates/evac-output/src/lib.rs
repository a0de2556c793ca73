//! `evac-output` — CSV output for evacuation runs.
//!
//! | File                 | One row per                                  |
//! |----------------------|----------------------------------------------|
//! | `exit_times.csv`     | evacuated person                             |
//! | `tick_summaries.csv` | tick                                         |
//! | `metrics.csv`        | run (makespan, mean, p50, p90, counts)       |
//! | `curve.csv`          | run × tick (cumulative evacuations)          |
//!
//! The writer implements [`OutputWriter`] and is driven during a run by
//! [`RunOutputObserver`], which implements `evac_sim::EngineObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use evac_output::{CsvWriter, RunOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = RunOutputObserver::new(writer, "baseline", config.tick_duration_secs);
//! let outcome = ScenarioController::new(config).run_with(&mut obs)?;
//! obs.record_outcome(&outcome);
//! obs.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::RunOutputObserver;
pub use row::{CurvePointRow, ExitTimeRow, MetricsRow, TickSummaryRow};
pub use writer::OutputWriter;
