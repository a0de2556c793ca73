//! `evac` — command-line front-end for the evacuation simulator.
//!
//! ```text
//! evac baseline                       # 300 people, 25×25, 3 exits, seed 42
//! evac closure --at 60 --exit 0       # same room, leftmost exit closes at 60 s
//! evac sweep --counts 1,2,3,4,5       # one run per exit count
//! ```
//!
//! Every subcommand writes CSV tables to `--outdir` and logs a summary.
//! Set `RUST_LOG=debug` for per-tick progress.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use evac_core::{EvacConfig, ExitLayout};
use evac_output::{CsvWriter, CurvePointRow, MetricsRow, OutputWriter, RunOutputObserver};
use evac_sim::{RunOutcome, ScenarioController, sweep_exit_counts};

#[derive(Parser, Debug)]
#[command(name = "evac")]
#[command(about = "Grid pedestrian evacuation simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one scenario with no closures.
    Baseline {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Run the scenario twice: as configured, and with one exit closing.
    Closure {
        #[command(flatten)]
        common: CommonArgs,

        /// Closure time in simulated seconds
        #[arg(long, default_value = "60")]
        at: f64,

        /// Index of the exit to close (0 = leftmost)
        #[arg(long, default_value = "0")]
        exit: usize,
    },
    /// Run once per exit count and tabulate the results.
    Sweep {
        #[command(flatten)]
        common: CommonArgs,

        /// Exit counts to try
        #[arg(long, value_delimiter = ',', default_value = "1,2,3,4,5")]
        counts: Vec<usize>,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON config file; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of people
    #[arg(short, long)]
    agents: Option<usize>,

    /// Grid columns
    #[arg(long)]
    width: Option<u32>,

    /// Grid rows
    #[arg(long)]
    height: Option<u32>,

    /// Number of 1 m exits on the bottom row
    #[arg(short = 'n', long)]
    num_exits: Option<usize>,

    /// Master seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Step budget
    #[arg(long)]
    max_steps: Option<u64>,

    /// Output directory for CSV tables
    #[arg(short, long, default_value = "output")]
    outdir: PathBuf,
}

impl CommonArgs {
    /// Baseline scenario, then the config file, then explicit flags.
    fn load(&self) -> Result<EvacConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => EvacConfig::baseline(),
        };
        if let Some(n) = self.agents {
            config.population = n;
        }
        if let Some(w) = self.width {
            config.width = w;
        }
        if let Some(h) = self.height {
            config.height = h;
        }
        if let Some(n) = self.num_exits {
            config.exits = ExitLayout::Count(n);
        }
        if let Some(s) = self.seed {
            config.seed = s;
        }
        if let Some(m) = self.max_steps {
            config.max_steps = m;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Baseline { common } => {
            let config = common.load()?;
            run_labelled("baseline", config, &common.outdir)?;
        }
        Command::Closure { common, at, exit } => {
            let config = common.load()?;
            let baseline = run_labelled("baseline", config.clone(), &common.outdir.join("baseline"))?;
            let closed = run_labelled(
                "closure",
                config.with_closure(at, exit),
                &common.outdir.join("closure"),
            )?;
            if let (Some(b), Some(c)) = (baseline.metrics.makespan_secs, closed.metrics.makespan_secs) {
                info!(delta_secs = c - b, "makespan change from closure");
            }
        }
        Command::Sweep { common, counts } => {
            if counts.is_empty() {
                bail!("--counts needs at least one exit count");
            }
            let config = common.load()?;
            let points = sweep_exit_counts(&config, &counts)?;

            let mut writer = CsvWriter::new(&common.outdir)?;
            for p in &points {
                let label = format!("exits={}", p.exit_count);
                log_summary(&label, &p.outcome);
                writer.write_metrics(&MetricsRow::new(label.as_str(), &p.outcome))?;
                writer.write_curve(&CurvePointRow::from_outcome(&label, &p.outcome))?;
            }
            writer.finish()?;
        }
    }
    Ok(())
}

/// Run `config` with full CSV output into `outdir`.
fn run_labelled(label: &str, config: EvacConfig, outdir: &Path) -> Result<RunOutcome> {
    let writer = CsvWriter::new(outdir).with_context(|| format!("creating {}", outdir.display()))?;
    let mut observer = RunOutputObserver::new(writer, label, config.tick_duration_secs);

    let outcome = ScenarioController::new(config).run_with(&mut observer)?;
    observer.record_outcome(&outcome);
    observer.finish()?;

    log_summary(label, &outcome);
    info!(dir = %outdir.display(), "tables written");
    Ok(outcome)
}

fn log_summary(label: &str, outcome: &RunOutcome) {
    let m = &outcome.metrics;
    info!(
        run = label,
        evacuated = m.evacuated,
        population = m.population,
        ticks = outcome.ticks,
        live_exits = outcome.live_exits,
        makespan_secs = m.makespan_secs.unwrap_or(f64::NAN),
        p50_secs = m.p50_secs.unwrap_or(f64::NAN),
        p90_secs = m.p90_secs.unwrap_or(f64::NAN),
        "run summary"
    );
}
