//! `iat` binary: runs the Implicit Association Test for one session.
//!
//! ```bash
//! iat --user-id 42 --referrer https://t.me/channel --results results.json
//! iat --user-id 42 --simulate --error-rate 0.1 --results results.json
//! ```

mod app;
mod input;
mod simulate;

use std::path::PathBuf;

use clap::Parser;
use iat_experiment::ExperimentConfig;
use iat_store::{JsonFileSink, ResultSink, Session, UnconfiguredSink};
use tracing::{info, warn};

pub use app::App;

#[derive(Parser, Debug)]
#[command(name = "iat", version, about = "Implicit Association Test runner", long_about = None)]
struct Args {
    /// Session user id handed over by the bootstrap.
    #[arg(long)]
    user_id: String,

    /// Where the subject came from; stored alongside the results.
    #[arg(long, default_value = "")]
    referrer: String,

    /// JSON results table. Without it every save fails.
    #[arg(long, value_name = "FILE")]
    results: Option<PathBuf>,

    /// Run headless with a simulated subject instead of opening a window.
    #[arg(long, default_value_t = false)]
    simulate: bool,

    /// Wrong-press probability of the simulated subject.
    #[arg(long, default_value_t = 0.1, value_parser = simulate::parse_error_rate)]
    error_rate: f64,

    /// Seed for the simulated subject.
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level_filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .init();

    let session = Session::new(args.user_id, args.referrer);
    let sink: Box<dyn ResultSink> = match args.results {
        Some(path) => {
            info!(path = %path.display(), "Saving results to file");
            Box::new(JsonFileSink::new(path))
        }
        None => {
            warn!("No --results file given; results cannot be saved");
            Box::new(UnconfiguredSink)
        }
    };
    let config = ExperimentConfig::default();

    if args.simulate {
        let sim = simulate::SimulationConfig {
            error_rate: args.error_rate,
            seed: args.seed.unwrap_or_else(rand::random),
        };
        let status = simulate::run(config, session, sink.as_ref(), &sim)?;
        info!(?status, "Simulation finished");
        return Ok(());
    }

    App::new(config, session, sink)?.run()
}
