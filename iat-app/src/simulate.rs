use anyhow::{Result, bail};
use iat_core::{Input, Side};
use iat_experiment::{ExperimentConfig, IatStateMachine, SaveStatus};
use iat_store::{ResultSink, Session};
use iat_timing::ManualTimer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Response time range of the simulated subject, per press.
const RESPONSE_MS: (u64, u64) = (350, 1200);

/// A subject who never answers correctly would never finish.
pub const MAX_ERROR_RATE: f64 = 0.9;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Probability that a press hits the wrong side.
    pub error_rate: f64,
    pub seed: u64,
}

/// Parses `--error-rate`; only finite rates in `0.0..=MAX_ERROR_RATE` are
/// accepted.
pub fn parse_error_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if !rate.is_finite() || !(0.0..=MAX_ERROR_RATE).contains(&rate) {
        return Err(format!("error rate must be within 0.0..={MAX_ERROR_RATE}, got `{s}`"));
    }
    Ok(rate)
}

/// Runs the whole test headless with a simulated subject and saves the
/// results through `sink`. Fails if the sink reports an error.
pub fn run(
    config: ExperimentConfig,
    session: Session,
    sink: &dyn ResultSink,
    sim: &SimulationConfig,
) -> Result<SaveStatus> {
    let timer = ManualTimer::new();
    let mut subject = StdRng::seed_from_u64(sim.seed);
    let mut experiment = IatStateMachine::new(
        config,
        session,
        timer.clone(),
        StdRng::seed_from_u64(sim.seed.wrapping_add(1)),
    )?;
    let error_rate = if sim.error_rate.is_finite() {
        sim.error_rate.clamp(0.0, MAX_ERROR_RATE)
    } else {
        0.0
    };
    info!(seed = sim.seed, error_rate, "Simulating subject");

    while !experiment.is_finished() {
        if experiment.current_phase().is_instruction() {
            experiment.handle_input(Input::Proceed);
            continue;
        }
        let Some(stimulus) = experiment.current_stimulus() else {
            bail!("no stimulus on screen while block is running");
        };
        let correct = experiment.current_block().correct_side(stimulus.category);
        let side = if subject.random_bool(error_rate) {
            correct.opposite()
        } else {
            correct
        };

        timer.advance_ms(subject.random_range(RESPONSE_MS.0..=RESPONSE_MS.1));
        experiment.handle_input(match side {
            Side::Left => Input::RespondLeft,
            Side::Right => Input::RespondRight,
        });
    }

    log_block_summary(&experiment);

    match pollster::block_on(experiment.finalize(sink)) {
        Some(SaveStatus::Failed(message)) => bail!("saving results failed: {message}"),
        Some(status) => Ok(status),
        None => bail!("results were already submitted"),
    }
}

fn log_block_summary(experiment: &IatStateMachine<ManualTimer, StdRng>) {
    for block in &experiment.config().blocks {
        let results: Vec<_> = experiment
            .results()
            .iter()
            .filter(|r| r.block_id == block.id)
            .collect();
        if results.is_empty() {
            continue;
        }
        let mean_rt =
            results.iter().map(|r| r.reaction_time_ms).sum::<f64>() / results.len() as f64;
        let errors = results.iter().filter(|r| !r.is_correct).count();
        info!(
            block_id = block.id,
            trials = results.len(),
            errors,
            mean_rt_ms = %format!("{mean_rt:.1}"),
            "Block summary"
        );
    }
}
