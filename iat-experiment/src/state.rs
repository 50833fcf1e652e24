use super::config::ExperimentConfig;
use super::error::ConfigError;
use super::sampler::StimulusSampler;
use super::trial::Trial;
use iat_core::{Block, Input, Phase, Side, Stimulus, TrialResult};
use iat_store::{ResultSink, SaveError, SaveReceipt, Session};
use iat_timing::Timer;
use rand::Rng;
use tracing::{debug, info, warn};

/// What a single input caused, in order. Ignored input causes nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentEvent {
    BlockStarted {
        block_id: u32,
    },
    TrialPresented {
        block_id: u32,
        trial: usize,
        stimulus_id: String,
    },
    Mistake {
        block_id: u32,
        trial: usize,
        pressed: Side,
    },
    TrialCompleted(TrialResult),
    BlockComplete {
        block_id: u32,
    },
    /// Last trial of the last block resolved; results are ready to save.
    TestFinished {
        total_results: usize,
    },
}

/// Outcome of the single save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    NotStarted,
    Pending,
    Saved { records: usize },
    /// Sink error message, verbatim.
    Failed(String),
}

/// Everything handed to the result sink, exactly once per engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub session: Session,
    pub results: Vec<TrialResult>,
}

/// The trial engine: block sequencing, stimulus sampling, response
/// classification and timing. Pure state; the only I/O is the sink call in
/// [`IatStateMachine::finalize`].
pub struct IatStateMachine<T, R>
where
    T: Timer,
    R: Rng,
{
    phase: Phase,
    timer: T,
    rng: R,
    config: ExperimentConfig,
    sampler: StimulusSampler,
    session: Session,
    block_index: usize,
    /// Trials presented in the current block, including the one in flight.
    block_trial_number: usize,
    current: Option<Trial<T::Timestamp>>,
    results: Vec<TrialResult>,
    submitted: bool,
    save_status: SaveStatus,
}

impl<T, R> IatStateMachine<T, R>
where
    T: Timer,
    R: Rng,
{
    pub fn new(
        config: ExperimentConfig,
        session: Session,
        timer: T,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let sampler = StimulusSampler::new(&config.blocks, config.pool.clone())?;
        let total = config.total_trials();

        info!(
            user_id = %session.user_id,
            blocks = config.blocks.len(),
            total_trials = total,
            "Experiment ready"
        );

        Ok(Self {
            phase: Phase::default(),
            timer,
            rng,
            results: Vec::with_capacity(total),
            config,
            sampler,
            session,
            block_index: 0,
            block_trial_number: 0,
            current: None,
            submitted: false,
            save_status: SaveStatus::NotStarted,
        })
    }

    /// Feeds one input through the engine and returns what it caused.
    pub fn handle_input(&mut self, input: Input) -> Vec<ExperimentEvent> {
        let mut events = Vec::new();
        if !self.phase.allows_input() {
            debug!(phase = ?self.phase, ?input, "Input ignored after test end");
            return events;
        }

        match (self.phase, input.side()) {
            (Phase::Instruction, None) => {
                self.phase = Phase::Running;
                events.push(ExperimentEvent::BlockStarted {
                    block_id: self.current_block().id,
                });
                info!(
                    block_id = self.current_block().id,
                    title = %self.current_block().title,
                    "Block started"
                );
                self.start_trial(&mut events);
            }
            (Phase::Running, Some(pressed)) if self.current.is_some() => {
                self.record_response(pressed, &mut events);
            }
            (phase, _) => {
                debug!(?phase, ?input, "Input ignored");
            }
        }

        events
    }

    fn start_trial(&mut self, events: &mut Vec<ExperimentEvent>) {
        let stimulus = self.sampler.sample(self.block_index, &mut self.rng).clone();
        let block_id = self.current_block().id;
        self.block_trial_number += 1;

        debug!(
            block_id,
            trial = self.block_trial_number,
            stimulus_id = %stimulus.id,
            "Trial started"
        );
        events.push(ExperimentEvent::TrialPresented {
            block_id,
            trial: self.block_trial_number,
            stimulus_id: stimulus.id.clone(),
        });

        self.current = Some(Trial::new(self.block_trial_number, stimulus, self.timer.now()));
    }

    /// Classifies a categorical press against the trial in flight. A wrong
    /// press only sets the mistake flag; the clock keeps running until the
    /// correct side is pressed.
    fn record_response(&mut self, pressed: Side, events: &mut Vec<ExperimentEvent>) {
        let block = &self.config.blocks[self.block_index];
        let Some(trial) = self.current.as_mut() else {
            return;
        };

        if pressed != block.correct_side(trial.stimulus.category) {
            trial.record_mistake();
            debug!(
                block_id = block.id,
                trial = trial.number,
                mistakes = trial.mistakes,
                "Wrong side pressed"
            );
            events.push(ExperimentEvent::Mistake {
                block_id: block.id,
                trial: trial.number,
                pressed,
            });
            return;
        }

        let reaction = self.timer.elapsed(trial.started_at);
        let had_mistake = trial.has_mistake();

        let result = TrialResult {
            block_id: block.id,
            stimulus_id: trial.stimulus.id.clone(),
            category: trial.stimulus.category,
            is_correct: !had_mistake,
            reaction_time_ms: reaction.as_nanos() as f64 / 1_000_000.0,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        debug!(
            block_id = block.id,
            trial = trial.number,
            rt_ms = result.reaction_time_ms,
            is_correct = result.is_correct,
            "Trial complete"
        );

        self.current = None;
        self.results.push(result.clone());
        events.push(ExperimentEvent::TrialCompleted(result));

        if self.block_trial_number >= self.current_block().trial_count {
            self.complete_block(events);
        } else {
            self.start_trial(events);
        }
    }

    fn complete_block(&mut self, events: &mut Vec<ExperimentEvent>) {
        let block_id = self.current_block().id;
        events.push(ExperimentEvent::BlockComplete { block_id });

        if self.block_index + 1 >= self.config.blocks.len() {
            self.phase = Phase::Saving;
            info!(
                block_id,
                results = self.results.len(),
                "Test finished"
            );
            events.push(ExperimentEvent::TestFinished {
                total_results: self.results.len(),
            });
        } else {
            self.block_index += 1;
            self.block_trial_number = 0;
            self.phase = Phase::Instruction;
            info!(block_id, next_block_id = self.current_block().id, "Block complete");
        }
    }

    /// Hands out the result set for saving. Returns `None` before the test is
    /// finished and on every call after the first.
    pub fn begin_save(&mut self) -> Option<Submission> {
        if self.phase != Phase::Saving || self.submitted {
            return None;
        }
        self.submitted = true;
        self.save_status = SaveStatus::Pending;
        Some(Submission {
            session: self.session.clone(),
            results: self.results.clone(),
        })
    }

    /// Records the sink's answer to the submission from [`Self::begin_save`].
    /// There is no retry; results stay in memory either way.
    pub fn complete_save(&mut self, outcome: Result<SaveReceipt, SaveError>) -> &SaveStatus {
        if self.save_status != SaveStatus::Pending {
            return &self.save_status;
        }

        self.save_status = match outcome {
            Ok(receipt) => {
                info!(
                    user_id = %receipt.user_id,
                    records = receipt.records,
                    replaced = receipt.replaced,
                    "Results saved"
                );
                SaveStatus::Saved {
                    records: receipt.records,
                }
            }
            Err(e) => {
                warn!(user_id = %self.session.user_id, error = %e, "Saving results failed");
                SaveStatus::Failed(e.to_string())
            }
        };
        self.phase = Phase::Finished;
        &self.save_status
    }

    /// Saves the finished test through `sink`: one call, no retry. Returns
    /// `None` without touching the sink if the test is not finished or was
    /// already submitted.
    pub async fn finalize<K>(&mut self, sink: &K) -> Option<SaveStatus>
    where
        K: ResultSink + ?Sized,
    {
        let submission = self.begin_save()?;
        debug!(
            sink = sink.name(),
            records = submission.results.len(),
            "Submitting results"
        );
        let outcome = sink
            .save_results(&submission.session, &submission.results)
            .await;
        Some(self.complete_save(outcome).clone())
    }

    pub fn current_phase(&self) -> Phase {
        self.phase
    }

    pub fn current_block(&self) -> &Block {
        &self.config.blocks[self.block_index]
    }

    pub fn block_index(&self) -> usize {
        self.block_index
    }

    pub fn current_stimulus(&self) -> Option<&Stimulus> {
        self.current.as_ref().map(|t| &t.stimulus)
    }

    pub fn current_trial(&self) -> Option<&Trial<T::Timestamp>> {
        self.current.as_ref()
    }

    /// Whether the subject has erred on the stimulus on screen.
    pub fn has_mistake(&self) -> bool {
        self.current.as_ref().is_some_and(|t| t.has_mistake())
    }

    /// `(trials presented, trials in block)` while a block is running.
    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        self.phase
            .is_running()
            .then(|| (self.block_trial_number, self.current_block().trial_count))
    }

    /// Completed trials so far, in completion order.
    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard;
    use iat_core::{Category, TrialState};
    use iat_store::MemorySink;
    use iat_timing::ManualTimer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    type Engine = IatStateMachine<ManualTimer, StdRng>;

    fn engine_with(config: ExperimentConfig) -> (Engine, ManualTimer) {
        let timer = ManualTimer::new();
        let engine = IatStateMachine::new(
            config,
            Session::new("user-1", "https://example.org/"),
            timer.clone(),
            StdRng::seed_from_u64(1),
        )
        .unwrap();
        (engine, timer)
    }

    fn engine() -> (Engine, ManualTimer) {
        engine_with(ExperimentConfig::default())
    }

    /// Two blocks of two trials each, words only.
    fn small_config() -> ExperimentConfig {
        let mut blocks = standard::blocks();
        blocks.truncate(2);
        blocks[1] = blocks[0].clone();
        blocks[1].id = 2;
        let swapped = &mut blocks[1];
        std::mem::swap(&mut swapped.left_categories, &mut swapped.right_categories);
        for block in &mut blocks {
            block.trial_count = 2;
        }
        ExperimentConfig::new(blocks, standard::stimulus_pool())
    }

    fn correct_input(engine: &Engine) -> Input {
        let stimulus = engine.current_stimulus().unwrap();
        match engine.current_block().correct_side(stimulus.category) {
            Side::Left => Input::RespondLeft,
            Side::Right => Input::RespondRight,
        }
    }

    fn wrong_input(engine: &Engine) -> Input {
        match correct_input(engine) {
            Input::RespondLeft => Input::RespondRight,
            _ => Input::RespondLeft,
        }
    }

    #[test]
    fn starts_on_first_instruction_screen() {
        let (engine, _) = engine();
        assert_eq!(engine.current_phase(), Phase::Instruction);
        assert_eq!(engine.current_block().id, 1);
        assert!(engine.current_stimulus().is_none());
        assert!(engine.trial_progress().is_none());
    }

    #[test]
    fn responses_on_instruction_screen_are_ignored() {
        let (mut engine, _) = engine();
        assert!(engine.handle_input(Input::RespondLeft).is_empty());
        assert!(engine.handle_input(Input::RespondRight).is_empty());
        assert_eq!(engine.current_phase(), Phase::Instruction);
        assert!(engine.results().is_empty());
    }

    #[test]
    fn proceed_starts_block_and_presents_first_trial() {
        let (mut engine, _) = engine();
        let events = engine.handle_input(Input::Proceed);

        assert_eq!(events[0], ExperimentEvent::BlockStarted { block_id: 1 });
        assert!(matches!(
            &events[1],
            ExperimentEvent::TrialPresented { block_id: 1, trial: 1, .. }
        ));
        assert_eq!(engine.current_phase(), Phase::Running);
        assert_eq!(engine.trial_progress(), Some((1, 10)));

        let stimulus = engine.current_stimulus().unwrap();
        assert!(matches!(stimulus.category, Category::Bashkir | Category::Russian));
    }

    #[test]
    fn proceed_while_running_is_ignored() {
        let (mut engine, _) = engine();
        engine.handle_input(Input::Proceed);
        let before = engine.current_stimulus().cloned();

        assert!(engine.handle_input(Input::Proceed).is_empty());
        assert_eq!(engine.current_stimulus().cloned(), before);
        assert_eq!(engine.trial_progress(), Some((1, 10)));
    }

    #[test]
    fn first_block_all_correct_advances_to_next_instruction() {
        let (mut engine, timer) = engine();
        engine.handle_input(Input::Proceed);

        for _ in 0..10 {
            timer.advance_ms(500);
            let input = correct_input(&engine);
            engine.handle_input(input);
        }

        assert_eq!(engine.results().len(), 10);
        assert!(engine.results().iter().all(|r| r.is_correct && r.block_id == 1));
        assert_eq!(engine.current_phase(), Phase::Instruction);
        assert_eq!(engine.current_block().id, 2);
        assert!(engine.current_stimulus().is_none());
    }

    #[test]
    fn wrong_press_flags_mistake_without_result() {
        let (mut engine, timer) = engine();
        engine.handle_input(Input::Proceed);
        let stimulus_id = engine.current_stimulus().unwrap().id.clone();

        timer.advance_ms(300);
        let wrong = wrong_input(&engine);
        let events = engine.handle_input(wrong);

        assert!(matches!(events.as_slice(), [ExperimentEvent::Mistake { trial: 1, .. }]));
        assert!(engine.results().is_empty());
        assert!(engine.has_mistake());
        assert_eq!(engine.current_stimulus().unwrap().id, stimulus_id);
        assert_eq!(engine.current_trial().unwrap().mistakes, 1);

        timer.advance_ms(400);
        let correct = correct_input(&engine);
        engine.handle_input(correct);

        let result = &engine.results()[0];
        assert_eq!(result.stimulus_id, stimulus_id);
        assert!(!result.is_correct);
        assert!(result.reaction_time_ms >= 700.0);
        assert!(!engine.has_mistake());
    }

    #[test]
    fn repeated_mistakes_keep_the_clock_running() {
        let (mut engine, timer) = engine();
        engine.handle_input(Input::Proceed);

        for _ in 0..3 {
            timer.advance_ms(200);
            let wrong = wrong_input(&engine);
            engine.handle_input(wrong);
        }
        timer.advance_ms(100);
        let correct = correct_input(&engine);
        engine.handle_input(correct);

        timer.advance_ms(100);
        let correct = correct_input(&engine);
        engine.handle_input(correct);

        let slow = &engine.results()[0];
        let fast = &engine.results()[1];
        assert_eq!(slow.reaction_time_ms, 700.0);
        assert_eq!(fast.reaction_time_ms, 100.0);
        assert!(!slow.is_correct);
        assert!(fast.is_correct);
    }

    #[test]
    fn mistake_flag_resets_for_next_trial() {
        let (mut engine, _) = engine();
        engine.handle_input(Input::Proceed);

        let wrong = wrong_input(&engine);
        engine.handle_input(wrong);
        let correct = correct_input(&engine);
        let events = engine.handle_input(correct);

        assert!(matches!(events.last(), Some(ExperimentEvent::TrialPresented { trial: 2, .. })));
        assert!(!engine.has_mistake());
        assert_eq!(engine.current_trial().unwrap().state, TrialState::AwaitingResponse);
    }

    #[test]
    fn last_trial_finishes_test_and_blocks_input() {
        let (mut engine, _) = engine_with(small_config());
        let mut finished = Vec::new();

        for _ in 0..2 {
            engine.handle_input(Input::Proceed);
            for _ in 0..2 {
                let input = correct_input(&engine);
                finished = engine.handle_input(input);
            }
        }

        assert!(matches!(
            finished.as_slice(),
            [
                ExperimentEvent::TrialCompleted(_),
                ExperimentEvent::BlockComplete { block_id: 2 },
                ExperimentEvent::TestFinished { total_results: 4 },
            ]
        ));
        assert_eq!(engine.current_phase(), Phase::Saving);
        assert!(engine.handle_input(Input::Proceed).is_empty());
        assert!(engine.handle_input(Input::RespondLeft).is_empty());
        assert_eq!(engine.results().len(), 4);
    }

    #[test]
    fn begin_save_hands_out_results_once() {
        let (mut engine, _) = engine_with(small_config());
        assert!(engine.begin_save().is_none());

        for _ in 0..2 {
            engine.handle_input(Input::Proceed);
            for _ in 0..2 {
                let input = correct_input(&engine);
                engine.handle_input(input);
            }
        }

        let submission = engine.begin_save().unwrap();
        assert_eq!(submission.results.len(), 4);
        assert_eq!(submission.session.user_id, "user-1");
        assert_eq!(engine.save_status(), &SaveStatus::Pending);
        assert!(engine.begin_save().is_none());

        assert!(engine.handle_input(Input::RespondRight).is_empty());
        assert_eq!(engine.current_phase(), Phase::Saving);
    }

    #[tokio::test]
    async fn input_after_save_leaves_engine_untouched() {
        let (mut engine, timer) = engine_with(small_config());
        for _ in 0..2 {
            engine.handle_input(Input::Proceed);
            for _ in 0..2 {
                let input = correct_input(&engine);
                engine.handle_input(input);
            }
        }
        let sink = MemorySink::new();
        engine.finalize(&sink).await;
        assert_eq!(engine.current_phase(), Phase::Finished);

        timer.advance_ms(100);
        for input in [Input::Proceed, Input::RespondLeft, Input::RespondRight] {
            assert!(engine.handle_input(input).is_empty());
        }
        assert_eq!(engine.current_phase(), Phase::Finished);
        assert!(engine.current_trial().is_none());
        assert_eq!(engine.results().len(), 4);
        assert_eq!(sink.call_count(), 1);
    }

    #[tokio::test]
    async fn finalize_calls_sink_once() {
        let (mut engine, _) = engine_with(small_config());
        for _ in 0..2 {
            engine.handle_input(Input::Proceed);
            for _ in 0..2 {
                let input = correct_input(&engine);
                engine.handle_input(input);
            }
        }

        let sink = MemorySink::new();
        let status = engine.finalize(&sink).await;
        assert_eq!(status, Some(SaveStatus::Saved { records: 4 }));
        assert_eq!(engine.finalize(&sink).await, None);
        assert_eq!(sink.call_count(), 1);
        assert_eq!(engine.current_phase(), Phase::Finished);

        let row = sink.row("user-1").unwrap();
        assert_eq!(row.results, engine.results());
        assert_eq!(row.referrer, "https://example.org/");
    }

    #[tokio::test]
    async fn finalize_before_finish_does_not_call_sink() {
        let (mut engine, _) = engine();
        engine.handle_input(Input::Proceed);

        let sink = MemorySink::new();
        assert_eq!(engine.finalize(&sink).await, None);
        assert_eq!(sink.call_count(), 0);
        assert_eq!(engine.save_status(), &SaveStatus::NotStarted);
    }

    #[tokio::test]
    async fn sink_failure_is_reported_verbatim() {
        let (mut engine, _) = engine_with(small_config());
        for _ in 0..2 {
            engine.handle_input(Input::Proceed);
            for _ in 0..2 {
                let input = correct_input(&engine);
                engine.handle_input(input);
            }
        }

        let sink = MemorySink::failing("permission denied for table iat_results");
        let status = engine.finalize(&sink).await;
        assert_eq!(
            status,
            Some(SaveStatus::Failed("permission denied for table iat_results".into()))
        );
        assert_eq!(engine.results().len(), 4);
        assert!(engine.handle_input(Input::Proceed).is_empty());
        assert!(engine.current_stimulus().is_none());
        assert_eq!(engine.finalize(&sink).await, None);
        assert_eq!(sink.call_count(), 1);
    }

    #[test]
    fn invalid_config_is_fatal() {
        let mut config = ExperimentConfig::default();
        config.pool.retain(|s| s.category != Category::Horse && s.category != Category::Cow);

        let err = IatStateMachine::new(
            config,
            Session::new("u", ""),
            ManualTimer::new(),
            StdRng::seed_from_u64(0),
        )
        .err();
        assert_eq!(err, Some(ConfigError::EmptyPool { block_id: 2 }));
    }
}
