use std::sync::Arc;

use anyhow::Result;
use iat_core::{Phase, Side, StimulusKind};
use iat_experiment::{ExperimentConfig, ExperimentEvent, IatStateMachine, SaveStatus};
use iat_store::{ResultSink, Session};
use iat_timing::{HighPrecisionTimer, Timer};
use rand::Rng;
use rand::rngs::ThreadRng;
use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::input::{KeyAction, map_key, map_pointer};

/// Window host: feeds keyboard and pointer input to the engine and saves
/// the results once the last block is done. Drawing is left to the
/// presentation layer; the window title carries the current screen.
pub struct App {
    window: Option<Arc<Window>>,
    experiment: IatStateMachine<HighPrecisionTimer, ThreadRng>,
    sink: Box<dyn ResultSink>,
    cursor: PhysicalPosition<f64>,
    should_exit: bool,
}

impl App {
    pub fn new(
        config: ExperimentConfig,
        session: Session,
        sink: Box<dyn ResultSink>,
    ) -> Result<Self> {
        let timer = HighPrecisionTimer::new();
        let rng = rand::rng();
        let experiment = IatStateMachine::new(config, session, timer, rng)?;

        Ok(Self {
            window: None,
            experiment,
            sink,
            cursor: PhysicalPosition::new(0.0, 0.0),
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "Press SPACE to start, E/I to answer, ESC to exit"
        );

        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title(status_text(&self.experiment))
            .with_resizable(true);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();
        info!(width = size.width, height = size.height, "Window created");

        self.window = Some(window);
        Ok(())
    }

    fn dispatch(&mut self, input: iat_core::Input) {
        let events = self.experiment.handle_input(input);
        if events.is_empty() {
            return;
        }

        self.refresh_title();
        if events
            .iter()
            .any(|e| matches!(e, ExperimentEvent::TestFinished { .. }))
        {
            self.save_results();
            self.refresh_title();
        }
    }

    /// Blocks on the single sink call. Input arriving meanwhile is queued by
    /// the event loop and then ignored by the engine, which is no longer
    /// running.
    fn save_results(&mut self) {
        match pollster::block_on(self.experiment.finalize(&*self.sink)) {
            Some(SaveStatus::Failed(message)) => error!(%message, "Results were not saved"),
            Some(status) => info!(?status, "Save finished"),
            None => {}
        }
    }

    fn refresh_title(&self) {
        if let Some(window) = &self.window {
            window.set_title(&status_text(&self.experiment));
        }
    }

    fn handle_pointer(&mut self) {
        let width = self
            .window
            .as_ref()
            .map_or(0.0, |w| w.inner_size().width as f64);
        if let Some(input) = map_pointer(self.cursor.x, width, self.experiment.current_phase()) {
            self.dispatch(input);
        }
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        info!(
            results = self.experiment.results().len(),
            status = ?self.experiment.save_status(),
            "Exiting"
        );
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window(event_loop) {
                error!(error = %e, "Failed to create window");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                match map_key(event.physical_key) {
                    Some(KeyAction::Engine(input)) => self.dispatch(input),
                    Some(KeyAction::Quit) => self.cleanup_and_exit(event_loop),
                    None => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.cursor = position,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.handle_pointer(),
            WindowEvent::Touch(touch) if touch.phase == TouchPhase::Started => {
                self.cursor = touch.location;
                self.handle_pointer();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}

/// One-line description of the current screen.
pub fn status_text<T: Timer, R: Rng>(experiment: &IatStateMachine<T, R>) -> String {
    let block = experiment.current_block();
    match experiment.current_phase() {
        Phase::Instruction => format!("{} | press SPACE to start", block.title),
        Phase::Running => {
            let stimulus = experiment
                .current_stimulus()
                .map(|s| match s.kind {
                    StimulusKind::Word => s.content.clone(),
                    StimulusKind::Image => format!("[{}]", s.content),
                })
                .unwrap_or_default();
            let mark = if experiment.has_mistake() { " X" } else { "" };
            let (done, total) = experiment.trial_progress().unwrap_or((0, block.trial_count));
            format!(
                "{} ({}) | {}{} | ({}) {} | block {} {}/{}",
                block.labels(Side::Left).join(", "),
                Side::Left.key_hint(),
                stimulus,
                mark,
                Side::Right.key_hint(),
                block.labels(Side::Right).join(", "),
                block.id,
                done,
                total
            )
        }
        Phase::Saving => "Test complete | saving results...".to_string(),
        Phase::Finished => match experiment.save_status() {
            SaveStatus::Failed(message) => format!("Test complete | save failed: {message}"),
            _ => "Test complete | results saved, thank you".to_string(),
        },
    }
}
