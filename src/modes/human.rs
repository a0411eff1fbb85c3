use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use rand::Rng;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Instant;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::game::{Direction, GameConfig, GameState, StepOutcome};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Keyboard-driven game in the terminal
pub struct HumanMode<R> {
    state: GameState<R>,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    /// Latest directional intent, consumed once per frame
    pending_direction: Option<Direction>,
}

impl<R: Rng> HumanMode<R> {
    pub fn new(config: GameConfig, rng: R) -> Self {
        Self {
            state: GameState::with_rng(config, rng),
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            pending_direction: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut terminal = match setup_terminal() {
            Ok(terminal) => terminal,
            Err(err) => {
                // Best effort; the setup error is the one worth reporting
                let mut stderr = stderr();
                let _ = execute!(stderr, LeaveAlternateScreen);
                let _ = disable_raw_mode();
                return Err(err);
            }
        };

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;
        let cleanup = restore_terminal(&mut terminal);

        first_error(result, cleanup)
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut frame_timer = interval(self.state.config().frame_interval());
        frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_frame = Instant::now();

        let area = terminal.size().context("Failed to query terminal size")?;
        let area = ratatui::layout::Rect::new(0, 0, area.width, area.height);
        if !Renderer::fits(area, self.state.config()) {
            let (width, height) = Renderer::required_size(self.state.config());
            warn!(
                have_width = area.width,
                have_height = area.height,
                width,
                height,
                "terminal is smaller than the board"
            );
        }

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => {
                            return Err(err).context("Failed to read terminal event");
                        }
                        None => self.should_quit = true,
                    }
                }

                // One frame: apply input, advance the clock, draw
                _ = frame_timer.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_frame).as_secs_f64();
                    last_frame = now;

                    self.update_game(dt);
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.state, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Turn(dir) => {
                    self.pending_direction = Some(dir);
                }
                KeyAction::Restart => {
                    if self.state.is_game_over() {
                        self.reset_game();
                    }
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }
    }

    fn update_game(&mut self, dt: f64) {
        if let Some(dir) = self.pending_direction.take() {
            self.state.set_heading(dir);
        }

        match self.state.advance(dt) {
            StepOutcome::Collided | StepOutcome::BoardFull => {
                self.metrics
                    .on_game_over(self.state.score(), self.state.is_won());
                info!(
                    score = self.state.score(),
                    high_score = self.metrics.high_score,
                    games_played = self.metrics.games_played,
                    boards_cleared = self.metrics.boards_cleared,
                    "game over"
                );
            }
            StepOutcome::Idle | StepOutcome::Moved | StepOutcome::Ate => {}
        }
    }

    fn reset_game(&mut self) {
        self.state.reset();
        self.metrics.on_game_start();
        self.pending_direction = None;
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stderr>>> {
    let mut stderr = stderr();
    execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor().context("Failed to hide cursor")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(terminal)
}

/// Undo every setup step, even when an earlier one fails
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
    let raw = disable_raw_mode().context("Failed to disable raw mode");
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen");
    let cursor = terminal.show_cursor().context("Failed to show cursor");
    first_error(first_error(raw, screen), cursor)
}

/// Keep the earlier error when both steps fail
fn first_error(first: Result<()>, second: Result<()>) -> Result<()> {
    first.and(second)
}
