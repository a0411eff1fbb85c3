use super::{
    action::Direction,
    config::GameConfig,
    state::{Phase, Position, Snake},
};
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::IteratorRandom;
use tracing::{debug, info};

/// Random draws tried before food placement falls back to scanning free cells
const MAX_FOOD_DRAWS: usize = 64;

/// What a call to [`GameState::advance`] or [`GameState::step`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No grid-step happened (not enough time, or the game is over)
    Idle,
    /// The snake moved one cell
    Moved,
    /// The snake ate food and grew
    Ate,
    /// The snake ran into itself; the game is over
    Collided,
    /// The snake ate the last food and now covers the whole grid
    BoardFull,
}

/// Fixed-timestep snake simulation.
///
/// The host drives it once per frame: [`set_heading`](Self::set_heading) with
/// the latest directional intent, [`advance`](Self::advance) with the frame
/// time, then reads the accessors to draw.
///
/// The configuration is expected to have passed [`GameConfig::validate`].
#[derive(Debug, Clone)]
pub struct GameState<R = ThreadRng> {
    config: GameConfig,
    rng: R,
    snake: Snake,
    heading: Direction,
    food: Option<Position>,
    score: u32,
    steps: u32,
    phase: Phase,
    accumulator: f64,
}

impl GameState<ThreadRng> {
    /// Create a new game seeded from the thread-local generator
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, rand::thread_rng())
    }
}

impl<R: Rng> GameState<R> {
    /// Create a new game drawing food positions from `rng`
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        let snake = Snake::new(config.center(), Direction::Right);
        let mut state = Self {
            config,
            rng,
            snake,
            heading: Direction::Right,
            food: None,
            score: 0,
            steps: 0,
            phase: Phase::Running,
            accumulator: 0.0,
        };
        state.reset();
        state
    }

    /// Build a game around an explicit snake and food cell.
    ///
    /// Food that is off the grid or under the snake is re-placed at random.
    pub fn from_parts(config: GameConfig, rng: R, snake: Snake, food: Position) -> Self {
        let heading = snake.direction();
        let mut state = Self {
            config,
            rng,
            snake,
            heading,
            food: None,
            score: 0,
            steps: 0,
            phase: Phase::Running,
            accumulator: 0.0,
        };
        if !state.place_food_at(food) {
            state.refill_food();
        }
        state
    }

    /// Start over with a single-cell snake at the grid center.
    ///
    /// The random source carries over so one seed drives a whole session.
    pub fn reset(&mut self) {
        self.snake = Snake::new(self.config.center(), Direction::Right);
        self.heading = Direction::Right;
        self.score = 0;
        self.steps = 0;
        self.phase = Phase::Running;
        self.accumulator = 0.0;
        self.refill_food();

        info!(
            width = self.config.grid_width,
            height = self.config.grid_height,
            food = ?self.food,
            "game reset"
        );
    }

    /// Queue a new heading for the next grid-step.
    ///
    /// The request is compared against the direction of the last grid-step,
    /// not against an earlier queued request. Only the reverse of the last
    /// move is ignored, so the snake can never fold back into its neck. Any
    /// other request replaces the queued heading, including the direction
    /// the snake is already moving in, which cancels a queued turn.
    pub fn set_heading(&mut self, requested: Direction) {
        if !requested.is_opposite(self.snake.direction()) {
            self.heading = requested;
        }
    }

    /// Feed `dt` seconds of frame time into the simulation.
    ///
    /// Performs at most one grid-step per call. The step interval is
    /// subtracted from the accumulator rather than zeroing it, and the
    /// leftover is capped at one interval so a lag spike costs at most one
    /// extra step on the following frame.
    pub fn advance(&mut self, dt: f64) -> StepOutcome {
        if self.is_game_over() {
            return StepOutcome::Idle;
        }
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }

        let interval = self.config.step_interval_secs;
        if self.accumulator < interval {
            return StepOutcome::Idle;
        }
        self.accumulator = (self.accumulator - interval).min(interval);

        self.step()
    }

    /// Perform one grid-step immediately, ignoring the accumulator
    pub fn step(&mut self) -> StepOutcome {
        if self.is_game_over() {
            return StepOutcome::Idle;
        }

        let new_head = self.snake.head().wrapped_step(
            self.heading,
            self.config.grid_width,
            self.config.grid_height,
        );

        // The tail counts: it has not moved out of the way yet
        if self.snake.contains(new_head) {
            self.phase = Phase::GameOver;
            info!(
                score = self.score,
                length = self.snake.len(),
                "snake collided with itself"
            );
            return StepOutcome::Collided;
        }

        let ate_food = self.food == Some(new_head);
        self.snake.advance_to(new_head, self.heading, ate_food);
        self.steps += 1;

        if !ate_food {
            return StepOutcome::Moved;
        }

        self.score += 1;
        self.refill_food();

        if self.food.is_none() {
            self.phase = Phase::GameOver;
            info!(score = self.score, "snake fills the board");
            return StepOutcome::BoardFull;
        }

        StepOutcome::Ate
    }

    /// Put the food on `pos`.
    ///
    /// Returns false and leaves the food untouched when `pos` is off the grid
    /// or under the snake.
    pub fn place_food_at(&mut self, pos: Position) -> bool {
        if !pos.is_within(self.config.grid_width, self.config.grid_height)
            || self.snake.contains(pos)
        {
            return false;
        }
        self.food = Some(pos);
        true
    }

    /// Body cells, head first
    pub fn snake(&self) -> &[Position] {
        self.snake.body()
    }

    pub fn head(&self) -> Position {
        self.snake.head()
    }

    /// `None` only once the snake covers the whole grid
    pub fn food(&self) -> Option<Position> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Grid-steps taken since the last reset
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Heading the next grid-step will use: the last request accepted by
    /// [`set_heading`](Self::set_heading) since the previous step, or the
    /// direction of that step if none was accepted
    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// The game ended because no free cell was left for food
    pub fn is_won(&self) -> bool {
        self.is_game_over() && self.food.is_none()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn refill_food(&mut self) {
        self.food = self.spawn_food_avoid_snake();
        if self.food.is_none() {
            self.phase = Phase::GameOver;
        }
    }

    /// Pick a uniformly random free cell, or `None` if the snake covers the grid
    fn spawn_food_avoid_snake(&mut self) -> Option<Position> {
        let (width, height) = (self.config.grid_width, self.config.grid_height);
        if self.snake.len() >= self.config.cell_count() {
            return None;
        }

        for _ in 0..MAX_FOOD_DRAWS {
            let x = self.rng.gen_range(0..width) as i32;
            let y = self.rng.gen_range(0..height) as i32;
            let pos = Position::new(x, y);

            if !self.snake.contains(pos) {
                debug!(x, y, "food placed");
                return Some(pos);
            }
        }

        // Crowded board: choose directly among the free cells
        let snake = &self.snake;
        let pos = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x as i32, y as i32)))
            .filter(|pos| !snake.contains(*pos))
            .choose(&mut self.rng);
        debug!(food = ?pos, "food placed after scanning free cells");
        pos
    }
}
