use grid_snake::game::{Direction, GameConfig, GameState, Position, Snake, StepOutcome};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn five_by_five() -> GameState<StdRng> {
    let config = GameConfig::new(5, 5).with_step_interval(0.1);
    GameState::with_rng(config, StdRng::seed_from_u64(2024))
}

#[test]
fn test_first_step_eats_food_ahead() {
    let mut state = five_by_five();
    assert_eq!(state.snake(), &[Position::new(2, 2)]);
    assert_eq!(state.heading(), Direction::Right);
    assert!(state.place_food_at(Position::new(3, 2)));

    assert_eq!(state.advance(0.1), StepOutcome::Ate);

    assert_eq!(state.snake(), &[Position::new(3, 2), Position::new(2, 2)]);
    assert_eq!(state.score(), 1);
    let food = state.food().expect("board still has free cells");
    assert_ne!(food, Position::new(3, 2));
    assert_ne!(food, Position::new(2, 2));
}

#[test]
fn test_snake_wraps_around_every_edge() {
    let mut state = five_by_five();
    // Off the route below
    assert!(state.place_food_at(Position::new(2, 4)));

    // Right from (2,2): (3,2), (4,2), then wrap to (0,2)
    for _ in 0..3 {
        state.step();
    }
    assert_eq!(state.head(), Position::new(0, 2));

    state.set_heading(Direction::Down);
    for _ in 0..3 {
        state.step();
    }
    assert_eq!(state.head(), Position::new(0, 0));

    state.set_heading(Direction::Left);
    state.step();
    assert_eq!(state.head(), Position::new(4, 0));

    state.set_heading(Direction::Up);
    state.step();
    assert_eq!(state.head(), Position::new(4, 4));
    assert!(!state.is_game_over());
}

#[test]
fn test_collision_then_reset() {
    let snake = Snake::from_body(
        vec![
            Position::new(1, 1),
            Position::new(2, 1),
            Position::new(2, 2),
            Position::new(1, 2),
        ],
        Direction::Left,
    )
    .unwrap();
    let mut state = GameState::from_parts(
        GameConfig::new(5, 5).with_step_interval(0.1),
        StdRng::seed_from_u64(3),
        snake,
        Position::new(4, 4),
    );

    state.set_heading(Direction::Down);
    let before = state.snake().to_vec();
    assert_eq!(state.advance(0.1), StepOutcome::Collided);
    assert!(state.is_game_over());
    assert_eq!(state.snake(), before.as_slice());

    // Time keeps flowing but nothing moves
    assert_eq!(state.advance(1.0), StepOutcome::Idle);
    assert_eq!(state.snake(), before.as_slice());

    state.reset();
    assert!(!state.is_game_over());
    assert_eq!(state.score(), 0);
    assert_eq!(state.snake(), &[Position::new(2, 2)]);
    assert_ne!(state.food(), Some(Position::new(2, 2)));
}

#[test]
fn test_filling_a_row_wins() {
    let mut state = GameState::with_rng(
        GameConfig::new(4, 1).with_step_interval(0.1),
        StdRng::seed_from_u64(8),
    );

    let mut last = StepOutcome::Idle;
    for _ in 0..3 {
        let ahead = state.head().wrapped_step(state.heading(), 4, 1);
        assert!(state.place_food_at(ahead));
        last = state.advance(0.1);
    }

    assert_eq!(last, StepOutcome::BoardFull);
    assert!(state.is_won());
    assert_eq!(state.score(), 3);
    assert_eq!(state.food(), None);
}
