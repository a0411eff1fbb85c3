use std::time::{Duration, Instant};

/// Per-process session statistics. Nothing here outlives the process.
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub games_played: u32,
    pub boards_cleared: u32,
    /// Whether the current game has already been counted
    recorded: bool,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            high_score: 0,
            games_played: 0,
            boards_cleared: 0,
            recorded: false,
        }
    }

    /// Refresh the play clock; it stops once the game has been recorded
    pub fn update(&mut self) {
        if !self.recorded {
            self.elapsed_time = self.start_time.elapsed();
        }
    }

    pub fn on_game_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.recorded = false;
    }

    /// Record a finished game. Repeated calls for the same game are ignored.
    pub fn on_game_over(&mut self, final_score: u32, won: bool) {
        if self.recorded {
            return;
        }
        self.recorded = true;
        self.games_played += 1;
        if won {
            self.boards_cleared += 1;
        }
        self.high_score = self.high_score.max(final_score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(0);
        assert_eq!(metrics.format_time(), "00:00");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_high_score_tracking() {
        let mut metrics = GameMetrics::new();

        metrics.on_game_over(10, false);
        assert_eq!(metrics.high_score, 10);
        assert_eq!(metrics.games_played, 1);

        metrics.on_game_start();
        metrics.on_game_over(5, false);
        assert_eq!(metrics.high_score, 10);
        assert_eq!(metrics.games_played, 2);

        metrics.on_game_start();
        metrics.on_game_over(15, true);
        assert_eq!(metrics.high_score, 15);
        assert_eq!(metrics.games_played, 3);
        assert_eq!(metrics.boards_cleared, 1);
    }

    #[test]
    fn test_game_over_counted_once() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_over(3, false);
        metrics.on_game_over(3, false);
        assert_eq!(metrics.games_played, 1);
    }

    #[test]
    fn test_clock_freezes_after_game_over() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed_time = Duration::from_secs(42);
        metrics.on_game_over(1, false);
        metrics.update();
        assert_eq!(metrics.elapsed_time, Duration::from_secs(42));
    }

    #[test]
    fn test_game_start_resets_time() {
        let mut metrics = GameMetrics::new();
        std::thread::sleep(Duration::from_millis(50));
        metrics.update();

        assert!(metrics.elapsed_time.as_millis() >= 50);

        metrics.on_game_start();
        metrics.update();
        assert!(metrics.elapsed_time.as_millis() < 50);
    }
}
