use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::state::Position;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Terminal columns used to draw one grid cell
    pub cell_width: u16,
    /// Seconds between grid-steps
    pub step_interval_secs: f64,
    /// Host frames per second
    pub frame_rate: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 32,
            grid_height: 24,
            cell_width: 2,
            step_interval_secs: 0.15,
            frame_rate: 60,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    pub fn with_step_interval(mut self, secs: f64) -> Self {
        self.step_interval_secs = secs;
        self
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width > 0 && self.grid_height > 0,
            "grid must be at least 1x1, got {}x{}",
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.grid_width <= i32::MAX as usize && self.grid_height <= i32::MAX as usize,
            "grid dimensions exceed the coordinate range"
        );
        ensure!(
            self.step_interval_secs.is_finite() && self.step_interval_secs > 0.0,
            "step interval must be a positive number of seconds, got {}",
            self.step_interval_secs
        );
        ensure!(self.frame_rate > 0, "frame rate must be positive");
        ensure!(self.cell_width > 0, "cell width must be positive");
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64)
    }

    /// Starting cell of a fresh snake
    pub fn center(&self) -> Position {
        Position::new((self.grid_width / 2) as i32, (self.grid_height / 2) as i32)
    }

    /// Total number of cells on the board
    pub fn cell_count(&self) -> usize {
        self.grid_width * self.grid_height
    }

    /// Terminal (columns, rows) needed to draw the board, borders excluded
    pub fn window_size(&self) -> (u16, u16) {
        let cols = (self.grid_width as u64 * self.cell_width as u64).min(u16::MAX as u64);
        let rows = (self.grid_height as u64).min(u16::MAX as u64);
        (cols as u16, rows as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 32);
        assert_eq!(config.grid_height, 24);
        assert_eq!(config.step_interval_secs, 0.15);
        assert_eq!(config.frame_interval(), Duration::from_secs_f64(1.0 / 60.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 15);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 15);
        assert_eq!(config.center(), Position::new(7, 7));
    }

    #[test]
    fn test_window_size() {
        let config = GameConfig::new(20, 10);
        assert_eq!(config.window_size(), (40, 10));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(GameConfig::new(0, 5).validate().is_err());
        assert!(GameConfig::new(5, 0).validate().is_err());
        assert!(GameConfig::small().with_step_interval(0.0).validate().is_err());
        assert!(GameConfig::small().with_step_interval(f64::NAN).validate().is_err());

        let mut config = GameConfig::small();
        config.frame_rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "grid_width": 12, "step_interval_secs": 0.1 }}"#).unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.grid_width, 12);
        assert_eq!(config.grid_height, 24);
        assert_eq!(config.step_interval_secs, 0.1);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = GameConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
