//! Grid Snake - a terminal Snake game on a wraparound grid
//!
//! This library provides:
//! - Core fixed-timestep game logic (game module)
//! - Keyboard input mapping (input module)
//! - TUI rendering (render module)
//! - Session statistics (metrics module)
//! - The interactive terminal loop (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
