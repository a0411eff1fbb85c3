use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use rand::Rng;
use std::collections::HashSet;

use crate::game::{GameConfig, GameState, Position};
use crate::metrics::GameMetrics;

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;
const OVERLAY_WIDTH: u16 = 40;
const OVERLAY_HEIGHT: u16 = 9;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Terminal size needed to show the whole board with header and footer
    pub fn required_size(config: &GameConfig) -> (u16, u16) {
        let (cols, rows) = config.window_size();
        (
            cols.saturating_add(2),
            rows.saturating_add(2 + HEADER_HEIGHT + FOOTER_HEIGHT),
        )
    }

    pub fn fits(area: Rect, config: &GameConfig) -> bool {
        let (width, height) = Self::required_size(config);
        area.width >= width && area.height >= height
    }

    pub fn render<R: Rng>(
        &self,
        frame: &mut Frame,
        state: &GameState<R>,
        metrics: &GameMetrics,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, metrics), chunks[0]);

        let (cols, rows) = state.config().window_size();
        let board_area = centered(chunks[1], cols.saturating_add(2), rows.saturating_add(2));
        frame.render_widget(self.render_grid(state), board_area);

        if state.is_game_over() {
            let overlay_area = centered(chunks[1], OVERLAY_WIDTH, OVERLAY_HEIGHT);
            frame.render_widget(Clear, overlay_area);
            frame.render_widget(self.render_game_over(state), overlay_area);
        }

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn render_grid<R: Rng>(&self, state: &GameState<R>) -> Paragraph<'static> {
        let config = state.config();
        let width = config.cell_width as usize;
        let head = state.head();
        let body: HashSet<Position> = state.snake().iter().copied().collect();

        let mut lines = Vec::with_capacity(config.grid_height);
        for y in 0..config.grid_height {
            let mut spans = Vec::with_capacity(config.grid_width);

            for x in 0..config.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    Span::styled(
                        cell_text('■', width),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if body.contains(&pos) {
                    Span::styled(cell_text('□', width), Style::default().fg(Color::Green))
                } else if state.food() == Some(pos) {
                    Span::styled(
                        cell_text('O', width),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(cell_text('.', width), Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Snake "),
        )
    }

    fn render_stats<R: Rng>(
        &self,
        state: &GameState<R>,
        metrics: &GameMetrics,
    ) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![
            Line::from(vec![
                Span::styled("Score: ", label),
                Span::styled(state.score().to_string(), value.add_modifier(Modifier::BOLD)),
                Span::raw("    "),
                Span::styled("Best: ", label),
                Span::styled(metrics.high_score.max(state.score()).to_string(), value),
                Span::raw("    "),
                Span::styled("Length: ", label),
                Span::styled(state.snake().len().to_string(), value),
                Span::raw("    "),
                Span::styled("Time: ", label),
                Span::styled(metrics.format_time(), value),
            ]),
            Line::from(vec![
                Span::styled("Games: ", label),
                Span::styled(metrics.games_played.to_string(), value),
                Span::raw("    "),
                Span::styled("Boards cleared: ", label),
                Span::styled(metrics.boards_cleared.to_string(), value),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_game_over<R: Rng>(&self, state: &GameState<R>) -> Paragraph<'static> {
        let (title, colour) = if state.is_won() {
            ("YOU WIN", Color::Green)
        } else {
            ("GAME OVER", Color::Red)
        };

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                title,
                Style::default().fg(colour).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score().to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "ENTER",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colour)),
        )
    }

    fn render_controls(&self) -> Paragraph<'static> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A glyph padded with spaces to `width` columns
fn cell_text(glyph: char, width: usize) -> String {
    let mut text = String::with_capacity(width + 2);
    text.push(glyph);
    text.extend(std::iter::repeat_n(' ', width.saturating_sub(1)));
    text
}

/// A `width` x `height` rect centered in `area`, shrunk to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
