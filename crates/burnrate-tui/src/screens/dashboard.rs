//! Dashboard — one card per provider with a usage gauge and key metrics.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
};

use burnrate_core::{ProviderResult, Window};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::fmt;

const CARD_HEIGHT: u16 = 7;

/// The single screen of the TUI: provider usage cards plus a raw payload
/// overlay for the selected provider.
pub struct Dashboard {
    results: Vec<ProviderResult>,
    window: Window,
    selected: usize,
    raw_visible: bool,
    raw_scroll: u16,
}

impl Dashboard {
    pub fn new(window: Window) -> Self {
        Self {
            results: Vec::new(),
            window,
            selected: 0,
            raw_visible: false,
            raw_scroll: 0,
        }
    }

    fn selected_result(&self) -> Option<&ProviderResult> {
        self.results.get(self.selected)
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, index: usize, result: &ProviderResult) {
        let border = if index == self.selected {
            theme::border_focused()
        } else {
            theme::border_default()
        };

        let title = format!(
            " {} ({}) ",
            result.provider.display_name(),
            result.window
        );
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(message) = &result.error {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(format!("  {message}"), theme::error_style())),
                Line::from(vec![
                    Span::styled("  Updated ", theme::label_style()),
                    Span::styled(
                        format!("{} ago", fmt::fmt_age(result.updated_at)),
                        theme::value_style(),
                    ),
                ]),
            ];
            frame.render_widget(Paragraph::new(lines), inner);
            return;
        }

        let rows = Layout::vertical([
            Constraint::Length(1), // gauge
            Constraint::Length(1), // cost / tokens / requests
            Constraint::Length(1), // resets / updated
            Constraint::Min(0),
        ])
        .split(inner);

        let metrics = &result.metrics;
        if let Some(percent) = metrics.usage_percent() {
            let ratio = (percent / 100.0).clamp(0.0, 1.0);
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(theme::usage_color(percent)))
                .ratio(ratio)
                .label(format!("{percent:.1}%"));
            frame.render_widget(gauge, rows[0]);
        } else {
            frame.render_widget(
                Paragraph::new(Span::styled(" no quota data", theme::label_style())),
                rows[0],
            );
        }

        let usage_line = Line::from(vec![
            Span::styled(" Cost ", theme::label_style()),
            Span::styled(fmt::fmt_cost(metrics.cost), theme::value_style()),
            Span::styled("  Tokens ", theme::label_style()),
            Span::styled(fmt::fmt_tokens(metrics.total_tokens()), theme::value_style()),
            Span::styled("  Requests ", theme::label_style()),
            Span::styled(fmt::fmt_requests(metrics.requests), theme::value_style()),
        ]);
        frame.render_widget(Paragraph::new(usage_line), rows[1]);

        let meta_line = Line::from(vec![
            Span::styled(" Resets ", theme::label_style()),
            Span::styled(fmt::fmt_reset(metrics.reset_at), theme::value_style()),
            Span::styled("  Updated ", theme::label_style()),
            Span::styled(
                format!("{} ago", fmt::fmt_age(result.updated_at)),
                theme::value_style(),
            ),
        ]);
        frame.render_widget(Paragraph::new(meta_line), rows[2]);
    }

    /// Centered overlay showing the raw vendor payload of the selected card.
    fn render_raw_overlay(&self, frame: &mut Frame, area: Rect) {
        let Some(result) = self.selected_result() else {
            return;
        };

        let width = area.width.saturating_sub(8).min(100);
        let height = area.height.saturating_sub(4);
        let x = (area.width.saturating_sub(width)) / 2;
        let y = (area.height.saturating_sub(height)) / 2;
        let overlay = Rect::new(area.x + x, area.y + y, width, height);

        // Clear the background
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            overlay,
        );

        let block = Block::default()
            .title(format!(" {} — raw payload ", result.provider))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let body = serde_json::to_string_pretty(&result.raw)
            .unwrap_or_else(|_| "<unrenderable payload>".into());
        let lines: Vec<Line> = body
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), theme::value_style())))
            .collect();

        let paragraph = Paragraph::new(lines).scroll((self.raw_scroll, 0));
        frame.render_widget(paragraph, inner);
    }
}

impl Component for Dashboard {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.raw_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Enter => Some(Action::ToggleRaw),
                KeyCode::Char('j') | KeyCode::Down => Some(Action::ScrollRaw(1)),
                KeyCode::Char('k') | KeyCode::Up => Some(Action::ScrollRaw(-1)),
                _ => None,
            });
        }

        Ok(match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrev),
            KeyCode::Enter => Some(Action::ToggleRaw),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ResultsUpdated { window, results } => {
                self.window = *window;
                self.results = results.clone();
                if self.selected >= self.results.len() {
                    self.selected = self.results.len().saturating_sub(1);
                }
            }
            Action::SelectNext => {
                if !self.results.is_empty() {
                    self.selected = (self.selected + 1) % self.results.len();
                }
            }
            Action::SelectPrev => {
                if !self.results.is_empty() {
                    self.selected = (self.selected + self.results.len() - 1) % self.results.len();
                }
            }
            Action::ToggleRaw => {
                if self.selected_result().is_some() {
                    self.raw_visible = !self.raw_visible;
                    self.raw_scroll = 0;
                }
            }
            Action::ScrollRaw(delta) => {
                self.raw_scroll = self.raw_scroll.saturating_add_signed(*delta);
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if self.results.is_empty() {
            let placeholder = Paragraph::new(Line::from(Span::styled(
                "  Fetching usage data...",
                theme::label_style(),
            )));
            frame.render_widget(placeholder, area);
            return;
        }

        let mut constraints: Vec<Constraint> = self
            .results
            .iter()
            .map(|_| Constraint::Length(CARD_HEIGHT))
            .collect();
        constraints.push(Constraint::Min(0));
        let rows = Layout::vertical(constraints).split(area);

        for (i, result) in self.results.iter().enumerate() {
            self.render_card(frame, rows[i], i, result);
        }

        if self.raw_visible {
            self.render_raw_overlay(frame, area);
        }
    }
}
