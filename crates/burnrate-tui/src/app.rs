//! Application core — event loop, key handling, action dispatch.

use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tokio::sync::mpsc;
use tracing::info;

use burnrate_core::Window;

use crate::action::Action;
use crate::component::Component;
use crate::input::{Input, InputReader};
use crate::poll::PollCommand;
use crate::screens::Dashboard;
use crate::theme;
use crate::tui;

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Spinner/staleness cadence.
const TICK_INTERVAL: Duration = Duration::from_millis(200);
/// Draw cadence (20 FPS is plenty for gauges and text).
const RENDER_INTERVAL: Duration = Duration::from_millis(50);

/// Top-level application state and event loop.
pub struct App {
    dashboard: Dashboard,
    /// Currently requested usage window.
    window: Window,
    /// Whether the app should keep running.
    running: bool,
    /// Help overlay visibility.
    help_visible: bool,
    /// Whether a refresh is in flight (drives the spinner).
    refreshing: bool,
    /// Tick counter for spinner animation.
    ticks: usize,
    /// Terminal size for responsive layout.
    terminal_size: (u16, u16),
    /// Commands to the background poll task.
    poll_tx: mpsc::UnboundedSender<PollCommand>,
    /// Action sender — components can dispatch actions through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver — main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(window: Window, poll_tx: mpsc::UnboundedSender<PollCommand>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            dashboard: Dashboard::new(window),
            window,
            running: true,
            help_visible: false,
            refreshing: false,
            ticks: 0,
            terminal_size: (0, 0),
            poll_tx,
            action_tx,
            action_rx,
        }
    }

    /// Clone of the action sender, for wiring background tasks into the loop.
    pub fn action_sender(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    /// Run the main event loop. This is the heart of the TUI.
    ///
    /// Each pass: wait for input or an interval, turn it into an action,
    /// then drain the action queue so follow-up actions from components
    /// settle before the next draw.
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = tui::init()?;
        let _restore = tui::RestoreGuard;

        let size = terminal.size()?;
        self.terminal_size = (size.width, size.height);
        self.dashboard.init(self.action_tx.clone())?;

        let mut input = InputReader::spawn();
        let mut tick = tokio::time::interval(TICK_INTERVAL);
        let mut render = tokio::time::interval(RENDER_INTERVAL);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        render.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!("TUI event loop started");

        while self.running {
            tokio::select! {
                maybe_input = input.next() => {
                    let Some(next) = maybe_input else { break };
                    match next {
                        Input::Key(key) => {
                            if let Some(action) = self.handle_key_event(key)? {
                                self.action_tx.send(action)?;
                            }
                        }
                        Input::Resize(cols, rows) => {
                            self.action_tx.send(Action::Resize(cols, rows))?;
                        }
                    }
                }
                _ = tick.tick() => self.action_tx.send(Action::Tick)?,
                _ = render.tick() => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    terminal.draw(|frame| self.render(frame))?;
                }
            }
        }

        input.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// everything else is delegated to the dashboard.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            // In help mode, Esc or ? closes help
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        // Global keybindings
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            (KeyModifiers::NONE, KeyCode::Char('r')) => return Ok(Some(Action::ForceRefresh)),

            // Window selection mirrors the window names: 1d, 7d, 30d
            (KeyModifiers::NONE, KeyCode::Char('1')) => {
                return Ok(Some(Action::SetWindow(Window::Day1)));
            }
            (KeyModifiers::NONE, KeyCode::Char('7')) => {
                return Ok(Some(Action::SetWindow(Window::Day7)));
            }
            (KeyModifiers::NONE, KeyCode::Char('3')) => {
                return Ok(Some(Action::SetWindow(Window::Day30)));
            }

            _ => {}
        }

        self.dashboard.handle_key_event(key)
    }

    /// Process a single action — update app state and propagate to the
    /// dashboard component.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => {
                self.terminal_size = (*w, *h);
            }

            Action::Tick => {
                self.ticks = self.ticks.wrapping_add(1);
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::SetWindow(window) => {
                if *window != self.window {
                    self.window = *window;
                    let _ = self.poll_tx.send(PollCommand::SetWindow(*window));
                }
            }

            Action::ForceRefresh => {
                let _ = self.poll_tx.send(PollCommand::Refresh { force: true });
            }

            Action::RefreshStarted => {
                self.refreshing = true;
            }

            Action::ResultsUpdated { .. } => {
                self.refreshing = false;
                if let Some(follow_up) = self.dashboard.update(action)? {
                    self.action_tx.send(follow_up)?;
                }
            }

            // Render is handled in the main loop, not here
            Action::Render => {}

            // Propagate everything else to the dashboard
            other => {
                if let Some(follow_up) = self.dashboard.update(other)? {
                    self.action_tx.send(follow_up)?;
                }
            }
        }

        Ok(())
    }

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [header] [dashboard] [status bar]
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_header(frame, layout[0]);
        self.dashboard.render(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Render help overlay on top (if visible)
        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    /// Top bar: app name, window selector, refresh spinner.
    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(" burnrate ", theme::title_style()),
            Span::styled("│ ", theme::key_hint()),
        ];

        for window in [Window::Day1, Window::Day7, Window::Day30] {
            let style = if window == self.window {
                theme::window_active()
            } else {
                theme::window_inactive()
            };
            spans.push(Span::styled(format!(" {window} "), style));
        }

        if self.refreshing {
            let frame_char = SPINNER[self.ticks % SPINNER.len()];
            spans.push(Span::styled(
                format!("  {frame_char} refreshing"),
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// Render the bottom status bar with key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::raw(" "),
            Span::styled("1/7/3", theme::key_hint_key()),
            Span::styled(" window  ", theme::key_hint()),
            Span::styled("j/k", theme::key_hint_key()),
            Span::styled(" select  ", theme::key_hint()),
            Span::styled("Enter", theme::key_hint_key()),
            Span::styled(" raw  ", theme::key_hint()),
            Span::styled("r", theme::key_hint_key()),
            Span::styled(" refresh  ", theme::key_hint()),
            Span::styled("?", theme::key_hint_key()),
            Span::styled(" help  ", theme::key_hint()),
            Span::styled("q", theme::key_hint_key()),
            Span::styled(" quit", theme::key_hint()),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }

    /// Render the help overlay centered on screen.
    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_width = 52u16.min(area.width.saturating_sub(4));
        let help_height = 15u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        // Clear the background
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let hint = |key: &str, desc: &str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(desc.to_string(), theme::key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            hint("1 / 7 / 3", "Switch usage window (1d / 7d / 30d)"),
            hint("j/k ↑/↓", "Select provider / scroll raw view"),
            hint("Enter", "Toggle raw payload for selection"),
            hint("Esc", "Close overlay"),
            Line::from(""),
            hint("r", "Force refresh (bypass cache)"),
            hint("?", "This help"),
            hint("q", "Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "                    Esc or ? to close",
                theme::key_hint(),
            )),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }
}
