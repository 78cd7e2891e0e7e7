//! SilkCircuit Neon palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Border for the selected provider card.
pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

/// Border for an unselected provider card.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Normal value text.
pub fn value_style() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Label text ("Cost", "Tokens", ...).
pub fn label_style() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Error message text inside a card.
pub fn error_style() -> Style {
    Style::default().fg(ERROR_RED)
}

/// Active window selector ("7d" while Day7 is shown).
pub fn window_active() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

/// Inactive window selector.
pub fn window_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Gauge color by usage pressure: green below 70%, yellow to 90%, red above.
pub fn usage_color(percent: f64) -> Color {
    if percent >= 90.0 {
        ERROR_RED
    } else if percent >= 70.0 {
        ELECTRIC_YELLOW
    } else {
        SUCCESS_GREEN
    }
}
