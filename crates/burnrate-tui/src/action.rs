//! Actions — the message type flowing through the application loop.

use burnrate_core::{ProviderResult, Window};

/// Every state change in the TUI is expressed as an action.
#[derive(Debug, Clone)]
pub enum Action {
    /// Exit the application.
    Quit,
    /// Periodic tick (spinner animation, staleness display).
    Tick,
    /// Draw a frame.
    Render,
    /// Terminal resized to (cols, rows).
    Resize(u16, u16),

    /// Switch the active usage window and refresh.
    SetWindow(Window),
    /// Force a refresh, bypassing cached results.
    ForceRefresh,
    /// The poll task started fetching.
    RefreshStarted,
    /// The poll task finished a refresh cycle.
    ResultsUpdated {
        window: Window,
        results: Vec<ProviderResult>,
    },

    /// Move the provider selection down.
    SelectNext,
    /// Move the provider selection up.
    SelectPrev,
    /// Show or hide the raw payload overlay for the selected provider.
    ToggleRaw,
    /// Scroll the raw payload overlay.
    ScrollRaw(i16),
    /// Show or hide the help overlay.
    ToggleHelp,
}
