//! Raw-mode terminal setup and teardown.
//!
//! Free functions rather than a wrapper type: the dashboard needs exactly
//! one terminal for its whole lifetime, so `init` hands back the ratatui
//! [`Terminal`] directly and [`RestoreGuard`] puts the shell back together
//! on any exit path, panics included.

use std::io::{Stdout, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

pub type Term = Terminal<CrosstermBackend<Stdout>>;

/// Enter raw mode and the alternate screen, returning a cleared terminal.
pub fn init() -> Result<Term> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, cursor::Hide)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    Ok(terminal)
}

/// Undo everything `init` did. Safe to call more than once; failures are
/// ignored because there is nothing left to do with a broken terminal.
pub fn restore() {
    let _ = execute!(stdout(), cursor::Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Restores the terminal when dropped, so `?` exits from the event loop
/// leave a usable shell.
pub struct RestoreGuard;

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        restore();
    }
}

/// Install color-eyre panic and error hooks that restore the terminal
/// before any report is printed. Call before `init`, so panics during
/// startup also come out readable.
pub fn install_panic_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        panic_hook(info);
    }));

    Ok(())
}
