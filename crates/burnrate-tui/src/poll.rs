//! Poll task — owns the [`Monitor`] and feeds results into the action loop.
//!
//! Runs as a background task: refreshes on an interval and on demand,
//! forwarding every result batch as an [`Action`] through the TUI's action
//! channel. The UI thread never touches the cache or the network directly.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use burnrate_core::{Monitor, Window};

use crate::action::Action;

/// Requests the UI sends to the poll task.
#[derive(Debug, Clone, Copy)]
pub enum PollCommand {
    /// Refresh the current window. `force` bypasses cached results.
    Refresh { force: bool },
    /// Switch the active window and refresh it.
    SetWindow(Window),
}

/// Spawn the background poll task.
///
/// The first interval tick fires immediately, so the dashboard gets an
/// initial result batch without an explicit kick.
pub fn spawn_poll_task(
    mut monitor: Monitor,
    initial_window: Window,
    poll_interval: Duration,
    action_tx: mpsc::UnboundedSender<Action>,
    mut command_rx: mpsc::UnboundedReceiver<PollCommand>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut window = initial_window;
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                Some(command) = command_rx.recv() => match command {
                    PollCommand::Refresh { force } => {
                        refresh(&mut monitor, window, force, &action_tx).await;
                    }
                    PollCommand::SetWindow(w) => {
                        window = w;
                        refresh(&mut monitor, window, false, &action_tx).await;
                    }
                },

                _ = interval.tick() => {
                    refresh(&mut monitor, window, false, &action_tx).await;
                }
            }
        }

        debug!("poll task shut down");
    })
}

async fn refresh(
    monitor: &mut Monitor,
    window: Window,
    force: bool,
    action_tx: &mpsc::UnboundedSender<Action>,
) {
    let _ = action_tx.send(Action::RefreshStarted);
    if force {
        monitor.invalidate(None, Some(window));
    }
    let results = monitor.refresh(window).await;
    debug!(window = %window, count = results.len(), force, "refresh complete");
    let _ = action_tx.send(Action::ResultsUpdated { window, results });
}
