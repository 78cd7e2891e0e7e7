//! Keyboard and resize input, lifted off the crossterm event stream.
//!
//! Only key presses and resizes reach the app; key releases, repeats, and
//! every other terminal event are dropped here. Timing (render cadence,
//! spinner ticks) is not an input concern and lives in the app loop.

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Terminal input the dashboard reacts to.
#[derive(Debug)]
pub enum Input {
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Forwards terminal input from a background task over a channel.
pub struct InputReader {
    rx: mpsc::UnboundedReceiver<Input>,
    cancel: CancellationToken,
}

impl InputReader {
    /// Spawn the reader task.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let reader_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut stream = EventStream::new();
            loop {
                let event = tokio::select! {
                    () = reader_cancel.cancelled() => break,
                    event = stream.next() => event,
                };

                let input = match event {
                    Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        Input::Key(key)
                    }
                    Some(Ok(CrosstermEvent::Resize(cols, rows))) => Input::Resize(cols, rows),
                    Some(Ok(_) | Err(_)) => continue,
                    // Stream ended: the terminal is gone.
                    None => break,
                };

                if tx.send(input).is_err() {
                    break;
                }
            }
        });

        Self { rx, cancel }
    }

    /// Next input, or `None` once the reader has shut down.
    pub async fn next(&mut self) -> Option<Input> {
        self.rx.recv().await
    }

    /// Ask the reader task to stop.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for InputReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
