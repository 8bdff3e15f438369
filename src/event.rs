use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

/// Application events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Terminal was resized, redraw on next frame
  Resize,
  /// Periodic tick for query polling and save results
  Tick,
}

/// Default interval between ticks
pub const TICK_RATE: Duration = Duration::from_millis(250);

/// Reads terminal input on a blocking thread and interleaves it with ticks.
///
/// A tick is emitted whenever `tick_rate` passes without input, so views
/// keep polling their queries while the user is idle.
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // crossterm's poll/read block, keep them off the async workers
    tokio::task::spawn_blocking(move || loop {
      let event = match event::poll(tick_rate) {
        Ok(true) => match event::read() {
          Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
          Ok(CrosstermEvent::Resize(_, _)) => Event::Resize,
          Ok(_) => continue,
          Err(e) => {
            tracing::warn!(error = %e, "failed to read terminal event");
            continue;
          }
        },
        Ok(false) => Event::Tick,
        Err(e) => {
          tracing::error!(error = %e, "terminal event polling failed");
          break;
        }
      };
      if tx.send(event).is_err() {
        break;
      }
    });

    Self { rx }
  }

  /// Receive the next event, `None` once the reader has stopped
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
