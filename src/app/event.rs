//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a background task that
//! forwards them over a channel so the main loop stays non-blocking.  The
//! same task paces the animation by emitting a `Frame` at a fixed interval.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Time to advance the engine and redraw.
    Frame,
}

/// Spawns a background task that polls the terminal for events and sends them
/// through the returned channel, interleaved with a `Frame` every
/// `frame_interval`.
pub fn spawn_event_reader(frame_interval: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut next_frame = Instant::now() + frame_interval;
        loop {
            // Wait for input only until the next frame is due.
            let timeout = next_frame.saturating_duration_since(Instant::now());
            let has_event = event::poll(timeout).unwrap_or(false);
            if has_event {
                if let Ok(ev) = event::read() {
                    let app_event = match ev {
                        CtEvent::Key(k) => Some(AppEvent::Key(k)),
                        CtEvent::Mouse(m) => Some(AppEvent::Mouse(m)),
                        CtEvent::Resize(w, h) => Some(AppEvent::Resize(w, h)),
                        _ => None,
                    };
                    if let Some(app_event) = app_event {
                        if tx.send(app_event).is_err() {
                            break; // receiver dropped
                        }
                    }
                }
            }

            let now = Instant::now();
            if now >= next_frame {
                if tx.send(AppEvent::Frame).is_err() {
                    break;
                }
                // Skip frames we already missed rather than bursting.
                while next_frame <= now {
                    next_frame += frame_interval;
                }
            }
        }
    });

    rx
}
