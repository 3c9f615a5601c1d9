//! Terminal input pump.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event};
use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, spawn_blocking};
use tokio::time::timeout;

use crate::app::App;

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 256;
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug)]
enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads crossterm events on a blocking thread and queues them for the
/// frame loop.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let reader = {
            let stop = Arc::clone(&stop);
            spawn_blocking(move || read_loop(&stop, &tx))
        };
        Self {
            rx,
            stop,
            reader: Some(reader),
        }
    }

    /// Stop the reader thread and wait briefly for it to exit.
    pub async fn shutdown(&mut self) {
        self.stop_reader();
        if let Some(reader) = self.reader.take()
            && timeout(SHUTDOWN_GRACE, reader).await.is_err()
        {
            tracing::debug!("Input reader still polling after shutdown");
        }
    }

    // Closing the receiver unblocks a reader stuck on a full channel.
    fn stop_reader(&mut self) {
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        self.stop_reader();
    }
}

fn next_event() -> io::Result<Option<Event>> {
    if event::poll(INPUT_POLL_TIMEOUT)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

fn read_loop(stop: &AtomicBool, tx: &mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        let msg = match next_event() {
            Ok(None) => continue,
            Ok(Some(ev)) => InputMsg::Event(ev),
            Err(e) => InputMsg::Error(e.to_string()),
        };
        let failed = matches!(msg, InputMsg::Error(_));
        if tx.blocking_send(msg).is_err() || failed {
            return;
        }
    }
}

/// Drain queued input into the app. Returns `true` when the app should quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    for _ in 0..MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        if app.handle_event(ev) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use splash_config::SplashSettings;
    use tokio::sync::mpsc;

    use super::{INPUT_CHANNEL_CAPACITY, InputMsg, InputPump, handle_events};
    use crate::app::{App, Screen};

    fn pump() -> (InputPump, mpsc::Sender<InputMsg>) {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let pump = InputPump {
            rx,
            stop: Arc::new(AtomicBool::new(false)),
            reader: None,
        };
        (pump, tx)
    }

    fn key(code: KeyCode) -> InputMsg {
        InputMsg::Event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn app() -> App {
        App::new(&SplashSettings {
            duration: Duration::from_millis(2500),
            fetch: None,
        })
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn queued_keys_reach_the_app_in_order() {
        let mut app = app();
        app.start();
        let (mut input, tx) = pump();
        tx.try_send(key(KeyCode::Enter)).unwrap();
        tx.try_send(key(KeyCode::Char('q'))).unwrap();

        assert!(handle_events(&mut app, &mut input).unwrap());
        assert_eq!(app.screen(), Screen::Main);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_queue_is_not_a_quit() {
        let mut app = app();
        app.start();
        let (mut input, _tx) = pump();
        assert!(!handle_events(&mut app, &mut input).unwrap());
        assert_eq!(app.screen(), Screen::Splash);
    }

    #[tokio::test(start_paused = true)]
    async fn reader_failure_surfaces_as_error() {
        let mut app = app();
        let (mut input, tx) = pump();
        tx.try_send(InputMsg::Error("tty closed".to_string())).unwrap();
        let err = handle_events(&mut app, &mut input).unwrap_err();
        assert!(err.to_string().contains("tty closed"));
    }

    #[tokio::test]
    async fn shutdown_without_reader_returns() {
        let (mut input, tx) = pump();
        input.shutdown().await;
        assert!(tx.is_closed());
    }
}
