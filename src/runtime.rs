use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Input the TUI loop reacts to. `Tick` means no input arrived in time.
#[derive(Clone, Debug)]
pub enum SnagEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where key presses and resizes come from
pub trait SnagEventSource: Send + 'static {
    /// Waits at most `timeout` for the next event
    fn recv_timeout(&self, timeout: Duration) -> Result<SnagEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<SnagEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                // Windows reports releases too; only presses are aim triggers
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => SnagEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => SnagEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SnagEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SnagEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for headless runs; the test holds the sender
pub struct TestEventSource {
    rx: Receiver<SnagEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<SnagEvent>) -> Self {
        Self { rx }
    }
}

impl SnagEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SnagEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pulls input events with a redraw deadline and owns the monotonic clock
/// the session core is driven by. `now()` is measured from construction.
pub struct Runner<E: SnagEventSource> {
    event_source: E,
    tick_rate: Duration,
    epoch: Instant,
}

impl<E: SnagEventSource> Runner<E> {
    pub fn new(event_source: E, tick_rate: Duration) -> Self {
        Self {
            event_source,
            tick_rate,
            epoch: Instant::now(),
        }
    }

    /// Next input event, or `Tick` once `tick_rate` passes without one
    pub fn step(&self) -> SnagEvent {
        match self.event_source.recv_timeout(self.tick_rate) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => SnagEvent::Tick,
        }
    }

    /// Time since the runner was created
    pub fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}
