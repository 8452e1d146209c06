use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum ExamEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait ExamEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<ExamEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<ExamEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => tx.send(ExamEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => tx.send(ExamEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
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

impl ExamEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ExamEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source fed from a channel
pub struct TestEventSource {
    rx: Receiver<ExamEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<ExamEvent>) -> Self {
        Self { rx }
    }
}

impl ExamEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ExamEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Display refresh period
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub const MIN: Duration = Duration::from_millis(50);
    pub const MAX: Duration = Duration::from_millis(250);

    /// Refresh periods outside 50..=250 ms are clamped.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.clamp(Self::MIN, Self::MAX),
        }
    }

    /// Unclamped, for tests that want fast ticks.
    pub fn exact(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: ExamEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: ExamEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> ExamEvent {
        self.wait(self.ticker.interval())
    }

    /// Like `step`, but wakes no later than `deadline` so a pending
    /// auto-submit fires on time even with a slow refresh tick.
    pub fn step_until(&self, deadline: Option<Instant>) -> ExamEvent {
        let mut timeout = self.ticker.interval();
        if let Some(at) = deadline {
            timeout = timeout.min(at.saturating_duration_since(Instant::now()));
        }
        self.wait(timeout)
    }

    fn wait(&self, timeout: Duration) -> ExamEvent {
        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => ExamEvent::Tick,
        }
    }
}

/// Time source for the session controller
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
