use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Redraw / animation cadence. The game clock counts whole seconds on top.
pub const TICK_RATE_MS: u64 = 100;

#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where the event loop gets keys and resizes from
pub trait GameEventSource: Send + 'static {
    /// Wait up to `timeout`; `None` when nothing arrived.
    fn next_event(&self, timeout: Duration) -> Option<GameEvent>;
}

/// Only key presses move words; releases and repeats reported by some
/// terminals are dropped, as are mouse and focus events.
pub fn translate(event: CtEvent) -> Option<GameEvent> {
    match event {
        CtEvent::Key(key) if key.kind == KeyEventKind::Press => Some(GameEvent::Key(key)),
        CtEvent::Resize(_, _) => Some(GameEvent::Resize),
        _ => None,
    }
}

/// Events fed through a channel, by the terminal reader thread or by a test
pub struct ChannelSource {
    rx: Receiver<GameEvent>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }

    /// Read the real terminal on a background thread.
    pub fn crossterm() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let event = match event::read() {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!(error = %e, "terminal event reader stopped");
                    break;
                }
            };
            if let Some(event) = translate(event) {
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl GameEventSource for ChannelSource {
    fn next_event(&self, timeout: Duration) -> Option<GameEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            // a closed channel idles like a quiet terminal
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(timeout);
                None
            }
        }
    }
}

/// One turn of the event loop
#[derive(Clone, Debug)]
pub struct Step {
    pub event: GameEvent,
    /// Wall time since the previous step
    pub elapsed: Duration,
}

/// Turns an event source into a steady stream of steps, with a `Tick`
/// whenever nothing happens for one tick length.
pub struct Runner<E: GameEventSource> {
    source: E,
    tick: Duration,
    last: Instant,
}

impl<E: GameEventSource> Runner<E> {
    pub fn new(source: E, tick: Duration) -> Self {
        Self {
            source,
            tick,
            last: Instant::now(),
        }
    }

    pub fn with_default_tick(source: E) -> Self {
        Self::new(source, Duration::from_millis(TICK_RATE_MS))
    }

    pub fn tick_ms(&self) -> u64 {
        self.tick.as_millis() as u64
    }

    pub fn step(&mut self) -> Step {
        let event = self.source.next_event(self.tick).unwrap_or(GameEvent::Tick);
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        Step { event, elapsed }
    }
}
