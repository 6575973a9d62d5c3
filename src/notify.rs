use std::io::{self, Write};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Audible feedback emitted by a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal
{
    Correct,
    Incorrect,
    Miss,
    Victory,
    GameOverGood,
    GameOverBad,
}

impl Signal
{
    /// Tone as (frequency in Hz, duration).
    pub fn tone(self) -> (u32, Duration)
    {
        match self {
            Signal::Correct => (880, Duration::from_millis(150)),
            Signal::Incorrect | Signal::Miss => (220, Duration::from_millis(200)),
            Signal::Victory => (784, Duration::from_millis(3000)),
            Signal::GameOverGood => (523, Duration::from_millis(3000)),
            Signal::GameOverBad => (196, Duration::from_millis(1000)),
        }
    }
}

/// One-way sink for signals. Implementations must return immediately.
pub trait Notifier
{
    fn notify(&mut self, signal: Signal);
}

/// Plays signals on a background thread. Playback is the terminal bell; the
/// tone itself only shows up in the log.
pub struct BellNotifier
{
    sender: Option<Sender<Signal>>,
}

impl BellNotifier
{
    pub fn spawn() -> Self
    {
        let (sender, receiver) = mpsc::channel::<Signal>();
        let spawned = thread::Builder::new()
            .name("bell".to_string())
            .spawn(move || {
                for signal in receiver {
                    let (frequency, duration) = signal.tone();
                    debug!("Signal {signal:?}: {frequency} Hz for {} ms", duration.as_millis());
                    let mut stderr = io::stderr();
                    let _ = stderr.write_all(b"\x07");
                    let _ = stderr.flush();
                }
            });

        match spawned {
            Ok(_) => Self {
                sender: Some(sender),
            },
            Err(err) => {
                warn!("Failed to start bell thread, sound disabled: {err}");
                Self { sender: None }
            }
        }
    }
}

impl Notifier for BellNotifier
{
    fn notify(&mut self, signal: Signal)
    {
        if let Some(sender) = &self.sender {
            let _ = sender.send(signal);
        }
    }
}
