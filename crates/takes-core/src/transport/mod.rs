//! The one shared audio slot.
//!
//! ```text
//!             start_recording            stop / pre-empt / release
//!   Idle ─────────────────────────▶ Recording ─────────────────────▶ Idle
//!     │                                                              ▲
//!     │       start_playback(take)      stop / pre-empt / release    │
//!     └───────────────────────────▶ Playing ─────────────────────────┘
//!                                       │     completion / failure   ▲
//!                                       └────────────────────────────┘
//! ```
//!
//! `AudioTransport` holds at most one engine session. Starting anything ends
//! the current session first (the old handle is dropped before the engine is
//! asked for a new one), so the hardware is never acquired twice.
//!
//! Every start issues a fresh `OpToken`. Every end produces a `Finished`
//! record: `stop` hands it back to the caller, every other end (pre-emption,
//! completion, failure, `release`) queues it for `poll`. Engine signals for a
//! token that is no longer active are dropped.

mod engine;
#[cfg(feature = "device")]
mod device;
mod simulated;

use std::collections::VecDeque;
use std::fmt;
use std::io::Read;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::error::{Side, TransportError};
use crate::take::TakeId;

pub use engine::{
    AudioEngine, CaptureSession, Completion, EngineSignal, PlaybackSession, SignalKind,
};
#[cfg(feature = "device")]
pub use device::DeviceEngine;
pub use simulated::{Clock, SimulatedEngine, SimulatedProbe};

pub(crate) use engine::encode_wav;

/// Identifies one started operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpToken(pub(crate) u64);

impl fmt::Display for OpToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// What an operation was doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Recording,
    Playing(TakeId),
}

/// Snapshot of the slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Recording { token: OpToken },
    Playing { token: OpToken, take: TakeId },
}

impl TransportState {
    pub fn is_idle(&self) -> bool {
        matches!(self, TransportState::Idle)
    }

    pub fn token(&self) -> Option<OpToken> {
        match self {
            TransportState::Idle => None,
            TransportState::Recording { token } | TransportState::Playing { token, .. } => {
                Some(*token)
            }
        }
    }
}

/// Why an operation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// Its owner asked
    Stopped,
    /// Playback reached the end
    Completed,
    /// Another start took the slot
    Preempted,
    /// The surface went away (`release` or drop)
    Released,
    /// The engine reported an error
    Failed(String),
}

/// Record of one ended operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    pub token: OpToken,
    pub activity: Activity,
    pub reason: EndReason,
    /// WAV bytes captured by a recording, when there are any
    pub capture: Option<Vec<u8>>,
}

impl Finished {
    pub fn is_recording(&self) -> bool {
        matches!(self.activity, Activity::Recording)
    }

    pub fn take(&self) -> Option<&TakeId> {
        match &self.activity {
            Activity::Playing(take) => Some(take),
            Activity::Recording => None,
        }
    }
}

enum Session {
    Capture(Box<dyn CaptureSession>),
    Playback(Box<dyn PlaybackSession>),
}

struct Active {
    token: OpToken,
    activity: Activity,
    session: Session,
}

impl Active {
    /// Release the session and describe how the operation ended
    fn close(self, reason: EndReason) -> Finished {
        let Active {
            token,
            activity,
            session,
        } = self;

        let (capture, reason) = match session {
            Session::Capture(capture) => match capture.finish() {
                Ok(bytes) => (Some(bytes), reason),
                Err(e) => {
                    crate::verbose!("Capture {token} could not be finalized: {e}");
                    (None, EndReason::Failed(e.to_string()))
                }
            },
            Session::Playback(playback) => {
                playback.stop();
                (None, reason)
            }
        };

        crate::verbose!("{token} ended: {reason:?}");
        Finished {
            token,
            activity,
            reason,
            capture,
        }
    }
}

/// Owner of the audio hardware
pub struct AudioTransport {
    engine: Box<dyn AudioEngine>,
    active: Option<Active>,
    next_token: u64,
    signal_tx: Sender<EngineSignal>,
    signal_rx: Receiver<EngineSignal>,
    ended: VecDeque<Finished>,
}

impl AudioTransport {
    pub fn new(engine: impl AudioEngine + 'static) -> Self {
        Self::with_engine(Box::new(engine))
    }

    pub fn with_engine(engine: Box<dyn AudioEngine>) -> Self {
        let (signal_tx, signal_rx) = crossbeam_channel::unbounded();
        Self {
            engine,
            active: None,
            next_token: 1,
            signal_tx,
            signal_rx,
            ended: VecDeque::new(),
        }
    }

    pub fn state(&self) -> TransportState {
        match &self.active {
            None => TransportState::Idle,
            Some(Active {
                token,
                activity: Activity::Recording,
                ..
            }) => TransportState::Recording { token: *token },
            Some(Active {
                token,
                activity: Activity::Playing(take),
                ..
            }) => TransportState::Playing {
                token: *token,
                take: take.clone(),
            },
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Whether `token` still owns the slot
    pub fn is_active(&self, token: OpToken) -> bool {
        self.active.as_ref().is_some_and(|a| a.token == token)
    }

    /// Begin capturing from the microphone, ending whatever was running
    pub fn start_recording(&mut self) -> Result<OpToken, TransportError> {
        self.preempt();
        let token = self.issue_token();

        let capture = self
            .engine
            .open_capture()
            .map_err(|e| TransportError::unavailable(Side::Recording, e))?;

        crate::verbose!("{token} recording");
        self.active = Some(Active {
            token,
            activity: Activity::Recording,
            session: Session::Capture(capture),
        });
        Ok(token)
    }

    /// Begin playing `source` as `take`, ending whatever was running
    pub fn start_playback(
        &mut self,
        take: TakeId,
        source: Box<dyn Read + Send>,
    ) -> Result<OpToken, TransportError> {
        self.preempt();
        let token = self.issue_token();

        let done = Completion::new(token, self.signal_tx.clone());
        let playback = self
            .engine
            .open_playback(source, done)
            .map_err(|e| TransportError::unavailable(Side::Playback, e))?;

        crate::verbose!("{token} playing {take}");
        self.active = Some(Active {
            token,
            activity: Activity::Playing(take),
            session: Session::Playback(playback),
        });
        Ok(token)
    }

    /// End the operation `token` if it still owns the slot.
    ///
    /// Returns `None` when the operation already ended some other way; its
    /// `Finished` record is then waiting in (or was taken from) `poll`.
    pub fn stop(&mut self, token: OpToken) -> Option<Finished> {
        if !self.is_active(token) {
            crate::verbose!("stop({token}) ignored: not active");
            return None;
        }
        self.active.take().map(|a| a.close(EndReason::Stopped))
    }

    /// Drop the hardware immediately (surface paused or destroyed)
    pub fn release(&mut self) {
        if let Some(active) = self.active.take() {
            crate::verbose!("Releasing audio hardware held by {}", active.token);
            let finished = active.close(EndReason::Released);
            self.ended.push_back(finished);
        }
    }

    /// Next ended operation that nobody was handed yet, without waiting
    pub fn poll(&mut self) -> Option<Finished> {
        if let Some(finished) = self.ended.pop_front() {
            return Some(finished);
        }
        while let Ok(signal) = self.signal_rx.try_recv() {
            if let Some(finished) = self.on_signal(signal) {
                return Some(finished);
            }
        }
        None
    }

    /// Like `poll`, but wait up to `timeout` for the engine to report
    pub fn poll_timeout(&mut self, timeout: Duration) -> Option<Finished> {
        if let Some(finished) = self.poll() {
            return Some(finished);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.signal_rx.recv_timeout(remaining) {
                Ok(signal) => {
                    if let Some(finished) = self.on_signal(signal) {
                        return Some(finished);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    fn on_signal(&mut self, signal: EngineSignal) -> Option<Finished> {
        if !self.is_active(signal.token) {
            crate::verbose!("Ignoring stale signal for {}", signal.token);
            return None;
        }

        let reason = match signal.kind {
            SignalKind::Completed => EndReason::Completed,
            SignalKind::Failed(reason) => EndReason::Failed(reason),
        };
        self.active.take().map(|a| a.close(reason))
    }

    fn preempt(&mut self) {
        if let Some(active) = self.active.take() {
            crate::verbose!("{} pre-empted", active.token);
            let finished = active.close(EndReason::Preempted);
            self.ended.push_back(finished);
        }
    }

    fn issue_token(&mut self) -> OpToken {
        let token = OpToken(self.next_token);
        self.next_token += 1;
        token
    }
}

impl Drop for AudioTransport {
    fn drop(&mut self) {
        self.release();
    }
}
