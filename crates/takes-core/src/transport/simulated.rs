//! An engine without hardware.
//!
//! Capture yields silence for as long as the session was open; playback
//! parses the WAV header to learn the duration. With `Clock::Realtime` a
//! helper thread reports completion once that duration has passed; with
//! `Clock::Manual` nothing completes until a `SimulatedProbe` says so.
//!
//! The probe also counts open sessions, which makes "never two at once"
//! directly observable.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use super::engine::{
    AudioEngine, CaptureSession, Completion, PlaybackSession, encode_wav, open_wav,
};
use super::OpToken;
use crate::error::EngineError;

const SAMPLE_RATE: u32 = 16000;
const TICK: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Completions fire only through the probe
    #[default]
    Manual,
    /// Playback completes after its real duration
    Realtime,
}

#[derive(Debug, Default)]
struct ProbeState {
    open: usize,
    max_concurrent: usize,
    opened: usize,
    fail_capture: bool,
    fail_playback: bool,
    completions: Vec<Completion>,
}

/// Shared view into a `SimulatedEngine`
#[derive(Debug, Clone, Default)]
pub struct SimulatedProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl SimulatedProbe {
    fn lock(&self) -> MutexGuard<'_, ProbeState> {
        // A panicking test thread must not hide the counters from the others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sessions currently holding the device
    pub fn open_handles(&self) -> usize {
        self.lock().open
    }

    /// Highest number of simultaneously open sessions ever seen
    pub fn max_concurrent(&self) -> usize {
        self.lock().max_concurrent
    }

    /// Sessions opened so far
    pub fn opened(&self) -> usize {
        self.lock().opened
    }

    pub fn fail_capture(&self, fail: bool) {
        self.lock().fail_capture = fail;
    }

    pub fn fail_playback(&self, fail: bool) {
        self.lock().fail_playback = fail;
    }

    /// Report completion for `token`; false if no playback was opened with it
    pub fn complete(&self, token: OpToken) -> bool {
        let state = self.lock();
        match state.completions.iter().find(|c| c.token() == token) {
            Some(done) => {
                done.complete();
                true
            }
            None => false,
        }
    }

    /// Report completion for the most recently opened playback
    pub fn complete_latest(&self) -> bool {
        let state = self.lock();
        match state.completions.last() {
            Some(done) => {
                done.complete();
                true
            }
            None => false,
        }
    }

    /// Report an engine failure for `token`
    pub fn fail(&self, token: OpToken, reason: &str) -> bool {
        let state = self.lock();
        match state.completions.iter().find(|c| c.token() == token) {
            Some(done) => {
                done.fail(reason);
                true
            }
            None => false,
        }
    }

    /// Tokens of every playback opened so far, oldest first
    pub fn playback_tokens(&self) -> Vec<OpToken> {
        self.lock().completions.iter().map(Completion::token).collect()
    }

    fn acquire(&self) {
        let mut state = self.lock();
        state.open += 1;
        state.opened += 1;
        state.max_concurrent = state.max_concurrent.max(state.open);
    }

    fn release(&self) {
        let mut state = self.lock();
        state.open = state.open.saturating_sub(1);
    }
}

/// Engine for tests, demos and hosts without audio hardware
#[derive(Debug, Default)]
pub struct SimulatedEngine {
    clock: Clock,
    probe: SimulatedProbe,
}

impl SimulatedEngine {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            probe: SimulatedProbe::default(),
        }
    }

    pub fn probe(&self) -> SimulatedProbe {
        self.probe.clone()
    }
}

impl AudioEngine for SimulatedEngine {
    fn open_capture(&mut self) -> Result<Box<dyn CaptureSession>, EngineError> {
        if self.probe.lock().fail_capture {
            return Err(EngineError::NoDevice("input"));
        }

        self.probe.acquire();
        Ok(Box::new(SimulatedCapture {
            started: Instant::now(),
            probe: self.probe.clone(),
        }))
    }

    fn open_playback(
        &mut self,
        source: Box<dyn Read + Send>,
        done: Completion,
    ) -> Result<Box<dyn PlaybackSession>, EngineError> {
        if self.probe.lock().fail_playback {
            return Err(EngineError::NoDevice("output"));
        }

        let reader = open_wav(source)?;
        let spec = reader.spec();
        let duration = Duration::from_secs_f64(reader.duration() as f64 / spec.sample_rate as f64);

        self.probe.acquire();
        let cancelled = Arc::new(AtomicBool::new(false));

        match self.clock {
            Clock::Manual => self.probe.lock().completions.push(done),
            Clock::Realtime => {
                let cancelled = cancelled.clone();
                thread::spawn(move || {
                    let deadline = Instant::now() + duration;
                    while Instant::now() < deadline {
                        if cancelled.load(Ordering::SeqCst) {
                            return;
                        }
                        thread::sleep(TICK);
                    }
                    if !cancelled.load(Ordering::SeqCst) {
                        done.complete();
                    }
                });
            }
        }

        Ok(Box::new(SimulatedPlayback {
            probe: self.probe.clone(),
            cancelled,
        }))
    }
}

struct SimulatedCapture {
    started: Instant,
    probe: SimulatedProbe,
}

impl CaptureSession for SimulatedCapture {
    fn finish(self: Box<Self>) -> Result<Vec<u8>, EngineError> {
        let elapsed = self.started.elapsed().as_secs_f64();
        let samples = (elapsed * SAMPLE_RATE as f64) as usize;
        encode_wav(&vec![0.0; samples], SAMPLE_RATE)
    }
}

impl Drop for SimulatedCapture {
    fn drop(&mut self) {
        self.probe.release();
    }
}

struct SimulatedPlayback {
    probe: SimulatedProbe,
    cancelled: Arc<AtomicBool>,
}

impl PlaybackSession for SimulatedPlayback {
    fn stop(self: Box<Self>) {}
}

impl Drop for SimulatedPlayback {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.probe.release();
    }
}
