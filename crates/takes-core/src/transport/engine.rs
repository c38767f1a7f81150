//! Capability boundary between the transport and whatever produces sound.
//!
//! An engine opens sessions; a session owns the hardware until it is
//! finished, stopped or dropped. Asynchronous completion travels back as an
//! `EngineSignal` through the `Completion` handed to `open_playback`.

use std::io::Read;

use crossbeam_channel::Sender;

use super::OpToken;
use crate::error::EngineError;

/// What the engine reports about a running operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalKind {
    /// Playback ran out of samples
    Completed,
    /// The device gave up mid-operation
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSignal {
    pub token: OpToken,
    pub kind: SignalKind,
}

/// One-shot reporter for an operation's end, tagged with its token.
///
/// Sending never blocks and never fails loudly: if the transport is gone
/// there is nobody left to tell.
#[derive(Debug, Clone)]
pub struct Completion {
    token: OpToken,
    tx: Sender<EngineSignal>,
}

impl Completion {
    pub(crate) fn new(token: OpToken, tx: Sender<EngineSignal>) -> Self {
        Self { token, tx }
    }

    pub fn token(&self) -> OpToken {
        self.token
    }

    pub fn complete(&self) {
        self.send(SignalKind::Completed);
    }

    pub fn fail(&self, reason: impl Into<String>) {
        self.send(SignalKind::Failed(reason.into()));
    }

    fn send(&self, kind: SignalKind) {
        let _ = self.tx.send(EngineSignal {
            token: self.token,
            kind,
        });
    }
}

/// An open microphone. Dropping it releases the device.
pub trait CaptureSession {
    /// Stop capturing and return the take's audio as a WAV file
    fn finish(self: Box<Self>) -> Result<Vec<u8>, EngineError>;
}

/// An open output stream. Dropping it releases the device.
pub trait PlaybackSession {
    fn stop(self: Box<Self>);
}

/// Opens capture and playback sessions on some audio backend
pub trait AudioEngine {
    fn open_capture(&mut self) -> Result<Box<dyn CaptureSession>, EngineError>;

    /// Start playing `source` (a WAV stream); `done` fires when it runs out
    fn open_playback(
        &mut self,
        source: Box<dyn Read + Send>,
        done: Completion,
    ) -> Result<Box<dyn PlaybackSession>, EngineError>;
}

/// Open a WAV stream for playback; a header without a sample rate can't be timed
pub(crate) fn open_wav<R: Read>(source: R) -> Result<hound::WavReader<R>, EngineError> {
    let reader = hound::WavReader::new(source).map_err(|e| EngineError::Decode(e.to_string()))?;
    if reader.spec().sample_rate == 0 {
        return Err(EngineError::Decode("WAV header declares a sample rate of 0".into()));
    }
    Ok(reader)
}

/// Encode mono f32 samples as a 16-bit PCM WAV file in memory
pub(crate) fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, EngineError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| EngineError::Encode(e.to_string()))?;
        for &sample in samples {
            let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(clamped)
                .map_err(|e| EngineError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| EngineError::Encode(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A well-formed 16-bit mono header whose sample rate field is 0
    pub(crate) fn zero_rate_wav() -> Vec<u8> {
        let mut bytes = Vec::with_capacity(44);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&36u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes
    }

    #[test]
    fn test_open_wav_rejects_zero_sample_rate() {
        let result = open_wav(std::io::Cursor::new(zero_rate_wav()));
        assert!(matches!(result, Err(EngineError::Decode(_))));
    }

    #[test]
    fn test_encode_wav_produces_readable_file() {
        let samples = vec![0.0f32; 1600];
        let bytes = encode_wav(&samples, 16000).unwrap();

        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.duration(), 1600);
    }

    #[test]
    fn test_completion_carries_its_token() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let done = Completion::new(OpToken(7), tx);
        done.complete();
        done.fail("unplugged");

        assert_eq!(
            rx.try_recv().unwrap(),
            EngineSignal {
                token: OpToken(7),
                kind: SignalKind::Completed
            }
        );
        assert_eq!(
            rx.try_recv().unwrap().kind,
            SignalKind::Failed("unplugged".into())
        );
    }

    #[test]
    fn test_completion_survives_closed_channel() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        Completion::new(OpToken(1), tx).complete();
    }
}
