//! Default microphone and speaker through cpal.

use std::io::Read;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Sample, SampleFormat, SizedSample, Stream, StreamConfig};

use super::engine::{
    AudioEngine, CaptureSession, Completion, PlaybackSession, encode_wav, open_wav,
};
use crate::error::EngineError;

fn device_error(e: impl std::fmt::Display) -> EngineError {
    EngineError::Device(e.to_string())
}

/// Engine backed by the host's default input and output devices
pub struct DeviceEngine {
    host: cpal::Host,
}

impl DeviceEngine {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }
}

impl Default for DeviceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine for DeviceEngine {
    fn open_capture(&mut self) -> Result<Box<dyn CaptureSession>, EngineError> {
        let device = self
            .host
            .default_input_device()
            .ok_or(EngineError::NoDevice("input"))?;
        let supported = device.default_input_config().map_err(device_error)?;

        let sample_rate = supported.sample_rate().0;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();
        crate::verbose!(
            "Input: {} Hz, {} ch, {:?}",
            sample_rate,
            config.channels,
            sample_format
        );

        let samples = Arc::new(Mutex::new(Vec::new()));
        let stream = match sample_format {
            SampleFormat::F32 => build_input::<f32>(&device, &config, samples.clone()),
            SampleFormat::I16 => build_input::<i16>(&device, &config, samples.clone()),
            SampleFormat::U16 => build_input::<u16>(&device, &config, samples.clone()),
            other => Err(EngineError::Device(format!(
                "unsupported input sample format {other:?}"
            ))),
        }?;
        stream.play().map_err(device_error)?;

        Ok(Box::new(DeviceCapture {
            stream: Some(stream),
            samples,
            sample_rate,
        }))
    }

    fn open_playback(
        &mut self,
        source: Box<dyn Read + Send>,
        done: Completion,
    ) -> Result<Box<dyn PlaybackSession>, EngineError> {
        let (samples, source_rate) = decode_mono(source)?;

        let device = self
            .host
            .default_output_device()
            .ok_or(EngineError::NoDevice("output"))?;
        let supported = device.default_output_config().map_err(device_error)?;

        let output_rate = supported.sample_rate().0;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        let cursor = PlaybackCursor {
            samples,
            position: 0.0,
            step: source_rate as f64 / output_rate.max(1) as f64,
            done: Some(done),
        };
        let stream = match sample_format {
            SampleFormat::F32 => build_output::<f32>(&device, &config, cursor),
            SampleFormat::I16 => build_output::<i16>(&device, &config, cursor),
            SampleFormat::U16 => build_output::<u16>(&device, &config, cursor),
            other => Err(EngineError::Device(format!(
                "unsupported output sample format {other:?}"
            ))),
        }?;
        stream.play().map_err(device_error)?;

        Ok(Box::new(DevicePlayback { _stream: stream }))
    }
}

fn build_input<T>(
    device: &Device,
    config: &StreamConfig,
    samples: Arc<Mutex<Vec<f32>>>,
) -> Result<Stream, EngineError>
where
    T: SizedSample,
    f32: cpal::FromSample<T>,
{
    let channels = config.channels.max(1) as usize;
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let Ok(mut buffer) = samples.lock() else {
                    return;
                };
                // Downmix to mono
                for frame in data.chunks(channels) {
                    let sum: f32 = frame.iter().map(|&s| <f32 as Sample>::from_sample(s)).sum();
                    buffer.push(sum / channels as f32);
                }
            },
            |err| crate::verbose!("Input stream error: {err}"),
            None,
        )
        .map_err(device_error)
}

struct PlaybackCursor {
    samples: Vec<f32>,
    position: f64,
    step: f64,
    done: Option<Completion>,
}

impl PlaybackCursor {
    fn next_sample(&mut self) -> Option<f32> {
        let sample = self.samples.get(self.position as usize).copied();
        self.position += self.step;
        sample
    }
}

fn build_output<T>(
    device: &Device,
    config: &StreamConfig,
    mut cursor: PlaybackCursor,
) -> Result<Stream, EngineError>
where
    T: SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let value = match cursor.next_sample() {
                        Some(sample) => sample,
                        None => {
                            // Report the end exactly once
                            if let Some(done) = cursor.done.take() {
                                done.complete();
                            }
                            0.0
                        }
                    };
                    for out in frame.iter_mut() {
                        *out = T::from_sample(value);
                    }
                }
            },
            |err| crate::verbose!("Output stream error: {err}"),
            None,
        )
        .map_err(device_error)
}

/// Read a WAV stream into mono f32 samples
fn decode_mono(source: Box<dyn Read + Send>) -> Result<(Vec<f32>, u32), EngineError> {
    let decode_error = |e: hound::Error| EngineError::Decode(e.to_string());

    let reader = open_wav(source)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(decode_error)?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(decode_error)?
        }
    };

    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}

struct DeviceCapture {
    stream: Option<Stream>,
    samples: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
}

impl CaptureSession for DeviceCapture {
    fn finish(mut self: Box<Self>) -> Result<Vec<u8>, EngineError> {
        // Close the stream before reading so no callback races the encoder
        drop(self.stream.take());
        let samples = match self.samples.lock() {
            Ok(mut buffer) => std::mem::take(&mut *buffer),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        crate::verbose!(
            "Captured {:.2}s",
            samples.len() as f32 / self.sample_rate as f32
        );
        encode_wav(&samples, self.sample_rate)
    }
}

struct DevicePlayback {
    _stream: Stream,
}

impl PlaybackSession for DevicePlayback {
    fn stop(self: Box<Self>) {}
}
