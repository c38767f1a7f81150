//! Error taxonomy shared by the stores, the transport and the controllers.
//!
//! Every kind here is recoverable: controllers report it through the
//! `Notifier` collaborator and leave catalog, selection and transport state
//! as they were before the failed operation.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::take::name::MAX_NAME_LEN;

/// Failure to read or write durable state (catalog index, selection map, content)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("stored data is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Catalog-level failures (create / rename / delete / content access)
#[derive(Debug, Error)]
pub enum TakeError {
    #[error("A take named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("Names must be {max} characters or fewer", max = MAX_NAME_LEN)]
    TooLong,

    #[error("Names may only use letters, digits, spaces and - _ ' ( )")]
    InvalidCharacters,

    #[error("Take \"{0}\" was not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<io::Error> for TakeError {
    fn from(err: io::Error) -> Self {
        TakeError::Storage(StorageError::Io(err))
    }
}

impl From<serde_json::Error> for TakeError {
    fn from(err: serde_json::Error) -> Self {
        TakeError::Storage(StorageError::Format(err))
    }
}

/// Which half of the audio hardware an operation needed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Recording,
    Playback,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Recording => write!(f, "Microphone"),
            Side::Playback => write!(f, "Audio output"),
        }
    }
}

/// Failures reported by an `AudioEngine` implementation
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no {0} device available")]
    NoDevice(&'static str),

    #[error("audio device error: {0}")]
    Device(String),

    #[error("could not decode audio: {0}")]
    Decode(String),

    #[error("could not encode audio: {0}")]
    Encode(String),
}

/// The transport could not acquire the hardware for a new operation
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{side} unavailable: {reason}")]
    Unavailable { side: Side, reason: String },
}

impl TransportError {
    pub(crate) fn unavailable(side: Side, err: EngineError) -> Self {
        TransportError::Unavailable {
            side,
            reason: err.to_string(),
        }
    }

    pub fn side(&self) -> Side {
        match self {
            TransportError::Unavailable { side, .. } => *side,
        }
    }
}

/// Everything a controller may surface to the user
#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Take(#[from] TakeError),

    #[error("No audio found for \"{0}\"")]
    PlaybackSourceMissing(String),

    #[error("No recording available yet")]
    NoRecordingAvailable,

    #[error(transparent)]
    TransportUnavailable(#[from] TransportError),

    #[error("No external audio editor is configured")]
    EditorUnavailable,

    #[error("External editor failed: {0}")]
    EditorFailed(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
