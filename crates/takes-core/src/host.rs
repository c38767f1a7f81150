//! What the controllers need from the surface that hosts them.
//!
//! Each controller is generic over a small host trait instead of knowing
//! which kind of screen it lives in. The CLI implements these with terminal
//! prompts; tests implement them with recorders.

use std::fmt;
use std::time::SystemTime;

use crate::config::Category;
use crate::error::StudioError;
use crate::take::{Scope, Take, TakeId};

/// User-facing message, fire-and-forget
#[derive(Debug)]
pub enum Notice {
    Problem(StudioError),
    Renamed { from: String, to: String },
    Deleted { name: String },
    Playing { name: String },
    Recorded { name: String },
    Edited { name: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Problem(err) => write!(f, "{err}"),
            Notice::Renamed { from, to } => write!(f, "Renamed \"{from}\" to \"{to}\""),
            Notice::Deleted { name } => write!(f, "Deleted \"{name}\""),
            Notice::Playing { name } => write!(f, "Playing \"{name}\""),
            Notice::Recorded { name } => write!(f, "Saved recording as \"{name}\""),
            Notice::Edited { name } => write!(f, "Updated \"{name}\" from the editor"),
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

pub trait Prompter {
    /// Ask a yes/no question
    fn confirm(&mut self, title: &str, message: &str) -> bool;

    /// Ask for a line of text; `None` when the user cancels
    fn prompt_text(&mut self, title: &str, initial: &str) -> Option<String>;
}

/// Host of a `TakeCatalogController`
pub trait CatalogHost: Notifier + Prompter {
    /// A row's play affordance changed
    fn row_playback_changed(&mut self, name: &str, playing: bool);

    /// The chosen take of `scope` changed (dependent displays should refresh)
    fn selection_changed(&mut self, scope: &Scope, selected: Option<&str>);

    /// The last take of `scope` was deleted
    fn catalog_emptied(&mut self, scope: &Scope);
}

/// Visible and enabled flags of one button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub visible: bool,
    pub enabled: bool,
}

impl ButtonState {
    pub const HIDDEN: ButtonState = ButtonState {
        visible: false,
        enabled: false,
    };
    pub const SHOWN: ButtonState = ButtonState {
        visible: true,
        enabled: true,
    };

    fn shown_if(condition: bool) -> Self {
        if condition { Self::SHOWN } else { Self::HIDDEN }
    }
}

/// Derived state of the transport toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolbarVisibility {
    pub record: ButtonState,
    pub play: ButtonState,
    pub edit: ButtonState,
}

impl ToolbarVisibility {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub(crate) fn unlocked(has_recording: bool, editor_available: bool) -> Self {
        Self {
            record: ButtonState::SHOWN,
            play: ButtonState::shown_if(has_recording),
            edit: ButtonState::shown_if(has_recording && editor_available),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Recording,
    Playback,
}

/// Telemetry for a successful record or play start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEvent {
    pub scope: Scope,
    pub kind: MediaKind,
    pub at: SystemTime,
}

impl MediaEvent {
    pub fn new(scope: Scope, kind: MediaKind) -> Self {
        Self {
            scope,
            kind,
            at: SystemTime::now(),
        }
    }

    /// Category-keyed description, e.g. "Draft Playback" or "Comment Recording"
    pub fn label(&self) -> String {
        let subject = match self.scope.category {
            Category::CommunityCheck => "Comment",
            other => other.display_name(),
        };
        let action = match self.kind {
            MediaKind::Recording => "Recording",
            MediaKind::Playback => "Playback",
        };
        format!("{subject} {action}")
    }
}

/// Host of a `TransportToolbarController`
pub trait ToolbarHost: Notifier {
    fn visibility_changed(&mut self, visibility: ToolbarVisibility);

    fn recording_changed(&mut self, recording: bool);

    fn playback_changed(&mut self, playing: bool);

    /// A recording was stored as a new take
    fn take_committed(&mut self, _take: &Take) {}

    fn log_media_event(&mut self, event: MediaEvent);
}

/// Result of handing a take to an external editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// New audio that replaces the take's content
    Replaced(Vec<u8>),
    Cancelled,
}

/// Optional out-of-process audio editor
pub trait ExternalEditor {
    fn is_available(&self) -> bool;

    fn edit(&mut self, take: &TakeId, content: &[u8]) -> Result<EditOutcome, StudioError>;
}
