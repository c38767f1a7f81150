pub mod catalog;
pub mod config;
pub mod error;
pub mod host;
pub mod selection;
pub mod settings;
pub mod studio;
pub mod take;
pub mod toolbar;
pub mod transport;
pub mod verbose;

pub use catalog::{CatalogMode, RowView, TakeCatalogController};
pub use config::Category;
pub use error::{EngineError, Side, StorageError, StudioError, TakeError, TransportError};
pub use host::{
    ButtonState, CatalogHost, EditOutcome, ExternalEditor, MediaEvent, MediaKind, Notice,
    Notifier, Prompter, ToolbarHost, ToolbarVisibility,
};
pub use selection::{JsonSelectionRegistry, MemorySelectionRegistry, SelectionRegistry};
pub use settings::Settings;
pub use studio::{Studio, TransportListener};
pub use take::{
    ContentStore, FsTakeStore, MemoryTakeStore, Scope, Take, TakeId, TakeRepository, TakeStore,
};
pub use toolbar::{ToolbarMode, TransportToolbarController};
#[cfg(feature = "device")]
pub use transport::DeviceEngine;
pub use transport::{
    AudioEngine, AudioTransport, Clock, EndReason, Finished, OpToken, SimulatedEngine,
    SimulatedProbe, TransportState,
};
pub use verbose::set_verbose;
