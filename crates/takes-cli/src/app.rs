use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use takes_core::{
    AudioEngine, AudioTransport, FsTakeStore, JsonSelectionRegistry, Settings, Studio,
    TransportListener, verbose,
};

/// Open the on-disk studio described by `settings`
pub fn open_studio(settings: &Settings) -> Result<Studio> {
    let root = settings.storage_root();
    let takes = FsTakeStore::open(&root)
        .with_context(|| format!("Failed to open take storage at {}", root.display()))?;
    let selection_path = settings.selection_path();
    let selection = JsonSelectionRegistry::open(&selection_path)
        .with_context(|| format!("Failed to read {}", selection_path.display()))?;

    Ok(Studio::new(takes, selection, AudioTransport::with_engine(engine())))
}

#[cfg(feature = "device")]
fn engine() -> Box<dyn AudioEngine> {
    verbose!("Using the default audio devices");
    Box::new(takes_core::DeviceEngine::new())
}

#[cfg(not(feature = "device"))]
fn engine() -> Box<dyn AudioEngine> {
    verbose!("Built without audio devices, using the simulated engine");
    Box::new(takes_core::SimulatedEngine::new(takes_core::Clock::Realtime))
}

pub fn wait_for_enter() -> Result<()> {
    std::io::stdout().flush()?;

    // Enable raw mode to read keypresses without echoing
    enable_raw_mode()?;

    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.code == KeyCode::Enter && key.kind == KeyEventKind::Press => {
                break Ok(());
            }
            Ok(_) => {}
            Err(e) => break Err(e),
        }
    };

    // Restore normal mode
    disable_raw_mode()?;
    Ok(result?)
}

/// Pump transport events until nothing is playing or recording
pub fn wait_until_idle(studio: &mut Studio, listeners: &mut [&mut dyn TransportListener]) {
    while !studio.transport.is_idle() {
        studio.pump_timeout(Duration::from_millis(200), listeners);
    }
    studio.pump(listeners);
}
