use anyhow::Result;
use takes_core::{Scope, Settings, ToolbarMode, TransportToolbarController};

use crate::{app, host::CliHost};

pub fn run(settings: &Settings, scope: &Scope) -> Result<bool> {
    let mode = super::toolbar_mode(settings, scope);
    if mode == ToolbarMode::Locked {
        return Ok(false);
    }

    let mut studio = app::open_studio(settings)?;
    let mut toolbar = TransportToolbarController::new(scope.clone(), mode, CliHost::new());

    toolbar.on_record_pressed(&mut studio);
    if !toolbar.is_recording(&studio) {
        return Ok(false);
    }

    let waited = app::wait_for_enter();
    match waited {
        Ok(()) => toolbar.on_record_pressed(&mut studio),
        // Terminal trouble: still keep what was captured
        Err(_) => toolbar.on_surface_paused(&mut studio),
    }
    studio.pump(&mut [&mut toolbar]);
    waited?;

    Ok(!toolbar.host().failed())
}
