use anyhow::Result;
use takes_core::{Scope, Settings, ToolbarMode, TransportToolbarController};

use crate::{app, editor::CommandEditor, host::CliHost, ui};

pub fn run(settings: &Settings, scope: &Scope) -> Result<bool> {
    let mode = super::toolbar_mode(settings, scope);
    if mode == ToolbarMode::Locked {
        return Ok(false);
    }

    let editor = CommandEditor::new(settings.editor());
    let mut studio = app::open_studio(settings)?;
    let mut toolbar = TransportToolbarController::new(scope.clone(), mode, CliHost::new())
        .with_editor(Box::new(editor));

    if !toolbar.visibility(&studio).edit.visible && toolbar.has_recording(&studio) {
        ui::info("Set an editor with: takes config --editor <command>");
    }
    toolbar.on_external_edit_pressed(&mut studio);

    Ok(!toolbar.host().failed())
}
