use anyhow::Result;
use takes_core::{
    CatalogMode, Scope, Settings, TakeCatalogController, ToolbarMode, TransportToolbarController,
};

use crate::{app, host::CliHost};

pub fn run(settings: &Settings, scope: &Scope, name: Option<&str>) -> Result<bool> {
    let mut studio = app::open_studio(settings)?;

    match name {
        Some(name) => {
            let mut catalog = TakeCatalogController::new(
                scope.clone(),
                CatalogMode::for_scope(scope),
                CliHost::new(),
            );
            catalog.refresh(&mut studio);
            catalog.on_row_play_toggled(&mut studio, name);
            app::wait_until_idle(&mut studio, &mut [&mut catalog]);
            Ok(!catalog.host().failed())
        }
        None => {
            let mode = super::toolbar_mode(settings, scope);
            if mode == ToolbarMode::Locked {
                return Ok(false);
            }
            let mut toolbar = TransportToolbarController::new(scope.clone(), mode, CliHost::new());
            toolbar.on_play_pressed(&mut studio);
            app::wait_until_idle(&mut studio, &mut [&mut toolbar]);
            Ok(!toolbar.host().failed())
        }
    }
}
