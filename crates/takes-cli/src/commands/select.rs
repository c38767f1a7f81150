use anyhow::Result;
use takes_core::{CatalogMode, Scope, Settings, TakeCatalogController};

use crate::{app, host::CliHost, ui};

pub fn run(settings: &Settings, scope: &Scope, name: &str) -> Result<bool> {
    let mode = CatalogMode::for_scope(scope);
    if mode == CatalogMode::Browse {
        ui::error(&format!(
            "{} takes are not chosen individually",
            scope.category.display_name()
        ));
        return Ok(false);
    }

    let mut studio = app::open_studio(settings)?;
    let mut catalog = TakeCatalogController::new(scope.clone(), mode, CliHost::new());
    catalog.refresh(&mut studio);
    catalog.on_row_picked(&mut studio, name);

    Ok(!catalog.host().failed())
}
