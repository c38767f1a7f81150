use anyhow::Result;
use takes_core::{CatalogMode, Scope, Settings, TakeCatalogController};

use crate::{app, host::CliHost};

pub fn run(settings: &Settings, scope: &Scope, name: &str, new: Option<&str>) -> Result<bool> {
    let mut studio = app::open_studio(settings)?;
    let mut catalog =
        TakeCatalogController::new(scope.clone(), CatalogMode::for_scope(scope), CliHost::new());
    catalog.refresh(&mut studio);

    match new {
        Some(new) => catalog.on_row_rename_requested(&mut studio, name, new),
        None => catalog.on_row_rename_clicked(&mut studio, name),
    }

    Ok(!catalog.host().failed())
}
