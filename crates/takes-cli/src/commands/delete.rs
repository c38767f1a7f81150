use anyhow::Result;
use takes_core::{CatalogMode, Scope, Settings, TakeCatalogController};

use crate::{app, host::CliHost};

pub fn run(settings: &Settings, scope: &Scope, name: &str, yes: bool) -> Result<bool> {
    let mut studio = app::open_studio(settings)?;
    let host = CliHost::new().assume_yes(yes);
    let mut catalog = TakeCatalogController::new(scope.clone(), CatalogMode::for_scope(scope), host);
    catalog.refresh(&mut studio);
    catalog.on_row_delete_requested(&mut studio, name);

    Ok(!catalog.host().failed())
}
