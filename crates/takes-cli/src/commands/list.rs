use anyhow::Result;
use serde::Serialize;
use takes_core::{CatalogMode, Scope, Settings, TakeCatalogController};

use crate::{app, host::CliHost, ui};

#[derive(Serialize)]
struct RowJson<'a> {
    name: &'a str,
    selected: bool,
}

pub fn run(settings: &Settings, scope: &Scope, json: bool) -> Result<bool> {
    let mut studio = app::open_studio(settings)?;
    let mut catalog =
        TakeCatalogController::new(scope.clone(), CatalogMode::for_scope(scope), CliHost::new());
    catalog.refresh(&mut studio);
    let rows = catalog.rows(&studio);

    if json {
        let rows: Vec<_> = rows
            .iter()
            .map(|r| RowJson {
                name: &r.name,
                selected: r.selected,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        ui::header(&format!(
            "{} takes for {} slide {}",
            scope.category.display_name(),
            scope.story,
            scope.slide
        ));
        if rows.is_empty() {
            ui::info("No takes yet. Record one with: takes record");
        }
        for row in &rows {
            ui::row(&row.name, row.selected, row.playing);
        }
    }

    Ok(!catalog.host().failed())
}
