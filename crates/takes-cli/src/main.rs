mod app;
mod args;
mod commands;
mod editor;
mod host;
mod ui;

use anyhow::Result;
use clap::Parser;
use takes_core::Settings;

use args::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load();

    if cli.verbose || settings.verbose {
        takes_core::set_verbose(true);
    }

    let scope = cli.target.scope();
    let ok = match cli.command {
        Commands::List { json } => commands::list::run(&settings, &scope, json)?,
        Commands::Record => commands::record::run(&settings, &scope)?,
        Commands::Play { name } => commands::play::run(&settings, &scope, name.as_deref())?,
        Commands::Select { name } => commands::select::run(&settings, &scope, &name)?,
        Commands::Rename { name, new } => {
            commands::rename::run(&settings, &scope, &name, new.as_deref())?
        }
        Commands::Delete { name, yes } => commands::delete::run(&settings, &scope, &name, yes)?,
        Commands::Edit => commands::edit::run(&settings, &scope)?,
        Commands::Config {
            storage_dir,
            editor,
            approve,
            revoke,
            verbose_default,
            show,
        } => commands::config::run(commands::config::ConfigChanges {
            storage_dir,
            editor,
            approve,
            revoke,
            verbose_default,
            show,
        })?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
