use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use takes_core::{Category, Scope};

#[derive(Parser)]
#[command(name = "takes")]
#[command(version)]
#[command(about = "Record, name and replay audio takes for each slide of a story")]
pub struct Cli {
    #[command(flatten)]
    pub target: Target,

    /// Print diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which slide and phase a command works on
#[derive(Args)]
pub struct Target {
    /// Story identifier
    #[arg(long, global = true, default_value = "default")]
    pub story: String,

    /// Slide number within the story
    #[arg(long, global = true, default_value_t = 1)]
    pub slide: usize,

    /// Phase category (draft, community-check, dramatization, back-translation)
    #[arg(long, short, global = true, default_value = "draft")]
    pub category: Category,
}

impl Target {
    pub fn scope(&self) -> Scope {
        Scope::new(self.story.clone(), self.slide, self.category)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the takes of a slide
    List {
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a new take (press Enter to stop)
    Record,

    /// Play a take; without NAME plays the chosen take
    Play {
        name: Option<String>,
    },

    /// Make NAME the chosen take of the slide
    Select {
        name: String,
    },

    /// Rename a take (prompts when NEW is omitted)
    Rename {
        name: String,
        new: Option<String>,
    },

    /// Delete a take
    Delete {
        name: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Open the chosen take in the external editor
    Edit,

    /// Configure storage, editor and approvals
    Config {
        /// Directory takes are stored in
        #[arg(long)]
        storage_dir: Option<PathBuf>,

        /// Editor command, e.g. "audacity" (empty to clear)
        #[arg(long)]
        editor: Option<String>,

        /// Allow recording for a story
        #[arg(long, value_name = "STORY")]
        approve: Option<String>,

        /// Lock a story again
        #[arg(long, value_name = "STORY")]
        revoke: Option<String>,

        /// Turn verbose output on or off by default
        #[arg(long, value_name = "BOOL")]
        verbose_default: Option<bool>,

        /// Print the current configuration
        #[arg(long)]
        show: bool,
    },
}
