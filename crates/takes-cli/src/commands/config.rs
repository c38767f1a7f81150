use std::path::PathBuf;

use anyhow::Result;
use takes_core::Settings;

use crate::ui;

/// Requested edits to the saved settings
pub struct ConfigChanges {
    pub storage_dir: Option<PathBuf>,
    pub editor: Option<String>,
    pub approve: Option<String>,
    pub revoke: Option<String>,
    pub verbose_default: Option<bool>,
    pub show: bool,
}

impl ConfigChanges {
    fn is_empty(&self) -> bool {
        self.storage_dir.is_none()
            && self.editor.is_none()
            && self.approve.is_none()
            && self.revoke.is_none()
            && self.verbose_default.is_none()
    }

    fn apply(self, settings: &mut Settings) {
        if let Some(dir) = self.storage_dir {
            settings.storage_dir = Some(dir);
        }
        if let Some(editor) = self.editor {
            settings.editor_command = Some(editor).filter(|e| !e.trim().is_empty());
        }
        if let Some(story) = self.approve {
            settings.set_approved(&story, true);
        }
        if let Some(story) = self.revoke {
            settings.set_approved(&story, false);
        }
        if let Some(verbose) = self.verbose_default {
            settings.verbose = verbose;
        }
    }
}

pub fn run(changes: ConfigChanges) -> Result<bool> {
    let mut settings = Settings::load();
    let show = changes.show || changes.is_empty();

    if !changes.is_empty() {
        changes.apply(&mut settings);
        settings.save()?;
        ui::success(&format!("Saved {}", Settings::path().display()));
    }

    if show {
        print(&settings);
    }
    Ok(true)
}

fn print(settings: &Settings) {
    ui::header("takes configuration");
    println!("  Settings file:  {}", Settings::path().display());
    println!("  Storage:        {}", settings.storage_root().display());
    println!(
        "  Editor:         {}",
        settings.editor().unwrap_or_else(|| "(none)".to_string())
    );
    println!("  Verbose:        {}", settings.verbose);
    if settings.approved_stories.is_empty() {
        println!("  Approved:       (none)");
    } else {
        println!("  Approved:       {}", settings.approved_stories.join(", "));
    }
}
