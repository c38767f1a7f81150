//! Persistent user settings.
//!
//! Stored as JSON at `<config dir>/takes/settings.json`. Loading never fails:
//! a missing or unreadable file yields defaults. A few values can be
//! overridden from the environment:
//!
//! - `TAKES_STORAGE_DIR` - where takes are stored
//! - `TAKES_EDITOR` - external audio editor command

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "takes";
const SETTINGS_FILE: &str = "settings.json";
const SELECTION_FILE: &str = "selection.json";

pub const STORAGE_DIR_ENV: &str = "TAKES_STORAGE_DIR";
pub const EDITOR_ENV: &str = "TAKES_EDITOR";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Root directory for takes (None = platform data dir)
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// Command that opens a WAV file for editing, e.g. "audacity"
    #[serde(default)]
    pub editor_command: Option<String>,

    /// Print diagnostics to stderr
    #[serde(default)]
    pub verbose: bool,

    /// Stories whose slides may be recorded
    #[serde(default)]
    pub approved_stories: Vec<String>,
}

impl Settings {
    /// Path of the settings file
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(SETTINGS_FILE)
    }

    /// Load settings from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                crate::verbose!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                crate::verbose!("Ignoring unreadable settings at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Where takes live: environment, then settings, then the platform data dir
    pub fn storage_root(&self) -> PathBuf {
        if let Some(dir) = std::env::var_os(STORAGE_DIR_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        self.storage_dir.clone().unwrap_or_else(default_storage_root)
    }

    /// File backing the selection registry
    pub fn selection_path(&self) -> PathBuf {
        self.storage_root().join(SELECTION_FILE)
    }

    /// External editor command: environment first, then settings
    pub fn editor(&self) -> Option<String> {
        std::env::var(EDITOR_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.editor_command.clone())
    }

    pub fn is_approved(&self, story: &str) -> bool {
        self.approved_stories.iter().any(|s| s == story)
    }

    /// Add or remove `story` from the approved list
    pub fn set_approved(&mut self, story: &str, approved: bool) {
        self.approved_stories.retain(|s| s != story);
        if approved {
            self.approved_stories.push(story.to_string());
        }
    }
}

fn default_storage_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
