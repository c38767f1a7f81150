//! External audio editor launched as a child process on a scratch copy.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use takes_core::{EditOutcome, ExternalEditor, StudioError, TakeId, verbose};

/// Runs `<command> [args...] <file.wav>` and reads the file back when it exits
pub struct CommandEditor {
    command: Option<String>,
    scratch_dir: PathBuf,
}

impl CommandEditor {
    pub fn new(command: Option<String>) -> Self {
        let scratch_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("takes")
            .join("edit");
        Self {
            command,
            scratch_dir,
        }
    }

    fn scratch_path(&self, take: &TakeId) -> PathBuf {
        let stem: String = take
            .name
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        self.scratch_dir
            .join(format!("{}-{}.wav", stem, std::process::id()))
    }

    fn run(&self, command: &str, take: &TakeId, content: &[u8]) -> Result<Vec<u8>, String> {
        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or("empty editor command")?;

        fs::create_dir_all(&self.scratch_dir).map_err(|e| e.to_string())?;
        let path = self.scratch_path(take);
        fs::write(&path, content).map_err(|e| e.to_string())?;

        verbose!("Launching {program} on {}", path.display());
        let status = Command::new(program)
            .args(parts)
            .arg(&path)
            .status()
            .map_err(|e| format!("could not start {program}: {e}"));

        let result = match status {
            Ok(status) if status.success() => fs::read(&path).map_err(|e| e.to_string()),
            Ok(status) => Err(format!("{program} exited with {status}")),
            Err(e) => Err(e),
        };
        let _ = fs::remove_file(&path);
        result
    }
}

impl ExternalEditor for CommandEditor {
    fn is_available(&self) -> bool {
        self.command
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    fn edit(&mut self, take: &TakeId, content: &[u8]) -> Result<EditOutcome, StudioError> {
        let Some(command) = self.command.clone().filter(|c| !c.trim().is_empty()) else {
            return Err(StudioError::EditorUnavailable);
        };

        let edited = self
            .run(&command, take, content)
            .map_err(StudioError::EditorFailed)?;

        if edited == content {
            Ok(EditOutcome::Cancelled)
        } else {
            Ok(EditOutcome::Replaced(edited))
        }
    }
}
