//! Terminal implementation of the controller hosts.

use takes_core::{
    CatalogHost, MediaEvent, Notice, Notifier, Prompter, Scope, Take, ToolbarHost,
    ToolbarVisibility, verbose,
};

use crate::ui;

#[derive(Default)]
pub struct CliHost {
    /// Answer yes to every confirmation
    assume_yes: bool,
    failed: bool,
}

impl CliHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    /// Whether any operation reported a problem
    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl Notifier for CliHost {
    fn notify(&mut self, notice: Notice) {
        match &notice {
            Notice::Problem(_) => {
                self.failed = true;
                ui::error(&notice.to_string());
            }
            Notice::Playing { .. } => ui::info(&notice.to_string()),
            _ => ui::success(&notice.to_string()),
        }
    }
}

impl Prompter for CliHost {
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        ui::header(title);
        ui::confirm(message, false).unwrap_or_else(|e| {
            verbose!("Confirmation aborted: {e}");
            false
        })
    }

    fn prompt_text(&mut self, title: &str, initial: &str) -> Option<String> {
        ui::input(title, initial)
            .map_err(|e| verbose!("Input aborted: {e}"))
            .ok()
            .filter(|text| text != initial)
    }
}

impl CatalogHost for CliHost {
    fn row_playback_changed(&mut self, name: &str, playing: bool) {
        verbose!("Row '{name}' playing: {playing}");
    }

    fn selection_changed(&mut self, scope: &Scope, selected: Option<&str>) {
        match selected {
            Some(name) => ui::info(&format!("\"{name}\" is now the chosen take for {scope}")),
            None => ui::info(&format!("No take chosen for {scope}")),
        }
    }

    fn catalog_emptied(&mut self, scope: &Scope) {
        ui::info(&format!("No takes left for {scope}"));
    }
}

impl ToolbarHost for CliHost {
    fn visibility_changed(&mut self, visibility: ToolbarVisibility) {
        verbose!(
            "Toolbar: record={} play={} edit={}",
            visibility.record.visible,
            visibility.play.visible,
            visibility.edit.visible
        );
    }

    fn recording_changed(&mut self, recording: bool) {
        if recording {
            ui::info("Recording... press Enter to stop");
        }
    }

    fn playback_changed(&mut self, playing: bool) {
        verbose!("Toolbar playback: {playing}");
    }

    fn take_committed(&mut self, take: &Take) {
        verbose!("Committed {} (#{})", take.id, take.seq);
    }

    fn log_media_event(&mut self, event: MediaEvent) {
        verbose!("{} in {}", event.label(), event.scope);
    }
}
