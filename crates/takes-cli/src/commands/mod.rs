pub mod config;
pub mod delete;
pub mod edit;
pub mod list;
pub mod play;
pub mod record;
pub mod rename;
pub mod select;

use takes_core::{Scope, Settings, ToolbarMode};

use crate::ui;

/// Toolbar mode for `scope`, explaining how to unlock when it is locked
pub(crate) fn toolbar_mode(settings: &Settings, scope: &Scope) -> ToolbarMode {
    let mode = ToolbarMode::from_approval(settings.is_approved(&scope.story));
    if mode == ToolbarMode::Locked {
        ui::error(&format!(
            "Story \"{}\" is not approved for recording yet",
            scope.story
        ));
        ui::info(&format!("Approve it with: takes config --approve {}", scope.story));
    }
    mode
}
