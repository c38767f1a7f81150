//! One category's list of takes for one slide.
//!
//! The controller keeps the list it last read, plus the token of the row it
//! is playing. Whether a row is playing is always checked against the
//! transport, so a row pre-empted by another controller reads as stopped even
//! before the `Finished` event is pumped.

use crate::error::{Side, StudioError, TakeError, TransportError};
use crate::host::{CatalogHost, Notice};
use crate::selection::SelectionRegistry;
use crate::studio::{Studio, TransportListener};
use crate::take::{ContentStore, Scope, Take, TakeRepository};
use crate::transport::{EndReason, Finished, OpToken};

/// How rows react to being picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMode {
    /// One take is "the" take; picking a row selects it
    Selectable,
    /// Plain list; nothing is highlighted and rows can't be picked
    Browse,
}

impl CatalogMode {
    /// Mode a category's take list uses
    pub fn for_scope(scope: &Scope) -> Self {
        if scope.category.is_selectable() {
            CatalogMode::Selectable
        } else {
            CatalogMode::Browse
        }
    }
}

/// What a row shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub name: String,
    pub selected: bool,
    pub playing: bool,
}

pub struct TakeCatalogController<H: CatalogHost> {
    scope: Scope,
    mode: CatalogMode,
    host: H,
    takes: Vec<Take>,
    playing: Option<(String, OpToken)>,
}

impl<H: CatalogHost> TakeCatalogController<H> {
    pub fn new(scope: Scope, mode: CatalogMode, host: H) -> Self {
        Self {
            scope,
            mode,
            host,
            takes: Vec::new(),
            playing: None,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn mode(&self) -> CatalogMode {
        self.mode
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Takes as of the last rebuild, oldest first
    pub fn takes(&self) -> &[Take] {
        &self.takes
    }

    /// Name of the row this controller is playing right now
    pub fn playing(&self, studio: &Studio) -> Option<&str> {
        self.playing
            .as_ref()
            .filter(|(_, token)| studio.transport.is_active(*token))
            .map(|(name, _)| name.as_str())
    }

    /// Rebuild the list; every row starts out not playing
    pub fn refresh(&mut self, studio: &mut Studio) {
        self.stop_playback(studio);
        match studio.takes.list(&self.scope) {
            Ok(takes) => self.takes = takes,
            Err(e) => self.report(e),
        }
    }

    pub fn rows(&self, studio: &Studio) -> Vec<RowView> {
        let selected = match self.mode {
            CatalogMode::Selectable => studio.selection.get(&self.scope),
            CatalogMode::Browse => None,
        };
        let playing = self.playing(studio);

        self.takes
            .iter()
            .map(|take| RowView {
                name: take.name().to_string(),
                selected: selected.as_deref() == Some(take.name()),
                playing: playing == Some(take.name()),
            })
            .collect()
    }

    pub fn on_row_picked(&mut self, studio: &mut Studio, name: &str) {
        if self.mode == CatalogMode::Browse {
            crate::verbose!("Ignoring pick of '{name}' in a browse list");
            return;
        }
        // Another controller may have deleted it since our last rebuild
        if !studio.takes.exists(&self.scope.take(name)) {
            self.report(TakeError::NotFound(name.to_string()));
            self.refresh(studio);
            return;
        }

        if let Err(e) = studio.selection.set(&self.scope, Some(name)) {
            self.report(e);
            return;
        }
        self.host.selection_changed(&self.scope, Some(name));
    }

    pub fn on_row_play_toggled(&mut self, studio: &mut Studio, name: &str) {
        if self.playing(studio) == Some(name) {
            self.stop_playback(studio);
            return;
        }

        // The old row goes quiet before the new one lights up
        self.stop_playback(studio);

        let take = self.scope.take(name);
        if !studio.takes.exists(&take) {
            self.report(StudioError::PlaybackSourceMissing(name.to_string()));
            return;
        }
        let source = match studio.takes.open(&take) {
            Ok(source) => source,
            Err(e) => {
                crate::verbose!("Could not open {take}: {e}");
                self.report(StudioError::PlaybackSourceMissing(name.to_string()));
                return;
            }
        };

        match studio.transport.start_playback(take, source) {
            Ok(token) => {
                self.playing = Some((name.to_string(), token));
                self.host.row_playback_changed(name, true);
                self.host.notify(Notice::Playing {
                    name: name.to_string(),
                });
            }
            Err(e) => self.report(e),
        }
    }

    pub fn on_row_delete_requested(&mut self, studio: &mut Studio, name: &str) {
        let (title, message) = self.scope.category.delete_prompt();
        if !self.host.confirm(title, message) {
            return;
        }

        let take = self.scope.take(name);
        let was_selected = studio.selection.get(&self.scope).as_deref() == Some(name);

        if self.playing(studio) == Some(name) {
            self.stop_playback(studio);
        }
        if let Err(e) = studio.takes.delete(&take) {
            self.report(e);
            return;
        }
        self.refresh(studio);
        self.host.notify(Notice::Deleted {
            name: name.to_string(),
        });

        if self.takes.is_empty() {
            if let Err(e) = studio.selection.set(&self.scope, None) {
                self.report(e);
            }
            self.host.selection_changed(&self.scope, None);
            self.host.catalog_emptied(&self.scope);
        } else if was_selected {
            // Most recently created survivor, whatever order the list shows
            let fallback = self
                .takes
                .iter()
                .max_by_key(|t| t.seq)
                .map(|t| t.name().to_string());
            if let Err(e) = studio.selection.set(&self.scope, fallback.as_deref()) {
                self.report(e);
                return;
            }
            self.host.selection_changed(&self.scope, fallback.as_deref());
        }
    }

    /// Ask the host for a new name, then rename
    pub fn on_row_rename_clicked(&mut self, studio: &mut Studio, name: &str) {
        let Some(new_name) = self.host.prompt_text("Rename take", name) else {
            return;
        };
        self.on_row_rename_requested(studio, name, &new_name);
    }

    pub fn on_row_rename_requested(&mut self, studio: &mut Studio, name: &str, new_name: &str) {
        let take = self.scope.take(name);
        let renamed = match studio.takes.rename(&take, new_name) {
            Ok(renamed) => renamed,
            Err(e) => {
                self.report(e);
                return;
            }
        };

        if studio.selection.get(&self.scope).as_deref() == Some(name) {
            match studio.selection.set(&self.scope, Some(renamed.name())) {
                Ok(()) => self
                    .host
                    .selection_changed(&self.scope, Some(renamed.name())),
                Err(e) => self.report(e),
            }
        }

        self.refresh(studio);
        self.host.notify(Notice::Renamed {
            from: name.to_string(),
            to: renamed.name().to_string(),
        });
    }

    /// The list's surface went away; stop the row it was playing
    pub fn on_surface_paused(&mut self, studio: &mut Studio) {
        self.stop_playback(studio);
    }

    fn stop_playback(&mut self, studio: &mut Studio) {
        if let Some((name, token)) = self.playing.take() {
            studio.transport.stop(token);
            self.host.row_playback_changed(&name, false);
        }
    }

    fn report(&mut self, err: impl Into<StudioError>) {
        let err = err.into();
        crate::verbose!("{}: {err}", self.scope);
        self.host.notify(Notice::Problem(err));
    }
}

impl<H: CatalogHost> TransportListener for TakeCatalogController<H> {
    fn on_transport_event(&mut self, _studio: &mut Studio, finished: &Finished) {
        let Some((name, token)) = &self.playing else {
            return;
        };
        if *token != finished.token {
            return;
        }

        let name = name.clone();
        self.playing = None;
        self.host.row_playback_changed(&name, false);

        if let EndReason::Failed(reason) = &finished.reason {
            self.report(TransportError::Unavailable {
                side: Side::Playback,
                reason: reason.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Category;
    use crate::host::{Notifier, Prompter};
    use crate::transport::{Clock, SimulatedEngine, SimulatedProbe, encode_wav};

    #[derive(Default)]
    struct TestHost {
        answer: bool,
        reply: Option<String>,
        notices: Vec<String>,
        row_events: Vec<(String, bool)>,
        selections: Vec<Option<String>>,
        emptied: usize,
    }

    impl Notifier for TestHost {
        fn notify(&mut self, notice: Notice) {
            self.notices.push(notice.to_string());
        }
    }

    impl Prompter for TestHost {
        fn confirm(&mut self, _title: &str, _message: &str) -> bool {
            self.answer
        }

        fn prompt_text(&mut self, _title: &str, _initial: &str) -> Option<String> {
            self.reply.clone()
        }
    }

    impl CatalogHost for TestHost {
        fn row_playback_changed(&mut self, name: &str, playing: bool) {
            self.row_events.push((name.to_string(), playing));
        }

        fn selection_changed(&mut self, _scope: &Scope, selected: Option<&str>) {
            self.selections.push(selected.map(str::to_string));
        }

        fn catalog_emptied(&mut self, _scope: &Scope) {
            self.emptied += 1;
        }
    }

    fn scope() -> Scope {
        Scope::new("lost-sheep", 1, Category::Draft)
    }

    fn setup(names: &[&str]) -> (Studio, SimulatedProbe, TakeCatalogController<TestHost>) {
        let engine = SimulatedEngine::new(Clock::Manual);
        let probe = engine.probe();
        let mut studio = Studio::in_memory(engine);
        let audio = encode_wav(&[0.0; 160], 16000).unwrap();
        for name in names {
            studio.takes.commit(&scope().take(*name), &audio).unwrap();
        }
        let host = TestHost {
            answer: true,
            ..Default::default()
        };
        let mut catalog = TakeCatalogController::new(scope(), CatalogMode::Selectable, host);
        catalog.refresh(&mut studio);
        (studio, probe, catalog)
    }

    #[test]
    fn test_pick_selects_row() {
        let (mut studio, _, mut catalog) = setup(&["v1", "v2"]);
        catalog.on_row_picked(&mut studio, "v2");

        let rows = catalog.rows(&studio);
        assert!(!rows[0].selected);
        assert!(rows[1].selected);
        assert_eq!(catalog.host().selections, [Some("v2".to_string())]);
    }

    #[test]
    fn test_browse_mode_ignores_picks() {
        let (mut studio, _, _) = setup(&["v1"]);
        let mut catalog =
            TakeCatalogController::new(scope(), CatalogMode::Browse, TestHost::default());
        catalog.refresh(&mut studio);
        catalog.on_row_picked(&mut studio, "v1");
        assert_eq!(studio.selection.get(&scope()), None);
        assert!(catalog.rows(&studio).iter().all(|r| !r.selected));
    }

    #[test]
    fn test_switching_rows_stops_old_row_first() {
        let (mut studio, probe, mut catalog) = setup(&["A", "B"]);
        catalog.on_row_play_toggled(&mut studio, "B");
        catalog.on_row_play_toggled(&mut studio, "A");

        assert_eq!(
            catalog.host().row_events,
            [
                ("B".to_string(), true),
                ("B".to_string(), false),
                ("A".to_string(), true)
            ]
        );
        assert_eq!(catalog.playing(&studio), Some("A"));
        assert_eq!(probe.max_concurrent(), 1);
    }

    #[test]
    fn test_toggle_same_row_stops_it() {
        let (mut studio, _, mut catalog) = setup(&["A"]);
        catalog.on_row_play_toggled(&mut studio, "A");
        catalog.on_row_play_toggled(&mut studio, "A");
        assert!(studio.transport.is_idle());
        assert_eq!(catalog.playing(&studio), None);
    }

    #[test]
    fn test_natural_completion_resets_row() {
        let (mut studio, probe, mut catalog) = setup(&["A"]);
        catalog.on_row_play_toggled(&mut studio, "A");
        probe.complete_latest();
        studio.pump(&mut [&mut catalog]);

        assert!(catalog.rows(&studio).iter().all(|r| !r.playing));
        assert_eq!(
            catalog.host().row_events.last(),
            Some(&("A".to_string(), false))
        );
    }

    #[test]
    fn test_missing_source_stays_idle() {
        let (mut studio, probe, mut catalog) = setup(&["A"]);
        catalog.on_row_play_toggled(&mut studio, "ghost");
        assert!(studio.transport.is_idle());
        assert_eq!(probe.opened(), 0);
        assert_eq!(catalog.host().notices, ["No audio found for \"ghost\""]);
    }

    #[test]
    fn test_declined_delete_changes_nothing() {
        let (mut studio, _, mut catalog) = setup(&["v1", "v2"]);
        catalog.host_mut().answer = false;
        catalog.on_row_delete_requested(&mut studio, "v1");
        assert_eq!(catalog.takes().len(), 2);
    }

    #[test]
    fn test_delete_unselected_keeps_selection() {
        let (mut studio, _, mut catalog) = setup(&["v1", "v2", "v3"]);
        catalog.on_row_picked(&mut studio, "v1");
        catalog.on_row_delete_requested(&mut studio, "v3");
        assert_eq!(studio.selection.get(&scope()).as_deref(), Some("v1"));
    }

    #[test]
    fn test_delete_playing_row_stops_it() {
        let (mut studio, probe, mut catalog) = setup(&["v1", "v2"]);
        catalog.on_row_play_toggled(&mut studio, "v1");
        catalog.on_row_delete_requested(&mut studio, "v1");
        assert!(studio.transport.is_idle());
        assert_eq!(probe.open_handles(), 0);
    }

    #[test]
    fn test_deleting_last_take_empties_catalog() {
        let (mut studio, _, mut catalog) = setup(&["only"]);
        catalog.on_row_picked(&mut studio, "only");
        catalog.on_row_delete_requested(&mut studio, "only");

        assert_eq!(studio.selection.get(&scope()), None);
        assert_eq!(catalog.host().emptied, 1);
        assert_eq!(catalog.host().selections.last(), Some(&None));
    }

    #[test]
    fn test_rename_follows_selection() {
        let (mut studio, _, mut catalog) = setup(&["v1", "v2"]);
        catalog.on_row_picked(&mut studio, "v1");
        catalog.on_row_rename_requested(&mut studio, "v1", "intro");

        assert_eq!(studio.selection.get(&scope()).as_deref(), Some("intro"));
        let names: Vec<_> = catalog.rows(&studio).into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["intro", "v2"]);
        assert_eq!(
            catalog.host().notices.last().map(String::as_str),
            Some("Renamed \"v1\" to \"intro\"")
        );
    }

    #[test]
    fn test_rename_failure_is_reported_without_mutation() {
        let (mut studio, _, mut catalog) = setup(&["v1", "v2"]);
        catalog.on_row_picked(&mut studio, "v1");
        catalog.on_row_rename_requested(&mut studio, "v1", "V2");

        assert_eq!(studio.selection.get(&scope()).as_deref(), Some("v1"));
        assert_eq!(
            catalog.host().notices,
            ["A take named \"V2\" already exists"]
        );
    }

    #[test]
    fn test_cancelled_rename_prompt_is_noop() {
        let (mut studio, _, mut catalog) = setup(&["v1"]);
        catalog.on_row_rename_clicked(&mut studio, "v1");
        assert_eq!(catalog.takes()[0].name(), "v1");
        assert!(catalog.host().notices.is_empty());

        catalog.host_mut().reply = Some("  v1 final ".into());
        catalog.on_row_rename_clicked(&mut studio, "v1");
        assert_eq!(catalog.takes()[0].name(), "v1 final");
    }

    #[test]
    fn test_row_preempted_elsewhere_reads_as_stopped() {
        let (mut studio, _, mut catalog) = setup(&["A"]);
        catalog.on_row_play_toggled(&mut studio, "A");
        studio.transport.start_recording().unwrap();

        assert!(catalog.rows(&studio).iter().all(|r| !r.playing));
        studio.pump(&mut [&mut catalog]);
        assert_eq!(
            catalog.host().row_events.last(),
            Some(&("A".to_string(), false))
        );
    }

    #[test]
    fn test_pick_of_take_deleted_by_another_list_is_refused() {
        let (mut studio, _, mut a) = setup(&["v1", "v2", "v3"]);
        let mut b = TakeCatalogController::new(scope(), CatalogMode::Selectable, TestHost::default());
        b.refresh(&mut studio);

        a.on_row_delete_requested(&mut studio, "v2");
        b.on_row_picked(&mut studio, "v2");

        assert_eq!(studio.selection.get(&scope()), None);
        assert_eq!(b.host().notices, ["Take \"v2\" was not found"]);
        let names: Vec<_> = b.takes().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, ["v1", "v3"]);
    }

    #[test]
    fn test_paused_list_releases_its_row() {
        let (mut studio, probe, mut catalog) = setup(&["A"]);
        catalog.on_row_play_toggled(&mut studio, "A");
        catalog.on_surface_paused(&mut studio);
        drop(catalog);

        assert!(studio.transport.is_idle());
        assert_eq!(probe.open_handles(), 0);
    }

    #[test]
    fn test_paused_list_leaves_other_owners_alone() {
        let (mut studio, _, mut catalog) = setup(&["A"]);
        catalog.on_row_play_toggled(&mut studio, "A");
        let recording = studio.transport.start_recording().unwrap();

        catalog.on_surface_paused(&mut studio);
        assert!(studio.transport.is_active(recording));
        assert_eq!(
            catalog.host().row_events.last(),
            Some(&("A".to_string(), false))
        );
    }
}
