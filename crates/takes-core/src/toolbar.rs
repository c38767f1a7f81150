//! Record / play / edit controls for the chosen take of one slide.
//!
//! The toolbar works on a single take: the selected one for selectable
//! categories, the newest one for browse categories. Recording always
//! produces a new take; editing replaces the chosen take's audio in place.

use crate::error::{Side, StudioError, TransportError};
use crate::host::{
    EditOutcome, ExternalEditor, MediaEvent, MediaKind, Notice, ToolbarHost, ToolbarVisibility,
};
use crate::selection::SelectionRegistry;
use crate::studio::{Studio, TransportListener};
use crate::take::{ContentStore, Scope, TakeId, TakeRepository, next_default_name, read_content};
use crate::transport::{EndReason, Finished, OpToken};

/// Whether the slide's content has been approved for recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolbarMode {
    /// Everything hidden and disabled
    #[default]
    Locked,
    Unlocked,
}

impl ToolbarMode {
    pub fn from_approval(approved: bool) -> Self {
        if approved {
            ToolbarMode::Unlocked
        } else {
            ToolbarMode::Locked
        }
    }
}

pub struct TransportToolbarController<H: ToolbarHost> {
    scope: Scope,
    mode: ToolbarMode,
    host: H,
    editor: Option<Box<dyn ExternalEditor>>,
    recording: Option<OpToken>,
    playing: Option<OpToken>,
    /// Recordings that ended elsewhere; their audio arrives through `pump`
    unclaimed: Vec<OpToken>,
}

impl<H: ToolbarHost> TransportToolbarController<H> {
    pub fn new(scope: Scope, mode: ToolbarMode, host: H) -> Self {
        Self {
            scope,
            mode,
            host,
            editor: None,
            recording: None,
            playing: None,
            unclaimed: Vec::new(),
        }
    }

    /// Attach an external editor capability
    pub fn with_editor(mut self, editor: Box<dyn ExternalEditor>) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn mode(&self) -> ToolbarMode {
        self.mode
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn is_recording(&self, studio: &Studio) -> bool {
        self.recording
            .is_some_and(|token| studio.transport.is_active(token))
    }

    pub fn is_playing(&self, studio: &Studio) -> bool {
        self.playing
            .is_some_and(|token| studio.transport.is_active(token))
    }

    fn editor_available(&self) -> bool {
        self.editor.as_ref().is_some_and(|e| e.is_available())
    }

    /// The take play and edit act on
    pub fn chosen_take(&self, studio: &Studio) -> Option<TakeId> {
        if self.scope.category.is_selectable() {
            return studio.selected_take(&self.scope);
        }
        studio
            .takes
            .list(&self.scope)
            .ok()?
            .into_iter()
            .max_by_key(|t| t.seq)
            .map(|t| t.id)
    }

    pub fn has_recording(&self, studio: &Studio) -> bool {
        self.chosen_take(studio).is_some()
    }

    pub fn visibility(&self, studio: &Studio) -> ToolbarVisibility {
        match self.mode {
            ToolbarMode::Locked => ToolbarVisibility::hidden(),
            ToolbarMode::Unlocked => {
                ToolbarVisibility::unlocked(self.has_recording(studio), self.editor_available())
            }
        }
    }

    pub fn refresh_visibility(&mut self, studio: &Studio) {
        let visibility = self.visibility(studio);
        self.host.visibility_changed(visibility);
    }

    pub fn on_record_pressed(&mut self, studio: &mut Studio) {
        if self.mode == ToolbarMode::Locked {
            crate::verbose!("Record ignored: {} is locked", self.scope);
            return;
        }
        self.settle(studio);

        if self.recording.is_some() {
            self.finish_recording(studio);
            return;
        }

        self.stop_playback(studio);
        match studio.transport.start_recording() {
            Ok(token) => {
                self.recording = Some(token);
                self.host.recording_changed(true);
                self.host
                    .log_media_event(MediaEvent::new(self.scope.clone(), MediaKind::Recording));
            }
            Err(e) => self.report(e),
        }
    }

    pub fn on_play_pressed(&mut self, studio: &mut Studio) {
        if self.mode == ToolbarMode::Locked {
            crate::verbose!("Play ignored: {} is locked", self.scope);
            return;
        }
        self.settle(studio);

        if self.playing.is_some() {
            self.stop_playback(studio);
            return;
        }

        // A running recording becomes the take we are about to play
        self.finish_recording(studio);

        let Some(take) = self.chosen_take(studio) else {
            self.report(StudioError::NoRecordingAvailable);
            return;
        };
        let source = match studio.takes.open(&take) {
            Ok(source) => source,
            Err(e) => {
                crate::verbose!("Could not open {take}: {e}");
                self.report(StudioError::PlaybackSourceMissing(take.name));
                return;
            }
        };

        let name = take.name.clone();
        match studio.transport.start_playback(take, source) {
            Ok(token) => {
                self.playing = Some(token);
                self.host.playback_changed(true);
                self.host.notify(Notice::Playing { name });
                self.host
                    .log_media_event(MediaEvent::new(self.scope.clone(), MediaKind::Playback));
            }
            Err(e) => self.report(e),
        }
    }

    pub fn on_external_edit_pressed(&mut self, studio: &mut Studio) {
        if self.mode == ToolbarMode::Locked {
            return;
        }
        if !self.editor_available() {
            self.report(StudioError::EditorUnavailable);
            return;
        }
        self.settle(studio);
        self.stop_own(studio);

        let Some(take) = self.chosen_take(studio) else {
            self.report(StudioError::NoRecordingAvailable);
            return;
        };
        let content = match read_content(studio.takes.as_ref(), &take) {
            Ok(content) => content,
            Err(e) => {
                self.report(e);
                return;
            }
        };

        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let outcome = editor.edit(&take, &content);

        match outcome {
            Ok(EditOutcome::Replaced(bytes)) => match studio.takes.commit(&take, &bytes) {
                Ok(_) => {
                    self.host.notify(Notice::Edited {
                        name: take.name.clone(),
                    });
                    self.refresh_visibility(studio);
                }
                Err(e) => self.report(e),
            },
            Ok(EditOutcome::Cancelled) => crate::verbose!("Edit of {take} cancelled"),
            Err(e) => self.report(e),
        }
    }

    /// Approval changed; locking stops whatever the toolbar was doing
    pub fn on_approval_changed(&mut self, studio: &mut Studio, approved: bool) {
        self.mode = ToolbarMode::from_approval(approved);
        if self.mode == ToolbarMode::Locked {
            self.settle(studio);
            self.stop_own(studio);
        }
        self.refresh_visibility(studio);
    }

    /// The hosting surface went to the background or away
    pub fn on_surface_paused(&mut self, studio: &mut Studio) {
        studio.transport.release();
    }

    fn stop_own(&mut self, studio: &mut Studio) {
        self.finish_recording(studio);
        self.stop_playback(studio);
    }

    /// Stop our recording and store it as a new take
    fn finish_recording(&mut self, studio: &mut Studio) {
        let Some(token) = self.recording else {
            return;
        };
        match studio.transport.stop(token) {
            Some(finished) => {
                self.recording = None;
                self.host.recording_changed(false);
                self.commit_capture(studio, &finished);
            }
            None => self.settle(studio),
        }
    }

    fn stop_playback(&mut self, studio: &mut Studio) {
        if let Some(token) = self.playing.take() {
            studio.transport.stop(token);
            self.host.playback_changed(false);
        }
    }

    /// Forget tokens some other start already ended
    fn settle(&mut self, studio: &Studio) {
        if let Some(token) = self.recording.filter(|t| !studio.transport.is_active(*t)) {
            self.recording = None;
            self.unclaimed.push(token);
            self.host.recording_changed(false);
        }
        if self
            .playing
            .is_some_and(|t| !studio.transport.is_active(t))
        {
            self.playing = None;
            self.host.playback_changed(false);
        }
    }

    fn commit_capture(&mut self, studio: &mut Studio, finished: &Finished) {
        let Some(bytes) = &finished.capture else {
            if let EndReason::Failed(reason) = &finished.reason {
                self.report(TransportError::Unavailable {
                    side: Side::Recording,
                    reason: reason.clone(),
                });
            }
            return;
        };

        let existing = match studio.takes.list(&self.scope) {
            Ok(takes) => takes,
            Err(e) => {
                self.report(e);
                return;
            }
        };
        let name = next_default_name(self.scope.category, existing.iter().map(|t| t.name()));

        let take = match studio.takes.commit(&self.scope.take(name.clone()), bytes) {
            Ok(take) => take,
            Err(e) => {
                self.report(e);
                return;
            }
        };
        if let Err(e) = studio.selection.set(&self.scope, Some(&name)) {
            self.report(e);
        }

        crate::verbose!("Committed {} ({} bytes)", take.id, bytes.len());
        self.host.take_committed(&take);
        self.host.notify(Notice::Recorded { name });
        self.refresh_visibility(studio);
    }

    fn report(&mut self, err: impl Into<StudioError>) {
        let err = err.into();
        crate::verbose!("{}: {err}", self.scope);
        self.host.notify(Notice::Problem(err));
    }
}

impl<H: ToolbarHost> TransportListener for TransportToolbarController<H> {
    fn on_transport_event(&mut self, studio: &mut Studio, finished: &Finished) {
        let token = finished.token;

        if self.recording == Some(token) {
            self.recording = None;
            self.host.recording_changed(false);
            self.commit_capture(studio, finished);
        } else if let Some(index) = self.unclaimed.iter().position(|t| *t == token) {
            self.unclaimed.remove(index);
            self.commit_capture(studio, finished);
        } else if self.playing == Some(token) {
            self.playing = None;
            self.host.playback_changed(false);
            if let EndReason::Failed(reason) = &finished.reason {
                self.report(TransportError::Unavailable {
                    side: Side::Playback,
                    reason: reason.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Category;
    use crate::host::Notifier;
    use crate::take::Take;
    use crate::transport::{Clock, SimulatedEngine, SimulatedProbe};

    #[derive(Default)]
    struct TestHost {
        notices: Vec<String>,
        visibility: Option<ToolbarVisibility>,
        recording: Vec<bool>,
        playing: Vec<bool>,
        committed: Vec<String>,
        events: Vec<String>,
    }

    impl Notifier for TestHost {
        fn notify(&mut self, notice: Notice) {
            self.notices.push(notice.to_string());
        }
    }

    impl ToolbarHost for TestHost {
        fn visibility_changed(&mut self, visibility: ToolbarVisibility) {
            self.visibility = Some(visibility);
        }

        fn recording_changed(&mut self, recording: bool) {
            self.recording.push(recording);
        }

        fn playback_changed(&mut self, playing: bool) {
            self.playing.push(playing);
        }

        fn take_committed(&mut self, take: &Take) {
            self.committed.push(take.name().to_string());
        }

        fn log_media_event(&mut self, event: MediaEvent) {
            self.events.push(event.label());
        }
    }

    struct FakeEditor {
        available: bool,
        result: Option<Vec<u8>>,
    }

    impl ExternalEditor for FakeEditor {
        fn is_available(&self) -> bool {
            self.available
        }

        fn edit(&mut self, _take: &TakeId, _content: &[u8]) -> Result<EditOutcome, StudioError> {
            Ok(match self.result.take() {
                Some(bytes) => EditOutcome::Replaced(bytes),
                None => EditOutcome::Cancelled,
            })
        }
    }

    fn scope() -> Scope {
        Scope::new("lost-sheep", 2, Category::Draft)
    }

    fn setup() -> (Studio, SimulatedProbe, TransportToolbarController<TestHost>) {
        let engine = SimulatedEngine::new(Clock::Manual);
        let probe = engine.probe();
        let studio = Studio::in_memory(engine);
        let toolbar =
            TransportToolbarController::new(scope(), ToolbarMode::Unlocked, TestHost::default());
        (studio, probe, toolbar)
    }

    #[test]
    fn test_locked_toolbar_hides_everything_and_ignores_presses() {
        let (mut studio, probe, _) = setup();
        let mut toolbar =
            TransportToolbarController::new(scope(), ToolbarMode::Locked, TestHost::default());
        assert_eq!(toolbar.visibility(&studio), ToolbarVisibility::hidden());

        toolbar.on_record_pressed(&mut studio);
        toolbar.on_play_pressed(&mut studio);
        assert_eq!(probe.opened(), 0);
    }

    #[test]
    fn test_record_twice_commits_and_selects_new_take() {
        let (mut studio, _, mut toolbar) = setup();
        assert!(!toolbar.visibility(&studio).play.visible);

        toolbar.on_record_pressed(&mut studio);
        assert!(toolbar.is_recording(&studio));
        toolbar.on_record_pressed(&mut studio);

        assert!(studio.transport.is_idle());
        assert_eq!(toolbar.host().committed, ["Draft 1"]);
        assert_eq!(studio.selection.get(&scope()).as_deref(), Some("Draft 1"));
        assert_eq!(toolbar.host().recording, [true, false]);
        assert_eq!(toolbar.host().events, ["Draft Recording"]);

        let visibility = toolbar.host().visibility.unwrap();
        assert!(visibility.play.visible);
        assert!(!visibility.edit.visible);
    }

    #[test]
    fn test_play_without_recording_reports() {
        let (mut studio, probe, mut toolbar) = setup();
        toolbar.on_play_pressed(&mut studio);
        assert_eq!(toolbar.host().notices, ["No recording available yet"]);
        assert_eq!(probe.opened(), 0);
    }

    #[test]
    fn test_play_toggles_chosen_take() {
        let (mut studio, _, mut toolbar) = setup();
        toolbar.on_record_pressed(&mut studio);
        toolbar.on_record_pressed(&mut studio);

        toolbar.on_play_pressed(&mut studio);
        assert!(toolbar.is_playing(&studio));
        assert_eq!(toolbar.host().events.last().unwrap(), "Draft Playback");

        toolbar.on_play_pressed(&mut studio);
        assert!(studio.transport.is_idle());
        assert_eq!(toolbar.host().playing, [true, false]);
    }

    #[test]
    fn test_play_while_recording_plays_the_new_take() {
        let (mut studio, probe, mut toolbar) = setup();
        toolbar.on_record_pressed(&mut studio);
        toolbar.on_play_pressed(&mut studio);

        assert_eq!(toolbar.host().committed, ["Draft 1"]);
        assert!(toolbar.is_playing(&studio));
        assert_eq!(probe.max_concurrent(), 1);
    }

    #[test]
    fn test_preempted_recording_is_still_committed() {
        let (mut studio, _, mut toolbar) = setup();
        toolbar.on_record_pressed(&mut studio);
        studio.transport.release();
        studio.pump(&mut [&mut toolbar]);

        assert_eq!(toolbar.host().committed, ["Draft 1"]);
        assert!(!toolbar.is_recording(&studio));
    }

    #[test]
    fn test_recording_ended_elsewhere_survives_a_new_recording() {
        let (mut studio, _, mut toolbar) = setup();
        toolbar.on_record_pressed(&mut studio);
        studio.transport.release();
        // Pressed again before the release was pumped
        toolbar.on_record_pressed(&mut studio);
        toolbar.on_record_pressed(&mut studio);
        studio.pump(&mut [&mut toolbar]);

        let mut committed = toolbar.host().committed.clone();
        committed.sort();
        assert_eq!(committed, ["Draft 1", "Draft 2"]);
    }

    #[test]
    fn test_locking_stops_recording() {
        let (mut studio, probe, mut toolbar) = setup();
        toolbar.on_record_pressed(&mut studio);
        toolbar.on_approval_changed(&mut studio, false);

        assert_eq!(probe.open_handles(), 0);
        assert_eq!(toolbar.mode(), ToolbarMode::Locked);
        assert_eq!(toolbar.host().visibility, Some(ToolbarVisibility::hidden()));
        assert_eq!(toolbar.host().committed, ["Draft 1"]);
    }

    #[test]
    fn test_external_edit_replaces_content_in_place() {
        let (mut studio, _, toolbar) = setup();
        let mut toolbar = toolbar.with_editor(Box::new(FakeEditor {
            available: true,
            result: Some(b"edited".to_vec()),
        }));
        toolbar.on_record_pressed(&mut studio);
        toolbar.on_record_pressed(&mut studio);
        assert!(toolbar.visibility(&studio).edit.visible);

        toolbar.on_external_edit_pressed(&mut studio);

        let takes = studio.takes.list(&scope()).unwrap();
        assert_eq!(takes.len(), 1);
        let content = read_content(studio.takes.as_ref(), &scope().take("Draft 1")).unwrap();
        assert_eq!(content, b"edited");

        // Second press: the fake cancels
        toolbar.on_external_edit_pressed(&mut studio);
        assert_eq!(studio.takes.list(&scope()).unwrap().len(), 1);
    }

    #[test]
    fn test_edit_without_editor_reports() {
        let (mut studio, _, toolbar) = setup();
        let mut toolbar = toolbar.with_editor(Box::new(FakeEditor {
            available: false,
            result: None,
        }));
        toolbar.on_external_edit_pressed(&mut studio);
        assert_eq!(
            toolbar.host().notices,
            ["No external audio editor is configured"]
        );
    }

    #[test]
    fn test_browse_category_plays_newest_take() {
        let engine = SimulatedEngine::new(Clock::Manual);
        let mut studio = Studio::in_memory(engine);
        let comments = Scope::new("lost-sheep", 2, Category::CommunityCheck);
        let mut toolbar = TransportToolbarController::new(
            comments.clone(),
            ToolbarMode::Unlocked,
            TestHost::default(),
        );

        toolbar.on_record_pressed(&mut studio);
        toolbar.on_record_pressed(&mut studio);
        toolbar.on_record_pressed(&mut studio);
        toolbar.on_record_pressed(&mut studio);

        assert_eq!(
            toolbar.chosen_take(&studio),
            Some(comments.take("Comment 2"))
        );
    }
}
