//! Randomized interleavings of record, play, completion and teardown across
//! several controllers sharing one transport, with two lists of the same
//! slide racing each other over deletes, picks and renames.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use takes_core::{
    CatalogHost, CatalogMode, Category, Clock, ContentStore, MediaEvent, Notice, Notifier,
    Prompter, Scope, SelectionRegistry, SimulatedEngine, SimulatedProbe, Studio,
    TakeCatalogController, TakeRepository, ToolbarHost, ToolbarMode, ToolbarVisibility,
    TransportState, TransportToolbarController,
};

#[derive(Default)]
struct QuietHost;

impl Notifier for QuietHost {
    fn notify(&mut self, _notice: Notice) {}
}

impl Prompter for QuietHost {
    fn confirm(&mut self, _title: &str, _message: &str) -> bool {
        true
    }

    fn prompt_text(&mut self, _title: &str, _initial: &str) -> Option<String> {
        None
    }
}

impl CatalogHost for QuietHost {
    fn row_playback_changed(&mut self, _name: &str, _playing: bool) {}

    fn selection_changed(&mut self, _scope: &Scope, _selected: Option<&str>) {}

    fn catalog_emptied(&mut self, _scope: &Scope) {}
}

impl ToolbarHost for QuietHost {
    fn visibility_changed(&mut self, _visibility: ToolbarVisibility) {}

    fn recording_changed(&mut self, _recording: bool) {}

    fn playback_changed(&mut self, _playing: bool) {}

    fn log_media_event(&mut self, _event: MediaEvent) {}
}

const NAMES: [&str; 3] = ["v1", "v2", "v3"];

/// Names picked, deleted and renamed to; includes some that don't exist yet
const POOL: [&str; 5] = ["v1", "v2", "v3", "w1", "w2"];

fn silence() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
    writer.write_sample(0i16).unwrap();
    writer.finalize().unwrap();
    cursor.into_inner()
}

struct Rig {
    studio: Studio,
    probe: SimulatedProbe,
    drafts: TakeCatalogController<QuietHost>,
    /// A second list over the same draft slide
    drafts_too: TakeCatalogController<QuietHost>,
    comments: TakeCatalogController<QuietHost>,
    draft_toolbar: TransportToolbarController<QuietHost>,
    comment_toolbar: TransportToolbarController<QuietHost>,
}

impl Rig {
    fn new() -> Self {
        let engine = SimulatedEngine::new(Clock::Manual);
        let probe = engine.probe();
        let mut studio = Studio::in_memory(engine);

        let drafts_scope = Scope::new("story", 1, Category::Draft);
        let comments_scope = Scope::new("story", 1, Category::CommunityCheck);
        for scope in [&drafts_scope, &comments_scope] {
            for name in NAMES {
                studio.takes.commit(&scope.take(name), &silence()).unwrap();
            }
        }
        studio.selection.set(&drafts_scope, Some("v1")).unwrap();

        let mut drafts =
            TakeCatalogController::new(drafts_scope.clone(), CatalogMode::Selectable, QuietHost);
        let mut drafts_too =
            TakeCatalogController::new(drafts_scope.clone(), CatalogMode::Selectable, QuietHost);
        let mut comments =
            TakeCatalogController::new(comments_scope.clone(), CatalogMode::Browse, QuietHost);
        drafts.refresh(&mut studio);
        drafts_too.refresh(&mut studio);
        comments.refresh(&mut studio);

        Self {
            studio,
            probe,
            drafts,
            drafts_too,
            comments,
            draft_toolbar: TransportToolbarController::new(
                drafts_scope,
                ToolbarMode::Unlocked,
                QuietHost,
            ),
            comment_toolbar: TransportToolbarController::new(
                comments_scope,
                ToolbarMode::Unlocked,
                QuietHost,
            ),
        }
    }

    fn pump(&mut self) {
        self.studio.pump(&mut [
            &mut self.drafts,
            &mut self.drafts_too,
            &mut self.comments,
            &mut self.draft_toolbar,
            &mut self.comment_toolbar,
        ]);
    }

    fn step(&mut self, rng: &mut StdRng) {
        let name = POOL[rng.gen_range(0..POOL.len())];
        let other = POOL[rng.gen_range(0..POOL.len())];
        let list = if rng.gen_bool(0.5) {
            &mut self.drafts
        } else {
            &mut self.drafts_too
        };
        match rng.gen_range(0..17) {
            0 | 1 => self.drafts.on_row_play_toggled(&mut self.studio, name),
            2 => self.comments.on_row_play_toggled(&mut self.studio, name),
            3 | 4 => self.draft_toolbar.on_record_pressed(&mut self.studio),
            5 => self.comment_toolbar.on_record_pressed(&mut self.studio),
            6 => self.draft_toolbar.on_play_pressed(&mut self.studio),
            7 => self.comment_toolbar.on_play_pressed(&mut self.studio),
            8 => {
                // Completion for any playback ever started, stale or not
                let tokens = self.probe.playback_tokens();
                if !tokens.is_empty() {
                    self.probe.complete(tokens[rng.gen_range(0..tokens.len())]);
                }
            }
            9 => self.draft_toolbar.on_surface_paused(&mut self.studio),
            10 => self.pump(),
            11 => list.on_row_picked(&mut self.studio, name),
            12 => list.on_row_delete_requested(&mut self.studio, name),
            13 => list.on_row_rename_requested(&mut self.studio, name, other),
            14 => list.on_row_play_toggled(&mut self.studio, name),
            15 => list.on_surface_paused(&mut self.studio),
            _ => {
                let fail = rng.gen_bool(0.2);
                self.probe.fail_capture(fail);
                self.probe.fail_playback(rng.gen_bool(0.1));
            }
        }
    }

    fn check(&self) {
        let studio = &self.studio;
        let open = self.probe.open_handles();
        assert!(open <= 1, "{open} sessions open at once");

        let expected = match studio.transport.state() {
            TransportState::Idle => 0,
            _ => 1,
        };
        assert_eq!(open, expected, "transport state and hardware disagree");

        let busy = [
            self.drafts.playing(studio).is_some(),
            self.drafts_too.playing(studio).is_some(),
            self.comments.playing(studio).is_some(),
            self.draft_toolbar.is_recording(studio),
            self.draft_toolbar.is_playing(studio),
            self.comment_toolbar.is_recording(studio),
            self.comment_toolbar.is_playing(studio),
        ];
        let active = busy.iter().filter(|b| **b).count();
        assert!(active <= 1, "{active} controllers believe they own the transport");
        assert_eq!(active, expected);

        let scope = self.drafts.scope();
        if let Some(selected) = studio.selection.get(scope) {
            assert!(
                studio.takes.exists(&scope.take(selected.as_str())),
                "selection points at missing take {selected:?}"
            );
        }
    }
}

#[test]
fn at_most_one_operation_under_random_interleavings() {
    for seed in 0..32u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rig = Rig::new();

        for _ in 0..400 {
            rig.step(&mut rng);
            rig.check();
        }

        rig.pump();
        assert!(rig.probe.max_concurrent() <= 1, "seed {seed}");
    }
}

#[test]
fn every_recording_becomes_a_take() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut rig = Rig::new();
    let mut started = 0;

    for _ in 0..200 {
        let before = rig.draft_toolbar.is_recording(&rig.studio);
        match rng.gen_range(0..4) {
            0 => rig.draft_toolbar.on_record_pressed(&mut rig.studio),
            1 => rig.drafts.on_row_play_toggled(&mut rig.studio, "v2"),
            2 => rig.draft_toolbar.on_surface_paused(&mut rig.studio),
            _ => rig.pump(),
        }
        if !before && rig.draft_toolbar.is_recording(&rig.studio) {
            started += 1;
        }
    }
    rig.draft_toolbar.on_surface_paused(&mut rig.studio);
    rig.pump();

    let scope = rig.draft_toolbar.scope().clone();
    let takes = rig.studio.takes.list(&scope).unwrap();
    assert_eq!(takes.len(), NAMES.len() + started);
}
