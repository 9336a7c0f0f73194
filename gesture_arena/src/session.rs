//! Session controller — the game's state machine.
//!
//! `SessionController` owns the level index, the scores, the feedback grids,
//! and the classifier resources (through a [`FrameLoop`]).  It consumes
//! [`SessionEvent`]s and exposes a [`SessionView`] for rendering.
//!
//! ```text
//! START ──Enter──▶ LOADING_MODEL ──ready──▶ PREDICT ──gesture──▶ COMPARE
//!   ▲                                          ▲                     │ 3 s
//!   │                                          └──Enter (more)── LEVEL_CLEAR
//!   └────────────Esc──────────── GAME_OVER ◀──Enter (last)──────────┘
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use gesture_core::level::{self, LEVELS};
use gesture_core::{
    score_round, select_gesture, ColumnMask, GameState, Prediction, SessionView, COLUMNS,
    COMPARE_DURATION,
};

use crate::classifier::{CaptureConfig, ClassifierBackend, Frame};
use crate::frame_loop::{ClassifierEvent, FrameLoop};

// ════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════

/// The two keys the game listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Enter.
    Confirm,
    /// Escape.
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The classifier runtime became usable.
    LibraryReady,
    Key(Control),
    Classifier(ClassifierEvent),
    /// Time passed; fires the compare timer when due.
    Tick,
}

// ════════════════════════════════════════════════════════════════════════════
// SessionController
// ════════════════════════════════════════════════════════════════════════════

pub struct SessionController {
    // ── game state ───────────────────────────────────────────────────────
    state:        GameState,
    level_index:  usize,
    total_score:  i32,
    round_score:  i32,
    error_grid:   ColumnMask,
    success_grid: ColumnMask,
    predictions:  Vec<Prediction>,

    // ── compare timer ────────────────────────────────────────────────────
    compare_deadline: Option<Instant>,

    // ── classifier resources ─────────────────────────────────────────────
    backend:       Arc<dyn ClassifierBackend>,
    capture:       CaptureConfig,
    library_ready: bool,
    /// Present while a camera is being acquired or is running.
    frame_loop:    Option<FrameLoop>,
    model_ready:   bool,
    load_error:    Option<String>,
    last_frame:    Option<Frame>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn ClassifierBackend>, capture: CaptureConfig) -> Self {
        SessionController {
            state:            GameState::Start,
            level_index:      0,
            total_score:      0,
            round_score:      0,
            error_grid:       [0; COLUMNS],
            success_grid:     [0; COLUMNS],
            predictions:      Vec::new(),
            compare_deadline: None,
            backend,
            capture,
            library_ready:    false,
            frame_loop:       None,
            model_ready:      false,
            load_error:       None,
            last_frame:       None,
        }
    }

    // ── event dispatch ───────────────────────────────────────────────────

    pub fn handle(&mut self, event: SessionEvent, now: Instant) {
        match event {
            SessionEvent::LibraryReady => self.library_ready = true,
            SessionEvent::Key(Control::Confirm) => self.confirm(),
            SessionEvent::Key(Control::Cancel)  => self.cancel(),
            SessionEvent::Classifier(ClassifierEvent::Ready { labels }) => {
                info!(?labels, "model and webcam ready");
                self.on_classifier_ready();
            }
            SessionEvent::Classifier(ClassifierEvent::Failed(err)) => self.on_classifier_failed(err),
            SessionEvent::Classifier(ClassifierEvent::Predicted { frame, predictions }) => {
                self.last_frame = Some(frame);
                self.on_predictions(predictions, now);
            }
            SessionEvent::Tick => self.tick(now),
        }
    }

    /// Feed every pending classifier event through [`handle`](Self::handle).
    pub fn pump(&mut self, now: Instant) {
        let events = match &self.frame_loop {
            Some(fl) => fl.drain_events(),
            None => return,
        };
        for e in events {
            self.handle(SessionEvent::Classifier(e), now);
        }
    }

    // ── keys ─────────────────────────────────────────────────────────────

    pub fn confirm(&mut self) {
        match self.state {
            GameState::Start if self.library_ready => self.start_level(self.level_index),
            GameState::LoadingModel if self.load_error.is_some() => self.retry_load(),
            GameState::LevelClear => {
                let next = self.level_index + 1;
                if next < LEVELS.len() {
                    self.level_index = next;
                    self.start_level(next);
                } else {
                    self.set_state(GameState::GameOver);
                }
            }
            _ => {}
        }
    }

    pub fn cancel(&mut self) {
        if self.state == GameState::GameOver {
            self.restart();
        }
    }

    // ── classifier lifecycle ─────────────────────────────────────────────

    pub fn on_classifier_ready(&mut self) {
        self.model_ready = true;
        self.load_error = None;
        if self.state == GameState::LoadingModel {
            self.set_state(GameState::Predict);
        }
    }

    pub fn on_classifier_failed(&mut self, err: String) {
        error!("classifier initialization failed: {}", err);
        self.model_ready = false;
        self.load_error = Some(err);
    }

    /// Store the latest predictions and, while predicting, lock in the first
    /// confident gesture.
    pub fn on_predictions(&mut self, predictions: Vec<Prediction>, now: Instant) {
        self.predictions = predictions;
        if self.state != GameState::Predict {
            return;
        }
        if let Some(detected) = select_gesture(&self.predictions) {
            self.check_gesture(detected, now);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if self.state != GameState::Compare { return; }
        if let Some(deadline) = self.compare_deadline {
            if now >= deadline {
                self.set_state(GameState::LevelClear);
            }
        }
    }

    // ── transitions ──────────────────────────────────────────────────────

    fn set_state(&mut self, next: GameState) {
        if next != self.state {
            info!(from = %self.state, to = %next, level = self.level_index, "state");
        }
        self.state = next;
        self.compare_deadline = None;
    }

    fn start_level(&mut self, index: usize) {
        self.error_grid = [0; COLUMNS];
        self.success_grid = [0; COLUMNS];
        self.round_score = 0;
        self.predictions.clear();
        info!(level = index, name = level::level(index).name, "level start");

        if self.model_ready {
            self.set_state(GameState::Predict);
        } else {
            self.set_state(GameState::LoadingModel);
            if self.frame_loop.is_none() {
                self.frame_loop = Some(FrameLoop::spawn(Arc::clone(&self.backend), self.capture.clone()));
            }
        }
    }

    fn retry_load(&mut self) {
        warn!("retrying classifier initialization");
        self.load_error = None;
        if let Some(fl) = self.frame_loop.take() {
            fl.stop();
        }
        self.frame_loop = Some(FrameLoop::spawn(Arc::clone(&self.backend), self.capture.clone()));
    }

    fn check_gesture(&mut self, detected: gesture_core::Gesture, now: Instant) {
        let level = level::level(self.level_index);
        let outcome = score_round(level, detected);

        self.round_score = outcome.score;
        self.total_score += outcome.score;
        self.error_grid = outcome.error_grid;
        self.success_grid = outcome.success_grid;
        info!(
            detected = detected.name(),
            required = level.required.name(),
            round = self.round_score,
            total = self.total_score,
            "round scored"
        );

        self.set_state(GameState::Compare);
        self.compare_deadline = Some(now + COMPARE_DURATION);
    }

    fn restart(&mut self) {
        if let Some(fl) = self.frame_loop.take() {
            fl.stop();
        }
        self.model_ready = false;
        self.load_error = None;
        self.last_frame = None;
        self.level_index = 0;
        self.total_score = 0;
        self.round_score = 0;
        self.error_grid = [0; COLUMNS];
        self.success_grid = [0; COLUMNS];
        self.predictions.clear();
        self.set_state(GameState::Start);
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn state(&self)        -> GameState     { self.state }
    pub fn level_index(&self)  -> usize         { self.level_index }
    pub fn total_score(&self)  -> i32           { self.total_score }
    pub fn round_score(&self)  -> i32           { self.round_score }
    pub fn error_grid(&self)   -> &ColumnMask   { &self.error_grid }
    pub fn success_grid(&self) -> &ColumnMask   { &self.success_grid }
    pub fn predictions(&self)  -> &[Prediction] { &self.predictions }
    pub fn has_classifier(&self) -> bool        { self.frame_loop.is_some() }
    pub fn model_ready(&self)  -> bool          { self.model_ready }
    pub fn load_error(&self)   -> Option<&str>  { self.load_error.as_deref() }
    pub fn last_frame(&self)   -> Option<&Frame> { self.last_frame.as_ref() }
    pub fn compare_deadline(&self) -> Option<Instant> { self.compare_deadline }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            state:         self.state,
            level_index:   self.level_index,
            total_score:   self.total_score,
            round_score:   self.round_score,
            error_grid:    &self.error_grid,
            success_grid:  &self.success_grid,
            predictions:   &self.predictions,
            library_ready: self.library_ready,
            load_error:    self.load_error.as_deref(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    use gesture_core::round::{is_empty, lit_columns};
    use gesture_core::Gesture;

    use crate::classifier::{Model, Webcam};
    use crate::error::ClassifierError;

    // ── fakes ────────────────────────────────────────────────────────────

    struct IdleModel(Vec<String>);
    impl Model for IdleModel {
        fn labels(&self) -> &[String] { &self.0 }
        fn predict(&mut self, _f: &Frame) -> Result<Vec<Prediction>, ClassifierError> { Ok(Vec::new()) }
    }

    struct IdleCam;
    impl Webcam for IdleCam {
        fn setup(&mut self) -> Result<(), ClassifierError> { Ok(()) }
        fn play(&mut self) -> Result<(), ClassifierError> { Ok(()) }
        fn update(&mut self) {}
        fn stop(&mut self) {}
        fn frame(&self) -> Frame { Frame::blank(1, 1, 0) }
    }

    /// Loads instantly and never predicts anything on its own; tests inject
    /// events directly.
    struct FakeBackend;
    impl ClassifierBackend for FakeBackend {
        fn is_ready(&self) -> bool { true }
        fn load(&self, _m: &Path, _d: &Path) -> Result<Box<dyn Model>, ClassifierError> {
            Ok(Box::new(IdleModel(vec!["주먹".into(), "가위".into(), "보".into()])))
        }
        fn webcam(&self, _w: u32, _h: u32, _m: bool) -> Box<dyn Webcam> { Box::new(IdleCam) }
    }

    fn controller() -> SessionController {
        let mut s = SessionController::new(Arc::new(FakeBackend), CaptureConfig::default());
        s.handle(SessionEvent::LibraryReady, Instant::now());
        s
    }

    fn shown(label: &str, p: f32) -> Vec<Prediction> {
        let mut v = vec![Prediction::new(label, p)];
        v.extend(["주먹", "가위", "보"].iter()
            .filter(|l| **l != label)
            .map(|l| Prediction::new(*l, (1.0 - p) / 2.0)));
        v
    }

    fn label(g: Gesture) -> &'static str {
        g.label().unwrap()
    }

    /// Controller sitting in PREDICT on level 0.
    fn predicting() -> SessionController {
        let mut s = controller();
        s.confirm();
        assert_eq!(s.state(), GameState::LoadingModel);
        s.on_classifier_ready();
        assert_eq!(s.state(), GameState::Predict);
        s
    }

    /// Play one round with `g`, then let the timer run out.
    fn play_round(s: &mut SessionController, g: Gesture, t: Instant) -> Instant {
        s.on_predictions(shown(label(g), 0.99), t);
        assert_eq!(s.state(), GameState::Compare);
        let later = t + COMPARE_DURATION;
        s.tick(later);
        assert_eq!(s.state(), GameState::LevelClear);
        later
    }

    // ── start / loading ──────────────────────────────────────────────────

    #[test]
    fn confirm_ignored_until_library_ready() {
        let mut s = SessionController::new(Arc::new(FakeBackend), CaptureConfig::default());
        s.confirm();
        assert_eq!(s.state(), GameState::Start);
        assert!(!s.has_classifier());
        s.handle(SessionEvent::LibraryReady, Instant::now());
        s.confirm();
        assert_eq!(s.state(), GameState::LoadingModel);
        assert!(s.has_classifier());
    }

    #[test]
    fn cancel_outside_game_over_is_ignored() {
        let mut s = predicting();
        s.cancel();
        assert_eq!(s.state(), GameState::Predict);
        assert!(s.has_classifier());
    }

    #[test]
    fn load_failure_stalls_then_retries() {
        let mut s = controller();
        s.confirm();
        s.on_classifier_failed("no metadata".into());
        assert_eq!(s.state(), GameState::LoadingModel);
        assert_eq!(s.load_error(), Some("no metadata"));
        assert!(!s.model_ready());

        s.confirm();
        assert_eq!(s.load_error(), None);
        assert!(s.has_classifier());
        s.on_classifier_ready();
        assert_eq!(s.state(), GameState::Predict);
    }

    #[test]
    fn confirm_while_loading_without_error_is_ignored() {
        let mut s = controller();
        s.confirm();
        s.confirm();
        assert_eq!(s.state(), GameState::LoadingModel);
    }

    // ── scoring scenarios ────────────────────────────────────────────────

    #[test]
    fn rock_on_rock_level_scores_fifty() {
        let mut s = predicting();
        s.on_predictions(shown("주먹", 0.97), Instant::now());
        assert_eq!(s.state(), GameState::Compare);
        assert_eq!(s.round_score(), 50);
        assert_eq!(s.total_score(), 50);
        assert_eq!(lit_columns(s.success_grid()), vec![8, 9, 10, 11]);
        assert_eq!(s.error_grid(), &[0u8; COLUMNS]);
    }

    #[test]
    fn scissors_on_rock_level_costs_twenty_five() {
        let mut s = predicting();
        s.on_predictions(shown("가위", 0.99), Instant::now());
        assert_eq!(s.state(), GameState::Compare);
        assert_eq!(s.round_score(), -25);
        assert_eq!(s.total_score(), -25);
        assert_eq!(lit_columns(s.error_grid()), vec![5, 6, 13, 14]);
        assert!(is_empty(s.success_grid()));
    }

    #[test]
    fn unsure_prediction_keeps_predicting() {
        let mut s = predicting();
        s.on_predictions(shown("주먹", 0.80), Instant::now());
        assert_eq!(s.state(), GameState::Predict);
        assert_eq!(s.total_score(), 0);
        assert_eq!(s.predictions().len(), 3);
    }

    #[test]
    fn unknown_label_keeps_predicting() {
        let mut s = predicting();
        s.on_predictions(vec![Prediction::new("없음", 0.99)], Instant::now());
        assert_eq!(s.state(), GameState::Predict);
    }

    #[test]
    fn only_first_prediction_scores() {
        let mut s = predicting();
        let t = Instant::now();
        s.on_predictions(shown("주먹", 0.99), t);
        s.on_predictions(shown("가위", 0.99), t);
        s.on_predictions(shown("주먹", 0.99), t);
        assert_eq!(s.total_score(), 50);
        assert_eq!(s.round_score(), 50);
        // Still stored for display.
        assert_eq!(s.predictions()[0].label, "주먹");
    }

    // ── compare timer ────────────────────────────────────────────────────

    #[test]
    fn compare_waits_for_timer_and_ignores_keys() {
        let mut s = predicting();
        let t = Instant::now();
        s.on_predictions(shown("주먹", 0.99), t);
        s.confirm();
        s.cancel();
        assert_eq!(s.state(), GameState::Compare);
        s.tick(t + Duration::from_millis(2999));
        assert_eq!(s.state(), GameState::Compare);
        s.handle(SessionEvent::Tick, t + COMPARE_DURATION);
        assert_eq!(s.state(), GameState::LevelClear);
        assert_eq!(s.compare_deadline(), None);
    }

    #[test]
    fn tick_outside_compare_does_nothing() {
        let mut s = predicting();
        s.tick(Instant::now() + Duration::from_secs(60));
        assert_eq!(s.state(), GameState::Predict);
    }

    // ── level progression ────────────────────────────────────────────────

    #[test]
    fn next_level_resets_round_but_keeps_model() {
        let mut s = predicting();
        play_round(&mut s, Gesture::Rock, Instant::now());
        s.confirm();
        assert_eq!(s.level_index(), 1);
        assert_eq!(s.state(), GameState::Predict);
        assert_eq!(s.round_score(), 0);
        assert!(is_empty(s.success_grid()));
        assert!(is_empty(s.error_grid()));
        assert!(s.predictions().is_empty());
        assert_eq!(s.total_score(), 50);
        assert!(s.model_ready());
    }

    #[test]
    fn scores_accumulate_and_can_go_negative() {
        let mut s = predicting();
        let mut t = Instant::now();
        let shown_per_level = [Gesture::Paper, Gesture::Rock, Gesture::Scissors, Gesture::Paper, Gesture::Paper];
        let mut expected = 0;
        for (i, &g) in shown_per_level.iter().enumerate() {
            t = play_round(&mut s, g, t);
            expected += if g == LEVELS[i].required { 50 } else { -25 };
            assert_eq!(s.total_score(), expected);
            s.confirm();
        }
        assert_eq!(expected, 25);
        assert_eq!(s.state(), GameState::GameOver);
    }

    #[test]
    fn last_level_confirm_ends_game() {
        let mut s = predicting();
        let mut t = Instant::now();
        for i in 0..LEVELS.len() {
            t = play_round(&mut s, LEVELS[i].required, t);
            if i + 1 < LEVELS.len() {
                s.confirm();
                assert_eq!(s.state(), GameState::Predict);
            }
        }
        assert_eq!(s.level_index(), LEVELS.len() - 1);
        s.confirm();
        assert_eq!(s.state(), GameState::GameOver);
        assert_eq!(s.total_score(), 50 * LEVELS.len() as i32);
    }

    #[test]
    fn cancel_from_game_over_resets_everything() {
        let mut s = predicting();
        let mut t = Instant::now();
        for _ in 0..LEVELS.len() {
            t = play_round(&mut s, Gesture::Scissors, t);
            s.confirm();
        }
        assert_eq!(s.state(), GameState::GameOver);
        s.handle(SessionEvent::Key(Control::Cancel), t);
        assert_eq!(s.state(), GameState::Start);
        assert_eq!(s.total_score(), 0);
        assert_eq!(s.level_index(), 0);
        assert!(!s.has_classifier());
        assert!(!s.model_ready());
        assert!(s.last_frame().is_none());

        // Next game reacquires the classifier.
        s.confirm();
        assert_eq!(s.state(), GameState::LoadingModel);
        assert!(s.has_classifier());
    }

    #[test]
    fn predicted_event_records_frame() {
        let mut s = predicting();
        s.handle(
            SessionEvent::Classifier(ClassifierEvent::Predicted {
                frame: Frame::blank(2, 2, 1),
                predictions: shown("보", 0.2),
            }),
            Instant::now(),
        );
        assert_eq!(s.last_frame().map(|f| f.width), Some(2));
        assert_eq!(s.state(), GameState::Predict);
    }

    #[test]
    fn view_mirrors_controller() {
        let mut s = predicting();
        s.on_predictions(shown("가위", 0.99), Instant::now());
        let v = s.view();
        assert_eq!(v.state, GameState::Compare);
        assert_eq!(v.total_score, -25);
        assert_eq!(v.level().required, Gesture::Rock);
        assert!(v.library_ready);
    }
}
