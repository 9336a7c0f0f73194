//! Game states, the read-only session view, and the status line.

use std::fmt;

use crate::gesture::Prediction;
use crate::level::{self, Level};
use crate::round::ColumnMask;

/// Where the session is in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    Start,
    LoadingModel,
    Predict,
    Compare,
    LevelClear,
    GameOver,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameState::Start        => "START",
            GameState::LoadingModel => "LOADING_MODEL",
            GameState::Predict      => "PREDICT",
            GameState::Compare      => "COMPARE",
            GameState::LevelClear   => "LEVEL_CLEAR",
            GameState::GameOver     => "GAME_OVER",
        };
        f.write_str(s)
    }
}

/// Snapshot of everything the presentation layer may look at.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub state:         GameState,
    pub level_index:   usize,
    pub total_score:   i32,
    pub round_score:   i32,
    pub error_grid:    &'a ColumnMask,
    pub success_grid:  &'a ColumnMask,
    pub predictions:   &'a [Prediction],
    pub library_ready: bool,
    pub load_error:    Option<&'a str>,
}

impl SessionView<'_> {
    pub fn level(&self) -> &'static Level {
        level::level(self.level_index)
    }
}

/// Two-part status line under the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub title:    String,
    pub subtitle: Option<String>,
}

impl StatusMessage {
    fn new(title: &str, subtitle: Option<&str>) -> Self {
        StatusMessage {
            title:    title.to_string(),
            subtitle: subtitle.map(str::to_string),
        }
    }
}

pub fn status_message(view: &SessionView<'_>) -> StatusMessage {
    match view.state {
        GameState::Start if !view.library_ready =>
            StatusMessage::new("Initializing AI Libraries...", Some("Please wait.")),
        GameState::Start =>
            StatusMessage::new("Welcome to the AI Gesture Challenge!", Some("Press [ENTER] to Begin")),
        GameState::LoadingModel => match view.load_error {
            Some(err) => StatusMessage {
                title:    format!("Could not start the AI model: {}", err),
                subtitle: Some("Press [ENTER] to retry".to_string()),
            },
            None => StatusMessage::new("Loading AI Model & Webcam...", Some("Please wait a moment.")),
        },
        GameState::Predict =>
            StatusMessage::new("Show Your Hand to the Camera", Some("The AI will lock in your choice automatically.")),
        GameState::Compare =>
            StatusMessage::new("Comparing Results...", None),
        GameState::LevelClear =>
            StatusMessage::new("Round Clear!", Some("Press [ENTER] for the Next Challenge")),
        GameState::GameOver =>
            StatusMessage::new("All Challenges Complete!", Some("Press [ESC] to play again.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::COLUMNS;

    const EMPTY: ColumnMask = [0; COLUMNS];

    fn view(state: GameState) -> SessionView<'static> {
        SessionView {
            state,
            level_index:   0,
            total_score:   0,
            round_score:   0,
            error_grid:    &EMPTY,
            success_grid:  &EMPTY,
            predictions:   &[],
            library_ready: true,
            load_error:    None,
        }
    }

    #[test]
    fn start_waits_for_library() {
        let mut v = view(GameState::Start);
        v.library_ready = false;
        assert_eq!(status_message(&v).title, "Initializing AI Libraries...");
        v.library_ready = true;
        assert_eq!(status_message(&v).subtitle.as_deref(), Some("Press [ENTER] to Begin"));
    }

    #[test]
    fn compare_has_no_subtitle() {
        assert_eq!(status_message(&view(GameState::Compare)).subtitle, None);
    }

    #[test]
    fn load_failure_offers_retry() {
        let mut v = view(GameState::LoadingModel);
        v.load_error = Some("metadata.json missing");
        let m = status_message(&v);
        assert!(m.title.contains("metadata.json missing"));
        assert_eq!(m.subtitle.as_deref(), Some("Press [ENTER] to retry"));
    }

    #[test]
    fn display_uses_screaming_case() {
        assert_eq!(GameState::LevelClear.to_string(), "LEVEL_CLEAR");
    }
}
