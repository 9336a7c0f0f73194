//! # gesture_core
//!
//! The pure half of the gesture challenge: what a gesture is, which levels
//! exist, how a round is scored, and how a session is laid out on the
//! neural grid.  Nothing in this crate touches a window, a camera or a
//! thread.
//!
//! ## Levels
//!
//! | # | Name | Required | Goal pattern |
//! |---|---|---|---|
//! | 0 | Round 1: The Rock | Rock | 8–11 |
//! | 1 | Round 2: The Paper | Paper | 4–15 |
//! | 2 | Round 3: The Scissors | Scissors | 5, 6, 13, 14 |
//! | 3 | Round 4: Rock Again | Rock | 8–11 |
//! | 4 | Round 5: Final Challenge - Paper | Paper | 4–15 |
//!
//! ## Scoring
//!
//! The first confident prediction of a round locks in the player's choice.
//! A match is worth `+50` and lights the level's pattern on the feedback
//! layer in the success colour; a miss costs `-25` and lights the pattern of
//! the gesture that was *shown* in the error colour.
//!
//! ## Grid
//!
//! `COLUMNS` columns by `LAYERS` layers.  Layer II/III carries feedback,
//! layer IV shows the goal pattern while results are being compared.

pub mod gesture;
pub mod level;
pub mod round;
pub mod state;
pub mod layout;

pub use gesture::{Gesture, Prediction, select_gesture, top_prediction, CONFIDENCE_THRESHOLD};
pub use level::{Level, LEVELS, COLUMNS, LAYERS, COMPARE_DURATION};
pub use round::{ColumnMask, RoundOutcome, score_round, CORRECT_SCORE, WRONG_SCORE};
pub use state::{GameState, SessionView, StatusMessage, status_message};
pub use layout::{Cell, GridLayout, Hud, ProbabilityBar, BarTier, probability_bars};
