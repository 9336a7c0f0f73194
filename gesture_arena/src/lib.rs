//! # gesture_arena
//!
//! Rock/paper/scissors against a neural grid.  A classifier watches the
//! camera; the first confident gesture of each round is locked in and scored
//! against the level's target, and the result lights up the grid.
//!
//! ## Session flow
//!
//! | State | Leaves on | Goes to |
//! |---|---|---|
//! | START | `Enter` (classifier runtime ready) | LOADING_MODEL, or PREDICT if a model is loaded |
//! | LOADING_MODEL | model + camera ready | PREDICT |
//! | PREDICT | confident Rock / Paper / Scissors | COMPARE |
//! | COMPARE | 3 s elapsed | LEVEL_CLEAR |
//! | LEVEL_CLEAR | `Enter` | PREDICT (next level) or GAME_OVER |
//! | GAME_OVER | `Esc` | START (camera released, scores reset) |
//!
//! ## Simulation keyboard shortcuts
//!
//! The bundled backend simulates the camera and model.  Hold a key to show
//! a hand shape:
//!
//! | Key | Hand |
//! |---|---|
//! | `R` | Rock |
//! | `P` | Paper |
//! | `S` | Scissors |
//! | `Enter` | Confirm |
//! | `Escape` | Restart (from GAME_OVER) |
//! | `Q` | Quit |

pub mod error;
pub mod config;
pub mod classifier;
pub mod sim;
pub mod frame_loop;
pub mod session;
pub mod visualizer;
pub mod app;
