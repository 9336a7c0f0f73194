//! The level table and grid dimensions.

use std::time::Duration;

use crate::gesture::Gesture;

/// Columns in the neural grid.
pub const COLUMNS: usize = 20;
/// Layers (rows) in the neural grid.
pub const LAYERS: usize = 6;

/// Feedback layer: error / success indicators.
pub const LAYER_II_III: usize = 1;
/// Stimulus layer: the goal pattern, shown while comparing.
pub const LAYER_IV: usize = 3;
/// Bottom layer.  Labelled, never lit.
pub const LAYER_V_VI: usize = 5;

/// How long results stay on screen before the round is cleared.
pub const COMPARE_DURATION: Duration = Duration::from_millis(3000);

/// One challenge: show `required` to match `pattern`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Level {
    pub name:     &'static str,
    pub hint:     &'static str,
    pub pattern:  &'static [usize],
    pub required: Gesture,
}

impl Level {
    const fn new(name: &'static str, hint: &'static str, required: Gesture, pattern: &'static [usize]) -> Self {
        Level { name, hint, pattern, required }
    }
}

pub const LEVELS: &[Level] = &[
    Level::new("Round 1: The Rock",                "Show me a 'Rock'",          Gesture::Rock,     &[8, 9, 10, 11]),
    Level::new("Round 2: The Paper",               "Show me 'Paper'",           Gesture::Paper,    &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]),
    Level::new("Round 3: The Scissors",            "Show me 'Scissors'",        Gesture::Scissors, &[5, 6, 13, 14]),
    Level::new("Round 4: Rock Again",              "A solid 'Rock' is needed.", Gesture::Rock,     &[8, 9, 10, 11]),
    Level::new("Round 5: Final Challenge - Paper", "Cover it all with 'Paper'", Gesture::Paper,    &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]),
];

/// Level at `index`, falling back to the first level when out of range.
pub fn level(index: usize) -> &'static Level {
    LEVELS.get(index).unwrap_or(&LEVELS[0])
}

pub fn is_last(index: usize) -> bool {
    index + 1 >= LEVELS.len()
}
