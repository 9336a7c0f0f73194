//! Presentation layer: session view → what goes on screen.
//!
//! Everything here is a pure function of [`SessionView`].  The visualizer
//! only decides *where* and in which colour; *what* is lit is decided here.

use crate::gesture::{Gesture, Prediction};
use crate::level::{COLUMNS, LAYERS, LAYER_II_III, LAYER_IV, LAYER_V_VI};
use crate::round::is_empty;
use crate::state::{GameState, SessionView};

// ════════════════════════════════════════════════════════════════════════════
// Neural grid
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Idle,
    /// Goal pattern (layer IV, compare only).
    Stimulus,
    /// Wrong gesture's pattern (layer II/III).
    Error,
    /// Level pattern after a match (layer II/III).
    Success,
}

/// Nominal layer captions and the row they sit on.
pub const LAYER_LABELS: [(&str, usize); 4] = [
    ("Layer I",                 0),
    ("Layer II/III (Feedback)", LAYER_II_III),
    ("Layer IV (Goal Pattern)", LAYER_IV),
    ("Layer V/VI",              LAYER_V_VI),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    /// `cells[layer][column]`
    pub cells: [[Cell; COLUMNS]; LAYERS],
}

impl GridLayout {
    pub fn from_view(view: &SessionView<'_>) -> Self {
        let mut cells = [[Cell::Idle; COLUMNS]; LAYERS];

        if view.state == GameState::Compare {
            for &col in view.level().pattern {
                if col < COLUMNS {
                    cells[LAYER_IV][col] = Cell::Stimulus;
                }
            }
        }

        if !is_empty(view.error_grid) {
            for (col, &v) in view.error_grid.iter().enumerate() {
                if v == 1 { cells[LAYER_II_III][col] = Cell::Error; }
            }
        }
        if !is_empty(view.success_grid) {
            for (col, &v) in view.success_grid.iter().enumerate() {
                if v == 1 { cells[LAYER_II_III][col] = Cell::Success; }
            }
        }

        GridLayout { cells }
    }

    pub fn cell(&self, layer: usize, column: usize) -> Cell {
        self.cells[layer][column]
    }

    /// Columns of `layer` holding `kind`.
    pub fn columns_with(&self, layer: usize, kind: Cell) -> Vec<usize> {
        self.cells[layer].iter().enumerate()
            .filter(|(_, &c)| c == kind)
            .map(|(i, _)| i)
            .collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Probability bars
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarTier { High, Medium, Low }

impl BarTier {
    pub fn for_probability(p: f32) -> Self {
        if p > 0.9 {
            BarTier::High
        } else if p > 0.75 {
            BarTier::Medium
        } else {
            BarTier::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBar {
    pub caption:     String,
    pub probability: f32,
    pub percent:     u32,
    pub tier:        BarTier,
}

/// Live per-class bars.  Empty unless predicting with predictions in hand.
pub fn probability_bars(view: &SessionView<'_>) -> Vec<ProbabilityBar> {
    if view.state != GameState::Predict {
        return Vec::new();
    }
    view.predictions.iter().map(bar_for).collect()
}

fn bar_for(p: &Prediction) -> ProbabilityBar {
    let probability = p.probability.clamp(0.0, 1.0);
    // Unmapped classes are the "nothing shown" class for the player.
    let caption = p.gesture().unwrap_or(Gesture::Neutral).name().to_string();
    ProbabilityBar {
        caption,
        probability,
        percent: (probability * 100.0).round() as u32,
        tier:    BarTier::for_probability(probability),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HUD
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTone { Positive, Negative }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub level_name:  &'static str,
    pub hint:        Option<&'static str>,
    pub round_score: Option<(i32, ScoreTone)>,
    pub total_score: i32,
    /// Gesture the current level asks for.
    pub required:    Gesture,
}

impl Hud {
    pub fn from_view(view: &SessionView<'_>) -> Self {
        let level = view.level();
        let hint = match view.state {
            GameState::Predict | GameState::LoadingModel => Some(level.hint),
            _ => None,
        };
        let round_score = (view.state == GameState::Compare).then(|| {
            let tone = if view.round_score > 0 { ScoreTone::Positive } else { ScoreTone::Negative };
            (view.round_score, tone)
        });
        Hud {
            level_name: level.name,
            hint,
            round_score,
            total_score: view.total_score,
            required:    level.required,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
