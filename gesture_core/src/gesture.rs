//! Gestures, classifier labels and the confidence gate.
//!
//! A classifier reports one [`Prediction`] per class it knows.  The gate
//! picks the most probable one and turns it into a [`Gesture`] only when the
//! classifier is sure enough and the label names a real hand shape.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// Semantic result of classifying a hand shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    Rock,
    Paper,
    Scissors,
    /// No hand, or nothing recognisable.
    Neutral,
}

const ROCK_PATTERN:     &[usize] = &[8, 9, 10, 11];
const PAPER_PATTERN:    &[usize] = &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];
const SCISSORS_PATTERN: &[usize] = &[5, 6, 13, 14]; // V-shape

/// Classifier label → gesture.  Labels are the class names the model was
/// trained with.
const LABEL_GESTURES: &[(&str, Gesture)] = &[
    ("주먹", Gesture::Rock),
    ("가위", Gesture::Scissors),
    ("보",   Gesture::Paper),
];

impl Gesture {
    pub const ALL: [Gesture; 4] = [
        Gesture::Rock, Gesture::Paper, Gesture::Scissors, Gesture::Neutral,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Gesture::Rock     => "Rock",
            Gesture::Paper    => "Paper",
            Gesture::Scissors => "Scissors",
            Gesture::Neutral  => "Neutral",
        }
    }

    /// Grid columns lit to depict this gesture.
    pub fn pattern(self) -> &'static [usize] {
        match self {
            Gesture::Rock     => ROCK_PATTERN,
            Gesture::Paper    => PAPER_PATTERN,
            Gesture::Scissors => SCISSORS_PATTERN,
            Gesture::Neutral  => &[],
        }
    }

    /// Map a classifier label to a gesture.  Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Gesture> {
        LABEL_GESTURES.iter()
            .find(|(l, _)| *l == label)
            .map(|&(_, g)| g)
    }

    /// The classifier label trained for this gesture, if any.
    pub fn label(self) -> Option<&'static str> {
        LABEL_GESTURES.iter()
            .find(|(_, g)| *g == self)
            .map(|&(l, _)| l)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Prediction + gate
// ════════════════════════════════════════════════════════════════════════════

/// Probability that the current frame shows one class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(alias = "className")]
    pub label:       String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Prediction { label: label.into(), probability }
    }

    pub fn gesture(&self) -> Option<Gesture> {
        Gesture::from_label(&self.label)
    }
}

/// A prediction must be strictly above this to lock in a gesture.
pub const CONFIDENCE_THRESHOLD: f32 = 0.95;

/// Highest-probability prediction.  On ties the earliest one wins.
/// Non-finite probabilities never count.
pub fn top_prediction(predictions: &[Prediction]) -> Option<&Prediction> {
    let mut best: Option<&Prediction> = None;
    for p in predictions.iter().filter(|p| p.probability.is_finite()) {
        match best {
            Some(b) if p.probability <= b.probability => {}
            _ => best = Some(p),
        }
    }
    best
}

/// Run the confidence gate over one frame's predictions.
///
/// Returns the detected gesture only when the top prediction is above
/// [`CONFIDENCE_THRESHOLD`] and its label maps to Rock, Paper or Scissors.
pub fn select_gesture(predictions: &[Prediction]) -> Option<Gesture> {
    let top = top_prediction(predictions)?;
    if top.probability <= CONFIDENCE_THRESHOLD {
        return None;
    }
    match top.gesture()? {
        Gesture::Neutral => None,
        g => Some(g),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
