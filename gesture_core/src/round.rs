//! Round scoring.

use crate::gesture::Gesture;
use crate::level::{Level, COLUMNS};

pub const CORRECT_SCORE: i32 = 50;
pub const WRONG_SCORE:   i32 = -25;

/// One 0/1 indicator per grid column.
pub type ColumnMask = [u8; COLUMNS];

/// Build a mask with `pattern`'s columns set.  Out-of-range columns are
/// dropped.
pub fn mask_of(pattern: &[usize]) -> ColumnMask {
    let mut mask = [0u8; COLUMNS];
    for &col in pattern {
        if let Some(cell) = mask.get_mut(col) {
            *cell = 1;
        }
    }
    mask
}

pub fn is_empty(mask: &ColumnMask) -> bool {
    mask.iter().all(|&c| c == 0)
}

/// Columns set in `mask`, ascending.
pub fn lit_columns(mask: &ColumnMask) -> Vec<usize> {
    mask.iter().enumerate()
        .filter(|(_, &c)| c != 0)
        .map(|(i, _)| i)
        .collect()
}

/// The result of locking in one gesture against a level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundOutcome {
    pub detected:     Gesture,
    pub score:        i32,
    pub error_grid:   ColumnMask,
    pub success_grid: ColumnMask,
}

impl RoundOutcome {
    pub fn is_success(&self) -> bool {
        self.score > 0
    }
}

/// Score `detected` against `level`.
pub fn score_round(level: &Level, detected: Gesture) -> RoundOutcome {
    if detected == level.required {
        RoundOutcome {
            detected,
            score:        CORRECT_SCORE,
            error_grid:   [0; COLUMNS],
            success_grid: mask_of(level.pattern),
        }
    } else {
        RoundOutcome {
            detected,
            score:        WRONG_SCORE,
            error_grid:   mask_of(detected.pattern()),
            success_grid: [0; COLUMNS],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LEVELS;

    #[test]
    fn correct_gesture_lights_level_pattern() {
        for l in LEVELS {
            let out = score_round(l, l.required);
            assert_eq!(out.score, 50);
            assert_eq!(lit_columns(&out.success_grid), l.pattern);
            assert!(is_empty(&out.error_grid));
        }
    }

    #[test]
    fn wrong_gesture_lights_shown_pattern() {
        for l in LEVELS {
            for g in Gesture::ALL.into_iter().filter(|&g| g != l.required) {
                let out = score_round(l, g);
                assert_eq!(out.score, -25);
                assert_eq!(lit_columns(&out.error_grid), g.pattern());
                assert!(is_empty(&out.success_grid));
            }
        }
    }

    #[test]
    fn scissors_on_rock_level() {
        let out = score_round(&LEVELS[0], Gesture::Scissors);
        assert_eq!(lit_columns(&out.error_grid), vec![5, 6, 13, 14]);
        assert!(!out.is_success());
    }

    #[test]
    fn mask_drops_out_of_range_columns() {
        let m = mask_of(&[0, 19, 20, 400]);
        assert_eq!(lit_columns(&m), vec![0, 19]);
    }
}
