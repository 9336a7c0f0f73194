//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┬──────────────┐
//! │  level name / hint / round score          TOTAL  50  │              │
//! ├──────────────────────────────────────────────────────┤   CAMERA     │
//! │  Layer I                                             │              │
//! │  Layer II/III  [error / success columns]             ├──────────────┤
//! │                                                      │  Rock   97%  │
//! │  Layer IV      [goal pattern while comparing]        │  ▇▇▇▇▇▇▇▇▇   │
//! │                                                      │  Paper   2%  │
//! │  Layer V/VI                                          │  ▏           │
//! ├──────────────────────────────────────────────────────┴──────────────┤
//! │  status title                                 subtitle              │
//! │  key legend                                                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use gesture_core::layout::{
    probability_bars, BarTier, Cell, GridLayout, Hud, ScoreTone, LAYER_LABELS,
};
use gesture_core::state::status_message;
use gesture_core::{GameState, Gesture, SessionView, COLUMNS, LAYERS};

use crate::classifier::Frame;
use crate::error::AppError;
use crate::session::Control;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 1060;
pub const WIN_H:       usize = 560;
const HUD_H:           usize = 52;
const TARGET_Y:        usize = 36;
const GRID_X:          usize = 12;
const GRID_Y:          usize = HUD_H + 12;
const CELL_W:          usize = 38;
const CELL_H:          usize = 46;
const GRID_W:          usize = CELL_W * COLUMNS;
const GRID_H:          usize = CELL_H * LAYERS;
const PANEL_X:         usize = GRID_X + GRID_W + 20;
const CAM_SIZE:        usize = 250;
const BARS_Y:          usize = GRID_Y + CAM_SIZE + 14;
const BAR_ROW_H:       usize = 34;
const STATUS_Y:        usize = WIN_H - 80;

const BG_COLOR:        u32   = 0xFF111827;
const HUD_BG:          u32   = 0xFF1F2937;
const LINE_COLOR:      u32   = 0xFF374151;
const CAM_BG:          u32   = 0xFF374151;
const STIMULUS_COLOR:  u32   = 0xFF22C55E;
const ERROR_COLOR:     u32   = 0xFFDC2626;
const SUCCESS_COLOR:   u32   = 0xFF22D3EE;
const TEXT_COLOR:      u32   = 0xFFE5E7EB;
const DIM_TEXT:        u32   = 0xFF9CA3AF;
const TITLE_COLOR:     u32   = 0xFFFACC15;
const HINT_COLOR:      u32   = 0xFFFDE047;
const POSITIVE_COLOR:  u32   = 0xFF4ADE80;
const NEGATIVE_COLOR:  u32   = 0xFFF87171;
const BAR_TRACK:       u32   = 0xFF4B5563;

// ════════════════════════════════════════════════════════════════════════════
// SimInput — raw input from the window
// ════════════════════════════════════════════════════════════════════════════

/// Input event from the visualizer window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    Key(Control),
    /// Hand held up to the simulated camera (`None` = lowered).
    Show(Option<Gesture>),
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:    Window,
    buf:       Vec<u32>,
    input_tx:  Sender<SimInput>,
    held:      Option<Gesture>,
    frame_no:  u64,
}

impl Visualizer {
    pub fn new(input_tx: Sender<SimInput>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Gesture Arena — Neural Layer Challenge",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            input_tx,
            held: None,
            frame_no: 0,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard state and translate it to [`SimInput`] events.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) {
            let _ = self.input_tx.send(SimInput::Quit);
            return false;
        }
        if pressed(Key::Enter) || pressed(Key::NumPadEnter) {
            let _ = self.input_tx.send(SimInput::Key(Control::Confirm));
        }
        if pressed(Key::Escape) {
            let _ = self.input_tx.send(SimInput::Key(Control::Cancel));
        }

        // The hand stays up while its key is held.
        let down = |k: Key| self.window.is_key_down(k);
        let pose = if down(Key::R) {
            Some(Gesture::Rock)
        } else if down(Key::P) {
            Some(Gesture::Paper)
        } else if down(Key::S) {
            Some(Gesture::Scissors)
        } else {
            None
        };
        if pose != self.held {
            self.held = pose;
            let _ = self.input_tx.send(SimInput::Show(pose));
        }

        true
    }

    /// Render one frame.
    pub fn render(&mut self, view: &SessionView<'_>, camera: Option<&Frame>) -> Result<(), AppError> {
        self.frame_no = self.frame_no.wrapping_add(1);
        self.buf.fill(BG_COLOR);

        self.draw_hud(&Hud::from_view(view));
        self.draw_grid(&GridLayout::from_view(view));
        self.draw_camera(view.state, camera);
        self.draw_bars(view);
        self.draw_status(view);

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H)?;
        Ok(())
    }

    /// 0.0–1.0 breathing value for pulsing elements.
    fn pulse(&self) -> f32 {
        0.5 + 0.5 * (self.frame_no as f32 * 0.12).sin()
    }

    // ── HUD ───────────────────────────────────────────────────────────────

    fn draw_hud(&mut self, hud: &Hud) {
        self.fill_rect(0, 0, WIN_W, HUD_H, HUD_BG);
        self.draw_text(hud.level_name, 12, 10, 3, 0xFFFFFFFF);

        if let Some(hint) = hud.hint {
            let c = blend(HINT_COLOR, HUD_BG, 0.5 * self.pulse());
            self.draw_text(hint, 12, 34, 2, c);
        }
        if let Some((score, tone)) = hud.round_score {
            let c = match tone {
                ScoreTone::Positive => POSITIVE_COLOR,
                ScoreTone::Negative => NEGATIVE_COLOR,
            };
            self.draw_text(&format!("Round Score: {}", score), 12, 34, 2, c);
        }

        let right = GRID_X + GRID_W;
        let total = format!("Total Score {}", hud.total_score);
        self.draw_text(&total, right.saturating_sub(text_width(&total, 3)), 12, 3, SUCCESS_COLOR);
        let target = target_caption(hud.required);
        self.draw_text(&target, right.saturating_sub(text_width(&target, 2)), TARGET_Y, 2, DIM_TEXT);
    }

    // ── Neural grid ───────────────────────────────────────────────────────

    fn draw_grid(&mut self, grid: &GridLayout) {
        let pulse = self.pulse();
        for layer in 0..LAYERS {
            for col in 0..COLUMNS {
                let color = match grid.cell(layer, col) {
                    Cell::Idle     => continue,
                    Cell::Stimulus => blend(STIMULUS_COLOR, BG_COLOR, 0.35 * pulse),
                    Cell::Error    => ERROR_COLOR,
                    Cell::Success  => SUCCESS_COLOR,
                };
                self.fill_rect(GRID_X + col * CELL_W, GRID_Y + layer * CELL_H, CELL_W, CELL_H, color);
            }
        }

        // Layer lines and column lines
        for i in 0..=LAYERS {
            self.fill_rect(GRID_X, GRID_Y + i * CELL_H, GRID_W, 1, LINE_COLOR);
        }
        for i in 1..COLUMNS {
            self.fill_rect(GRID_X + i * CELL_W, GRID_Y, 1, GRID_H, LINE_COLOR);
        }

        for (label, layer) in LAYER_LABELS {
            self.draw_text(label, GRID_X + 4, GRID_Y + layer * CELL_H + 4, 2, DIM_TEXT);
        }
    }

    // ── Camera panel ──────────────────────────────────────────────────────

    fn draw_camera(&mut self, state: GameState, camera: Option<&Frame>) {
        self.fill_rect(PANEL_X, GRID_Y, CAM_SIZE, CAM_SIZE, CAM_BG);
        match camera {
            Some(frame) if frame.width > 0 && frame.height > 0 => {
                // Nearest-neighbour scale into the square panel.
                for y in 0..CAM_SIZE {
                    let sy = (y * frame.height as usize / CAM_SIZE) as u32;
                    for x in 0..CAM_SIZE {
                        let sx = (x * frame.width as usize / CAM_SIZE) as u32;
                        if let Some(p) = frame.pixel(sx, sy) {
                            self.set_pixel(PANEL_X + x, GRID_Y + y, p);
                        }
                    }
                }
            }
            _ if state == GameState::LoadingModel => {
                let msg = "Starting camera...";
                let x = PANEL_X + (CAM_SIZE - text_width(msg, 2)) / 2;
                self.draw_text(msg, x, GRID_Y + CAM_SIZE / 2 - 5, 2, DIM_TEXT);
            }
            _ => {}
        }
    }

    // ── Probability bars ──────────────────────────────────────────────────

    fn draw_bars(&mut self, view: &SessionView<'_>) {
        let bar_w = CAM_SIZE;
        for (i, bar) in probability_bars(view).iter().enumerate() {
            let y = BARS_Y + i * BAR_ROW_H;
            if y + BAR_ROW_H > STATUS_Y { break; }

            self.draw_text(&bar.caption, PANEL_X, y, 2, 0xFFFFFFFF);
            let pct = format!("{}%", bar.percent);
            self.draw_text(&pct, PANEL_X + bar_w - text_width(&pct, 2), y, 2, DIM_TEXT);

            let color = match bar.tier {
                BarTier::High   => STIMULUS_COLOR,
                BarTier::Medium => 0xFFEAB308,
                BarTier::Low    => 0xFF6B7280,
            };
            self.fill_rect(PANEL_X, y + 16, bar_w, 8, BAR_TRACK);
            let fill = (bar_w as f32 * bar.probability) as usize;
            self.fill_rect(PANEL_X, y + 16, fill, 8, color);
        }
    }

    // ── Status line ───────────────────────────────────────────────────────

    fn draw_status(&mut self, view: &SessionView<'_>) {
        let msg = status_message(view);
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, HUD_BG);
        self.draw_text(&msg.title, 12, STATUS_Y + 14, 3, TITLE_COLOR);
        if let Some(sub) = &msg.subtitle {
            let c = blend(DIM_TEXT, HUD_BG, 0.6 * self.pulse());
            self.draw_text(sub, 12, STATUS_Y + 38, 2, c);
        }

        self.draw_label(
            "Enter=confirm  Esc=restart  hold R/P/S=show rock/paper/scissors  Q=quit",
            12, WIN_H - 12, 0xFF888888,
        );
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        self.draw_text(text, x, y, 1, color);
    }

    /// Minimal bitmap font — 3×5 glyphs, each font pixel drawn as a
    /// `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

/// Right-hand HUD line naming the gesture the level wants.
fn target_caption(required: Gesture) -> String {
    format!("Target: {}", required.name())
}

fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// Glyph for `c`.  Letters are case-folded; anything without a glyph
/// (including non-ASCII label text) draws as a hollow box.
fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        // Punctuation used by status lines, captions and load errors.
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '&' => [0b010, 0b101, 0b010, 0b101, 0b011],
        ' ' => [0b000; 5],
        _   => MISSING_GLYPH,
    }
}

const MISSING_GLYPH: [u8; 5] = [0b111, 0b101, 0b101, 0b101, 0b111];

/// Mix two opaque ARGB colours channel by channel; `t` = 0 keeps `a`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    [16u32, 8, 0].iter().fold(0xFF00_0000, |out, &shift| {
        let (ca, cb) = ((a >> shift) & 0xFF, (b >> shift) & 0xFF);
        let mixed = (ca as f32 + (cb as f32 - ca as f32) * t).round() as u32;
        out | (mixed.min(0xFF) << shift)
    })
}
