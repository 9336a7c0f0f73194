//! Simulation backend — a keyboard-driven hand in front of a virtual camera.
//!
//! The visualizer sets a [`SimHand`] when a gesture key is held.  The
//! [`SimWebcam`] paints that hand as lit column bands (the same shapes the
//! neural grid uses), and the [`SimModel`] classifies a frame by matching its
//! lit columns against each label's pattern.  No hardware and no weights are
//! needed, but frames still flow through the full camera → model → gate path.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::debug;

use gesture_core::{Gesture, Prediction, COLUMNS};

use crate::classifier::{ClassifierBackend, Frame, Model, ModelMetadata, Webcam};
use crate::error::ClassifierError;

const BACKDROP:  u32 = 0xFF202028;
const SKIN:      u32 = 0xFFE0B48C;
/// Mean channel value above which a sampled pixel counts as "hand".
const LIT_LEVEL: u32 = 96;
/// Softmax sharpness over template similarity.
const SHARPNESS: f32 = 10.0;

// ════════════════════════════════════════════════════════════════════════════
// SimHand
// ════════════════════════════════════════════════════════════════════════════

/// The gesture currently held up to the simulated camera.
#[derive(Clone, Debug, Default)]
pub struct SimHand {
    pose: Arc<Mutex<Option<Gesture>>>,
}

impl SimHand {
    pub fn new() -> Self { Self::default() }

    pub fn show(&self, gesture: Option<Gesture>) {
        *self.pose.lock().unwrap_or_else(|e| e.into_inner()) = gesture;
    }

    pub fn pose(&self) -> Option<Gesture> {
        *self.pose.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimWebcam
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CamState { Closed, Ready, Playing, Stopped }

pub struct SimWebcam {
    width:    u32,
    height:   u32,
    mirrored: bool,
    hand:     SimHand,
    state:    CamState,
    frame:    Frame,
}

impl SimWebcam {
    pub fn new(width: u32, height: u32, mirrored: bool, hand: SimHand) -> Self {
        SimWebcam {
            width,
            height,
            mirrored,
            hand,
            state: CamState::Closed,
            frame: Frame::blank(width, height, BACKDROP),
        }
    }

    pub fn is_playing(&self) -> bool { self.state == CamState::Playing }

    fn render(&mut self, pose: Option<Gesture>) {
        self.frame.pixels.fill(BACKDROP);
        let Some(g) = pose else { return };

        let (w, h) = (self.width as usize, self.height as usize);
        let (top, bottom) = (h / 5, h - h / 5);
        for &col in g.pattern() {
            let col = if self.mirrored { COLUMNS - 1 - col } else { col };
            let x0 = col * w / COLUMNS;
            let x1 = ((col + 1) * w / COLUMNS).max(x0 + 1).min(w);
            for row in top..bottom {
                self.frame.pixels[row * w + x0..row * w + x1].fill(SKIN);
            }
        }
    }
}

impl Webcam for SimWebcam {
    fn setup(&mut self) -> Result<(), ClassifierError> {
        if self.width == 0 || self.height == 0 {
            return Err(ClassifierError::Webcam(format!(
                "invalid capture size {}x{}", self.width, self.height
            )));
        }
        self.state = CamState::Ready;
        Ok(())
    }

    fn play(&mut self) -> Result<(), ClassifierError> {
        match self.state {
            CamState::Ready | CamState::Playing => {
                self.state = CamState::Playing;
                Ok(())
            }
            s => Err(ClassifierError::Webcam(format!("play() in state {:?}", s))),
        }
    }

    fn update(&mut self) {
        if self.state != CamState::Playing { return; }
        let pose = self.hand.pose();
        self.render(pose);
    }

    fn stop(&mut self) {
        self.state = CamState::Stopped;
    }

    fn frame(&self) -> Frame {
        self.frame.clone()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimModel
// ════════════════════════════════════════════════════════════════════════════

/// Template matcher over column bands.
pub struct SimModel {
    labels:    Vec<String>,
    templates: Vec<[bool; COLUMNS]>,
}

impl SimModel {
    pub fn from_labels(labels: Vec<String>) -> Self {
        let templates = labels.iter()
            .map(|l| {
                let mut t = [false; COLUMNS];
                let pattern = Gesture::from_label(l).map(Gesture::pattern).unwrap_or(&[]);
                for &c in pattern { t[c] = true; }
                t
            })
            .collect();
        SimModel { labels, templates }
    }

    /// Which bands of `frame` contain hand pixels.
    fn lit_bands(frame: &Frame) -> [bool; COLUMNS] {
        let mut lit = [false; COLUMNS];
        if frame.width == 0 || frame.height == 0 { return lit; }
        let y = frame.height / 2;
        for (col, band) in lit.iter_mut().enumerate() {
            let x = ((2 * col as u64 + 1) * frame.width as u64 / (2 * COLUMNS as u64)) as u32;
            if let Some(p) = frame.pixel(x, y) {
                let mean = (((p >> 16) & 0xFF) + ((p >> 8) & 0xFF) + (p & 0xFF)) / 3;
                *band = mean > LIT_LEVEL;
            }
        }
        lit
    }
}

/// Jaccard similarity; two empty sets are identical.
fn similarity(a: &[bool; COLUMNS], b: &[bool; COLUMNS]) -> f32 {
    let inter = a.iter().zip(b).filter(|(x, y)| **x && **y).count();
    let union = a.iter().zip(b).filter(|(x, y)| **x || **y).count();
    if union == 0 { 1.0 } else { inter as f32 / union as f32 }
}

impl Model for SimModel {
    fn labels(&self) -> &[String] { &self.labels }

    fn predict(&mut self, frame: &Frame) -> Result<Vec<Prediction>, ClassifierError> {
        if frame.pixels.len() != frame.width as usize * frame.height as usize {
            return Err(ClassifierError::Predict(format!(
                "frame is {}x{} but holds {} pixels", frame.width, frame.height, frame.pixels.len()
            )));
        }
        let lit = Self::lit_bands(frame);
        let weights: Vec<f32> = self.templates.iter()
            .map(|t| (SHARPNESS * similarity(&lit, t)).exp())
            .collect();
        let total: f32 = weights.iter().sum();
        Ok(self.labels.iter().zip(weights)
            .map(|(l, w)| Prediction::new(l.clone(), w / total))
            .collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimBackend
// ════════════════════════════════════════════════════════════════════════════

/// Backend wiring a [`SimHand`] into simulated models and cameras.
#[derive(Clone, Debug, Default)]
pub struct SimBackend {
    hand: SimHand,
}

impl SimBackend {
    pub fn new(hand: SimHand) -> Self { SimBackend { hand } }
}

impl ClassifierBackend for SimBackend {
    fn is_ready(&self) -> bool { true }

    fn load(&self, model_path: &Path, metadata_path: &Path) -> Result<Box<dyn Model>, ClassifierError> {
        let meta = ModelMetadata::from_file(metadata_path)?;
        debug!(
            model = %model_path.display(),
            name = meta.model_name.as_deref().unwrap_or("unnamed"),
            labels = meta.labels.len(),
            "simulated model loaded"
        );
        Ok(Box::new(SimModel::from_labels(meta.labels)))
    }

    fn webcam(&self, width: u32, height: u32, mirrored: bool) -> Box<dyn Webcam> {
        Box::new(SimWebcam::new(width, height, mirrored, self.hand.clone()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
