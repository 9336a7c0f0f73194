//! Classifier collaborator — the seam between the game and whatever model
//! and camera sit behind it.
//!
//! The session never sees a concrete model.  It asks a
//! [`ClassifierBackend`] for a [`Model`] and a [`Webcam`], and from then on
//! only exchanges [`Frame`]s and [`Prediction`]s with them.  The simulation
//! backend in [`crate::sim`] is one implementation; tests use others.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use gesture_core::Prediction;

use crate::error::ClassifierError;

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// One captured camera image, packed ARGB, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width:  u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl Frame {
    pub fn blank(width: u32, height: u32, color: u32) -> Self {
        Frame { width, height, pixels: vec![color; width as usize * height as usize] }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height { return None; }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Traits
// ════════════════════════════════════════════════════════════════════════════

/// A loaded image classifier.
pub trait Model: Send {
    /// Class names, in output order.
    fn labels(&self) -> &[String];

    /// One prediction per class for `frame`.
    fn predict(&mut self, frame: &Frame) -> Result<Vec<Prediction>, ClassifierError>;
}

/// A camera handle.  `setup` then `play` before `update`/`frame`.
pub trait Webcam: Send {
    fn setup(&mut self) -> Result<(), ClassifierError>;
    fn play(&mut self) -> Result<(), ClassifierError>;
    /// Grab the next image from the device.
    fn update(&mut self);
    fn stop(&mut self);
    /// Most recently grabbed image.
    fn frame(&self) -> Frame;
}

/// Factory for models and cameras.
pub trait ClassifierBackend: Send + Sync {
    /// True once the backend's runtime is usable.
    fn is_ready(&self) -> bool;

    fn load(&self, model_path: &Path, metadata_path: &Path) -> Result<Box<dyn Model>, ClassifierError>;

    fn webcam(&self, width: u32, height: u32, mirrored: bool) -> Box<dyn Webcam>;
}

// ════════════════════════════════════════════════════════════════════════════
// Metadata
// ════════════════════════════════════════════════════════════════════════════

/// `metadata.json` written next to an exported image model.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub labels:     Vec<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub image_size: Option<u32>,
}

impl ModelMetadata {
    pub fn from_file(path: &Path) -> Result<Self, ClassifierError> {
        let text = fs::read_to_string(path).map_err(|source| ClassifierError::MetadataIo {
            path: path.to_path_buf(),
            source,
        })?;
        let meta: ModelMetadata = serde_json::from_str(&text).map_err(|source| {
            ClassifierError::MetadataFormat { path: path.to_path_buf(), source }
        })?;
        if meta.labels.is_empty() {
            return Err(ClassifierError::NoLabels(path.to_path_buf()));
        }
        Ok(meta)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CaptureConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where the model lives and how the camera is opened.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub model_dir:      PathBuf,
    pub width:          u32,
    pub height:         u32,
    pub mirrored:       bool,
    pub frame_interval: Duration,
}

impl CaptureConfig {
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join("model.json")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.model_dir.join("metadata.json")
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            model_dir:      PathBuf::from("model"),
            width:          250,
            height:         250,
            mirrored:       true,
            frame_interval: Duration::from_millis(16),
        }
    }
}
