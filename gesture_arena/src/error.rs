//! Error types for the arena.

use std::path::PathBuf;

use thiserror::Error;

/// Failures from a classifier backend: loading, camera, or inference.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("cannot read model metadata {path}: {source}")]
    MetadataIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model metadata {path}: {source}")]
    MetadataFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model metadata {0} lists no labels")]
    NoLabels(PathBuf),

    #[error("webcam error: {0}")]
    Webcam(String),

    #[error("prediction failed: {0}")]
    Predict(String),
}

/// Top-level application error.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_failure_is_the_only_fatal_error() {
        let err = AppError::from(minifb::Error::WindowCreate("no display".into()));
        let msg = err.to_string();
        assert!(msg.starts_with("window error: "), "{}", msg);
        assert!(msg.contains("no display"), "{}", msg);
        assert!(matches!(err, AppError::Window(_)));
    }

    #[test]
    fn classifier_errors_name_the_file() {
        let err = ClassifierError::NoLabels(PathBuf::from("model/metadata.json"));
        assert_eq!(err.to_string(), "model metadata model/metadata.json lists no labels");
    }
}
