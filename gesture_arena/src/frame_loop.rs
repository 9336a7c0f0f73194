//! Capture/predict thread.
//!
//! The loop acquires the model and camera, then grabs a frame and classifies
//! it once per `frame_interval` until told to stop.  Results go back to the
//! session as [`ClassifierEvent`]s; the session talks to the loop only with
//! [`LoopCommand`]s.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, trace, warn};

use gesture_core::Prediction;

use crate::classifier::{CaptureConfig, ClassifierBackend, Frame, Model, Webcam};

// ════════════════════════════════════════════════════════════════════════════
// Messages
// ════════════════════════════════════════════════════════════════════════════

/// Sent to the loop thread.
pub enum LoopCommand {
    /// Stop capturing, release the camera, and exit.
    Stop,
}

/// Sent back from the loop thread.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassifierEvent {
    /// Model loaded and camera playing.
    Ready { labels: Vec<String> },
    /// Acquisition failed; the loop has exited.
    Failed(String),
    /// One classified frame.
    Predicted { frame: Frame, predictions: Vec<Prediction> },
}

// ════════════════════════════════════════════════════════════════════════════
// FrameLoop — handle to the thread
// ════════════════════════════════════════════════════════════════════════════

/// Handle to a running capture loop.  Dropping it stops the loop.
pub struct FrameLoop {
    cmd_tx:   Sender<LoopCommand>,
    event_rx: Receiver<ClassifierEvent>,
    handle:   Option<JoinHandle<()>>,
}

impl FrameLoop {
    /// Spawn the loop.  Acquisition happens on the new thread, so this
    /// returns immediately.
    pub fn spawn(backend: Arc<dyn ClassifierBackend>, capture: CaptureConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();
        let (event_tx, event_rx) = mpsc::channel::<ClassifierEvent>();

        let handle = thread::Builder::new()
            .name("frame-loop".into())
            .spawn(move || loop_thread(backend.as_ref(), &capture, cmd_rx, event_tx));

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                // Nothing will ever answer; surface it the same way as a
                // failed load so the session can offer a retry.
                error!("cannot spawn frame loop: {}", e);
                let (tx, rx) = mpsc::channel();
                let _ = tx.send(ClassifierEvent::Failed(e.to_string()));
                return FrameLoop { cmd_tx, event_rx: rx, handle: None };
            }
        };

        FrameLoop { cmd_tx, event_rx, handle }
    }

    /// Drain pending events (non-blocking).
    pub fn drain_events(&self) -> Vec<ClassifierEvent> {
        let mut out = Vec::new();
        while let Ok(e) = self.event_rx.try_recv() { out.push(e); }
        out
    }

    /// Stop the loop and wait for it to release the camera.
    pub fn stop(mut self) {
        let _ = self.cmd_tx.send(LoopCommand::Stop);
        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                warn!("frame loop panicked");
            }
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(LoopCommand::Stop);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// loop_thread — the actual loop
// ════════════════════════════════════════════════════════════════════════════

fn loop_thread(
    backend:  &dyn ClassifierBackend,
    capture:  &CaptureConfig,
    cmd_rx:   Receiver<LoopCommand>,
    event_tx: Sender<ClassifierEvent>,
) {
    let (mut model, mut webcam) = match acquire(backend, capture) {
        Ok(pair) => pair,
        Err(msg) => {
            error!("error initializing classifier: {}", msg);
            let _ = event_tx.send(ClassifierEvent::Failed(msg));
            return;
        }
    };

    // A stop may have arrived while we were loading.
    if !matches!(cmd_rx.try_recv(), Err(TryRecvError::Empty)) {
        webcam.stop();
        return;
    }

    info!(labels = model.labels().len(), "classifier ready");
    if event_tx.send(ClassifierEvent::Ready { labels: model.labels().to_vec() }).is_err() {
        webcam.stop();
        return;
    }

    let mut frames: u64 = 0;
    loop {
        webcam.update();
        let frame = webcam.frame();
        match model.predict(&frame) {
            Ok(predictions) => {
                frames += 1;
                trace!(frames, "frame classified");
                if event_tx.send(ClassifierEvent::Predicted { frame, predictions }).is_err() {
                    break;
                }
            }
            Err(e) => warn!("skipping frame: {}", e),
        }

        match cmd_rx.recv_timeout(capture.frame_interval) {
            Ok(LoopCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    webcam.stop();
    debug!(frames, "frame loop stopped");
}

fn acquire(
    backend: &dyn ClassifierBackend,
    capture: &CaptureConfig,
) -> Result<(Box<dyn Model>, Box<dyn Webcam>), String> {
    let model = backend
        .load(&capture.model_path(), &capture.metadata_path())
        .map_err(|e| e.to_string())?;

    let mut webcam = backend.webcam(capture.width, capture.height, capture.mirrored);
    webcam.setup().map_err(|e| e.to_string())?;
    webcam.play().map_err(|e| e.to_string())?;
    Ok((model, webcam))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use gesture_core::Gesture;

    use crate::sim::{SimBackend, SimHand};

    fn capture(dir: &std::path::Path) -> CaptureConfig {
        CaptureConfig {
            model_dir:      dir.to_path_buf(),
            width:          40,
            height:         40,
            mirrored:       true,
            frame_interval: Duration::from_millis(2),
        }
    }

    fn model_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("metadata.json"), r#"{"labels":["주먹","가위","보","없음"]}"#).unwrap();
        dir
    }

    /// Poll until `pred` matches an event or two seconds pass.
    fn wait_for(fl: &FrameLoop, pred: impl Fn(&ClassifierEvent) -> bool) -> Option<ClassifierEvent> {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if let Some(e) = fl.drain_events().into_iter().find(|e| pred(e)) {
                return Some(e);
            }
            thread::sleep(Duration::from_millis(2));
        }
        None
    }

    #[test]
    fn reports_ready_then_predictions() {
        let dir = model_dir();
        let hand = SimHand::new();
        hand.show(Some(Gesture::Scissors));
        let fl = FrameLoop::spawn(Arc::new(SimBackend::new(hand)), capture(dir.path()));

        let ready = wait_for(&fl, |e| matches!(e, ClassifierEvent::Ready { .. }));
        assert_eq!(ready, Some(ClassifierEvent::Ready {
            labels: vec!["주먹".into(), "가위".into(), "보".into(), "없음".into()],
        }));

        let got = wait_for(&fl, |e| matches!(e, ClassifierEvent::Predicted { .. }));
        match got {
            Some(ClassifierEvent::Predicted { predictions, frame }) => {
                assert_eq!(frame.width, 40);
                assert_eq!(gesture_core::select_gesture(&predictions), Some(Gesture::Scissors));
            }
            other => panic!("expected predictions, got {:?}", other),
        }
        fl.stop();
    }

    #[test]
    fn missing_model_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let fl = FrameLoop::spawn(Arc::new(SimBackend::default()), capture(dir.path()));
        let failed = wait_for(&fl, |e| matches!(e, ClassifierEvent::Failed(_)));
        assert!(matches!(failed, Some(ClassifierEvent::Failed(msg)) if msg.contains("metadata")));
        fl.stop();
    }

    #[test]
    fn stop_ends_the_stream() {
        let dir = model_dir();
        let fl = FrameLoop::spawn(Arc::new(SimBackend::default()), capture(dir.path()));
        assert!(wait_for(&fl, |e| matches!(e, ClassifierEvent::Ready { .. })).is_some());
        let _ = fl.cmd_tx.send(LoopCommand::Stop);
        if let Some(h) = fl.handle.as_ref() {
            let deadline = Instant::now() + Duration::from_secs(2);
            while !h.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(2));
            }
            assert!(h.is_finished());
        }
    }
}
