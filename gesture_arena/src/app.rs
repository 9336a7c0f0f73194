//! The main application loop.
//!
//! One thread drives everything the player sees: poll the window, feed keys
//! and classifier results to the [`SessionController`], fire the compare
//! timer, render.  Only the frame loop runs elsewhere.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::classifier::ClassifierBackend;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::session::{SessionController, SessionEvent};
use crate::sim::{SimBackend, SimHand};
use crate::visualizer::{SimInput, Visualizer};

/// What the run loop should do after draining input.
#[derive(Debug, PartialEq, Eq)]
enum Flow { Continue, Quit }

/// Apply every pending window input to the session and the simulated hand.
fn drain_inputs(
    rx:      &Receiver<SimInput>,
    session: &mut SessionController,
    hand:    &SimHand,
    now:     Instant,
) -> Flow {
    loop {
        match rx.try_recv() {
            Ok(SimInput::Quit) => return Flow::Quit,
            Ok(SimInput::Key(k)) => session.handle(SessionEvent::Key(k), now),
            Ok(SimInput::Show(pose)) => {
                debug!(?pose, "simulated hand");
                hand.show(pose);
            }
            Err(TryRecvError::Empty)        => return Flow::Continue,
            Err(TryRecvError::Disconnected) => return Flow::Quit,
        }
    }
}

/// Run the full application.
///
/// Creates the visualizer, the simulation backend and the session, and
/// drives the event/render loop at ~60 fps until the window closes.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let (input_tx, input_rx) = mpsc::channel::<SimInput>();
    let mut vis = Visualizer::new(input_tx)?;

    let hand = SimHand::new();
    let backend: Arc<dyn ClassifierBackend> = Arc::new(SimBackend::new(hand.clone()));
    let mut session = SessionController::new(Arc::clone(&backend), cfg.capture);
    let mut library_announced = false;

    info!("gesture arena started");

    while vis.is_open() {
        // 1. Poll window input → SimInput
        if !vis.poll_input() { break; }

        let now = Instant::now();

        // 2. The runtime may come up after the window does.
        if !library_announced && backend.is_ready() {
            library_announced = true;
            session.handle(SessionEvent::LibraryReady, now);
        }

        // 3. Keys and hand poses
        if drain_inputs(&input_rx, &mut session, &hand, now) == Flow::Quit {
            break;
        }

        // 4. Classifier results, then the compare timer
        session.pump(now);
        session.handle(SessionEvent::Tick, now);

        // 5. Render
        vis.render(&session.view(), session.last_frame())?;
    }

    info!(total = session.total_score(), "gesture arena closed");
    Ok(())
}
