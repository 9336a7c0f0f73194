//! gesture_arena — interactive entry point.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gesture_arena::app::run;
use gesture_arena::config::{AppConfig, Cli};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gesture_arena=info")),
        )
        .init();

    let cfg: AppConfig = Cli::parse().into();
    info!(
        "gesture_arena v{} — model dir {}",
        env!("CARGO_PKG_VERSION"),
        cfg.capture.model_dir.display()
    );
    info!("Mode: keyboard simulation (hold R/P/S in the window to show a hand)");

    if let Err(e) = run(cfg) {
        error!("{}", e);
        std::process::exit(1);
    }
}
