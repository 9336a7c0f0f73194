//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::classifier::CaptureConfig;

#[derive(Parser, Debug)]
#[command(name = "gesture_arena", version, about = "Rock/paper/scissors gesture challenge on a neural grid")]
pub struct Cli {
    /// Directory holding model.json and metadata.json
    #[arg(long, default_value = "model")]
    pub model_dir: PathBuf,

    /// Camera frame width in pixels
    #[arg(long, default_value_t = 250)]
    pub width: u32,

    /// Camera frame height in pixels
    #[arg(long, default_value_t = 250)]
    pub height: u32,

    /// Do not mirror the camera image
    #[arg(long)]
    pub no_mirror: bool,

    /// Milliseconds between captured frames
    #[arg(long, default_value_t = 16)]
    pub frame_ms: u64,
}

/// Configuration for the full application.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub capture: CaptureConfig,
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        AppConfig {
            capture: CaptureConfig {
                model_dir:      cli.model_dir,
                width:          cli.width.max(1),
                height:         cli.height.max(1),
                mirrored:       !cli.no_mirror,
                frame_interval: Duration::from_millis(cli.frame_ms.max(1)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let from_cli: AppConfig = Cli::parse_from(["gesture_arena"]).into();
        let default = AppConfig::default();
        assert_eq!(from_cli.capture.model_dir, default.capture.model_dir);
        assert_eq!(from_cli.capture.width, 250);
        assert_eq!(from_cli.capture.height, 250);
        assert!(from_cli.capture.mirrored);
        assert_eq!(from_cli.capture.frame_interval, default.capture.frame_interval);
    }

    #[test]
    fn flags_override_capture() {
        let cfg: AppConfig = Cli::parse_from([
            "gesture_arena", "--model-dir", "/tmp/m", "--no-mirror", "--width", "320", "--frame-ms", "0",
        ]).into();
        assert_eq!(cfg.capture.model_dir, PathBuf::from("/tmp/m"));
        assert!(!cfg.capture.mirrored);
        assert_eq!(cfg.capture.width, 320);
        assert_eq!(cfg.capture.frame_interval, Duration::from_millis(1));
    }
}
