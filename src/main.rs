//! fxbox - frame-exchange host
//!
//! Runs the test pattern core through a session and prints a JSON report.

use anyhow::{Context, Result};
use clap::Parser;
use fx_core::{logging, Config, Settings};
use fx_frame::FrameLayout;
use fx_integration::{DeinterlaceMode, Session, SessionOptions, TestPatternCore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "fxbox", about = "Drive an emulation core frame by frame and report what it produced")]
struct Args {
    /// Config file (defaults to the per-user config, created if missing)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Frames to run
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Ask the core to skip rendering every Nth frame
    #[arg(long, value_name = "N")]
    skip_every: Option<u64>,

    /// Framebuffer size, e.g. 1024x480 (defaults to the system minimum)
    #[arg(long, value_name = "WxH", value_parser = parse_layout)]
    layout: Option<FrameLayout>,

    /// Request per-line widths
    #[arg(long, action = clap::ArgAction::SetTrue)]
    line_widths: bool,

    /// Produce interlaced output and bob-deinterlace it
    #[arg(long, action = clap::ArgAction::SetTrue)]
    interlace: bool,

    /// Throttle to real time
    #[arg(long, action = clap::ArgAction::SetTrue)]
    realtime: bool,
}

fn parse_layout(s: &str) -> std::result::Result<FrameLayout, String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    let width = w.parse().map_err(|e| format!("bad width {w:?}: {e}"))?;
    let height = h.parse().map_err(|e| format!("bad height {h:?}: {e}"))?;
    Ok(FrameLayout::new(width, height))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading default config")?,
    };
    logging::init(config.debug.log_level);

    tracing::info!("Starting fxbox");

    let settings = Arc::new(Settings::from_config(&config).context("invalid configuration")?);
    let core = TestPatternCore::new(settings)
        .context("creating test pattern core")?
        .with_interlace(args.interlace);

    let options = SessionOptions {
        layout: args.layout,
        use_line_widths: args.line_widths,
        deinterlace: args.interlace.then_some(DeinterlaceMode::Bob),
        realtime: args.realtime,
        trace_frames: config.debug.trace_frames,
        ..Default::default()
    };
    let mut session = Session::new(core, options).context("creating session")?;

    for frame in 0..args.frames {
        let skip = args.skip_every.is_some_and(|n| n > 0 && (frame + 1) % n == 0);
        session
            .run_frame(skip)
            .with_context(|| format!("frame {frame}"))?;
    }

    let report = session.report();
    tracing::info!(
        "Ran {} frames, {:.3}s emulated, digest {}",
        report.frames,
        report.emulated_seconds,
        report.digest
    );
    println!("{}", report.to_json()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layout() {
        assert_eq!(parse_layout("1024x480"), Ok(FrameLayout::new(1024, 480)));
        assert!(parse_layout("1024").is_err());
        assert!(parse_layout("wide x480").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::parse_from(["fxbox", "--frames", "10", "--skip-every", "3", "--interlace"]);
        assert_eq!(args.frames, 10);
        assert_eq!(args.skip_every, Some(3));
        assert!(args.interlace);
        assert!(args.config.is_none());
    }
}
