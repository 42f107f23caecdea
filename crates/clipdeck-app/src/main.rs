//! ClipDeck - overlay timeline inspector
//!
//! Loads an overlay collection from JSON, checks it and prints the track
//! projection the timeline widget would receive.
//!
//! Usage: clipdeck <overlays.json> [--config <path>] [--canvas <W>x<H>]

use anyhow::{bail, Context, Result};
use clipdeck_core::{init_logging, EngineConfig, Overlay, Size};
use clipdeck_timeline::{TimelineEditor, TimelineTrack};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

const USAGE: &str = "usage: clipdeck <overlays.json> [--config <path>] [--canvas <W>x<H>]";
const DEFAULT_CANVAS: Size = Size::new(1920.0, 1080.0);

#[derive(Debug, PartialEq)]
struct Args {
    overlays: PathBuf,
    config: Option<PathBuf>,
    canvas: Size,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut overlays = None;
    let mut config = None;
    let mut canvas = DEFAULT_CANVAS;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--canvas" => {
                let raw = args.next().context("--canvas needs <W>x<H>")?;
                canvas = parse_canvas(&raw)?;
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            path => {
                if overlays.replace(PathBuf::from(path)).is_some() {
                    bail!("only one overlay file may be given");
                }
            }
        }
    }

    let overlays = overlays.context(USAGE)?;
    Ok(Args {
        overlays,
        config,
        canvas,
    })
}

fn parse_canvas(raw: &str) -> Result<Size> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .with_context(|| format!("canvas {raw:?} is not <W>x<H>"))?;
    let size = Size::new(w.trim().parse()?, h.trim().parse()?);
    if size.aspect_ratio().is_none() {
        bail!("canvas {raw:?} must have positive dimensions");
    }
    Ok(size)
}

/// What gets printed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    fps: f64,
    track_count: u32,
    composition_duration_in_frames: u64,
    tracks: Vec<TimelineTrack>,
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => EngineConfig::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::load(),
    };
    init_logging(&config.logging);

    info!("ClipDeck starting with {}", config.frame_rate);

    let content = std::fs::read_to_string(&args.overlays)
        .with_context(|| format!("failed to read {}", args.overlays.display()))?;
    let overlays: Vec<Overlay> =
        serde_json::from_str(&content).context("overlay file is not a valid overlay list")?;
    info!("Loaded {} overlays from {:?}", overlays.len(), args.overlays);

    let editor = TimelineEditor::with_overlays(config, args.canvas, overlays)?;
    if let Err(e) = editor.store().validate_at_rest() {
        warn!("Overlay collection breaks an invariant: {}", e);
    }

    let summary = Summary {
        fps: editor.fps().to_fps_f64(),
        track_count: editor.store().track_count(),
        composition_duration_in_frames: editor.store().composition_duration(),
        tracks: editor.tracks().to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
