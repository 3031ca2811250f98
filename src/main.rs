// SPDX-License-Identifier: GPL-3.0-or-later
// src/main.rs
//
// Headless host: load an image, replay scripted gestures through the crop
// session, optionally dump a preview frame, then commit.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::Parser;
use tokio::sync::mpsc;

use cropframe::app::document::raster::{FileImageSource, ImageRasterizer, OutputFormat};
use cropframe::domain::crop::{CropRect, Handle, Point};
use cropframe::{AppConfig, CropController, PointerEvent, SessionEvent, Viewport};

/// Moves emitted per scripted gesture.
const GESTURE_STEPS: u32 = 6;

#[derive(Parser, Debug)]
#[command(
    name = "cropframe",
    version,
    about = "Crop an image by replaying touch gestures on a crop box"
)]
struct Args {
    /// Image to crop.
    input: PathBuf,

    /// TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Simulated screen size.
    #[arg(long, default_value = "390x844", value_name = "WxH")]
    screen: Viewport,

    /// Lock the crop box to width / height (0 = free).
    #[arg(short, long, value_name = "RATIO")]
    aspect: Option<f32>,

    /// Minimum crop box side in canvas units.
    #[arg(long, value_name = "N")]
    min_size: Option<f32>,

    /// Output quality in 0..=1.
    #[arg(short, long, value_name = "Q")]
    quality: Option<f32>,

    /// Use the whole screen as the preview box.
    #[arg(long)]
    fullscreen: bool,

    /// Drag the box by DX,DY (repeatable).
    #[arg(long, value_name = "DX,DY", allow_hyphen_values = true)]
    drag: Vec<Delta>,

    /// Drag a corner by DX,DY, e.g. `br:40,-20` (repeatable).
    #[arg(long, value_name = "CORNER:DX,DY", allow_hyphen_values = true)]
    resize: Vec<CornerDelta>,

    /// Write the composed preview frame to this PNG before committing.
    #[arg(long, value_name = "FILE")]
    preview: Option<PathBuf>,

    /// Directory for the cropped image.
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Encode as PNG instead of JPEG.
    #[arg(long)]
    png: bool,

    /// Open the result with the default viewer.
    #[arg(long)]
    open: bool,
}

#[derive(Debug, Clone, Copy)]
struct Delta {
    dx: f32,
    dy: f32,
}

impl FromStr for Delta {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (dx, dy) = s
            .split_once(',')
            .ok_or_else(|| anyhow::anyhow!("expected DX,DY, got '{s}'"))?;
        Ok(Self {
            dx: dx.trim().parse()?,
            dy: dy.trim().parse()?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct CornerDelta {
    handle: Handle,
    delta: Delta,
}

impl FromStr for CornerDelta {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (corner, delta) = s
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("expected CORNER:DX,DY, got '{s}'"))?;
        Ok(Self {
            handle: corner.parse()?,
            delta: delta.parse()?,
        })
    }
}

/// Synthetic clock advancing a few milliseconds per event.
struct Clock {
    now: Instant,
    step: Duration,
}

impl Clock {
    fn next(&mut self) -> Instant {
        self.now += self.step;
        self.now
    }
}

/// Press at `start`, move in even steps by `delta`, release.
fn gesture(start: Point, delta: Delta, clock: &mut Clock) -> Vec<PointerEvent> {
    let mut events = vec![PointerEvent::Down {
        position: start,
        at: clock.next(),
    }];
    for step in 1..=GESTURE_STEPS {
        let t = step as f32 / GESTURE_STEPS as f32;
        events.push(PointerEvent::Move {
            position: Point::new(start.x + delta.dx * t, start.y + delta.dy * t),
            at: clock.next(),
        });
    }
    events.push(PointerEvent::Up { at: clock.next() });
    events
}

fn center(rect: CropRect) -> Point {
    Point::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(aspect) = args.aspect {
        config.session.aspect_ratio = aspect;
    }
    if let Some(min_size) = args.min_size {
        config.session.min_size = min_size;
    }
    if let Some(quality) = args.quality {
        config.session.quality = quality;
    }
    if args.fullscreen {
        config.session.fullscreen = true;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let format = if args.png {
        OutputFormat::Png
    } else {
        OutputFormat::Jpeg
    };
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut controller = CropController::new(
        FileImageSource::new(Some(args.input)),
        ImageRasterizer::new(config.output_dir.clone(), format),
        config.layout.clone(),
        args.screen,
        events_tx,
    );

    // Half a frame per event, so the gate has to coalesce.
    let mut clock = Clock {
        now: Instant::now(),
        step: config.session.frame_interval() / 2,
    };

    if !controller.open(config.session.clone()).await? {
        bail!("no image selected");
    }

    for delta in &args.drag {
        let Some(session) = controller.session() else {
            break;
        };
        for event in gesture(center(session.rect()), *delta, &mut clock) {
            controller.handle_pointer(event);
        }
    }
    for resize in &args.resize {
        let Some(session) = controller.session() else {
            break;
        };
        for event in gesture(session.rect().corner(resize.handle), resize.delta, &mut clock) {
            controller.handle_pointer(event);
        }
    }

    if let Some(session) = controller.session() {
        log::info!(
            "crop box {:?}, source {:?}",
            session.rect(),
            session.source_rect()
        );
    }

    if let Some(path) = &args.preview {
        let frame = controller
            .pipeline()
            .compose()
            .context("No preview frame available")?;
        frame
            .save(path)
            .with_context(|| format!("Failed to write preview {}", path.display()))?;
        log::info!("preview written to {}", path.display());
    }

    let artifact = controller.commit().await?;
    if let Some(SessionEvent::Cropped { .. }) = events_rx.recv().await {
        println!(
            "{} ({}x{})",
            artifact.path.display(),
            artifact.width,
            artifact.height
        );
    }

    if args.open {
        open::that(&artifact.path)
            .with_context(|| format!("Failed to open {}", artifact.path.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
