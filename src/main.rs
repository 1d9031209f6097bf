use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

use chromawave::{
    config::{AnalysisConfig, Config, CoverShape, RingShape, RotationAxis, SpinDirection},
    pipeline::RenderEngine,
    render::PaletteRegistry,
};

#[derive(Parser)]
#[command(
    name = "chromawave",
    version,
    about = "Render psychedelic audio-reactive music videos from an audio track",
    long_about = "Chromawave analyzes an audio track into frequency-band energies and beats, \
then deterministically synthesizes a layered visualization (starfield, waveform trails, \
pulsing cover rings, text) and muxes it with the audio via ffmpeg."
)]
struct Cli {
    /// Audio file path (WAV, MP3, FLAC, OGG, M4A)
    #[arg(short, long)]
    audio: PathBuf,

    /// Output video file path
    #[arg(short, long)]
    output: PathBuf,

    /// Color palette (see --help for the built-in list)
    #[arg(short, long)]
    palette: Option<String>,

    /// Cover image shown at the center of the frame
    #[arg(short, long)]
    cover: Option<PathBuf>,

    /// Cover clipping shape
    #[arg(long, value_enum)]
    cover_shape: Option<CoverShape>,

    /// Cover size multiplier
    #[arg(long)]
    cover_size: Option<f32>,

    /// Mirror the cover into N kaleidoscope segments
    #[arg(long, value_name = "N")]
    kaleidoscope: Option<u32>,

    /// Overlay text (e.g. artist - title)
    #[arg(short, long)]
    text: Option<String>,

    /// TrueType font file for the overlay text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output frame rate
    #[arg(long)]
    fps: Option<f64>,

    /// Output resolution as WIDTHxHEIGHT
    #[arg(short, long, value_parser = parse_resolution)]
    resolution: Option<(u32, u32)>,

    /// Rotation axis for the waveform layer
    #[arg(long, value_enum)]
    waveform_rotation: Option<RotationAxis>,

    /// Rotation axis for the ring layer
    #[arg(long, value_enum)]
    ring_rotation: Option<RotationAxis>,

    /// Spin direction for the starfield
    #[arg(long, value_enum)]
    starfield_rotation: Option<SpinDirection>,

    /// Ring outline shape
    #[arg(long, value_enum)]
    ring_shape: Option<RingShape>,

    /// Skip the ring layer
    #[arg(long)]
    no_rings: bool,

    /// Skip the starfield layer
    #[arg(long)]
    no_starfield: bool,

    /// Render only the first N seconds
    #[arg(long, value_name = "SECONDS")]
    preview: Option<f64>,

    /// Halve the resolution for a fast proof render
    #[arg(long)]
    proof: bool,

    /// Configuration file (optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_resolution(value: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width = w.parse().map_err(|_| format!("invalid width '{w}'"))?;
    let height = h.parse().map_err(|_| format!("invalid height '{h}'"))?;
    Ok((width, height))
}

/// Overlay CLI flags onto the base configuration
fn apply_cli(config: &mut Config, cli: &Cli) {
    if let Some(palette) = &cli.palette {
        config.visual.palette = palette.clone();
    }
    if cli.cover.is_some() {
        config.visual.cover = cli.cover.clone();
    }
    if let Some(shape) = cli.cover_shape {
        config.visual.cover_shape = shape;
    }
    if let Some(size) = cli.cover_size {
        config.visual.cover_size = size;
    }
    if cli.kaleidoscope.is_some() {
        config.visual.kaleidoscope_segments = cli.kaleidoscope;
    }
    if cli.text.is_some() {
        config.visual.text = cli.text.clone();
    }
    if cli.font.is_some() {
        config.visual.font = cli.font.clone();
    }
    if let Some(fps) = cli.fps {
        config.visual.fps = fps;
    }
    if let Some(resolution) = cli.resolution {
        config.visual.resolution = resolution;
    }
    if let Some(axis) = cli.waveform_rotation {
        config.visual.waveform_rotation = axis;
    }
    if let Some(axis) = cli.ring_rotation {
        config.visual.ring_rotation = axis;
    }
    if let Some(spin) = cli.starfield_rotation {
        config.visual.starfield_rotation = spin;
    }
    if let Some(shape) = cli.ring_shape {
        config.visual.ring_shape = shape;
    }
    if cli.no_rings {
        config.visual.disable_rings = true;
    }
    if cli.no_starfield {
        config.visual.disable_starfield = true;
    }
    if cli.preview.is_some() {
        config.visual.preview_seconds = cli.preview;
    }
    if cli.proof {
        // Proof renders trade analysis resolution for speed as well
        config.visual.proof = true;
        config.analysis = AnalysisConfig {
            threads: config.analysis.threads,
            ..AnalysisConfig::preview()
        };
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Starting Chromawave v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };
    apply_cli(&mut config, &cli);
    config.validate()?;

    if PaletteRegistry::new().get(&config.visual.palette).is_none() {
        anyhow::bail!(
            "Unknown palette '{}'. Available: {}",
            config.visual.palette,
            PaletteRegistry::new().available_names().join(", ")
        );
    }

    let engine = RenderEngine::new(config);
    engine.render(&cli.audio, &cli.output).await?;

    Ok(())
}
