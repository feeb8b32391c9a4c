use std::{
    f32::consts::TAU,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use sacred_geometry_core::{
    extract_bpm_with, find_primes_in_range, generate_prime_sequence, AppConfig, AsciiSurface,
    AudioFrontEnd, FrameDriver, FrameInput, PlaybackClock, RenderLoop, SacredGeoError, Viewport,
    VisualizationSettings,
};
use tracing_subscriber::EnvFilter;

fn main() -> sacred_geometry_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Render {
            settings,
            frames,
            tone,
            bpm,
            preview,
        } => run_render(&config, settings.as_deref(), frames, tone, bpm, preview),
        Commands::Primes { count, max, range } => run_primes(count, max, range),
        Commands::Bpm { input, sample_rate } => run_bpm(&config, &input, sample_rate),
        Commands::Settings { input } => run_settings(input.as_deref()),
    }
}

fn run_render(
    config: &AppConfig,
    settings: Option<&Path>,
    frames: u64,
    tone: f32,
    bpm: f32,
    preview: bool,
) -> sacred_geometry_core::Result<()> {
    let settings = match settings {
        Some(path) => VisualizationSettings::load(path)?,
        None => VisualizationSettings::default(),
    };
    tracing::info!(
        shapes = ?settings.active_shapes,
        mode = ?settings.mode,
        theme = %settings.color_theme,
        frames,
        "starting headless render"
    );

    let viewport = Viewport::new(config.render.width, config.render.height);
    let mut render = RenderLoop::mount(Some(AsciiSurface::new()), viewport, config.geometry.clone());
    let mut driver = FrameDriver::new(render.cancellation_token(), &config.render, settings);

    let mut audio = AudioFrontEnd::new(&config.audio, config.bpm);
    let mut signal = PulseTone::new(tone, bpm, config.audio.sample_rate);
    let block_len = config.audio.block_len(config.render.fps);

    let mut source = |frame: u64, clock: &PlaybackClock| {
        let block = signal.next_block(block_len);
        let analysis = match audio.process_block(&block) {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::warn!(%err, frame, "audio analysis failed, reusing last snapshot");
                None
            }
        };
        if frame % u64::from(config.render.fps.max(1)) == 0 {
            tracing::debug!(frame, seconds = clock.time_seconds, ?analysis, "tick");
        }
        Some(FrameInput {
            analysis,
            ..Default::default()
        })
    };

    let summary = driver.run(&mut render, &mut source, frames);
    tracing::info!(
        frames = summary.frames,
        shape_draw_calls = summary.shape_draw_calls,
        stale_frames = summary.stale_frames,
        "render finished"
    );

    if preview {
        if let Some(surface) = render.surface() {
            println!("{}", surface.frame_text());
        }
    }
    render.teardown();
    Ok(())
}

fn run_primes(count: usize, max: u64, range: Option<Vec<u64>>) -> sacred_geometry_core::Result<()> {
    let primes = match range.as_deref() {
        Some(&[min, max]) => find_primes_in_range(min, max),
        Some(_) => return Err(SacredGeoError::InvalidInput("--range takes MIN and MAX")),
        None => generate_prime_sequence(count, max),
    };
    let line = primes
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");
    Ok(())
}

fn run_bpm(
    config: &AppConfig,
    input: &Path,
    sample_rate: Option<u32>,
) -> sacred_geometry_core::Result<()> {
    let bytes = std::fs::read(input)?;
    if bytes.len() % 4 != 0 {
        return Err(SacredGeoError::msg(format!(
            "`{}` is not a raw f32 stream ({} bytes)",
            input.display(),
            bytes.len()
        )));
    }
    let samples: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    let sample_rate = sample_rate.unwrap_or(config.audio.sample_rate);

    tracing::info!(?input, samples = samples.len(), sample_rate, "estimating tempo");
    match extract_bpm_with(&samples, sample_rate, &config.bpm) {
        Some(bpm) => println!("{bpm}"),
        None => println!("unknown"),
    }
    Ok(())
}

fn run_settings(input: Option<&Path>) -> sacred_geometry_core::Result<()> {
    let settings = match input {
        Some(path) => VisualizationSettings::load(path)?,
        None => VisualizationSettings::default(),
    };
    println!("{}", settings.to_json()?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Synthetic input for headless runs: a quiet sine with a click on every beat.
///
/// The sine stays below the tempo estimator's peak threshold, so only the
/// clicks register as peaks.
struct PulseTone {
    frequency: f32,
    sample_rate: u32,
    beat_interval: usize,
    position: usize,
}

impl PulseTone {
    fn new(frequency: f32, bpm: f32, sample_rate: u32) -> Self {
        let beat_interval = if bpm > 0.0 {
            (sample_rate as f32 * 60.0 / bpm) as usize
        } else {
            usize::MAX
        };
        Self {
            frequency,
            sample_rate,
            beat_interval: beat_interval.max(1),
            position: 0,
        }
    }

    fn next_block(&mut self, len: usize) -> Vec<f32> {
        let block = (0..len)
            .map(|offset| {
                let n = self.position + offset;
                let since_beat = n % self.beat_interval;
                if since_beat == 0 {
                    return 0.9;
                }
                let decay = (-(since_beat as f32) / (self.sample_rate as f32 * 0.15)).exp();
                let phase = TAU * self.frequency * n as f32 / self.sample_rate as f32;
                0.15 * decay * phase.sin()
            })
            .collect();
        self.position += len;
        block
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-reactive sacred geometry visualiser", long_about = None)]
struct Cli {
    /// Optional JSON configuration file (audio, bpm, render, geometry).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render frames headlessly from a synthesized pulse tone.
    Render {
        /// Visualization settings JSON; defaults are used when omitted.
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// Number of frames to render.
        #[arg(short, long, default_value_t = 240)]
        frames: u64,
        /// Frequency of the synthesized tone in Hz.
        #[arg(long, default_value_t = 432.0)]
        tone: f32,
        /// Tempo of the synthesized clicks.
        #[arg(long, default_value_t = 120.0)]
        bpm: f32,
        /// Print the last frame as text.
        #[arg(long)]
        preview: bool,
    },
    /// Print a prime sequence, or the primes in a range.
    Primes {
        #[arg(short = 'n', long, default_value_t = 25)]
        count: usize,
        #[arg(long, default_value_t = 10_000)]
        max: u64,
        #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
        range: Option<Vec<u64>>,
    },
    /// Estimate the tempo of a raw little-endian f32 mono file.
    Bpm {
        input: PathBuf,
        #[arg(long)]
        sample_rate: Option<u32>,
    },
    /// Print settings as JSON, normalised from a file or the defaults.
    Settings { input: Option<PathBuf> },
}
