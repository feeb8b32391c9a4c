//! Core library for the sacred geometry visualiser.
//!
//! Pure generators (`geometry`, `primes`, `color`) sit at the bottom and are
//! callable without any I/O. `analysis` and `settings` define the read-only
//! snapshots handed to the renderer each frame, and `render` owns the scene
//! and drives a host-supplied [`Surface`]. The `audio` front end and `config`
//! are the host-side pieces used by the command line application.

pub mod analysis;
pub mod audio;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod mapping;
pub mod primes;
pub mod render;
pub mod scene;
pub mod settings;
pub mod timeline;

pub use analysis::{
    extract_bpm, extract_bpm_with, AnalysisFeed, AudioAnalysisResult, BpmConfig, FeedSample,
};
pub use audio::AudioFrontEnd;
pub use color::{chakra_frequency_to_color, frequency_to_color, ColorTheme, Rgb};
pub use config::{AppConfig, AudioConfig, RenderConfig};
pub use error::{Result, SacredGeoError};
pub use geometry::{GeometryParams, Point, PrimePoint, ShapeGeometry};
pub use mapping::{ShapeProfile, ShapeUpdate};
pub use primes::{find_primes_in_range, generate_prime_sequence, is_prime};
pub use render::{
    AsciiSurface, DrawCall, FrameStats, RecordingSurface, RenderLoop, ShapeDraw, Surface, Viewport,
};
pub use scene::{Material, SceneArena, ShapeInstance, Transform};
pub use settings::{RenderMode, ShapeKind, VisualizationSettings, VisualizerType};
pub use timeline::{
    CancellationToken, FrameDriver, FrameInput, FrameSource, PlaybackClock, RunSummary,
};
