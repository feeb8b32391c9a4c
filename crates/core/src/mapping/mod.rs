//! Routing from settings and audio features to per-shape transform and
//! material parameters.

use crate::{
    analysis::AudioAnalysisResult,
    color::{chakra_frequency_to_color, ColorTheme, Rgb},
    settings::VisualizationSettings,
    ShapeKind,
};

/// Brightness multipliers outside this range wash out or black out the frame.
pub const SAFE_BRIGHTNESS: (f32, f32) = (0.2, 1.5);
const MAX_SENSITIVITY: f32 = 3.0;
const MAX_SPEED: f32 = 10.0;

/// Fixed animation character of one shape. Rates differ per shape and per
/// axis so that overlapping shapes drift against each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeProfile {
    /// Radians per frame around X, Y and Z at speed 1.0.
    pub rotation_rate: [f32; 3],
    /// Scale gained per unit of amplitude.
    pub scale_gain: f32,
    pub default_color: &'static str,
    /// Position in the theme gradient used when a theme colors the shape.
    pub palette_slot: f32,
    pub base_opacity: f32,
    pub opacity_gain: f32,
    pub base_point_size: f32,
    pub point_size_gain: f32,
}

pub fn profile(shape: ShapeKind) -> ShapeProfile {
    match shape {
        ShapeKind::FlowerOfLife => ShapeProfile {
            rotation_rate: [0.0, 0.005, 0.002],
            scale_gain: 0.3,
            default_color: "#A78BFA",
            palette_slot: 0.2,
            base_opacity: 0.6,
            opacity_gain: 0.4,
            base_point_size: 2.0,
            point_size_gain: 3.0,
        },
        ShapeKind::MetatronsCube => ShapeProfile {
            rotation_rate: [0.0, 0.003, 0.002],
            scale_gain: 0.2,
            default_color: "#FBBF24",
            palette_slot: 0.45,
            base_opacity: 0.7,
            opacity_gain: 0.3,
            base_point_size: 2.0,
            point_size_gain: 3.0,
        },
        ShapeKind::FibonacciSpiral => ShapeProfile {
            rotation_rate: [0.0, 0.0, 0.002],
            scale_gain: 0.3,
            default_color: "#34D399",
            palette_slot: 0.7,
            base_opacity: 0.5,
            opacity_gain: 0.5,
            base_point_size: 1.5,
            point_size_gain: 2.5,
        },
        ShapeKind::PrimeSpiral => ShapeProfile {
            rotation_rate: [0.0, 0.0, 0.004],
            scale_gain: 0.2,
            default_color: "#F472B6",
            palette_slot: 0.95,
            base_opacity: 0.6,
            opacity_gain: 0.4,
            base_point_size: 3.0,
            point_size_gain: 4.0,
        },
    }
}

/// Values written into a shape instance for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeUpdate {
    pub rotation_delta: [f32; 3],
    pub scale: f32,
    pub color: Rgb,
    pub opacity: f32,
    pub point_size: f32,
}

/// Computes the frame update for `shape` from the current settings and the
/// latest audio snapshot.
pub fn evaluate(
    shape: ShapeKind,
    settings: &VisualizationSettings,
    analysis: &AudioAnalysisResult,
) -> ShapeUpdate {
    let profile = profile(shape);
    let speed = finite_or(settings.speed, 1.0).clamp(0.0, MAX_SPEED);
    let sensitivity = finite_or(settings.sensitivity, 1.0).clamp(0.0, MAX_SENSITIVITY);
    let drive = analysis.amplitude() * sensitivity;

    let rotation_delta = profile.rotation_rate.map(|rate| rate * speed);
    let scale = 1.0 + drive * profile.scale_gain;
    let opacity = (profile.base_opacity + drive * profile.opacity_gain).clamp(0.0, 1.0);
    let point_size = profile.base_point_size + drive * profile.point_size_gain;

    ShapeUpdate {
        rotation_delta,
        scale,
        color: shape_color(&profile, settings, analysis),
        opacity,
        point_size,
    }
}

fn shape_color(
    profile: &ShapeProfile,
    settings: &VisualizationSettings,
    analysis: &AudioAnalysisResult,
) -> Rgb {
    let css = if settings.chakra_alignment_mode {
        chakra_frequency_to_color(analysis.dominant_frequency)
    } else if settings.color_theme != ColorTheme::default() {
        settings.color_theme.sample(profile.palette_slot)
    } else {
        profile.default_color
    };
    Rgb::parse(css)
        .unwrap_or(Rgb::WHITE)
        .scaled(safe_brightness(settings.brightness))
}

/// Clamps a brightness setting into [`SAFE_BRIGHTNESS`].
pub fn safe_brightness(brightness: f32) -> f32 {
    finite_or(brightness, 1.0).clamp(SAFE_BRIGHTNESS.0, SAFE_BRIGHTNESS.1)
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
