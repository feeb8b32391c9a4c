use std::{collections::BTreeSet, fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{color::ColorTheme, Result, SacredGeoError};

/// The geometric constructions the renderer knows how to draw.
///
/// The ordering is the draw order, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    FlowerOfLife,
    MetatronsCube,
    FibonacciSpiral,
    PrimeSpiral,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::FlowerOfLife,
        ShapeKind::MetatronsCube,
        ShapeKind::FibonacciSpiral,
        ShapeKind::PrimeSpiral,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::FlowerOfLife => "flower-of-life",
            ShapeKind::MetatronsCube => "metatrons-cube",
            ShapeKind::FibonacciSpiral => "fibonacci-spiral",
            ShapeKind::PrimeSpiral => "prime-spiral",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = SacredGeoError;

    fn from_str(s: &str) -> Result<Self> {
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SacredGeoError::msg(format!("unknown shape `{s}`")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    #[default]
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "3d")]
    ThreeD,
}

/// Primitive used when drawing a shape's point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizerType {
    #[default]
    Lines,
    Points,
}

/// Immutable visualization configuration handed to the render loop each frame.
///
/// Edits never mutate an existing value; every `with_*` call returns a fresh
/// copy. Ranges are not validated here; each consumer clamps what it uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualizationSettings {
    pub active_shapes: BTreeSet<ShapeKind>,
    pub mode: RenderMode,
    pub color_theme: ColorTheme,
    pub speed: f32,
    pub symmetry: u32,
    pub sensitivity: f32,
    pub brightness: f32,
    pub grid_intensity: f32,
    pub rotation_speed: f32,
    pub mirror_enabled: bool,
    pub chakra_alignment_mode: bool,
    pub show_grid: bool,
    pub show_prime_affirmations: bool,
    pub visualizer_type: VisualizerType,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self {
            active_shapes: [ShapeKind::FlowerOfLife, ShapeKind::MetatronsCube]
                .into_iter()
                .collect(),
            mode: RenderMode::TwoD,
            color_theme: ColorTheme::CosmicViolet,
            speed: 1.0,
            symmetry: 6,
            sensitivity: 1.0,
            brightness: 1.0,
            grid_intensity: 0.3,
            rotation_speed: 1.0,
            mirror_enabled: false,
            chakra_alignment_mode: false,
            show_grid: true,
            show_prime_affirmations: false,
            visualizer_type: VisualizerType::Lines,
        }
    }
}

impl VisualizationSettings {
    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_active(&self, shape: ShapeKind) -> bool {
        self.active_shapes.contains(&shape)
    }

    /// Copy-with-replacement for edits that touch several fields at once.
    pub fn edited(&self, edit: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        edit(&mut next);
        next
    }

    pub fn with_active_shapes(&self, shapes: impl IntoIterator<Item = ShapeKind>) -> Self {
        self.edited(|s| s.active_shapes = shapes.into_iter().collect())
    }

    pub fn with_shape_toggled(&self, shape: ShapeKind) -> Self {
        self.edited(|s| {
            if !s.active_shapes.remove(&shape) {
                s.active_shapes.insert(shape);
            }
        })
    }

    pub fn with_mode(&self, mode: RenderMode) -> Self {
        self.edited(|s| s.mode = mode)
    }

    pub fn with_color_theme(&self, theme: ColorTheme) -> Self {
        self.edited(|s| s.color_theme = theme)
    }

    pub fn with_speed(&self, speed: f32) -> Self {
        self.edited(|s| s.speed = speed)
    }

    pub fn with_sensitivity(&self, sensitivity: f32) -> Self {
        self.edited(|s| s.sensitivity = sensitivity)
    }

    pub fn with_chakra_alignment(&self, enabled: bool) -> Self {
        self.edited(|s| s.chakra_alignment_mode = enabled)
    }

    pub fn with_grid(&self, show: bool, intensity: f32) -> Self {
        self.edited(|s| {
            s.show_grid = show;
            s.grid_intensity = intensity;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_leave_original_untouched() {
        let base = VisualizationSettings::default();
        let faster = base.with_speed(2.5);

        assert_eq!(base.speed, 1.0);
        assert_eq!(faster.speed, 2.5);
        assert_eq!(faster.active_shapes, base.active_shapes);
    }

    #[test]
    fn toggling_a_shape_twice_restores_the_set() {
        let base = VisualizationSettings::default();
        let toggled = base.with_shape_toggled(ShapeKind::PrimeSpiral);
        assert!(toggled.is_active(ShapeKind::PrimeSpiral));

        let restored = toggled.with_shape_toggled(ShapeKind::PrimeSpiral);
        assert_eq!(restored, base);
    }

    #[test]
    fn parses_partial_json_with_defaults() {
        let settings = VisualizationSettings::from_json(
            r#"{"activeShapes":["prime-spiral"],"mode":"3d","colorTheme":"fire-essence","chakraAlignmentMode":true}"#,
        )
        .unwrap();

        assert_eq!(
            settings.active_shapes.iter().copied().collect::<Vec<_>>(),
            vec![ShapeKind::PrimeSpiral]
        );
        assert_eq!(settings.mode, RenderMode::ThreeD);
        assert_eq!(settings.color_theme, ColorTheme::FireEssence);
        assert!(settings.chakra_alignment_mode);
        assert_eq!(settings.symmetry, 6);
    }

    #[test]
    fn unknown_theme_falls_back_to_cosmic_violet() {
        let settings = VisualizationSettings::from_json(r#"{"colorTheme":"neon-dreams"}"#).unwrap();
        assert_eq!(settings.color_theme, ColorTheme::CosmicViolet);
    }

    #[test]
    fn empty_shape_set_is_allowed() {
        let settings = VisualizationSettings::from_json(r#"{"activeShapes":[]}"#).unwrap();
        assert!(settings.active_shapes.is_empty());
    }

    #[test]
    fn round_trips_through_json() {
        let settings = VisualizationSettings::default().with_mode(RenderMode::ThreeD);
        let text = settings.to_json().unwrap();
        assert_eq!(VisualizationSettings::from_json(&text).unwrap(), settings);
    }

    #[test]
    fn parses_shape_names() {
        assert_eq!("prime-spiral".parse::<ShapeKind>().unwrap(), ShapeKind::PrimeSpiral);
        assert!("dodecahedron".parse::<ShapeKind>().is_err());
    }
}
