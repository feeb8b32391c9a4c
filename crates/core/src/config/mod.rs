use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{analysis::BpmConfig, geometry::GeometryParams, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub bpm: BpmConfig,
    pub render: RenderConfig,
    pub geometry: GeometryParams,
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a JSON config file. Sections left out of the file keep their
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::debug!(?path, "loaded configuration");
        Ok(config)
    }
}

/// Configuration specific to the audio front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    /// Samples handed to the front end per frame. Zero derives the length
    /// from the sample rate and frame rate.
    pub block_size: usize,
    /// Multiplier applied to block RMS before clamping into [0, 1].
    pub amplitude_gain: f32,
    /// Length of the rolling window handed to the tempo estimator.
    pub tempo_window_seconds: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            block_size: 1024,
            amplitude_gain: 1.0,
            tempo_window_seconds: 4.0,
        }
    }
}

/// Drawing surface and frame pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 40,
            fps: 60,
        }
    }
}

impl AudioConfig {
    /// Block length used per frame at `fps`. Never below two samples.
    pub fn block_len(&self, fps: u32) -> usize {
        let len = if self.block_size > 0 {
            self.block_size
        } else {
            (self.sample_rate / fps.max(1)) as usize
        };
        len.max(2)
    }
}

impl RenderConfig {
    /// Seconds covered by one frame tick.
    pub fn frame_seconds(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }
}
