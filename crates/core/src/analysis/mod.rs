use serde::{Deserialize, Deserializer, Serialize};

/// Default peak threshold for [`extract_bpm`].
pub const BPM_PEAK_THRESHOLD: f32 = 0.2;
/// Slowest tempo [`extract_bpm`] will report.
pub const BPM_MIN: u32 = 60;
/// Fastest tempo [`extract_bpm`] will report.
pub const BPM_MAX: u32 = 180;

/// Per-frame snapshot produced by the host audio front end.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAnalysisResult {
    #[serde(deserialize_with = "deserialize_unit")]
    amplitude: f32,
    pub dominant_frequency: f32,
    /// `None` means the tempo is unknown, not that analysis failed.
    pub bpm: Option<u32>,
}

impl AudioAnalysisResult {
    /// Builds a snapshot, clamping amplitude into [0, 1]. Non-finite input
    /// counts as silence.
    pub fn new(amplitude: f32, dominant_frequency: f32, bpm: Option<u32>) -> Self {
        let amplitude = clamp_unit(amplitude);
        let dominant_frequency = if dominant_frequency.is_finite() {
            dominant_frequency.max(0.0)
        } else {
            0.0
        };
        Self {
            amplitude,
            dominant_frequency,
            bpm,
        }
    }

    pub fn silence() -> Self {
        Self::default()
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn deserialize_unit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    f32::deserialize(deserializer).map(clamp_unit)
}

/// Tuning for the peak-picking tempo heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BpmConfig {
    pub peak_threshold: f32,
    pub min_bpm: u32,
    pub max_bpm: u32,
}

impl Default for BpmConfig {
    fn default() -> Self {
        Self {
            peak_threshold: BPM_PEAK_THRESHOLD,
            min_bpm: BPM_MIN,
            max_bpm: BPM_MAX,
        }
    }
}

/// Estimates tempo from raw samples with the default [`BpmConfig`].
pub fn extract_bpm(samples: &[f32], sample_rate: u32) -> Option<u32> {
    extract_bpm_with(samples, sample_rate, &BpmConfig::default())
}

/// Estimates tempo by picking local maxima above a threshold and averaging
/// their spacing.
///
/// This is a heuristic, not onset detection: on dense material every
/// waveform crest is a peak and the implied tempo lands far above the valid
/// range, which yields `None`.
pub fn extract_bpm_with(samples: &[f32], sample_rate: u32, config: &BpmConfig) -> Option<u32> {
    if sample_rate == 0 || samples.len() < 3 {
        return None;
    }

    let peaks: Vec<usize> = samples
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > config.peak_threshold && w[1] > w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .collect();

    if peaks.len() < 2 {
        return None;
    }

    let total: usize = peaks.windows(2).map(|pair| pair[1] - pair[0]).sum();
    let mean_distance = total as f64 / (peaks.len() - 1) as f64;
    let bpm = (sample_rate as f64 / mean_distance * 60.0).round();

    if bpm < config.min_bpm as f64 || bpm > config.max_bpm as f64 {
        tracing::trace!(bpm, "tempo estimate outside plausible range");
        return None;
    }
    Some(bpm as u32)
}

/// Holds the most recent analysis snapshot so a frame never waits for audio.
///
/// When no fresh result has been published since the last read, the previous
/// snapshot is handed out again and flagged as stale.
#[derive(Debug, Default, Clone)]
pub struct AnalysisFeed {
    latest: Option<AudioAnalysisResult>,
    fresh: bool,
    stale_reads: u64,
}

/// What [`AnalysisFeed::current`] handed out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedSample {
    pub result: AudioAnalysisResult,
    pub stale: bool,
}

impl AnalysisFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, result: AudioAnalysisResult) {
        self.latest = Some(result);
        self.fresh = true;
    }

    /// Returns the newest snapshot, or silence before anything arrived.
    pub fn current(&mut self) -> FeedSample {
        let stale = !self.fresh;
        self.fresh = false;
        if stale {
            self.stale_reads += 1;
        }
        FeedSample {
            result: self.latest.unwrap_or_default(),
            stale,
        }
    }

    /// Number of reads served from a previous snapshot.
    pub fn stale_reads(&self) -> u64 {
        self.stale_reads
    }
}
