use std::{f32::consts::TAU, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};

use crate::{
    analysis::{extract_bpm_with, AudioAnalysisResult, BpmConfig},
    config::AudioConfig,
    Result, SacredGeoError,
};

/// Host-side audio front end that turns raw sample blocks into the
/// [`AudioAnalysisResult`] snapshots consumed by the render loop.
///
/// Amplitude is the block RMS scaled by a gain, dominant frequency is the
/// loudest FFT bin, and tempo comes from [`extract_bpm_with`] over a rolling
/// window of recent samples.
pub struct AudioFrontEnd {
    sample_rate: u32,
    amplitude_gain: f32,
    bpm: BpmConfig,
    window: Vec<f32>,
    window_capacity: usize,
    processed_samples: usize,
    fft_planner: RealFftPlanner<f32>,
    fft: Option<FftResources>,
}

impl AudioFrontEnd {
    pub fn new(config: &AudioConfig, bpm: BpmConfig) -> Self {
        let window_capacity =
            (config.sample_rate as f32 * config.tempo_window_seconds.max(0.0)) as usize;
        Self {
            sample_rate: config.sample_rate,
            amplitude_gain: config.amplitude_gain,
            bpm,
            window: Vec::with_capacity(window_capacity),
            window_capacity,
            processed_samples: 0,
            fft_planner: RealFftPlanner::new(),
            fft: None,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Seconds of audio consumed so far.
    pub fn elapsed_seconds(&self) -> f32 {
        self.processed_samples as f32 / self.sample_rate.max(1) as f32
    }

    /// Clears the tempo window while keeping configuration and FFT plans.
    pub fn reset(&mut self) {
        self.window.clear();
        self.processed_samples = 0;
    }

    pub fn process_block(&mut self, samples: &[f32]) -> Result<AudioAnalysisResult> {
        if samples.len() < 2 {
            return Err(SacredGeoError::InvalidInput(
                "analysis requires blocks with at least two samples",
            ));
        }

        let amplitude = block_rms(samples) * self.amplitude_gain;
        let dominant_frequency = self.compute_dominant_frequency(samples)?;

        self.processed_samples += samples.len();
        self.window.extend_from_slice(samples);
        if self.window.len() > self.window_capacity {
            let overflow = self.window.len() - self.window_capacity;
            self.window.drain(0..overflow);
        }
        let bpm = extract_bpm_with(&self.window, self.sample_rate, &self.bpm);

        let result = AudioAnalysisResult::new(amplitude, dominant_frequency, bpm);
        tracing::trace!(
            amplitude = result.amplitude(),
            dominant_frequency = result.dominant_frequency,
            bpm = ?result.bpm,
            "analysed block"
        );
        Ok(result)
    }

    fn compute_dominant_frequency(&mut self, samples: &[f32]) -> Result<f32> {
        let bin_hz = self.sample_rate as f32 / samples.len() as f32;
        let fft = self.spectrum_plan(samples.len());

        let taper = hann(samples.len());
        for ((slot, sample), weight) in fft.input.iter_mut().zip(samples).zip(taper) {
            *slot = sample * weight;
        }
        fft.plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)?;

        // Bin 0 is DC and never counts as a pitch.
        let peak = fft
            .spectrum
            .iter()
            .map(|bin| bin.norm())
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(&b.1));
        Ok(match peak {
            Some((bin, magnitude)) if magnitude > f32::EPSILON => bin as f32 * bin_hz,
            _ => 0.0,
        })
    }

    /// Buffers for a `size`-point transform, replanned when the block length
    /// changes.
    fn spectrum_plan(&mut self, size: usize) -> &mut FftResources {
        let resources = match self.fft.take() {
            Some(current) if current.size == size => current,
            _ => {
                let plan = self.fft_planner.plan_fft_forward(size);
                tracing::debug!(size, "planned fft");
                FftResources {
                    size,
                    input: plan.make_input_vec(),
                    spectrum: plan.make_output_vec(),
                    scratch: plan.make_scratch_vec(),
                    plan,
                }
            }
        };
        self.fft.insert(resources)
    }
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl fmt::Debug for AudioFrontEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioFrontEnd")
            .field("sample_rate", &self.sample_rate)
            .field("window_len", &self.window.len())
            .field("fft_size", &self.fft.as_ref().map(|fft| fft.size))
            .finish_non_exhaustive()
    }
}

fn block_rms(samples: &[f32]) -> f32 {
    let energy: f32 = samples.iter().map(|s| s * s).sum();
    (energy / samples.len() as f32).sqrt()
}

/// Hann taper over `len` samples; callers guarantee `len >= 2`.
fn hann(len: usize) -> impl Iterator<Item = f32> {
    let span = len.saturating_sub(1).max(1) as f32;
    (0..len).map(move |i| 0.5 * (1.0 - (TAU * i as f32 / span).cos()))
}
