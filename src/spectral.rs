//! Default frame transform: a spectral noise gate.
//!
//! Frames are analysed with a 50 % overlapped sqrt-Hann window of twice the
//! frame size, so the transform adds exactly one frame of delay. The squared
//! window sums to one across overlapping blocks, which makes the gate
//! transparent at intensity `0.0`.

use crate::transform::FrameTransform;

use realfft::{ComplexToReal, RealFftPlanner, RealToComplex, num_complex::Complex32};

use std::{f32::consts::PI, sync::Arc};

/// Frames whose bin power stays below `GATE` times the noise estimate update it.
const GATE: f32 = 4.0;
/// Recursive averaging factor of the noise estimate.
const NOISE_SMOOTHING: f32 = 0.9;
/// Per-frame growth of the noise estimate while the gate is closed.
const NOISE_RISE: f32 = 1.01;
/// Over-subtraction factor of the suppression gain.
const OVER_SUBTRACTION: f32 = 1.5;
/// Lowest gain applied to a bin (-20 dB).
const GAIN_FLOOR: f32 = 0.1;
/// Temporal smoothing of the suppression gain.
const GAIN_SMOOTHING: f32 = 0.5;
/// Frames averaged without gating to seed the noise estimate.
const WARMUP_FRAMES: usize = 10;
const EPSILON: f32 = 1e-12;

/// Frame size used by [`SpectralGate`]: 10 ms at the given rate.
pub fn frame_size_for(sample_rate: u32) -> usize {
    sample_rate as usize / 100
}

/// Spectral subtraction style denoiser with per-bin noise tracking.
///
/// The intensity blends between the unmodified spectrum (`0.0`) and the fully
/// suppressed spectrum (`1.0`).
pub struct SpectralGate {
    hop: usize,
    window: Vec<f32>,
    /// Previous frame, first half of the analysis block.
    history: Vec<f32>,
    /// Second half of the previous synthesis block.
    overlap: Vec<f32>,
    time: Vec<f32>,
    spectrum: Vec<Complex32>,
    forward_scratch: Vec<Complex32>,
    inverse_scratch: Vec<Complex32>,
    noise: Vec<f32>,
    gains: Vec<f32>,
    frames_seen: usize,
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
}

impl SpectralGate {
    pub fn new(sample_rate: u32) -> Self {
        let hop = frame_size_for(sample_rate).max(1);
        let fft_size = 2 * hop;

        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);

        let window = (0..fft_size)
            .map(|i| (PI * i as f32 / fft_size as f32).sin())
            .collect();
        let num_bins = fft_size / 2 + 1;

        Self {
            hop,
            window,
            history: vec![0.0; hop],
            overlap: vec![0.0; hop],
            time: forward.make_input_vec(),
            spectrum: forward.make_output_vec(),
            forward_scratch: forward.make_scratch_vec(),
            inverse_scratch: inverse.make_scratch_vec(),
            noise: vec![0.0; num_bins],
            gains: vec![1.0; num_bins],
            frames_seen: 0,
            forward,
            inverse,
        }
    }

    fn update_gains(&mut self) {
        for ((bin, noise), gain) in self
            .spectrum
            .iter()
            .zip(self.noise.iter_mut())
            .zip(self.gains.iter_mut())
        {
            let power = bin.norm_sqr();

            if self.frames_seen < WARMUP_FRAMES {
                *noise += (power - *noise) / (self.frames_seen + 1) as f32;
            } else if power < GATE * *noise {
                *noise = NOISE_SMOOTHING * *noise + (1.0 - NOISE_SMOOTHING) * power;
            } else {
                *noise = (*noise).max(EPSILON) * NOISE_RISE;
            }

            let target = (1.0 - OVER_SUBTRACTION * *noise / (power + EPSILON)).max(GAIN_FLOOR);
            *gain = GAIN_SMOOTHING * *gain + (1.0 - GAIN_SMOOTHING) * target;
        }
        self.frames_seen = self.frames_seen.saturating_add(1);
    }
}

impl FrameTransform for SpectralGate {
    fn frame_size(&self) -> usize {
        self.hop
    }

    fn delay(&self) -> usize {
        self.hop
    }

    fn denoise(&mut self, frame: &[f32], intensity: f32, output: &mut [f32]) {
        debug_assert_eq!(frame.len(), self.hop);
        debug_assert_eq!(output.len(), self.hop);

        let (first, second) = self.time.split_at_mut(self.hop);
        let (win_first, win_second) = self.window.split_at(self.hop);
        for ((buf, &sample), &w) in first.iter_mut().zip(&self.history).zip(win_first) {
            *buf = sample * w;
        }
        for ((buf, &sample), &w) in second.iter_mut().zip(frame).zip(win_second) {
            *buf = sample * w;
        }
        self.history.copy_from_slice(frame);

        let analysed = self.forward.process_with_scratch(
            &mut self.time,
            &mut self.spectrum,
            &mut self.forward_scratch,
        );
        debug_assert!(analysed.is_ok());

        self.update_gains();
        for (bin, &gain) in self.spectrum.iter_mut().zip(&self.gains) {
            *bin *= 1.0 - intensity * (1.0 - gain);
        }
        // DC and Nyquist must stay real for the inverse transform.
        if let Some(dc) = self.spectrum.first_mut() {
            dc.im = 0.0;
        }
        if let Some(nyquist) = self.spectrum.last_mut() {
            nyquist.im = 0.0;
        }

        let synthesised = self.inverse.process_with_scratch(
            &mut self.spectrum,
            &mut self.time,
            &mut self.inverse_scratch,
        );
        debug_assert!(synthesised.is_ok());

        let norm = 1.0 / self.time.len() as f32;
        for (x, &w) in self.time.iter_mut().zip(&self.window) {
            *x *= w * norm;
        }

        let (first, second) = self.time.split_at(self.hop);
        for ((out, &x), mem) in output.iter_mut().zip(first).zip(self.overlap.iter_mut()) {
            *out = x + *mem;
        }
        self.overlap.copy_from_slice(second);
    }

    fn reset(&mut self) {
        self.history.fill(0.0);
        self.overlap.fill(0.0);
        self.noise.fill(0.0);
        self.gains.fill(1.0);
        self.frames_seen = 0;
    }
}
