use crate::error::JvError;

/// Sample rates accepted by [`Config::validate`].
pub const SUPPORTED_SAMPLE_RATES: [u32; 8] =
    [8000, 16000, 24000, 32000, 48000, 64000, 96000, 192000];

/// Largest block size a caller may commit to.
pub const MAX_SAMPLES_PER_BLOCK: u32 = 32768;

/// Intensity used by [`Params::default`].
pub const DEFAULT_INTENSITY: f32 = 0.5;

/// Stream layout bound once per handle by [`Engine::setup`](crate::Engine::setup).
///
/// The configuration cannot be changed after setup. Create a new handle to
/// process a stream with a different layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Config {
    /// Number of interleaved channels in the input buffer (1 or more).
    pub num_input_channels: u32,
    /// Number of interleaved channels in the output buffer (1 or more).
    pub num_output_channels: u32,
    /// Sample rate in Hz, one of [`SUPPORTED_SAMPLE_RATES`].
    pub sample_rate: u32,
    /// Samples per channel the caller commits to pass on every call.
    /// `0` allows any length per call.
    pub samples_per_block: u32,
}

impl Config {
    /// Mono in, mono out, dynamic block length.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            num_input_channels: 1,
            num_output_channels: 1,
            sample_rate,
            samples_per_block: 0,
        }
    }

    /// Sets both input and output channel counts.
    pub fn with_num_channels(self, num_channels: u32) -> Self {
        Self {
            num_input_channels: num_channels,
            num_output_channels: num_channels,
            ..self
        }
    }

    pub fn with_num_input_channels(self, num_input_channels: u32) -> Self {
        Self {
            num_input_channels,
            ..self
        }
    }

    pub fn with_num_output_channels(self, num_output_channels: u32) -> Self {
        Self {
            num_output_channels,
            ..self
        }
    }

    pub fn with_samples_per_block(self, samples_per_block: u32) -> Self {
        Self {
            samples_per_block,
            ..self
        }
    }

    /// Checks every field against its supported range.
    ///
    /// Fields are checked in the order input channels, output channels,
    /// sample rate, samples per block. The error of the first invalid field
    /// is returned.
    pub fn validate(&self) -> Result<(), JvError> {
        if self.num_input_channels == 0 {
            return Err(JvError::NotSupportedNumInputChannels);
        }
        if self.num_output_channels == 0 {
            return Err(JvError::NotSupportedNumOutputChannels);
        }
        if !SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(JvError::NotSupportedSampleRate);
        }
        if self.samples_per_block > MAX_SAMPLES_PER_BLOCK {
            return Err(JvError::NotSupportedSamplesPerBlock);
        }
        Ok(())
    }
}

/// Settings that can be changed at any time after setup.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Params {
    /// How strongly to denoise.
    ///
    /// **Range:** 0.0 to 1.0
    /// - **0.0:** Original signal passes through (still delayed by the latency)
    /// - **1.0:** Maximum noise reduction
    pub noise_reduction_intensity: f32,
}

impl Params {
    pub fn new(noise_reduction_intensity: f32) -> Self {
        Self {
            noise_reduction_intensity,
        }
    }

    pub fn validate(&self) -> Result<(), JvError> {
        validate_intensity(self.noise_reduction_intensity)
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new(DEFAULT_INTENSITY)
    }
}

/// NaN is rejected along with values outside `[0.0, 1.0]`.
pub(crate) fn validate_intensity(intensity: f32) -> Result<(), JvError> {
    if (0.0..=1.0).contains(&intensity) {
        Ok(())
    } else {
        Err(JvError::NotSupportedIntensity)
    }
}
