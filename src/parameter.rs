use crate::{config::validate_intensity, error::JvError};

use atomic_float::AtomicF32;

use std::sync::{Arc, atomic::Ordering};

/// Lock-free slot holding the effective noise reduction intensity.
#[derive(Debug)]
#[repr(align(64))]
pub(crate) struct ParameterStore {
    intensity: AtomicF32,
}

impl ParameterStore {
    pub(crate) fn new(intensity: f32) -> Self {
        Self {
            intensity: AtomicF32::new(intensity),
        }
    }

    #[inline]
    pub(crate) fn intensity(&self) -> f32 {
        self.intensity.load(Ordering::Acquire)
    }

    /// Callers validate the value first.
    #[inline]
    pub(crate) fn set_intensity(&self, intensity: f32) {
        self.intensity.store(intensity, Ordering::Release);
    }
}

/// Thread-safe view on the parameters of a configured [`Engine`](crate::Engine).
///
/// Obtained from [`Engine::parameter_context`](crate::Engine::parameter_context).
/// The context can be cloned and moved to a control thread while the audio thread
/// keeps processing. Changes take effect at the next frame boundary; a frame is
/// always processed under a single intensity value.
///
/// # Example
///
/// ```rust
/// # use just_voice::{Config, Engine, Params};
/// let mut engine = Engine::create().unwrap();
/// engine.setup(&Config::new(48000), &Params::default()).unwrap();
///
/// let context = engine.parameter_context().unwrap();
/// std::thread::spawn(move || context.set_intensity(0.8).unwrap())
///     .join()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ParameterContext {
    store: Arc<ParameterStore>,
    latency_samples: usize,
    sample_rate: u32,
}

impl ParameterContext {
    pub(crate) fn new(store: Arc<ParameterStore>, latency_samples: usize, sample_rate: u32) -> Self {
        Self {
            store,
            latency_samples,
            sample_rate,
        }
    }

    /// Replaces the noise reduction intensity.
    ///
    /// Returns [`JvError::NotSupportedIntensity`] and keeps the current value if
    /// `intensity` is outside `[0.0, 1.0]`.
    pub fn set_intensity(&self, intensity: f32) -> Result<(), JvError> {
        validate_intensity(intensity)?;
        self.store.set_intensity(intensity);
        Ok(())
    }

    /// Returns the most recently written intensity.
    pub fn intensity(&self) -> f32 {
        self.store.intensity()
    }

    /// End-to-end delay in samples.
    pub fn latency_samples(&self) -> usize {
        self.latency_samples
    }

    /// End-to-end delay in seconds.
    pub fn latency(&self) -> f32 {
        self.latency_samples as f32 / self.sample_rate as f32
    }
}
