use crate::{
    channel_buffer::ChannelBuffer,
    config::{Config, Params},
    error::JvError,
    mixing::ChannelMap,
    parameter::{ParameterContext, ParameterStore},
    spectral::SpectralGate,
    transform::{FrameTransform, TransformFactory},
};

use std::sync::Arc;

/// Streaming noise reduction engine.
///
/// An engine starts out created but unconfigured. [`Engine::setup`] binds a
/// [`Config`] exactly once; afterwards audio can be processed in chunks of
/// any length and the intensity can be changed between calls.
///
/// # Example
///
/// ```rust
/// use just_voice::{Config, Engine, Params};
///
/// let mut engine = Engine::create().unwrap();
/// engine.setup(&Config::new(48000), &Params::new(0.5)).unwrap();
///
/// let input = vec![0.0f32; 100];
/// let mut output = vec![0.0f32; 100];
/// engine.process(&input, &mut output).unwrap();
/// ```
pub struct Engine {
    factory: Box<dyn TransformFactory>,
    state: State,
}

enum State {
    Created,
    Configured(Pipeline),
}

/// Everything bound by a successful setup.
struct Pipeline {
    config: Config,
    params: Arc<ParameterStore>,
    map: ChannelMap,
    channels: Vec<ChannelBuffer>,
    latency_samples: usize,
}

impl Engine {
    /// Creates an engine backed by the built-in [`SpectralGate`].
    ///
    /// Nothing sized by the stream is allocated here. Running out of memory
    /// for the engine itself aborts like any other Rust allocation;
    /// [`JvError::AllocationFailed`] is reported by [`setup`](Self::setup).
    pub fn create() -> Result<Self, JvError> {
        Self::with_transform(|sample_rate: u32| -> Box<dyn FrameTransform> {
            Box::new(SpectralGate::new(sample_rate))
        })
    }

    /// Creates an engine that builds one transform per processing channel from `factory`.
    pub fn with_transform(factory: impl TransformFactory + 'static) -> Result<Self, JvError> {
        log::trace!("Creating engine");
        Ok(Self {
            factory: Box::new(factory),
            state: State::Created,
        })
    }

    /// Binds the stream configuration and the initial parameters.
    ///
    /// Every field is validated before anything is allocated. On error the
    /// engine stays unconfigured and can be set up again.
    ///
    /// # Warning
    /// Do not call from audio processing threads as this allocates memory.
    pub fn setup(&mut self, config: &Config, params: &Params) -> Result<(), JvError> {
        if matches!(self.state, State::Configured(_)) {
            return Err(JvError::AlreadyInitialized);
        }

        if let Err(err) = config.validate().and_then(|()| params.validate()) {
            log::debug!("Rejected setup {config:?} {params:?}: {err}");
            return Err(err);
        }

        let pipeline = Pipeline::new(self.factory.as_ref(), *config, *params)?;
        log::debug!(
            "Engine configured: {} Hz, {} -> {} channels, frame size {}, latency {} samples",
            config.sample_rate,
            config.num_input_channels,
            config.num_output_channels,
            pipeline.frame_size(),
            pipeline.latency_samples,
        );
        self.state = State::Configured(pipeline);
        Ok(())
    }

    /// Replaces the noise reduction intensity.
    ///
    /// The new value is picked up at the next frame boundary.
    pub fn update(&self, params: &Params) -> Result<(), JvError> {
        let pipeline = self.pipeline()?;
        params.validate()?;
        pipeline.params.set_intensity(params.noise_reduction_intensity);
        Ok(())
    }

    /// Denoises one chunk of interleaved audio.
    ///
    /// `input` holds `n * num_input_channels` samples and `output` must hold
    /// `n * num_output_channels` samples, for any `n` including zero. The
    /// output lags the input by [`latency_samples`](Self::latency_samples);
    /// the first samples of a stream are silence.
    ///
    /// Real-time safe: never allocates, blocks or logs.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), JvError> {
        self.pipeline_mut()?.process(input, output)
    }

    /// End-to-end delay in seconds. Fixed once configured.
    pub fn latency(&self) -> Result<f32, JvError> {
        let pipeline = self.pipeline()?;
        Ok(pipeline.latency_samples as f32 / pipeline.config.sample_rate as f32)
    }

    /// End-to-end delay in samples per channel.
    pub fn latency_samples(&self) -> Result<usize, JvError> {
        Ok(self.pipeline()?.latency_samples)
    }

    /// Returns a context for changing parameters from another thread.
    pub fn parameter_context(&self) -> Result<ParameterContext, JvError> {
        let pipeline = self.pipeline()?;
        Ok(ParameterContext::new(
            Arc::clone(&pipeline.params),
            pipeline.latency_samples,
            pipeline.config.sample_rate,
        ))
    }

    /// The configuration bound by [`setup`](Self::setup).
    pub fn config(&self) -> Result<&Config, JvError> {
        Ok(&self.pipeline()?.config)
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.state, State::Configured(_))
    }

    /// Clears all buffered audio and transform state.
    ///
    /// Call this when the stream is interrupted. Configuration and parameters
    /// are kept and the latency is unchanged.
    pub fn reset(&mut self) -> Result<(), JvError> {
        let pipeline = self.pipeline_mut()?;
        for channel in &mut pipeline.channels {
            channel.reset();
        }
        log::debug!("Engine reset");
        Ok(())
    }

    fn pipeline(&self) -> Result<&Pipeline, JvError> {
        match &self.state {
            State::Configured(pipeline) => Ok(pipeline),
            State::Created => Err(JvError::NotInitialized),
        }
    }

    fn pipeline_mut(&mut self) -> Result<&mut Pipeline, JvError> {
        match &mut self.state {
            State::Configured(pipeline) => Ok(pipeline),
            State::Created => Err(JvError::NotInitialized),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        log::trace!("Destroying engine");
    }
}

impl Pipeline {
    fn new(factory: &dyn TransformFactory, config: Config, params: Params) -> Result<Self, JvError> {
        let map = ChannelMap::new(
            config.num_input_channels as usize,
            config.num_output_channels as usize,
        );

        let mut channels = Vec::new();
        channels.try_reserve_exact(map.processing_channels())?;
        for _ in 0..map.processing_channels() {
            channels.push(ChannelBuffer::new(factory.build(config.sample_rate))?);
        }

        let first = &channels[0];
        if channels
            .iter()
            .any(|c| c.frame_size() != first.frame_size() || c.latency() != first.latency())
        {
            return Err(JvError::NotSupportedSampleRate);
        }
        let latency_samples = first.latency();

        Ok(Self {
            config,
            params: Arc::new(ParameterStore::new(params.noise_reduction_intensity)),
            map,
            channels,
            latency_samples,
        })
    }

    fn frame_size(&self) -> usize {
        self.channels[0].frame_size()
    }

    fn process(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), JvError> {
        let Pipeline {
            params,
            map,
            channels,
            ..
        } = self;
        let (num_inputs, num_outputs) = (map.inputs(), map.outputs());

        if input.len() % num_inputs != 0 {
            return Err(JvError::BufferSizeMismatch {
                expected: input.len() / num_inputs * num_inputs,
                actual: input.len(),
            });
        }
        let num_frames = input.len() / num_inputs;
        if output.len() != num_frames * num_outputs {
            return Err(JvError::BufferSizeMismatch {
                expected: num_frames * num_outputs,
                actual: output.len(),
            });
        }

        let mut offset = 0;
        while offset < num_frames {
            let segment = (num_frames - offset).min(channels[0].space());
            let chunk_in = &input[offset * num_inputs..(offset + segment) * num_inputs];

            for (c, channel) in channels.iter_mut().enumerate() {
                channel.write(chunk_in.chunks_exact(num_inputs).map(|f| map.fold(c, f)));
            }

            if channels[0].frame_ready() {
                // Read once per frame so every channel sees the same value.
                let intensity = params.intensity();
                for channel in channels.iter_mut() {
                    channel.run_frame(intensity);
                }
            }

            for channel in channels.iter_mut() {
                channel.stage(segment);
            }

            let chunk_out = &mut output[offset * num_outputs..(offset + segment) * num_outputs];
            for (t, frame) in chunk_out.chunks_exact_mut(num_outputs).enumerate() {
                for (o, sample) in frame.iter_mut().enumerate() {
                    *sample = channels[map.source(o)].staged()[t];
                }
            }

            offset += segment;
        }

        debug_assert!(
            channels
                .iter()
                .all(|c| c.pending_input() < c.frame_size()
                    && c.pending_output() < 2 * c.frame_size())
        );
        Ok(())
    }
}
