use std::collections::VecDeque;

/// Fixed-size block denoiser driven by the engine's channel buffers.
///
/// The engine builds one transform per processing channel during setup and
/// calls [`denoise`](Self::denoise) with exactly [`frame_size`](Self::frame_size)
/// samples each time a frame is complete. `denoise` runs on the audio thread and
/// must not block or allocate.
pub trait FrameTransform: Send {
    /// Number of samples per frame. Fixed for the lifetime of the transform.
    fn frame_size(&self) -> usize;

    /// Algorithmic delay in samples between a frame's input and its output.
    fn delay(&self) -> usize;

    /// Denoises one frame.
    ///
    /// `frame` and `output` both hold exactly `frame_size()` samples. The whole
    /// frame is processed under the given `intensity` in `[0.0, 1.0]`.
    fn denoise(&mut self, frame: &[f32], intensity: f32, output: &mut [f32]);

    /// Clears any state carried between frames.
    fn reset(&mut self) {}
}

impl<T: FrameTransform + ?Sized> FrameTransform for Box<T> {
    fn frame_size(&self) -> usize {
        (**self).frame_size()
    }

    fn delay(&self) -> usize {
        (**self).delay()
    }

    fn denoise(&mut self, frame: &[f32], intensity: f32, output: &mut [f32]) {
        (**self).denoise(frame, intensity, output);
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// Builds a [`FrameTransform`] for a sample rate.
///
/// Implemented for any `Fn(u32) -> Box<dyn FrameTransform> + Send` closure.
/// A transform reporting a frame size of zero marks the sample rate as
/// unsupported.
pub trait TransformFactory: Send {
    fn build(&self, sample_rate: u32) -> Box<dyn FrameTransform>;
}

impl<F> TransformFactory for F
where
    F: Fn(u32) -> Box<dyn FrameTransform> + Send,
{
    fn build(&self, sample_rate: u32) -> Box<dyn FrameTransform> {
        self(sample_rate)
    }
}

/// Identity transform with an optional declared delay.
///
/// Useful as a bypass and as a deterministic stand-in for a real denoiser.
#[derive(Debug, Clone)]
pub struct Passthrough {
    frame_size: usize,
    delay: usize,
    line: VecDeque<f32>,
}

impl Passthrough {
    pub fn new(frame_size: usize) -> Self {
        Self::with_delay(frame_size, 0)
    }

    /// Output lags input by exactly `delay` samples.
    pub fn with_delay(frame_size: usize, delay: usize) -> Self {
        let mut line = VecDeque::with_capacity(delay + frame_size);
        line.resize(delay, 0.0);
        Self {
            frame_size,
            delay,
            line,
        }
    }
}

impl FrameTransform for Passthrough {
    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn delay(&self) -> usize {
        self.delay
    }

    fn denoise(&mut self, frame: &[f32], _intensity: f32, output: &mut [f32]) {
        self.line.extend(frame.iter().copied());
        for (out, sample) in output.iter_mut().zip(self.line.drain(..frame.len())) {
            *out = sample;
        }
    }

    fn reset(&mut self) {
        self.line.clear();
        self.line.resize(self.delay, 0.0);
    }
}
