use crate::{error::JvError, transform::FrameTransform};

use std::collections::VecDeque;

/// Per-channel framing stage between variable-length chunks and a [`FrameTransform`].
///
/// Input samples accumulate until a full frame of `N` samples is available,
/// which is then denoised in one piece and appended to the output queue.
/// The output queue starts with `N - 1` zeros, the minimum head start that lets
/// every call read back as many samples as it wrote, whatever the chunk sizes.
///
/// All storage is reserved in [`ChannelBuffer::new`]; no method allocates.
pub(crate) struct ChannelBuffer {
    transform: Box<dyn FrameTransform>,
    frame_size: usize,
    /// Pending input, valid up to `filled`.
    frame: Vec<f32>,
    filled: usize,
    denoised: Vec<f32>,
    output: VecDeque<f32>,
    /// Samples handed out by the last [`ChannelBuffer::stage`] call.
    staged: Vec<f32>,
}

impl ChannelBuffer {
    pub(crate) fn new(transform: Box<dyn FrameTransform>) -> Result<Self, JvError> {
        let frame_size = transform.frame_size();
        if frame_size == 0 {
            return Err(JvError::NotSupportedSampleRate);
        }

        let mut frame = Vec::new();
        frame.try_reserve_exact(frame_size)?;
        frame.resize(frame_size, 0.0);

        let mut denoised = Vec::new();
        denoised.try_reserve_exact(frame_size)?;
        denoised.resize(frame_size, 0.0);

        let mut staged = Vec::new();
        staged.try_reserve_exact(frame_size)?;
        staged.resize(frame_size, 0.0);

        let mut output = VecDeque::new();
        output.try_reserve_exact(Self::priming(frame_size) + frame_size)?;

        let mut buffer = Self {
            transform,
            frame_size,
            frame,
            filled: 0,
            denoised,
            output,
            staged,
        };
        buffer.prime();
        Ok(buffer)
    }

    fn priming(frame_size: usize) -> usize {
        frame_size - 1
    }

    fn prime(&mut self) {
        self.output.clear();
        self.output.resize(Self::priming(self.frame_size), 0.0);
    }

    pub(crate) fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Delay in samples from input to output, framing included.
    pub(crate) fn latency(&self) -> usize {
        Self::priming(self.frame_size) + self.transform.delay()
    }

    /// Room left in the pending frame.
    pub(crate) fn space(&self) -> usize {
        self.frame_size - self.filled
    }

    pub(crate) fn pending_input(&self) -> usize {
        self.filled
    }

    pub(crate) fn pending_output(&self) -> usize {
        self.output.len()
    }

    /// Appends samples to the pending frame. At most [`space`](Self::space)
    /// samples are taken from `samples`.
    pub(crate) fn write(&mut self, samples: impl Iterator<Item = f32>) {
        for (slot, sample) in self.frame[self.filled..].iter_mut().zip(samples) {
            *slot = sample;
            self.filled += 1;
        }
    }

    pub(crate) fn frame_ready(&self) -> bool {
        self.filled == self.frame_size
    }

    /// Denoises the pending frame and queues the result.
    pub(crate) fn run_frame(&mut self, intensity: f32) {
        debug_assert!(self.frame_ready());
        self.transform
            .denoise(&self.frame, intensity, &mut self.denoised);
        self.output.extend(self.denoised.iter().copied());
        self.filled = 0;
    }

    /// Moves the next `count` output samples into the staging area.
    ///
    /// Missing samples are filled with silence.
    pub(crate) fn stage(&mut self, count: usize) -> &[f32] {
        let staged = &mut self.staged[..count];
        for slot in staged.iter_mut() {
            *slot = self.output.pop_front().unwrap_or(0.0);
        }
        staged
    }

    pub(crate) fn staged(&self) -> &[f32] {
        &self.staged
    }

    pub(crate) fn reset(&mut self) {
        self.filled = 0;
        self.transform.reset();
        self.prime();
    }
}
