/// Maps between the bound input/output channel counts and the processing channels.
///
/// The engine denoises `min(inputs, outputs)` channels:
/// - processing channel `c` is the mean of input channels `c`, `c + P`, `c + 2P`, ...
/// - output channel `o` takes processing channel `o % P`
///
/// With equal counts this is the identity, mono input is duplicated to every
/// output, and a mono output receives the average of all inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChannelMap {
    inputs: usize,
    outputs: usize,
}

impl ChannelMap {
    pub(crate) fn new(inputs: usize, outputs: usize) -> Self {
        debug_assert!(inputs > 0 && outputs > 0);
        Self { inputs, outputs }
    }

    pub(crate) fn inputs(&self) -> usize {
        self.inputs
    }

    pub(crate) fn outputs(&self) -> usize {
        self.outputs
    }

    pub(crate) fn processing_channels(&self) -> usize {
        self.inputs.min(self.outputs)
    }

    /// Folds one interleaved input frame into processing channel `channel`.
    #[inline]
    pub(crate) fn fold(&self, channel: usize, frame: &[f32]) -> f32 {
        let step = self.processing_channels();
        let (sum, count) = frame
            .iter()
            .skip(channel)
            .step_by(step)
            .fold((0.0f32, 0usize), |(sum, count), &s| (sum + s, count + 1));
        if count == 1 { sum } else { sum / count as f32 }
    }

    /// Processing channel feeding output channel `output_channel`.
    #[inline]
    pub(crate) fn source(&self, output_channel: usize) -> usize {
        output_channel % self.processing_channels()
    }
}
