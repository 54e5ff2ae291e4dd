use std::sync::{Arc, Mutex};

use just_voice::{
    Config, Engine, FrameTransform, Handle, JvError, Params, Passthrough, frame_size_for,
};

/// Identity transform that records the intensity of every frame it sees.
struct Recording {
    frame_size: usize,
    intensities: Arc<Mutex<Vec<f32>>>,
}

impl FrameTransform for Recording {
    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn delay(&self) -> usize {
        0
    }

    fn denoise(&mut self, frame: &[f32], intensity: f32, output: &mut [f32]) {
        self.intensities.lock().unwrap().push(intensity);
        output.copy_from_slice(frame);
    }
}

fn passthrough_engine(transform_delay: usize) -> Engine {
    Engine::with_transform(move |sample_rate: u32| -> Box<dyn FrameTransform> {
        Box::new(Passthrough::with_delay(
            frame_size_for(sample_rate),
            transform_delay,
        ))
    })
    .expect("Failed to create engine")
}

fn ramp(len: usize) -> Vec<f32> {
    (0..len).map(|n| (n % 1000) as f32 / 1000.0 + 0.001).collect()
}

/// Chunk lengths from a fixed pseudo-random sequence, including empty chunks.
fn chunk_lengths(total: usize) -> Vec<usize> {
    let mut state: u32 = 7;
    let mut lengths = Vec::new();
    let mut remaining = total;
    while remaining > 0 {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let len = ((state >> 16) as usize % 700).min(remaining);
        lengths.push(len);
        remaining -= len;
    }
    lengths
}

fn process_in_chunks(engine: &mut Engine, input: &[f32], lengths: &[usize]) -> Vec<f32> {
    let mut output = Vec::with_capacity(input.len());
    let mut offset = 0;
    for &len in lengths {
        let mut chunk_out = vec![f32::NAN; len];
        engine
            .process(&input[offset..offset + len], &mut chunk_out)
            .expect("Failed to process chunk");
        output.extend_from_slice(&chunk_out);
        offset += len;
    }
    output
}

/// 48 kHz mono stream processed as chunks of 100, 37 and 500 samples.
#[test]
fn odd_chunk_sizes_return_equal_lengths() {
    let mut engine = passthrough_engine(0);
    engine
        .setup(&Config::new(48000), &Params::new(0.5))
        .expect("Failed to set up engine");

    let input = ramp(637);
    let mut output = Vec::new();
    let mut offset = 0;
    for len in [100, 37, 500] {
        let mut chunk_out = vec![f32::NAN; len];
        engine
            .process(&input[offset..offset + len], &mut chunk_out)
            .unwrap();
        assert_eq!(chunk_out.len(), len);
        output.extend_from_slice(&chunk_out);
        offset += len;
    }

    let delay = engine.latency_samples().unwrap();
    assert_eq!(delay, 479);
    assert!(output[..delay].iter().all(|&s| s == 0.0));
    assert_eq!(&output[delay..], &input[..input.len() - delay]);
}

/// The same stream with the default spectral gate keeps the chunk lengths.
#[test]
fn default_engine_returns_equal_lengths() {
    let mut engine = Engine::create().unwrap();
    engine.setup(&Config::new(48000), &Params::new(0.5)).unwrap();

    for len in [100, 37, 500] {
        let input = vec![0.1f32; len];
        let mut output = vec![f32::NAN; len];
        engine.process(&input, &mut output).unwrap();
        assert!(output.iter().all(|s| s.is_finite()));
    }
}

/// Output is the input delayed by exactly the reported latency, for any chunking.
#[test]
fn samples_are_conserved_across_arbitrary_chunks() {
    for sample_rate in [8000, 16000, 48000, 192000] {
        let mut engine = passthrough_engine(7);
        engine
            .setup(&Config::new(sample_rate), &Params::default())
            .unwrap();

        let input = ramp(20_000);
        let output = process_in_chunks(&mut engine, &input, &chunk_lengths(input.len()));

        let delay = engine.latency_samples().unwrap();
        assert_eq!(delay, frame_size_for(sample_rate) - 1 + 7);
        assert_eq!(output.len(), input.len());
        assert!(output[..delay].iter().all(|&s| s == 0.0));
        assert_eq!(&output[delay..], &input[..input.len() - delay]);
    }
}

/// Interleaved channel order survives buffering.
#[test]
fn stereo_channels_stay_separate() {
    let mut engine = passthrough_engine(0);
    engine
        .setup(&Config::new(16000).with_num_channels(2), &Params::default())
        .unwrap();

    let frames = 2000;
    let input: Vec<f32> = (0..frames).flat_map(|n| [n as f32, -(n as f32)]).collect();
    let lengths: Vec<usize> = chunk_lengths(frames).iter().map(|len| len * 2).collect();
    let output = process_in_chunks(&mut engine, &input, &lengths);

    let delay = engine.latency_samples().unwrap();
    for n in delay..frames {
        let source = (n - delay) as f32;
        assert_eq!(output[2 * n], source);
        assert_eq!(output[2 * n + 1], -source);
    }
}

/// A block size committed at setup works like any other chunk length.
#[test]
fn committed_block_size_is_processed_in_full() {
    let mut engine = passthrough_engine(0);
    let config = Config::new(48000).with_samples_per_block(512);
    engine.setup(&config, &Params::default()).unwrap();

    let input = ramp(512 * 10);
    let output = process_in_chunks(&mut engine, &input, &[512; 10]);

    let delay = engine.latency_samples().unwrap();
    assert_eq!(&output[delay..], &input[..input.len() - delay]);
}

/// Updating before every call changes neither lengths nor latency, and each
/// frame is processed under a single intensity.
#[test]
fn intensity_can_change_between_every_call() {
    let intensities = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&intensities);
    let mut engine = Engine::with_transform(move |_: u32| -> Box<dyn FrameTransform> {
        Box::new(Recording {
            frame_size: 160,
            intensities: Arc::clone(&recorded),
        })
    })
    .unwrap();
    engine.setup(&Config::new(16000), &Params::new(0.0)).unwrap();

    let latency = engine.latency().unwrap();
    let values = [0.0, 0.25, 0.5, 0.75, 1.0];
    let input = ramp(30_000);
    let mut output = Vec::new();
    let mut expected = Vec::new();
    let mut offset = 0;

    for (call, len) in chunk_lengths(input.len()).into_iter().enumerate() {
        let value = values[call % values.len()];
        engine.update(&Params::new(value)).unwrap();
        // Frames completed by this call see the value set just before it.
        let completed = (offset + len) / 160 - offset / 160;
        expected.extend(std::iter::repeat_n(value, completed));

        let mut chunk_out = vec![0.0; len];
        engine
            .process(&input[offset..offset + len], &mut chunk_out)
            .unwrap();
        output.extend_from_slice(&chunk_out);
        offset += len;
        assert_eq!(engine.latency().unwrap(), latency);
    }

    let delay = engine.latency_samples().unwrap();
    assert_eq!(&output[delay..], &input[..input.len() - delay]);

    let intensities = intensities.lock().unwrap();
    assert_eq!(intensities.len(), input.len() / 160);
    assert_eq!(*intensities, expected);
}

/// A frame filled across several calls is processed under the intensity set
/// before the call that completes it, identically on every channel.
#[test]
fn frame_spanning_calls_uses_intensity_at_completion() {
    let channels: Arc<Mutex<Vec<Arc<Mutex<Vec<f32>>>>>> = Arc::new(Mutex::new(Vec::new()));
    let built = Arc::clone(&channels);
    let mut engine = Engine::with_transform(move |_: u32| -> Box<dyn FrameTransform> {
        let intensities = Arc::new(Mutex::new(Vec::new()));
        built.lock().unwrap().push(Arc::clone(&intensities));
        Box::new(Recording {
            frame_size: 160,
            intensities,
        })
    })
    .unwrap();
    engine
        .setup(&Config::new(16000).with_num_channels(3), &Params::new(0.1))
        .unwrap();

    fn chunk(engine: &mut Engine, samples_per_channel: usize) {
        let input = vec![0.5f32; 3 * samples_per_channel];
        let mut output = vec![0.0f32; input.len()];
        engine.process(&input, &mut output).unwrap();
    }

    // 100 of 160 samples, no frame yet
    chunk(&mut engine, 100);
    engine.update(&Params::new(0.9)).unwrap();
    // Completes the first frame and starts the second
    chunk(&mut engine, 100);
    engine.update(&Params::new(0.3)).unwrap();
    engine.update(&Params::new(0.6)).unwrap();
    // Completes the second frame
    chunk(&mut engine, 220);
    engine.update(&Params::new(0.0)).unwrap();
    // 100 samples pending, no frame
    chunk(&mut engine, 0);

    let channels = channels.lock().unwrap();
    assert_eq!(channels.len(), 3);
    for intensities in channels.iter() {
        assert_eq!(*intensities.lock().unwrap(), [0.9, 0.6]);
    }
}

/// A control thread hammering the parameters never disturbs the audio thread.
#[test]
fn concurrent_updates_during_processing() {
    let mut engine = Engine::create().unwrap();
    engine
        .setup(&Config::new(16000).with_num_channels(2), &Params::new(1.0))
        .unwrap();
    let context = engine.parameter_context().unwrap();

    let control = std::thread::spawn(move || {
        for i in 0..5_000 {
            context.set_intensity((i % 11) as f32 / 10.0).unwrap();
        }
    });

    let input = ramp(2 * 256);
    for _ in 0..200 {
        let mut output = vec![f32::NAN; input.len()];
        engine.process(&input, &mut output).unwrap();
        assert!(output.iter().all(|s| s.is_finite()));
    }
    control.join().unwrap();
}

/// With the intensity at zero the spectral gate only delays the signal.
#[test]
fn default_engine_is_transparent_at_zero_intensity() {
    let mut engine = Engine::create().unwrap();
    engine.setup(&Config::new(16000), &Params::new(0.0)).unwrap();

    let input: Vec<f32> = (0..16000)
        .map(|n| (2.0 * std::f32::consts::PI * 300.0 * n as f32 / 16000.0).sin() * 0.3)
        .collect();
    let output = process_in_chunks(&mut engine, &input, &chunk_lengths(input.len()));

    let delay = engine.latency_samples().unwrap();
    assert_eq!(delay, 319);
    for n in delay..input.len() {
        assert!(approx::abs_diff_eq!(output[n], input[n - delay], epsilon = 1e-4));
    }
}

/// Every supported sample rate sets up with any valid channel layout and block size.
#[test]
fn setup_accepts_every_supported_configuration() {
    for sample_rate in just_voice::SUPPORTED_SAMPLE_RATES {
        for (inputs, outputs, block) in [(1, 1, 0), (2, 1, 512), (1, 6, 32768)] {
            let mut engine = Engine::create().unwrap();
            let config = Config::new(sample_rate)
                .with_num_input_channels(inputs)
                .with_num_output_channels(outputs)
                .with_samples_per_block(block);
            engine.setup(&config, &Params::default()).unwrap();
            assert!(engine.is_configured());
        }
    }
}

/// Lifecycle ordering through the handle slot.
#[test]
fn handle_lifecycle() {
    let mut handle = Handle::empty();
    assert_eq!(handle.latency(), Err(JvError::NotCreated));

    handle.create().unwrap();
    assert_eq!(handle.process(&[0.0], &mut [0.0]), Err(JvError::NotInitialized));
    assert_eq!(
        handle.setup(&Config::new(22050), &Params::default()),
        Err(JvError::NotSupportedSampleRate)
    );

    handle.setup(&Config::new(24000), &Params::default()).unwrap();
    assert_eq!(
        handle.setup(&Config::new(24000), &Params::default()),
        Err(JvError::AlreadyInitialized)
    );
    assert_eq!(handle.engine().unwrap().config().unwrap().sample_rate, 24000);

    handle.destroy().unwrap();
    assert_eq!(handle.update(&Params::default()), Err(JvError::NotCreated));
    assert_eq!(handle.destroy(), Err(JvError::NotCreated));
}
