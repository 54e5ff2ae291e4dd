use just_voice::{Config, Engine, Handle, Params};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Display library version
    println!("Just Voice version: {}", just_voice::get_version());

    // Create the engine with the built-in spectral gate
    let mut engine = Engine::create()?;
    println!("Engine created successfully");

    // Set up configuration: stereo in and out, 48 kHz, 512 samples per block
    let config = Config::new(48000)
        .with_num_channels(2)
        .with_samples_per_block(512);
    engine.setup(&config, &Params::new(0.5))?;
    println!(
        "Engine configured: Sample rate: {} Hz, Block: {} samples, Channels: {} -> {}",
        config.sample_rate,
        config.samples_per_block,
        config.num_input_channels,
        config.num_output_channels
    );

    // Get output delay
    println!(
        "Latency: {} samples ({:.2} ms)",
        engine.latency_samples()?,
        engine.latency()? * 1000.0
    );

    // Process interleaved audio = [l, r, l, r, ..]
    let num_channels = config.num_input_channels as usize;
    let input = vec![0.0f32; num_channels * config.samples_per_block as usize];
    let mut output = vec![0.0f32; input.len()];
    engine.process(&input, &mut output)?;

    // Chunks do not have to match the block size
    let mut short = vec![0.0f32; num_channels * 37];
    engine.process(&input[..short.len()], &mut short)?;

    // Change the intensity on the engine directly
    engine.update(&Params::new(0.8))?;

    // Get a parameter context for thread safe interaction from a control thread
    let context = engine.parameter_context()?;
    let control = std::thread::spawn(move || context.set_intensity(0.3));
    control.join().map_err(|_| "control thread panicked")??;
    println!("Intensity: {}", engine.parameter_context()?.intensity());

    // Start a new stream
    engine.reset()?;
    println!("Engine reset succeeded");

    // The handle slot mirrors the create / destroy discipline of the C API
    let mut handle = Handle::empty();
    handle.create()?;
    handle.setup(&Config::new(16000), &Params::default())?;
    println!("Handle latency: {:.2} ms", handle.latency()? * 1000.0);
    handle.destroy()?;

    match handle.latency() {
        Ok(_) => println!("Destroyed handle still answered"),
        Err(e) => println!("Destroyed handle: {e}"),
    }

    println!("All steps completed");

    Ok(())
}
