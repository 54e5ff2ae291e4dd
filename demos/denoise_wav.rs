//! Denoises a WAV file.
//!
//! ```text
//! cargo run --example denoise_wav -- input.wav output.wav [intensity]
//! ```

use just_voice::{Config, Engine, Params};

const BLOCK_SIZE: usize = 512;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(input_path), Some(output_path)) = (args.next(), args.next()) else {
        return Err("Usage: denoise_wav <input.wav> <output.wav> [intensity]".into());
    };
    let intensity = match args.next() {
        Some(value) => value.parse::<f32>()?,
        None => just_voice::DEFAULT_INTENSITY,
    };

    let mut reader = hound::WavReader::open(&input_path)?;
    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let config = Config::new(spec.sample_rate)
        .with_num_channels(spec.channels.into())
        .with_samples_per_block(BLOCK_SIZE as u32);

    let mut engine = Engine::create()?;
    engine.setup(&config, &Params::new(intensity))?;
    println!(
        "Denoising {input_path}: {} Hz, {} channels, intensity {intensity}, latency {} samples",
        spec.sample_rate,
        spec.channels,
        engine.latency_samples()?
    );

    let block = BLOCK_SIZE * spec.channels as usize;
    let mut denoised = vec![0.0f32; samples.len()];
    for (input, output) in samples.chunks(block).zip(denoised.chunks_mut(block)) {
        engine.process(input, output)?;
    }

    let out_spec = hound::WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&output_path, out_spec)?;
    for sample in denoised {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    println!("Wrote {output_path}");

    Ok(())
}
