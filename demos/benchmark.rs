use just_voice::{Config, Engine, Params, SUPPORTED_SAMPLE_RATES};
use std::time::{Duration, Instant};

const BLOCK_SIZE: u32 = 512;
const SECONDS: u32 = 10;

struct SessionReport {
    sample_rate: u32,
    period: Duration,
    max_execution_time: Duration,
    total_execution_time: Duration,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Just Voice version: {}", just_voice::get_version());
    println!("Block size: {BLOCK_SIZE} samples, {SECONDS} s of stereo noise per sample rate\n");

    // One session per sample rate, all running at the same time
    let sessions: Vec<_> = SUPPORTED_SAMPLE_RATES
        .into_iter()
        .map(|sample_rate| std::thread::spawn(move || run_session(sample_rate)))
        .collect();

    let mut reports = Vec::with_capacity(sessions.len());
    for session in sessions {
        reports.push(session.join().map_err(|_| "session thread panicked")??);
    }

    println!("Session report (max processing time per block):");
    for report in &reports {
        let max_ms = report.max_execution_time.as_secs_f64() * 1000.0;
        let period_ms = report.period.as_secs_f64() * 1000.0;
        let realtime_factor =
            report.total_execution_time.as_secs_f64() / f64::from(SECONDS);
        let miss_note = if report.max_execution_time > report.period {
            " (missed deadline)"
        } else {
            ""
        };
        println!(
            "{:>6} Hz: {max_ms:.3} ms / {period_ms:.3} ms ({:.1}%), real-time factor {realtime_factor:.4}{miss_note}",
            report.sample_rate,
            max_ms / period_ms * 100.0,
        );
    }

    Ok(())
}

fn run_session(sample_rate: u32) -> Result<SessionReport, just_voice::JvError> {
    let config = Config::new(sample_rate)
        .with_num_channels(2)
        .with_samples_per_block(BLOCK_SIZE);
    let mut engine = Engine::create()?;
    engine.setup(&config, &Params::new(1.0))?;

    let block_len = (BLOCK_SIZE * config.num_input_channels) as usize;
    let mut state: u32 = sample_rate;
    let input: Vec<f32> = (0..block_len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / (1u32 << 24) as f32 - 0.5
        })
        .collect();
    let mut output = vec![0.0f32; block_len];

    let mut max_execution_time = Duration::ZERO;
    let mut total_execution_time = Duration::ZERO;
    for _ in 0..SECONDS * sample_rate / BLOCK_SIZE {
        let start = Instant::now();
        engine.process(&input, &mut output)?;
        let elapsed = start.elapsed();
        max_execution_time = max_execution_time.max(elapsed);
        total_execution_time += elapsed;
    }

    Ok(SessionReport {
        sample_rate,
        period: Duration::from_secs_f64(f64::from(BLOCK_SIZE) / f64::from(sample_rate)),
        max_execution_time,
        total_execution_time,
    })
}
