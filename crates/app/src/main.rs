//! codec-sim: push a payload through compression and channel coding over a
//! noisy link, many times, and report how often it survives.
//!
//! Usage:
//!   codec-sim                                   # random defaults, printed seed
//!   codec-sim --seed 42 --noise 0.5 --trials 1000
//!   codec-sim --in notes.txt --compression rle --encoding repetition --repetitions 5

mod config;
mod input_gen;

use anyhow::Result;
use clap::Parser;
use codec_sim_core::framing::Envelope;
use codec_sim_core::metrics::ChannelMetrics;
use codec_sim_core::noise::ChannelNoise;
use codec_sim_core::pipeline::{CodecPipeline, Outcome};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Config};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();

    let config = Config::from_cli(Cli::parse())?;
    if config.print_config {
        config.print();
    }

    let metrics = run(&config)?;
    if config.print_metrics {
        metrics.print_summary();
    }
    metrics.print_result();
    Ok(())
}

/// Transmit the configured payload `config.trials` times.
fn run(config: &Config) -> Result<ChannelMetrics> {
    let envelope = match &config.input_file {
        Some(path) => input_gen::load_file(path)?,
        None => input_gen::sample_envelope(config.seed, config.sample_bytes),
    };
    let frame = envelope.to_bytes()?;

    let pipeline = CodecPipeline::new(config.pipeline_config()?);
    let mut noise = ChannelNoise::new(config.seed);
    let mut metrics = ChannelMetrics::new();

    info!(
        pipeline = %pipeline.config(),
        payload = envelope.payload.len(),
        frame = frame.len(),
        noise = config.noise_level,
        trials = config.trials,
        seed = config.seed,
        "starting simulation"
    );

    for trial in 0..config.trials {
        let transmission = pipeline.transmit(&frame, &mut noise, config.noise_level)?;
        let outcome = metrics.record(&frame, &transmission);

        if let (Outcome::Corrupted { bit_errors }, Ok(received)) = (outcome, &transmission.decoded) {
            match Envelope::parse(received) {
                Err(err) => {
                    debug!(trial, bit_errors, error = %err, "envelope caught corruption");
                    metrics.record_crc_failure();
                }
                Ok(_) => warn!(trial, bit_errors, "corrupted payload passed envelope checks"),
            }
        }
        debug!(trial, ?outcome, flipped = transmission.bits_flipped, "trial complete");
    }

    metrics.complete();
    info!(
        intact = metrics.delivered_intact,
        corrupted = metrics.delivered_corrupted,
        rejected = metrics.rejected,
        "simulation finished"
    );
    Ok(metrics)
}
