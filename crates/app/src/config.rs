//! Configuration for the codec-sim application.
//!
//! Handles parsing command-line arguments and generating sensible defaults
//! (including randomized defaults that are reproducible with a seed).
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments, using intelligent defaults.
//! All defaults are printed so runs are reproducible.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use codec_sim_core::compress::CompressionScheme;
use codec_sim_core::ecc::{EncodingScheme, Hamming, ParityCheck, Repetition};
use codec_sim_core::pipeline::PipelineConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Compression stage choices.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum CompressionChoice {
    None,
    Huffman,
    #[value(name = "rle", alias = "run-length")]
    RunLength,
}

/// Channel code choices.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum EncodingChoice {
    None,
    Hamming,
    Parity,
    Repetition,
}

#[derive(Parser, Debug)]
#[command(
    name = "codec-sim",
    version,
    about = "Push payloads through compression and error-correcting codes over a noisy channel"
)]
pub struct Cli {
    /// Input file (default: generate a sample payload)
    #[arg(long = "in", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Size of the generated sample payload in bytes
    #[arg(long, default_value_t = 4096)]
    pub size: usize,

    /// Random seed for determinism (default: time-based)
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, ignore_case = true, default_value_t = CompressionChoice::Huffman)]
    pub compression: CompressionChoice,

    #[arg(long, value_enum, ignore_case = true, default_value_t = EncodingChoice::Hamming)]
    pub encoding: EncodingChoice,

    /// Data bits per Hamming codeword
    #[arg(long, default_value_t = 8)]
    pub codeword_len: usize,

    /// Copies of each bit for the repetition code
    #[arg(long, default_value_t = 3)]
    pub repetitions: usize,

    /// Failing parity pairs that reject a payload
    #[arg(long, default_value_t = codec_sim_core::ecc::DEFAULT_FAILURE_THRESHOLD)]
    pub parity_threshold: usize,

    /// Percent of wire bits to flip (default: random 0-2)
    #[arg(long, value_name = "PERCENT")]
    pub noise: Option<f64>,

    /// Number of transmissions to simulate
    #[arg(long, default_value_t = 100)]
    pub trials: usize,

    /// Print resolved configuration
    #[arg(long)]
    pub print_config: bool,

    /// Don't print metrics summary
    #[arg(long)]
    pub no_metrics: bool,
}

/// Complete configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct Config {
    // === Input ===
    /// Input file path (None = generate sample)
    pub input_file: Option<PathBuf>,

    /// Generated sample size in bytes
    pub sample_bytes: usize,

    // === Pipeline ===
    pub compression: CompressionChoice,
    pub encoding: EncodingChoice,
    pub codeword_len: usize,
    pub repetitions: usize,
    pub parity_threshold: usize,

    // === Channel ===
    /// Seed for sample generation and noise
    pub seed: u64,

    /// Percent of wire bits flipped per transmission
    pub noise_level: f64,

    /// Transmissions to simulate
    pub trials: usize,

    // === Behavior ===
    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print detailed metrics summary
    pub print_metrics: bool,
}

impl Config {
    /// Resolve parsed arguments into a configuration.
    ///
    /// If --seed is absent a time-based seed is used. Every randomized default
    /// is drawn from that seed, so printing the config makes a run repeatable.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let seed = match cli.seed {
            Some(seed) => seed,
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .context("system clock is before the unix epoch")?
                .as_millis() as u64,
        };

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let noise_level = cli.noise.unwrap_or_else(|| {
            // Bias toward light noise
            let r: f64 = rng.gen();
            r * r * 2.0
        });

        ensure!(
            noise_level.is_finite() && (0.0..=100.0).contains(&noise_level),
            "--noise must be a percentage between 0 and 100, got {noise_level}"
        );
        ensure!(cli.trials > 0, "--trials must be at least 1");

        Ok(Config {
            input_file: cli.input,
            sample_bytes: cli.size,
            compression: cli.compression,
            encoding: cli.encoding,
            codeword_len: cli.codeword_len,
            repetitions: cli.repetitions,
            parity_threshold: cli.parity_threshold,
            seed,
            noise_level,
            trials: cli.trials,
            print_config: cli.print_config,
            print_metrics: !cli.no_metrics,
        })
    }

    /// Build the core pipeline description, validating code parameters.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let compression = match self.compression {
            CompressionChoice::None => None,
            CompressionChoice::Huffman => Some(CompressionScheme::Huffman),
            CompressionChoice::RunLength => Some(CompressionScheme::RunLength),
        };
        let encoding: Option<EncodingScheme> = match self.encoding {
            EncodingChoice::None => None,
            EncodingChoice::Hamming => Some(
                Hamming::new(self.codeword_len)
                    .context("invalid --codeword-len")?
                    .into(),
            ),
            EncodingChoice::Parity => Some(
                ParityCheck::with_threshold(self.parity_threshold)
                    .context("invalid --parity-threshold")?
                    .into(),
            ),
            EncodingChoice::Repetition => Some(
                Repetition::new(self.repetitions)
                    .context("invalid --repetitions")?
                    .into(),
            ),
        };
        Ok(PipelineConfig::new(compression, encoding))
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.input_file {
            Some(path) => println!("Input file: {}", path.display()),
            None => println!("Input file: (generate {} byte sample)", self.sample_bytes),
        }
        println!();
        println!("=== Pipeline ===");
        println!("Compression: {:?}", self.compression);
        println!("Encoding: {:?}", self.encoding);
        match self.encoding {
            EncodingChoice::Hamming => println!("Codeword length: {} bits", self.codeword_len),
            EncodingChoice::Parity => println!("Parity threshold: {}", self.parity_threshold),
            EncodingChoice::Repetition => println!("Repetitions: {}", self.repetitions),
            EncodingChoice::None => {}
        }
        println!();
        println!("=== Channel Simulation ===");
        println!("Seed: {}", self.seed);
        println!("Noise: {:.3}% of bits", self.noise_level);
        println!("Trials: {}", self.trials);
        println!();
    }
}
