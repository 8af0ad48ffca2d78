//! Metrics collection and reporting for channel simulations.
//!
//! A simulation pushes the same payload through a pipeline many times with
//! fresh noise. Each trial ends in one of three ways:
//! - delivered intact
//! - delivered corrupted (the code "corrected" to the wrong data)
//! - rejected by the decoder
//!
//! Corrupted deliveries are the dangerous case: nothing below the
//! application noticed. When an envelope CRC sits on top, the ones it catches
//! are counted separately.

use std::time::{Duration, Instant};

use crate::pipeline::{Outcome, Transmission};

/// Number of bit positions in which `a` and `b` differ.
///
/// Bytes present in only one buffer count as 8 differing bits each.
pub fn bit_errors(a: &[u8], b: &[u8]) -> usize {
    let common: usize = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x ^ y).count_ones() as usize)
        .sum();
    common + a.len().abs_diff(b.len()) * 8
}

/// Counters accumulated over a series of transmissions.
#[derive(Debug, Clone)]
pub struct ChannelMetrics {
    // === Timing ===
    /// When the simulation started
    pub start_time: Instant,

    /// When the simulation ended (set on completion)
    pub end_time: Option<Instant>,

    // === Volume ===
    /// Trials run
    pub trials: u64,

    /// Payload bytes offered to the pipeline
    pub payload_bytes: u64,

    /// Encoded bytes that crossed the channel
    pub wire_bytes: u64,

    /// Bits flipped by the channel
    pub bits_flipped: u64,

    // === Outcomes ===
    /// Trials whose output matched the input exactly
    pub delivered_intact: u64,

    /// Trials that decoded without error to the wrong bytes
    pub delivered_corrupted: u64,

    /// Trials refused by the decoder
    pub rejected: u64,

    /// Corrupted deliveries rejected by envelope parsing (CRC, lengths)
    pub crc_failures: u64,

    // === Residual errors ===
    /// Payload bits handed to the receiver across all deliveries
    pub delivered_bits: u64,

    /// Bits still wrong after decoding
    pub residual_bit_errors: u64,
}

impl ChannelMetrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            trials: 0,
            payload_bytes: 0,
            wire_bytes: 0,
            bits_flipped: 0,
            delivered_intact: 0,
            delivered_corrupted: 0,
            rejected: 0,
            crc_failures: 0,
            delivered_bits: 0,
            residual_bit_errors: 0,
        }
    }

    /// Account for one transmission of `original` and return its outcome.
    pub fn record(&mut self, original: &[u8], transmission: &Transmission) -> Outcome {
        let outcome = transmission.outcome(original);
        self.trials += 1;
        self.payload_bytes += original.len() as u64;
        self.wire_bytes += transmission.wire_bytes as u64;
        self.bits_flipped += transmission.bits_flipped as u64;

        match outcome {
            Outcome::Intact => {
                self.delivered_intact += 1;
                self.delivered_bits += original.len() as u64 * 8;
            }
            Outcome::Corrupted { bit_errors } => {
                self.delivered_corrupted += 1;
                self.delivered_bits += original.len() as u64 * 8;
                self.residual_bit_errors += bit_errors as u64;
            }
            Outcome::Rejected => self.rejected += 1,
        }
        outcome
    }

    /// Note that envelope parsing caught a corrupted delivery.
    pub fn record_crc_failure(&mut self) {
        self.crc_failures += 1;
    }

    /// Mark the simulation as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Wire bytes per payload byte.
    ///
    /// Returns 0.0 if nothing was sent.
    pub fn expansion_ratio(&self) -> f64 {
        ratio(self.wire_bytes, self.payload_bytes)
    }

    /// Fraction of trials delivered intact.
    pub fn delivery_rate(&self) -> f64 {
        ratio(self.delivered_intact, self.trials)
    }

    /// Fraction of delivered payload bits that were wrong.
    pub fn residual_bit_error_rate(&self) -> f64 {
        ratio(self.residual_bit_errors, self.delivered_bits)
    }

    /// Fraction of wire bits the channel flipped.
    pub fn channel_bit_error_rate(&self) -> f64 {
        ratio(self.bits_flipped, self.wire_bytes * 8)
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Channel Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!("Trials: {}", self.trials);
        println!();

        println!("=== Volume ===");
        println!("Payload: {} bytes", self.payload_bytes);
        println!("Wire:    {} bytes", self.wire_bytes);
        println!("Expansion: {:.3}x", self.expansion_ratio());
        println!(
            "Bits flipped: {} ({:.3}% of wire bits)",
            self.bits_flipped,
            self.channel_bit_error_rate() * 100.0
        );
        println!();

        println!("=== Outcomes ===");
        println!(
            "Intact:    {} ({:.2}%)",
            self.delivered_intact,
            self.delivery_rate() * 100.0
        );
        println!("Corrupted: {}", self.delivered_corrupted);
        println!("Rejected:  {}", self.rejected);
        println!("CRC caught: {}", self.crc_failures);
        println!(
            "Residual bit error rate: {:.6}",
            self.residual_bit_error_rate()
        );
        println!();
    }

    /// Print just the final result (pass/fail).
    pub fn print_result(&self) {
        if self.trials > 0 && self.delivered_intact == self.trials {
            println!("✓ All {} transmissions delivered intact", self.trials);
        } else if self.delivered_corrupted > self.crc_failures {
            println!(
                "✗ {} transmissions delivered corrupted data undetected",
                self.delivered_corrupted - self.crc_failures
            );
        } else {
            println!(
                "✗ {} of {} transmissions lost",
                self.trials - self.delivered_intact,
                self.trials
            );
        }
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             trials={}\n\
             payload_bytes={}\n\
             wire_bytes={}\n\
             expansion_ratio={:.4}\n\
             bits_flipped={}\n\
             delivered_intact={}\n\
             delivered_corrupted={}\n\
             rejected={}\n\
             crc_failures={}\n\
             delivery_rate={:.4}\n\
             residual_bit_error_rate={:.6}\n",
            self.duration().as_millis(),
            self.trials,
            self.payload_bytes,
            self.wire_bytes,
            self.expansion_ratio(),
            self.bits_flipped,
            self.delivered_intact,
            self.delivered_corrupted,
            self.rejected,
            self.crc_failures,
            self.delivery_rate(),
            self.residual_bit_error_rate(),
        )
    }
}

impl Default for ChannelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
