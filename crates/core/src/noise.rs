//! Channel noise: flips a fixed number of distinct bits in a buffer.
//!
//! The injector models an unreliable channel independently of any codec.
//! For a buffer of `b` bits and a level of `p` percent it flips exactly
//! `floor(b * p / 100)` distinct bits, chosen uniformly without replacement:
//! positions are drawn at random and redrawn when they were already flipped
//! during the same call.
//!
//! # Determinism
//!
//! All randomness comes from a ChaCha8 RNG owned by the injector. Seeded
//! injectors are bit-for-bit reproducible; `from_entropy` is for production
//! fault injection.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::{NoiseError, Result};

/// Bits already flipped during one call: byte offset -> mask of flipped bits.
pub type NoiseMap = HashMap<usize, u8>;

/// Number of bits a `level` percent of `total_bits` corrupts.
///
/// # Errors
/// `NoiseError::InvalidLevel` unless `level` is finite and in `[0, 100]`.
pub fn flip_count(total_bits: usize, level: f64) -> Result<usize> {
    if !level.is_finite() || !(0.0..=100.0).contains(&level) {
        return Err(NoiseError::InvalidLevel(level).into());
    }
    let count = (total_bits as f64 * level / 100.0).floor() as usize;
    Ok(count.min(total_bits))
}

/// Random bit-flip injector.
#[derive(Debug, Clone)]
pub struct ChannelNoise {
    rng: ChaCha8Rng,
    calls: u64,
    bits_flipped: u64,
}

impl ChannelNoise {
    /// Create an injector with a reproducible seed.
    pub fn new(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Create an injector seeded from system entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            rng,
            calls: 0,
            bits_flipped: 0,
        }
    }

    /// Return a copy of `data` with `level` percent of its bits flipped.
    pub fn inject(&mut self, data: &[u8], level: f64) -> Result<Vec<u8>> {
        let mut out = data.to_vec();
        self.inject_in_place(&mut out, level)?;
        Ok(out)
    }

    /// Flip `level` percent of the bits of `data` and return how many flipped.
    pub fn inject_in_place(&mut self, data: &mut [u8], level: f64) -> Result<usize> {
        let map = self.corrupt(data, level)?;
        Ok(map.values().map(|mask| mask.count_ones() as usize).sum())
    }

    /// Flip bits like `inject_in_place`, returning the positions touched.
    pub fn corrupt(&mut self, data: &mut [u8], level: f64) -> Result<NoiseMap> {
        let target = flip_count(data.len() * 8, level)?;
        let mut flipped = NoiseMap::with_capacity(target.min(data.len()));
        let mut remaining = target;

        while remaining > 0 {
            let byte = self.rng.gen_range(0..data.len());
            let mask = 0x80u8 >> self.rng.gen_range(0..8);
            let seen = flipped.entry(byte).or_insert(0);
            if *seen & mask != 0 {
                continue;
            }
            *seen |= mask;
            data[byte] ^= mask;
            remaining -= 1;
        }

        self.calls += 1;
        self.bits_flipped += target as u64;
        debug!(bytes = data.len(), level, flipped = target, "channel noise");
        Ok(flipped)
    }

    /// Counters accumulated over every call so far.
    pub fn stats(&self) -> NoiseStats {
        NoiseStats {
            calls: self.calls,
            bits_flipped: self.bits_flipped,
        }
    }
}

/// Statistics about injector behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoiseStats {
    /// Number of inject calls
    pub calls: u64,

    /// Total bits flipped across all calls
    pub bits_flipped: u64,
}
