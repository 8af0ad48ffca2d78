//! Payload loading and sample generation.
//!
//! When no input file is specified, we generate a sample payload with
//! interesting compression characteristics: a mix of long runs, text and
//! random bytes. Runs favor run-length encoding, text favors Huffman, and the
//! random sections defeat both, so switching compressors shows up in the
//! expansion ratio.

use std::path::Path;

use anyhow::{Context, Result};
use codec_sim_core::framing::Envelope;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Largest section of a single kind in a generated sample.
const SECTION_BYTES: usize = 512;

/// Generate a sample payload with mixed compressibility.
///
/// # Arguments
/// - `seed`: random seed for determinism
/// - `size_bytes`: exact size of generated data
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let section = (size_bytes - data.len()).min(rng.gen_range(16..=SECTION_BYTES));

        match rng.gen_range(0..10u8) {
            // 30% runs of a single byte
            0..=2 => {
                let byte_value: u8 = rng.gen();
                data.extend(std::iter::repeat(byte_value).take(section));
            }

            // 50% text-like, limited alphabet
            3..=7 => {
                let alphabet = b"etaoin shrdlu cmfwyp,.\n";
                for _ in 0..section {
                    data.push(alphabet[rng.gen_range(0..alphabet.len())]);
                }
            }

            // 20% incompressible
            _ => {
                for _ in 0..section {
                    data.push(rng.gen());
                }
            }
        }
    }

    data
}

/// Read the payload to transmit, tagged by the file's extension.
pub fn load_file(path: &Path) -> Result<Envelope> {
    let payload =
        std::fs::read(path).with_context(|| format!("reading input file {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    Ok(Envelope::file(extension, payload))
}

/// Build a generated sample payload wrapped as a binary file.
pub fn sample_envelope(seed: u64, size_bytes: usize) -> Envelope {
    Envelope::file("bin", generate_sample_data(seed, size_bytes))
}
