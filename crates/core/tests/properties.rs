//! Property tests for the codecs.

use codec_sim_core::bitio::flip_bit;
use codec_sim_core::compress::{Compressor, Huffman, RunLength};
use codec_sim_core::ecc::{ErrorCode, Hamming, ParityCheck, Repetition};
use codec_sim_core::metrics::bit_errors;
use codec_sim_core::noise::ChannelNoise;
use proptest::prelude::*;

/// Byte strings biased toward runs so both compressors see interesting input.
fn runny_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec((any::<u8>(), 1usize..200), 0..12).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(byte, count)| std::iter::repeat(byte).take(count))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_huffman_round_trip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let packed = Huffman.compress(&data).unwrap();
        prop_assert_eq!(Huffman.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn prop_huffman_round_trip_runs(data in runny_bytes()) {
        let packed = Huffman.compress(&data).unwrap();
        prop_assert_eq!(Huffman.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn prop_rle_round_trip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let packed = RunLength.compress(&data).unwrap();
        prop_assert_eq!(RunLength.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn prop_rle_round_trip_runs(data in runny_bytes()) {
        let packed = RunLength.compress(&data).unwrap();
        prop_assert_eq!(RunLength.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn prop_decompress_garbage_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = Huffman.decompress(&data);
        let _ = RunLength.decompress(&data);
    }

    #[test]
    fn prop_hamming_round_trip(
        codeword_len in 1usize..80,
        data in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let code = Hamming::new(codeword_len).unwrap();
        let encoded = code.encode(&data).unwrap();
        prop_assert_eq!(code.decode(&encoded).unwrap(), data);
    }

    #[test]
    fn prop_hamming_corrects_one_flip_per_block(
        codeword_len in 1usize..80,
        data in prop::collection::vec(any::<u8>(), 1..256),
        offsets in prop::collection::vec(any::<usize>(), 1..64),
    ) {
        let code = Hamming::new(codeword_len).unwrap();
        let block_len = code.block_len();
        let mut encoded = code.encode(&data).unwrap();
        let blocks = encoded.len() * 8 / block_len;
        for block in 0..blocks {
            let offset = offsets[block % offsets.len()] % block_len;
            flip_bit(&mut encoded, block * block_len + offset);
        }
        prop_assert_eq!(code.decode(&encoded).unwrap(), data);
    }

    #[test]
    fn prop_hamming_garbage_never_panics(
        codeword_len in 1usize..40,
        data in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let code = Hamming::new(codeword_len).unwrap();
        let _ = code.decode(&data);
    }

    #[test]
    fn prop_parity_round_trip(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let code = ParityCheck::default();
        let encoded = code.encode(&data).unwrap();
        prop_assert_eq!(encoded.len(), data.len() * 2);
        prop_assert_eq!(code.decode(&encoded).unwrap(), data);
    }

    #[test]
    fn prop_repetition_corrects_minority_flips(
        count in 1usize..8,
        data in prop::collection::vec(any::<u8>(), 0..64),
        seed in any::<u64>(),
    ) {
        let code = Repetition::new(count).unwrap();
        let mut encoded = code.encode(&data).unwrap();
        prop_assert_eq!(encoded.len(), data.len() * count);

        // Flip at most `correctable_flips` copies of every bit.
        let mut noise = ChannelNoise::new(seed);
        let flips = code.correctable_flips();
        let mut group = vec![0u8; count.div_ceil(8)];
        for bit in 0..data.len() * 8 {
            group.iter_mut().for_each(|b| *b = 0);
            let level = flips as f64 * 100.0 / (group.len() * 8) as f64;
            noise.inject_in_place(&mut group, level.min(100.0)).unwrap();
            for copy in 0..count {
                if group[copy / 8] & (0x80 >> (copy % 8)) != 0 {
                    flip_bit(&mut encoded, bit * count + copy);
                }
            }
        }
        prop_assert_eq!(code.decode(&encoded).unwrap(), data);
    }

    #[test]
    fn prop_noise_flips_exact_count(
        data in prop::collection::vec(any::<u8>(), 0..256),
        level in 0.0f64..=100.0,
        seed in any::<u64>(),
    ) {
        let mut noise = ChannelNoise::new(seed);
        let noisy = noise.inject(&data, level).unwrap();
        let expected = (data.len() as f64 * 8.0 * level / 100.0).floor() as usize;
        prop_assert_eq!(noisy.len(), data.len());
        prop_assert_eq!(bit_errors(&data, &noisy), expected);
    }
}
