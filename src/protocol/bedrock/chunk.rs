//! Serialization of the `LevelChunk` payload.
//!
//! A sub-chunk is a version byte, a storage count, and per storage a
//! paletted block array: a header byte `(bits_per_block << 1) | 1`,
//! packed little-endian 32-bit words (no value straddles a word), and a
//! zigzag-varint palette of block runtime ids. Blocks are indexed in
//! x-major order (`x << 8 | z << 4 | y`), unlike the Java y-major order.
//! The payload ends with 256 biome bytes and a border-block count.

use crate::protocol::{Decoder, Encoder};
use anyhow::Context;

/// Sub-chunk storage format version.
pub const SUB_CHUNK_VERSION: u8 = 8;

/// Blocks per 16x16x16 sub-chunk.
pub const SUB_CHUNK_VOLUME: usize = 4096;

/// Palette widths the format allows.
const PALETTE_BIT_SIZES: [u8; 8] = [1, 2, 3, 4, 5, 6, 8, 16];

fn bits_for_palette(palette_len: usize) -> u8 {
    let needed = usize::BITS - palette_len.saturating_sub(1).leading_zeros();
    *PALETTE_BIT_SIZES
        .iter()
        .find(|&&bits| u32::from(bits) >= needed)
        .unwrap_or(&16)
}

/// Appends one sub-chunk in runtime-id serialization. `indices` are
/// palette positions in Bedrock block order.
pub fn write_sub_chunk(buf: &mut Vec<u8>, palette: &[i32], indices: &[u16; SUB_CHUNK_VOLUME]) {
    let mut encoder = Encoder::new(buf);
    encoder.write_u8(SUB_CHUNK_VERSION);
    encoder.write_u8(1); // storage layers

    let bits = bits_for_palette(palette.len());
    encoder.write_u8((bits << 1) | 1);

    let blocks_per_word = 32 / usize::from(bits);
    let word_count = (SUB_CHUNK_VOLUME + blocks_per_word - 1) / blocks_per_word;
    for word_index in 0..word_count {
        let mut word = 0u32;
        for position in 0..blocks_per_word {
            let block = word_index * blocks_per_word + position;
            if block >= SUB_CHUNK_VOLUME {
                break;
            }
            word |= u32::from(indices[block]) << (position * usize::from(bits));
        }
        encoder.write_u32_le(word);
    }

    encoder.write_var_i32_zigzag(palette.len().try_into().unwrap_or(i32::MAX));
    for &runtime_id in palette {
        encoder.write_var_i32_zigzag(runtime_id);
    }
}

/// Appends the biome array and the (empty) border block list that close
/// a chunk payload.
pub fn write_chunk_tail(buf: &mut Vec<u8>, biomes: &[u8; 256]) {
    buf.extend_from_slice(biomes);
    buf.push(0); // border blocks
}

/// Parses one sub-chunk back into its palette and indices. The inverse
/// of [`write_sub_chunk`], used to inspect emitted chunks.
pub fn parse_sub_chunk(
    decoder: &mut Decoder,
) -> anyhow::Result<(Vec<i32>, Vec<u16>)> {
    let version = decoder.read_u8()?;
    anyhow::ensure!(version == SUB_CHUNK_VERSION, "bad sub-chunk version {version}");
    let storages = decoder.read_u8()?;
    anyhow::ensure!(storages == 1, "expected one storage, got {storages}");

    let header = decoder.read_u8()?;
    let bits = usize::from(header >> 1);
    anyhow::ensure!(
        PALETTE_BIT_SIZES.contains(&(bits as u8)),
        "bad palette width {bits}"
    );

    let blocks_per_word = 32 / bits;
    let word_count = (SUB_CHUNK_VOLUME + blocks_per_word - 1) / blocks_per_word;
    let mask = (1u32 << bits) - 1;
    let mut indices = Vec::with_capacity(SUB_CHUNK_VOLUME);
    for _ in 0..word_count {
        let word = decoder.read_u32_le()?;
        for position in 0..blocks_per_word {
            if indices.len() == SUB_CHUNK_VOLUME {
                break;
            }
            indices.push(((word >> (position * bits)) & mask) as u16);
        }
    }

    let palette_len = decoder.read_var_i32_zigzag()?;
    let palette_len = usize::try_from(palette_len).context("negative palette length")?;
    let mut palette = Vec::with_capacity(palette_len);
    for _ in 0..palette_len {
        palette.push(decoder.read_var_i32_zigzag()?);
    }

    Ok((palette, indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_widths_round_up_to_allowed_sizes() {
        assert_eq!(bits_for_palette(1), 1);
        assert_eq!(bits_for_palette(2), 1);
        assert_eq!(bits_for_palette(3), 2);
        assert_eq!(bits_for_palette(17), 5);
        assert_eq!(bits_for_palette(65), 8);
        assert_eq!(bits_for_palette(300), 16);
    }

    #[test]
    fn sub_chunk_round_trips() {
        let palette = vec![134, 0, 5, 17];
        let mut indices = [0u16; SUB_CHUNK_VOLUME];
        indices[0] = 3;
        indices[100] = 1;
        indices[4095] = 2;

        let mut buf = Vec::new();
        write_sub_chunk(&mut buf, &palette, &indices);

        let mut decoder = Decoder::new(&buf);
        let (read_palette, read_indices) = parse_sub_chunk(&mut decoder).unwrap();
        assert!(decoder.is_finished());
        assert_eq!(read_palette, palette);
        assert_eq!(read_indices[0], 3);
        assert_eq!(read_indices[100], 1);
        assert_eq!(read_indices[4095], 2);
        assert_eq!(read_indices[1], 0);
    }

    #[test]
    fn chunk_tail_is_biomes_plus_border_count() {
        let mut buf = Vec::new();
        write_chunk_tail(&mut buf, &[4; 256]);
        assert_eq!(buf.len(), 257);
        assert_eq!(buf[0], 4);
        assert_eq!(buf[256], 0);
    }
}
