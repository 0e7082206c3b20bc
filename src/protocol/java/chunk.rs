//! Parsing of the chunk section payload inside `ChunkData`.
//!
//! Each set bit of the primary bitmask contributes one 16x16x16 section:
//! a block count, a bits-per-block width, an optional indirect palette of
//! global state ids, and a packed array of 64-bit words. Values may
//! straddle word boundaries (pre-1.16 packing).

use crate::protocol::{decoder, Decoder};
use anyhow::anyhow;

/// Blocks per 16x16x16 section.
pub const SECTION_VOLUME: usize = 4096;

/// Sections stacked in one chunk column.
pub const SECTIONS_PER_CHUNK: usize = 16;

/// Width at and above which sections use the global palette directly.
const DIRECT_PALETTE_BITS: u8 = 14;

/// One decoded 16x16x16 block-state section.
#[derive(Debug, Clone)]
pub struct ChunkSection {
    /// Non-air block count as reported by the server.
    pub block_count: i16,
    pub bits_per_block: u8,
    /// Indirect palette of global state ids; empty for direct sections.
    pub palette: Vec<i32>,
    data: Vec<u64>,
}

impl ChunkSection {
    /// The global Java block state at the given section-local index
    /// (`y << 8 | z << 4 | x`).
    pub fn state_at(&self, index: usize) -> i32 {
        debug_assert!(index < SECTION_VOLUME);
        let bits = usize::from(self.bits_per_block);
        let mask = (1u64 << bits) - 1;

        let bit_index = index * bits;
        let word = bit_index / 64;
        let offset = bit_index % 64;

        let mut value = self.data[word] >> offset;
        if offset + bits > 64 {
            value |= self.data[word + 1] << (64 - offset);
        }
        let value = (value & mask) as i32;

        if self.palette.is_empty() {
            value
        } else {
            self.palette.get(value as usize).copied().unwrap_or(-1)
        }
    }
}

/// Parses the sections named by `bitmask` out of the `ChunkData` payload.
/// Returns `(section_y, section)` pairs, lowest first.
pub fn parse_sections(
    bitmask: i32,
    data: &[u8],
) -> decoder::Result<Vec<(usize, ChunkSection)>> {
    let mut decoder = Decoder::new(data);
    let mut sections = Vec::new();

    for section_y in 0..SECTIONS_PER_CHUNK {
        if bitmask & (1 << section_y) == 0 {
            continue;
        }

        let block_count = decoder.read_i16()?;
        let bits_per_block = decoder.read_u8()?;
        if bits_per_block == 0 || bits_per_block > 32 {
            return Err(decoder::DecodeError::Other(anyhow!(
                "invalid bits-per-block {bits_per_block}"
            )));
        }

        let palette = if bits_per_block < DIRECT_PALETTE_BITS {
            let length = usize::try_from(decoder.read_var_int()?)?;
            let mut palette = Vec::with_capacity(length);
            for _ in 0..length {
                palette.push(decoder.read_var_int()?);
            }
            palette
        } else {
            Vec::new()
        };

        let word_count = usize::try_from(decoder.read_var_int()?)?;
        let expected = (SECTION_VOLUME * usize::from(bits_per_block) + 63) / 64;
        if word_count != expected {
            return Err(decoder::DecodeError::Other(anyhow!(
                "section data has {word_count} words, expected {expected}"
            )));
        }
        let mut words = Vec::with_capacity(word_count);
        for _ in 0..word_count {
            words.push(decoder.read_u64()?);
        }

        sections.push((
            section_y,
            ChunkSection {
                block_count,
                bits_per_block,
                palette,
                data: words,
            },
        ));
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Encoder;

    /// Packs `states` (palette indices) at the given width, straddling
    /// word boundaries like the server does.
    fn pack(states: &[u16], bits: u8) -> Vec<u64> {
        let word_count = (states.len() * usize::from(bits) + 63) / 64;
        let mut words = vec![0u64; word_count];
        for (i, &state) in states.iter().enumerate() {
            let bit_index = i * usize::from(bits);
            let word = bit_index / 64;
            let offset = bit_index % 64;
            words[word] |= u64::from(state) << offset;
            if offset + usize::from(bits) > 64 {
                words[word + 1] |= u64::from(state) >> (64 - offset);
            }
        }
        words
    }

    fn encode_section(palette: &[i32], states: &[u16], bits: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.write_i16(states.iter().filter(|&&s| s != 0).count() as i16);
        encoder.write_u8(bits);
        encoder.write_var_int(palette.len() as i32);
        for &entry in palette {
            encoder.write_var_int(entry);
        }
        let words = pack(states, bits);
        encoder.write_var_int(words.len() as i32);
        for word in words {
            encoder.write_u64(word);
        }
        buf
    }

    #[test]
    fn parses_single_paletted_section() {
        let palette = [0, 33, 1090];
        let mut states = vec![0u16; SECTION_VOLUME];
        states[0] = 1;
        states[255] = 2;
        states[4095] = 1;
        let data = encode_section(&palette, &states, 5);

        let sections = parse_sections(0b1, &data).unwrap();
        assert_eq!(sections.len(), 1);
        let (section_y, section) = &sections[0];
        assert_eq!(*section_y, 0);
        assert_eq!(section.state_at(0), 33);
        assert_eq!(section.state_at(255), 1090);
        assert_eq!(section.state_at(4095), 33);
        assert_eq!(section.state_at(1), 0);
    }

    #[test]
    fn respects_bitmask_positions() {
        let palette = [0, 9];
        let states = vec![1u16; SECTION_VOLUME];
        let data = encode_section(&palette, &states, 4);

        let sections = parse_sections(0b100, &data).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, 2);
    }

    #[test]
    fn rejects_truncated_section() {
        let palette = [0, 9];
        let states = vec![1u16; SECTION_VOLUME];
        let mut data = encode_section(&palette, &states, 4);
        data.truncate(data.len() - 8);
        assert!(parse_sections(0b1, &data).is_err());
    }
}
