//! Just enough NBT to delimit tags inside Java packets.
//!
//! Chunk data and item slots embed NBT documents with no length prefix,
//! so decoding the fields that follow them requires walking the tag
//! structure. The contents are not interpreted; callers either discard
//! the document or carry the raw bytes through untouched.

use super::decoder::{DecodeError, Decoder, Result};
use anyhow::anyhow;

const TAG_END: u8 = 0;
const TAG_BYTE: u8 = 1;
const TAG_SHORT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_FLOAT: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_BYTE_ARRAY: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_LIST: u8 = 9;
const TAG_COMPOUND: u8 = 10;
const TAG_INT_ARRAY: u8 = 11;
const TAG_LONG_ARRAY: u8 = 12;

/// Nesting limit; a hostile peer could otherwise recurse us to death.
const MAX_DEPTH: u32 = 64;

/// Consumes one named root tag (including the `TAG_End` case of an
/// empty document) and returns the raw bytes that made it up.
pub fn consume_document<'a>(decoder: &mut Decoder<'a>) -> Result<&'a [u8]> {
    let before = decoder.buffer();
    let tag = decoder.read_u8()?;
    if tag != TAG_END {
        skip_name(decoder)?;
        skip_payload(decoder, tag, 0)?;
    }
    let consumed = before.len() - decoder.buffer().len();
    Ok(&before[..consumed])
}

fn skip_name(decoder: &mut Decoder) -> Result<()> {
    let length = decoder.read_u16()?;
    decoder.consume_slice(usize::from(length))?;
    Ok(())
}

fn skip_payload(decoder: &mut Decoder, tag: u8, depth: u32) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::Other(anyhow!("NBT nesting too deep")));
    }
    match tag {
        TAG_END => {}
        TAG_BYTE => {
            decoder.read_u8()?;
        }
        TAG_SHORT => {
            decoder.read_i16()?;
        }
        TAG_INT | TAG_FLOAT => {
            decoder.read_i32()?;
        }
        TAG_LONG | TAG_DOUBLE => {
            decoder.read_i64()?;
        }
        TAG_BYTE_ARRAY => {
            let length = usize::try_from(decoder.read_i32()?)?;
            decoder.consume_slice(length)?;
        }
        TAG_STRING => {
            skip_name(decoder)?;
        }
        TAG_LIST => {
            let element = decoder.read_u8()?;
            let length = decoder.read_i32()?;
            for _ in 0..length.max(0) {
                skip_payload(decoder, element, depth + 1)?;
            }
        }
        TAG_COMPOUND => loop {
            let child = decoder.read_u8()?;
            if child == TAG_END {
                break;
            }
            skip_name(decoder)?;
            skip_payload(decoder, child, depth + 1)?;
        },
        TAG_INT_ARRAY => {
            let length = usize::try_from(decoder.read_i32()?)?;
            decoder.consume_slice(length * 4)?;
        }
        TAG_LONG_ARRAY => {
            let length = usize::try_from(decoder.read_i32()?)?;
            decoder.consume_slice(length * 8)?;
        }
        other => {
            return Err(DecodeError::Other(anyhow!("unknown NBT tag {other}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_empty_document() {
        let data = [TAG_END, 0xaa];
        let mut decoder = Decoder::new(&data);
        let doc = consume_document(&mut decoder).unwrap();
        assert_eq!(doc, &[TAG_END]);
        assert_eq!(decoder.buffer(), &[0xaa]);
    }

    #[test]
    fn consumes_nested_compound() {
        // {"": {"a": 1i, "b": [2s, 3s]}} followed by trailing data
        let mut data = vec![TAG_COMPOUND, 0, 0];
        data.extend([TAG_INT, 0, 1, b'a', 0, 0, 0, 1]);
        data.extend([TAG_LIST, 0, 1, b'b', TAG_SHORT, 0, 0, 0, 2, 0, 2, 0, 3]);
        data.push(TAG_END);
        let len = data.len();
        data.extend([0xde, 0xad]);

        let mut decoder = Decoder::new(&data);
        let doc = consume_document(&mut decoder).unwrap();
        assert_eq!(doc.len(), len);
        assert_eq!(decoder.buffer(), &[0xde, 0xad]);
    }

    #[test]
    fn truncated_document_errors() {
        let data = [TAG_COMPOUND, 0, 0, TAG_INT, 0, 1, b'a', 0, 0];
        let mut decoder = Decoder::new(&data);
        assert!(consume_document(&mut decoder).is_err());
    }
}
