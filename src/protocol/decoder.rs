use crate::position::{BlockPosition, Vec3};
use std::{backtrace::Backtrace, convert::Infallible, num::TryFromIntError, str::Utf8Error};

/// An error while decoding packets.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("need at least {0} more bytes at {1}")]
    EndOfStream(usize, Backtrace),
    #[error("invalid boolean pattern {0} - expected either 0 or 1")]
    InvalidBool(u8),
    #[error("varint / varlong is too long")]
    VarIntTooLong,
    #[error("string exceeds max allowed length")]
    StringTooLong,
    #[error(transparent)]
    Utf8(#[from] Utf8Error),
    #[error(transparent)]
    IntConversion(#[from] TryFromIntError),
    /// Special variant for derive macro integer conversions to work.
    /// Cannot occur.
    #[error(transparent)]
    Infallible(#[from] Infallible),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

const MAX_STRING_LENGTH: usize = i16::MAX as usize;

/// A raw decoder for a Minecraft bitstream.
///
/// Big-endian reads serve the Java edition; the `_le`, varuint and
/// zigzag reads serve the Bedrock edition.
#[derive(Debug)]
pub struct Decoder<'a> {
    buffer: &'a [u8],
}

impl<'a> Decoder<'a> {
    /// Creates a decoder from the buffer it will read from.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }

    /// Gets the remaining buffer.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    /// Returns if there is no data left in the buffer.
    pub fn is_finished(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consumes `n` bytes from the buffer, returning them as a slice.
    pub fn consume_slice(&mut self, n: usize) -> Result<&'a [u8]> {
        if n <= self.buffer.len() {
            let (data, buffer) = self.buffer.split_at(n);
            self.buffer = buffer;
            Ok(data)
        } else {
            Err(DecodeError::EndOfStream(n, Backtrace::capture()))
        }
    }

    /// Consumes `N` bytes into an array.
    pub fn consume<const N: usize>(&mut self) -> Result<[u8; N]> {
        let data = self.consume_slice(N)?;
        Ok(<[u8; N]>::try_from(data).unwrap())
    }

    /// Reads an unsigned byte from the stream.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.consume::<1>().map(|[x]| x)
    }

    /// Reads a signed byte from the stream.
    pub fn read_i8(&mut self) -> Result<i8> {
        self.consume().map(i8::from_be_bytes)
    }

    /// Reads an unsigned short from the stream.
    pub fn read_u16(&mut self) -> Result<u16> {
        self.consume().map(u16::from_be_bytes)
    }

    /// Reads a signed short from the stream.
    pub fn read_i16(&mut self) -> Result<i16> {
        self.consume().map(i16::from_be_bytes)
    }

    /// Reads an unsigned int from the stream.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.consume().map(u32::from_be_bytes)
    }

    /// Reads a signed int from the stream.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.consume().map(i32::from_be_bytes)
    }

    /// Reads an unsigned long from the stream.
    pub fn read_u64(&mut self) -> Result<u64> {
        self.consume().map(u64::from_be_bytes)
    }

    /// Reads a signed long from the stream.
    pub fn read_i64(&mut self) -> Result<i64> {
        self.consume().map(i64::from_be_bytes)
    }

    /// Reads a float from the stream.
    pub fn read_f32(&mut self) -> Result<f32> {
        self.consume().map(f32::from_be_bytes)
    }

    /// Reads a double from the stream.
    pub fn read_f64(&mut self) -> Result<f64> {
        self.consume().map(f64::from_be_bytes)
    }

    /// Reads a little-endian unsigned short from the stream.
    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.consume().map(u16::from_le_bytes)
    }

    /// Reads a little-endian signed short from the stream.
    pub fn read_i16_le(&mut self) -> Result<i16> {
        self.consume().map(i16::from_le_bytes)
    }

    /// Reads a little-endian unsigned int from the stream.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.consume().map(u32::from_le_bytes)
    }

    /// Reads a little-endian signed int from the stream.
    pub fn read_i32_le(&mut self) -> Result<i32> {
        self.consume().map(i32::from_le_bytes)
    }

    /// Reads a little-endian unsigned long from the stream.
    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.consume().map(u64::from_le_bytes)
    }

    /// Reads a little-endian signed long from the stream.
    pub fn read_i64_le(&mut self) -> Result<i64> {
        self.consume().map(i64::from_le_bytes)
    }

    /// Reads a little-endian float from the stream.
    pub fn read_f32_le(&mut self) -> Result<f32> {
        self.consume().map(f32::from_le_bytes)
    }

    /// Reads a little-endian double from the stream.
    pub fn read_f64_le(&mut self) -> Result<f64> {
        self.consume().map(f64::from_le_bytes)
    }

    /// Reads a boolean from the stream.
    pub fn read_bool(&mut self) -> Result<bool> {
        let x = self.read_u8()?;
        match x {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(DecodeError::InvalidBool(x)),
        }
    }

    /// Reads a VarInt from the stream.
    pub fn read_var_int(&mut self) -> Result<i32> {
        self.read_var_int_with_size().map(|(x, _)| x)
    }

    /// Reads a VarInt from the stream, additionally
    /// returning the number of bytes read.
    pub fn read_var_int_with_size(&mut self) -> Result<(i32, usize)> {
        let mut num_read = 0;
        let mut result = 0;

        loop {
            let read = self.read_u8()?;
            let value = i32::from(read & 0b0111_1111);
            result |= value.overflowing_shl(7 * num_read).0;

            num_read += 1;

            if num_read > 5 {
                return Err(DecodeError::VarIntTooLong);
            }
            if read & 0b1000_0000 == 0 {
                break;
            }
        }
        Ok((result, num_read as usize))
    }

    /// Reads a VarLong from the stream.
    pub fn read_var_long(&mut self) -> Result<i64> {
        let mut num_read = 0;
        let mut result = 0;

        loop {
            let read = self.read_u8()?;
            let value = i64::from(read & 0b0111_1111);
            result |= value.overflowing_shl(7 * num_read).0;

            num_read += 1;

            if num_read > 10 {
                return Err(DecodeError::VarIntTooLong);
            }
            if read & 0b1000_0000 == 0 {
                break;
            }
        }
        Ok(result)
    }

    /// Reads an unsigned VarInt (Bedrock) from the stream.
    pub fn read_var_u32(&mut self) -> Result<u32> {
        self.read_var_u32_with_size().map(|(x, _)| x)
    }

    /// Reads an unsigned VarInt (Bedrock) from the stream, additionally
    /// returning the number of bytes read.
    pub fn read_var_u32_with_size(&mut self) -> Result<(u32, usize)> {
        let mut num_read = 0;
        let mut result: u32 = 0;

        loop {
            let read = self.read_u8()?;
            result |= u32::from(read & 0b0111_1111).overflowing_shl(7 * num_read).0;

            num_read += 1;

            if num_read > 5 {
                return Err(DecodeError::VarIntTooLong);
            }
            if read & 0b1000_0000 == 0 {
                break;
            }
        }
        Ok((result, num_read as usize))
    }

    /// Reads an unsigned 64-bit VarInt (Bedrock) from the stream.
    pub fn read_var_u64(&mut self) -> Result<u64> {
        let mut num_read = 0;
        let mut result: u64 = 0;

        loop {
            let read = self.read_u8()?;
            result |= u64::from(read & 0b0111_1111).overflowing_shl(7 * num_read).0;

            num_read += 1;

            if num_read > 10 {
                return Err(DecodeError::VarIntTooLong);
            }
            if read & 0b1000_0000 == 0 {
                break;
            }
        }
        Ok(result)
    }

    /// Reads a zigzag VarInt (Bedrock) from the stream.
    pub fn read_var_i32_zigzag(&mut self) -> Result<i32> {
        let raw = self.read_var_u32()?;
        Ok((raw >> 1) as i32 ^ -((raw & 1) as i32))
    }

    /// Reads a zigzag 64-bit VarInt (Bedrock) from the stream.
    pub fn read_var_i64_zigzag(&mut self) -> Result<i64> {
        let raw = self.read_var_u64()?;
        Ok((raw >> 1) as i64 ^ -((raw & 1) as i64))
    }

    pub fn read_block_position(&mut self) -> Result<BlockPosition> {
        let value = self.read_i64()?;

        let x = (value >> 38) as i32;
        let y = (value & 0xFFF) as i32;
        let z = (value << 26 >> 38) as i32;

        Ok(BlockPosition { x, y, z })
    }

    /// Reads a varint-prefixed string (Java) from the stream.
    pub fn read_string(&mut self) -> Result<&'a str> {
        let length = usize::try_from(self.read_var_int()?)?;
        self.read_string_body(length)
    }

    /// Reads a varuint-prefixed string (Bedrock) from the stream.
    pub fn read_string_varuint(&mut self) -> Result<&'a str> {
        let length = usize::try_from(self.read_var_u32()?)?;
        self.read_string_body(length)
    }

    fn read_string_body(&mut self, length: usize) -> Result<&'a str> {
        if length > MAX_STRING_LENGTH {
            return Err(DecodeError::StringTooLong);
        }

        let bytes = std::str::from_utf8(self.consume_slice(length)?)?;
        Ok(bytes)
    }

    pub fn read_angle(&mut self) -> Result<f32> {
        let fixed = self.read_u8()?;
        Ok((fixed as f32 / u8::MAX as f32) * 360.)
    }
}

/// A type that can be read from a [`Decoder`].
pub trait Decode: Sized {
    fn decode(decoder: &mut Decoder) -> Result<Self>;
}

/// A type that can be read from a [`Decoder`] in its little-endian /
/// Bedrock-flavored form. Selected by `#[encoding(le)]` in the derive.
pub trait DecodeLe: Sized {
    fn decode_le(decoder: &mut Decoder) -> Result<Self>;
}

impl Decode for u8 {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_u8()
    }
}

impl Decode for i8 {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_i8()
    }
}

impl Decode for u16 {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_u16()
    }
}

impl Decode for i16 {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_i16()
    }
}

impl Decode for u32 {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_u32()
    }
}

impl Decode for i32 {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_i32()
    }
}

impl Decode for u64 {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_u64()
    }
}

impl Decode for i64 {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_i64()
    }
}

impl Decode for f32 {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_f32()
    }
}

impl Decode for f64 {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_f64()
    }
}

impl Decode for bool {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_bool()
    }
}

impl Decode for String {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_string().map(str::to_owned)
    }
}

impl Decode for u128 {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        let bytes = decoder.consume::<16>()?;
        Ok(Self::from_be_bytes(bytes))
    }
}

impl Decode for BlockPosition {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_block_position()
    }
}

impl Decode for () {
    fn decode(_decoder: &mut Decoder) -> Result<Self> {
        Ok(())
    }
}

impl DecodeLe for u8 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_u8()
    }
}

impl DecodeLe for i8 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_i8()
    }
}

impl DecodeLe for u16 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_u16_le()
    }
}

impl DecodeLe for i16 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_i16_le()
    }
}

impl DecodeLe for u32 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_u32_le()
    }
}

impl DecodeLe for i32 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_i32_le()
    }
}

impl DecodeLe for u64 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_u64_le()
    }
}

impl DecodeLe for i64 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_i64_le()
    }
}

impl DecodeLe for f32 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_f32_le()
    }
}

impl DecodeLe for f64 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_f64_le()
    }
}

impl DecodeLe for bool {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_bool()
    }
}

impl DecodeLe for String {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_string_varuint().map(str::to_owned)
    }
}

impl DecodeLe for u128 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        let bytes = decoder.consume::<16>()?;
        Ok(Self::from_le_bytes(bytes))
    }
}

impl DecodeLe for Vec3 {
    fn decode_le(decoder: &mut Decoder) -> Result<Self> {
        Ok(Vec3 {
            x: decoder.read_f32_le()?,
            y: decoder.read_f32_le()?,
            z: decoder.read_f32_le()?,
        })
    }
}
