//! Framing codec for the Java edition connection.
//! Supports zlib compression and CFB8 encryption.

use super::ProtocolState;
use crate::protocol::{Decode, DecodeError, Decoder, Encode, Encoder, BUFFER_LIMIT};
use aes::{cipher::generic_array::GenericArray, Aes128};
use anyhow::bail;
use cfb8::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use flate2::Compression;
use std::{
    borrow::Cow,
    io::{Read, Write},
    marker::PhantomData,
    num::NonZeroUsize,
    slice,
};

/// The proxy mostly relays small serverbound packets on this leg, so we
/// avoid spending time on high compression levels.
const COMPRESSION_LEVEL: Compression = Compression::fast();

/// Key used for encryption.
#[derive(Copy, Clone, Debug)]
pub struct EncryptionKey([u8; 16]);

impl EncryptionKey {
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

/// Threshold in bytes where a packet will be compressed.
#[derive(Copy, Clone, Debug)]
pub struct CompressionThreshold(NonZeroUsize);

impl CompressionThreshold {
    pub fn new(threshold: NonZeroUsize) -> Self {
        Self(threshold)
    }
}

/// Codec state for one direction pair of a Java connection.
pub struct JavaCodec<State> {
    /// Buffered incoming bytes.
    read_buffer: Vec<u8>,
    encryption_state: Option<EncryptionState>,
    compression_state: Option<CompressionState>,
    _marker: PhantomData<State>,
}

impl<State> JavaCodec<State>
where
    State: ProtocolState,
{
    pub fn new() -> Self {
        Self {
            read_buffer: Vec::new(),
            encryption_state: None,
            compression_state: None,
            _marker: PhantomData,
        }
    }

    pub fn switch_state<NewState: ProtocolState>(self) -> JavaCodec<NewState> {
        JavaCodec {
            read_buffer: self.read_buffer,
            encryption_state: self.encryption_state,
            compression_state: self.compression_state,
            _marker: PhantomData,
        }
    }

    pub fn enable_encryption(&mut self, key: EncryptionKey) {
        assert!(
            self.encryption_state.is_none(),
            "called enable_encryption() multiple times"
        );
        self.encryption_state = Some(EncryptionState {
            encryptor: cfb8::Encryptor::new(&key.0.into(), &key.0.into()),
            decryptor: cfb8::Decryptor::new(&key.0.into(), &key.0.into()),
        });
    }

    pub fn enable_compression(&mut self, threshold: CompressionThreshold) {
        assert!(
            self.compression_state.is_none(),
            "called enable_compression() multiple times"
        );
        self.compression_state = Some(CompressionState { threshold });
    }

    /// Encodes a packet to a stream of bytes in the protocol format.
    pub fn encode_packet(&mut self, packet: &State::Serverbound) -> anyhow::Result<Vec<u8>> {
        let mut plain_buf = Vec::new();
        packet.encode(&mut Encoder::new(&mut plain_buf));

        let uncompressed_length = i32::try_from(plain_buf.len())?;
        let mut framed_buf = match &self.compression_state {
            Some(CompressionState { threshold }) => {
                let (data_length, payload) = if uncompressed_length as usize >= threshold.0.get() {
                    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), COMPRESSION_LEVEL);
                    encoder.write_all(&plain_buf).expect("infallible write");
                    (uncompressed_length, encoder.finish()?)
                } else {
                    // send uncompressed
                    (0, plain_buf)
                };
                let mut buf = Vec::new();
                let mut encoder = Encoder::new(&mut buf);
                encoder.write_var_int(
                    var_int_size(data_length) as i32 + i32::try_from(payload.len())?,
                );
                encoder.write_var_int(data_length);
                encoder.write_slice(&payload);
                buf
            }
            None => {
                let mut buf = Vec::new();
                let mut encoder = Encoder::new(&mut buf);
                encoder.write_var_int(uncompressed_length);
                encoder.write_slice(&plain_buf);
                buf
            }
        };

        if let Some(EncryptionState { encryptor, .. }) = &mut self.encryption_state {
            for x in &mut framed_buf {
                let slice = slice::from_mut(x);
                encryptor.encrypt_block_mut(GenericArray::from_mut_slice(slice));
            }
        }

        Ok(framed_buf)
    }

    /// Gives data to the internal read buffer.
    ///
    /// `data` will be modified in-place and its results
    /// after calling this function are unspecified.
    ///
    /// Call `decode_packet` to get a packet.
    pub fn give_data(&mut self, mut data: impl AsMut<[u8]>) {
        let data = data.as_mut();
        if let Some(EncryptionState { decryptor, .. }) = &mut self.encryption_state {
            for byte in data.iter_mut() {
                let slice = slice::from_mut(byte);
                decryptor.decrypt_block_mut(GenericArray::from_mut_slice(slice));
            }
        }

        self.read_buffer.extend_from_slice(data);
    }

    /// Attempts to decode a packet.
    /// This should be called in a loop after any call to `give_data`
    /// until this function returns `None`.
    ///
    /// * If not enough data is available, returns `Ok(None)`.
    /// * If a packet was read, returns `Ok(Some(packet))`. More packets may be available.
    /// * If an error occurs, returns `Err(e)`, invalidating the stream.
    pub fn decode_packet(&mut self) -> anyhow::Result<Option<State::Clientbound>> {
        // Note: data in the read buffer is already decrypted.
        let mut decoder = Decoder::new(&self.read_buffer);
        let (length, length_size) = match decoder.read_var_int_with_size() {
            Ok(x) => x,
            Err(DecodeError::EndOfStream(_, _)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let length = usize::try_from(length)?;
        let total_bytes = length + length_size;

        if length > BUFFER_LIMIT {
            bail!("packet length of {length} exceeds maximum allowed");
        }
        let packet_contents = match decoder.consume_slice(length) {
            Ok(x) => x,
            Err(DecodeError::EndOfStream(_, _)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let plain_data = match &self.compression_state {
            Some(_) => {
                let mut decoder = Decoder::new(packet_contents);
                let uncompressed_length = usize::try_from(decoder.read_var_int()?)?;
                if uncompressed_length == 0 {
                    Cow::Borrowed(decoder.buffer())
                } else {
                    let mut buf = Vec::new();
                    flate2::read::ZlibDecoder::new(decoder.buffer())
                        .take(BUFFER_LIMIT.try_into().unwrap())
                        .read_to_end(&mut buf)?;
                    Cow::Owned(buf)
                }
            }
            None => Cow::Borrowed(packet_contents),
        };

        let packet = State::Clientbound::decode(&mut Decoder::new(&plain_data))?;
        self.read_buffer.drain(..total_bytes);
        Ok(Some(packet))
    }
}

impl<State: ProtocolState> Default for JavaCodec<State> {
    fn default() -> Self {
        Self::new()
    }
}

struct EncryptionState {
    encryptor: cfb8::Encryptor<Aes128>,
    decryptor: cfb8::Decryptor<Aes128>,
}

struct CompressionState {
    threshold: CompressionThreshold,
}

pub fn var_int_size(x: i32) -> usize {
    Encoder::new(&mut Vec::new()).write_var_int(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::java::{login, play, state};

    /// Pairs a serverbound-encoding codec with a clientbound-decoding
    /// one so encoded frames can be decoded back in tests.
    fn echo_decode(frame: Vec<u8>, decode_codec: &mut JavaCodec<state::Play>) -> play::Clientbound {
        decode_codec.give_data(frame);
        decode_codec
            .decode_packet()
            .expect("decode failed")
            .expect("frame incomplete")
    }

    /// Encodes a clientbound packet the way the server would, honoring
    /// the codec's compression and encryption state.
    fn server_encode(
        packet: &play::Clientbound,
        compression: Option<CompressionThreshold>,
        encryption: Option<EncryptionKey>,
    ) -> Vec<u8> {
        let mut plain = Vec::new();
        packet.encode(&mut Encoder::new(&mut plain));

        let mut framed = Vec::new();
        let mut encoder = Encoder::new(&mut framed);
        match compression {
            Some(threshold) if plain.len() >= threshold.0.get() => {
                let mut z =
                    flate2::write::ZlibEncoder::new(Vec::new(), COMPRESSION_LEVEL);
                z.write_all(&plain).unwrap();
                let compressed = z.finish().unwrap();
                let data_length = plain.len() as i32;
                encoder.write_var_int(var_int_size(data_length) as i32 + compressed.len() as i32);
                encoder.write_var_int(data_length);
                encoder.write_slice(&compressed);
            }
            Some(_) => {
                encoder.write_var_int(1 + plain.len() as i32);
                encoder.write_var_int(0);
                encoder.write_slice(&plain);
            }
            None => {
                encoder.write_var_int(plain.len() as i32);
                encoder.write_slice(&plain);
            }
        }

        if let Some(key) = encryption {
            let mut encryptor: cfb8::Encryptor<Aes128> =
                cfb8::Encryptor::new(&key.0.into(), &key.0.into());
            for byte in &mut framed {
                encryptor.encrypt_block_mut(GenericArray::from_mut_slice(slice::from_mut(byte)));
            }
        }
        framed
    }

    fn keep_alive(id: i64) -> play::Clientbound {
        play::Clientbound::KeepAlive(play::KeepAlive { id })
    }

    #[test]
    fn plain_frame_round_trips() {
        let mut codec = JavaCodec::<state::Play>::new();
        let frame = server_encode(&keep_alive(7), None, None);
        match echo_decode(frame, &mut codec) {
            play::Clientbound::KeepAlive(packet) => assert_eq!(packet.id, 7),
            other => panic!("wrong variant: {}", other.as_ref()),
        }
    }

    #[test]
    fn partial_frame_returns_none() {
        let mut codec = JavaCodec::<state::Play>::new();
        let frame = server_encode(&keep_alive(7), None, None);
        codec.give_data(&mut frame[..3].to_vec());
        assert!(codec.decode_packet().unwrap().is_none());
        codec.give_data(&mut frame[3..].to_vec());
        assert!(codec.decode_packet().unwrap().is_some());
    }

    #[test]
    fn compressed_frame_round_trips() {
        let threshold = CompressionThreshold::new(NonZeroUsize::new(8).unwrap());
        let mut codec = JavaCodec::<state::Play>::new();
        codec.enable_compression(threshold);

        let packet = play::Clientbound::ChatMessage(play::ChatMessage {
            json: "{\"text\":\"the quick brown fox jumps over the lazy dog\"}".to_owned(),
            position: 0,
        });
        let frame = server_encode(&packet, Some(threshold), None);
        match echo_decode(frame, &mut codec) {
            play::Clientbound::ChatMessage(chat) => assert!(chat.json.contains("quick brown")),
            other => panic!("wrong variant: {}", other.as_ref()),
        }
    }

    #[test]
    fn encrypted_frame_round_trips() {
        let key = EncryptionKey::new([7; 16]);
        let mut codec = JavaCodec::<state::Play>::new();
        codec.enable_encryption(key);

        let frame = server_encode(&keep_alive(99), None, Some(key));
        match echo_decode(frame, &mut codec) {
            play::Clientbound::KeepAlive(packet) => assert_eq!(packet.id, 99),
            other => panic!("wrong variant: {}", other.as_ref()),
        }
    }

    #[test]
    fn serverbound_encode_is_framed() {
        let mut codec = JavaCodec::<state::Login>::new();
        let frame = codec
            .encode_packet(&login::Serverbound::LoginStart(login::LoginStart {
                username: "Steve".to_owned(),
            }))
            .unwrap();
        // varint length prefix, then packet id 0x00, then the string.
        let mut decoder = Decoder::new(&frame);
        let length = decoder.read_var_int().unwrap() as usize;
        assert_eq!(length, frame.len() - 1);
        assert_eq!(decoder.read_var_int().unwrap(), 0x00);
        assert_eq!(decoder.read_string().unwrap(), "Steve");
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut codec = JavaCodec::<state::Play>::new();
        let mut frame = Vec::new();
        Encoder::new(&mut frame).write_var_int((BUFFER_LIMIT + 1) as i32);
        codec.give_data(frame);
        assert!(codec.decode_packet().is_err());
    }
}
