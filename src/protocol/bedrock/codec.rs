//! Batch codec for the Bedrock edition connection.
//!
//! Every byte packet handed to us by the RakNet layer is a `0xfe` game
//! packet wrapping a zlib-compressed batch: each contained packet is
//! prefixed with its varuint length. Encryption is not negotiated on
//! this leg; the proxy answers logins itself.

use super::{packets::Packet, LATEST_PROTOCOL, SUPPORTED_PROTOCOLS};
use crate::protocol::{Decode, Decoder, Encode, Encoder, BUFFER_LIMIT};
use anyhow::{bail, Context};
use flate2::Compression;
use std::io::{Read, Write};

/// Wrapper id of a game packet batch.
const BATCH_HEADER: u8 = 0xfe;

/// Batches mostly carry one or two small packets; heavy chunk payloads
/// are already dominated by their own size.
const COMPRESSION_LEVEL: Compression = Compression::fast();

/// Result of checking a client's protocol version against the
/// supported set.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    Supported,
    /// The client is older than the oldest supported version.
    ClientOutdated,
    /// The client is newer than the newest supported version.
    ServerOutdated,
}

/// Checks a protocol version against the supported sorted set.
pub fn check_protocol(version: i32) -> VersionCheck {
    let oldest = SUPPORTED_PROTOCOLS[0];
    let newest = SUPPORTED_PROTOCOLS[SUPPORTED_PROTOCOLS.len() - 1];
    if version < oldest {
        VersionCheck::ClientOutdated
    } else if version > newest {
        VersionCheck::ServerOutdated
    } else {
        VersionCheck::Supported
    }
}

/// Codec for one Bedrock connection, fixed to the protocol version
/// selected by the initial handshake.
#[derive(Debug, Clone)]
pub struct BedrockCodec {
    protocol_version: i32,
}

impl BedrockCodec {
    /// Selects the codec for the given protocol version, or `None` if
    /// the version is unsupported.
    pub fn for_protocol(version: i32) -> Option<Self> {
        (check_protocol(version) == VersionCheck::Supported).then_some(Self {
            protocol_version: version,
        })
    }

    /// The newest supported codec. Used to decode the initial login
    /// batch before a version has been negotiated.
    pub fn latest() -> Self {
        Self {
            protocol_version: LATEST_PROTOCOL,
        }
    }

    pub fn protocol_version(&self) -> i32 {
        self.protocol_version
    }

    /// Encodes packets into one compressed batch.
    pub fn encode_batch(&self, packets: &[Packet]) -> anyhow::Result<Vec<u8>> {
        let mut payload = Vec::new();
        let mut scratch = Vec::new();
        for packet in packets {
            scratch.clear();
            packet.encode(&mut Encoder::new(&mut scratch));
            Encoder::new(&mut payload).write_var_u32(scratch.len().try_into()?);
            payload.extend_from_slice(&scratch);
        }

        let mut compressed = flate2::write::ZlibEncoder::new(Vec::new(), COMPRESSION_LEVEL);
        compressed.write_all(&payload)?;
        let compressed = compressed.finish()?;

        let mut batch = Vec::with_capacity(compressed.len() + 1);
        batch.push(BATCH_HEADER);
        batch.extend_from_slice(&compressed);
        Ok(batch)
    }

    /// Decodes one batch into the packets it contains, in order.
    pub fn decode_batch(&self, data: &[u8]) -> anyhow::Result<Vec<Packet>> {
        let (&header, compressed) = data.split_first().context("empty batch")?;
        if header != BATCH_HEADER {
            bail!("unexpected batch header {header:#04x}");
        }

        let mut payload = Vec::new();
        flate2::read::ZlibDecoder::new(compressed)
            .take(BUFFER_LIMIT.try_into().unwrap())
            .read_to_end(&mut payload)?;

        let mut decoder = Decoder::new(&payload);
        let mut packets = Vec::new();
        while !decoder.is_finished() {
            let length = usize::try_from(decoder.read_var_u32()?)?;
            if length > BUFFER_LIMIT {
                bail!("packet length of {length} exceeds maximum allowed");
            }
            let body = decoder.consume_slice(length)?;
            packets.push(Packet::decode(&mut Decoder::new(body))?);
        }
        Ok(packets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::bedrock::packets::{play_status, PlayStatus, SetTime};

    #[test]
    fn batch_round_trips_in_order() {
        let codec = BedrockCodec::latest();
        let batch = codec
            .encode_batch(&[
                Packet::PlayStatus(PlayStatus {
                    status: play_status::LOGIN_SUCCESS,
                }),
                Packet::SetTime(SetTime { time: 6000 }),
            ])
            .unwrap();

        let packets = codec.decode_batch(&batch).unwrap();
        assert_eq!(packets.len(), 2);
        assert!(matches!(packets[0], Packet::PlayStatus(_)));
        assert!(matches!(&packets[1], Packet::SetTime(t) if t.time == 6000));
    }

    #[test]
    fn rejects_wrong_header() {
        let codec = BedrockCodec::latest();
        let mut batch = codec.encode_batch(&[]).unwrap();
        batch[0] = 0x42;
        assert!(codec.decode_batch(&batch).is_err());
    }

    #[test]
    fn version_bounds() {
        assert_eq!(check_protocol(388), VersionCheck::ClientOutdated);
        assert_eq!(check_protocol(389), VersionCheck::Supported);
        assert_eq!(check_protocol(390), VersionCheck::Supported);
        assert_eq!(check_protocol(391), VersionCheck::ServerOutdated);
    }

    #[test]
    fn codec_selection_follows_bounds() {
        assert!(BedrockCodec::for_protocol(390).is_some());
        assert!(BedrockCodec::for_protocol(100).is_none());
        assert_eq!(BedrockCodec::latest().protocol_version(), 390);
    }
}
