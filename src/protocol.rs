//! Implements the two Minecraft wire formats bridged by the proxy.
//!
//! The Java edition speaks big-endian primitives and signed varints over
//! length-prefixed TCP frames; the Bedrock edition speaks little-endian
//! primitives and unsigned/zigzag varints inside compressed RakNet batches.
//! Both are driven by the same [`Encoder`]/[`Decoder`] bitstream layer.

/// Java edition protocol version spoken on the outbound leg (1.14.4).
pub const JAVA_PROTOCOL_VERSION: i32 = 498;

pub mod bedrock;
pub mod decoder;
pub mod encoder;
pub mod java;
pub mod nbt;

pub use decoder::{Decode, DecodeError, DecodeLe, Decoder};
pub use encoder::{Encode, EncodeLe, Encoder};

/// Limit to avoid out-of-memory DOS.
const BUFFER_LIMIT: usize = 1024 * 1024; // 1 MiB
