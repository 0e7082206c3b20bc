//! Bedrock edition packet definitions and framing.
//!
//! The RakNet layer below us delivers whole byte packets; each one wraps
//! a zlib-compressed batch of game packets. A single enum covers both
//! directions because the Bedrock protocol uses one id space.

pub mod chunk;
pub mod codec;
pub mod packets;

pub use codec::BedrockCodec;
pub use packets::Packet;

/// Supported Bedrock protocol versions, sorted ascending.
///
/// 389 is 1.14.0, 390 is 1.14.60.
pub const SUPPORTED_PROTOCOLS: [i32; 2] = [389, 390];

/// The newest supported protocol version.
pub const LATEST_PROTOCOL: i32 = 390;
