//! Java edition packet definitions and framing.
//!
//! The proxy always plays the client role on this leg, so each protocol
//! state names the packet enum we send (serverbound) and the enum we
//! receive (clientbound). Full parsing of packets is _not_ implemented:
//! only the fields required for translation are decoded, and the rest of
//! a packet's data is kept as a `Vec<u8>` tail. (This enables roundtrip
//! encoding/decoding without loss of information.)

use super::{Decode, Encode};
use std::fmt::Debug;

pub mod chunk;
pub mod codec;
pub mod handshake;
pub mod login;
pub mod play;

/// Type encoding for a Java protocol state.
pub trait ProtocolState: Send + Sync + 'static {
    /// Packet type sent by the proxy to the remote server in this state.
    type Serverbound: Encode + Debug + AsRef<str> + Send + 'static;
    /// Packet type sent by the remote server in this state.
    type Clientbound: Decode + Debug + AsRef<str> + Send + 'static;
}

pub mod state {
    use super::*;
    use minecraft_bedrock_proxy_macros::{Decode, Encode};

    #[derive(Debug, Copy, Clone)]
    pub struct Handshake;
    impl ProtocolState for Handshake {
        type Serverbound = handshake::Packet;
        type Clientbound = EmptyPacket;
    }

    /// The server never speaks during the handshake.
    #[derive(Encode, Decode, Debug, Clone)]
    pub struct EmptyPacket;

    impl AsRef<str> for EmptyPacket {
        fn as_ref(&self) -> &str {
            ""
        }
    }

    #[derive(Debug, Copy, Clone)]
    pub struct Login;
    impl ProtocolState for Login {
        type Serverbound = login::Serverbound;
        type Clientbound = login::Clientbound;
    }

    #[derive(Debug, Copy, Clone)]
    pub struct Play;
    impl ProtocolState for Play {
        type Serverbound = play::Serverbound;
        type Clientbound = play::Clientbound;
    }
}
