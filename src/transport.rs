//! Transport boundaries.
//!
//! The core never owns a wire format's reliability layer. The Bedrock
//! side consumes a [`PacketChannel`]: whole byte packets in, whole byte
//! packets out, as delivered by the RakNet layer sitting outside the
//! core. The Java side is a plain TCP stream driven through the
//! [`JavaConnection`] framing wrapper.

use crate::protocol::java::{codec::JavaCodec, state, ProtocolState};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream, UdpSocket,
    },
};

/// Buffered packets per channel direction before producers block.
const CHANNEL_CAPACITY: usize = 128;

/// One side of a byte-packet channel. Each `Vec<u8>` is a whole packet
/// as framed by the transport below us.
pub struct PacketChannel {
    outgoing: flume::Sender<Vec<u8>>,
    incoming: flume::Receiver<Vec<u8>>,
}

impl PacketChannel {
    pub fn new(outgoing: flume::Sender<Vec<u8>>, incoming: flume::Receiver<Vec<u8>>) -> Self {
        Self { outgoing, incoming }
    }

    /// Sends one packet. Fails when the peer side is gone.
    pub async fn send(&self, packet: Vec<u8>) -> anyhow::Result<()> {
        self.outgoing
            .send_async(packet)
            .await
            .context("packet channel closed")
    }

    /// Receives the next packet, or `None` once the peer side is gone.
    pub async fn recv(&self) -> Option<Vec<u8>> {
        self.incoming.recv_async().await.ok()
    }

    /// A clonable handle to the outgoing direction.
    pub fn sender(&self) -> flume::Sender<Vec<u8>> {
        self.outgoing.clone()
    }
}

/// An in-process channel pair, used by tests and by transports that
/// deliver packets from their own demultiplexing task.
pub fn memory_pair() -> (PacketChannel, PacketChannel) {
    let (a_tx, a_rx) = flume::bounded(CHANNEL_CAPACITY);
    let (b_tx, b_rx) = flume::bounded(CHANNEL_CAPACITY);
    (
        PacketChannel::new(a_tx, b_rx),
        PacketChannel::new(b_tx, a_rx),
    )
}

/// Minimal UDP endpoint standing in for the RakNet layer: each datagram
/// is treated as one delivered byte packet. A real deployment puts a
/// RakNet implementation here; everything above this boundary is
/// unchanged by that swap.
pub struct UdpEndpoint {
    accept_rx: flume::Receiver<(SocketAddr, PacketChannel)>,
}

impl UdpEndpoint {
    pub async fn bind(address: &str, port: u16) -> anyhow::Result<Self> {
        let socket = Arc::new(UdpSocket::bind((address, port)).await?);
        let (accept_tx, accept_rx) = flume::bounded(16);

        tokio::spawn(demultiplex(socket, accept_tx));

        Ok(Self { accept_rx })
    }

    /// Waits for a packet from a previously unseen peer and returns the
    /// channel bound to that peer.
    pub async fn accept(&self) -> Option<(SocketAddr, PacketChannel)> {
        self.accept_rx.recv_async().await.ok()
    }
}

async fn demultiplex(
    socket: Arc<UdpSocket>,
    accept_tx: flume::Sender<(SocketAddr, PacketChannel)>,
) {
    let mut peers: ahash::AHashMap<SocketAddr, flume::Sender<Vec<u8>>> = ahash::AHashMap::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let (length, peer) = match socket.recv_from(&mut buffer).await {
            Ok(x) => x,
            Err(e) => {
                tracing::warn!("UDP receive failed: {e}");
                continue;
            }
        };
        let packet = buffer[..length].to_vec();

        if let Some(sender) = peers.get(&peer).cloned() {
            if sender.send_async(packet).await.is_err() {
                peers.remove(&peer);
            }
            continue;
        }

        let (inbound_tx, inbound_rx) = flume::bounded(CHANNEL_CAPACITY);
        let (outbound_tx, outbound_rx) = flume::bounded::<Vec<u8>>(CHANNEL_CAPACITY);

        // Writer task for this peer.
        let write_socket = Arc::clone(&socket);
        tokio::spawn(async move {
            while let Ok(packet) = outbound_rx.recv_async().await {
                if let Err(e) = write_socket.send_to(&packet, peer).await {
                    tracing::debug!("UDP send to {peer} failed: {e}");
                    break;
                }
            }
        });

        inbound_tx.send_async(packet).await.ok();
        peers.insert(peer, inbound_tx);
        let channel = PacketChannel::new(outbound_tx, inbound_rx);
        if accept_tx.send_async((peer, channel)).await.is_err() {
            return;
        }
    }
}

/// A framed Java edition connection in protocol state `State`.
///
/// Send and receive keep separate codec instances so the connection can
/// later be split into independently owned halves.
pub struct JavaConnection<State: ProtocolState> {
    read_stream: OwnedReadHalf,
    write_stream: OwnedWriteHalf,
    send_codec: JavaCodec<State>,
    recv_codec: JavaCodec<State>,
}

impl JavaConnection<state::Handshake> {
    pub async fn connect(endpoint: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(endpoint)
            .await
            .with_context(|| format!("connecting to Java server {endpoint}"))?;
        stream.set_nodelay(true).ok();
        let (read_stream, write_stream) = stream.into_split();
        Ok(Self {
            read_stream,
            write_stream,
            send_codec: JavaCodec::new(),
            recv_codec: JavaCodec::new(),
        })
    }
}

impl<State: ProtocolState> JavaConnection<State> {
    pub async fn send_packet(&mut self, packet: &State::Serverbound) -> anyhow::Result<()> {
        let bytes = self.send_codec.encode_packet(packet)?;
        self.write_stream.write_all(&bytes).await?;
        Ok(())
    }

    pub async fn recv_packet(&mut self) -> anyhow::Result<State::Clientbound> {
        let mut buffer = [0u8; 256];
        loop {
            if let Some(packet) = self.recv_codec.decode_packet()? {
                return Ok(packet);
            }

            let bytes_read = self.read_stream.read(&mut buffer).await?;
            if bytes_read == 0 {
                anyhow::bail!("end of stream");
            }
            self.recv_codec.give_data(&mut buffer[..bytes_read]);
        }
    }

    pub fn enable_compression(&mut self, threshold: crate::protocol::java::codec::CompressionThreshold) {
        self.send_codec.enable_compression(threshold);
        self.recv_codec.enable_compression(threshold);
    }

    pub fn switch_state<NewState: ProtocolState>(self) -> JavaConnection<NewState> {
        JavaConnection {
            read_stream: self.read_stream,
            write_stream: self.write_stream,
            send_codec: self.send_codec.switch_state(),
            recv_codec: self.recv_codec.switch_state(),
        }
    }
}

impl JavaConnection<state::Play> {
    /// Splits into independently owned read and write halves for the
    /// per-session feeder and writer tasks.
    pub fn into_split(self) -> (JavaReader, JavaWriter) {
        (
            JavaReader {
                stream: self.read_stream,
                codec: self.recv_codec,
            },
            JavaWriter {
                stream: self.write_stream,
                codec: self.send_codec,
            },
        )
    }
}

/// Receiving half of a Play-state Java connection.
pub struct JavaReader {
    stream: OwnedReadHalf,
    codec: JavaCodec<state::Play>,
}

impl JavaReader {
    pub async fn recv_packet(
        &mut self,
    ) -> anyhow::Result<crate::protocol::java::play::Clientbound> {
        let mut buffer = [0u8; 4096];
        loop {
            if let Some(packet) = self.codec.decode_packet()? {
                return Ok(packet);
            }

            let bytes_read = self.stream.read(&mut buffer).await?;
            if bytes_read == 0 {
                anyhow::bail!("end of stream");
            }
            self.codec.give_data(&mut buffer[..bytes_read]);
        }
    }
}

/// Sending half of a Play-state Java connection.
pub struct JavaWriter {
    stream: OwnedWriteHalf,
    codec: JavaCodec<state::Play>,
}

impl JavaWriter {
    pub async fn send_packet(
        &mut self,
        packet: &crate::protocol::java::play::Serverbound,
    ) -> anyhow::Result<()> {
        let bytes = self.codec.encode_packet(packet)?;
        self.stream.write_all(&bytes).await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) {
        self.stream.shutdown().await.ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_pair_is_cross_wired() {
        let (client, server) = memory_pair();
        client.send(vec![1, 2, 3]).await.unwrap();
        assert_eq!(server.recv().await, Some(vec![1, 2, 3]));
        server.send(vec![4]).await.unwrap();
        assert_eq!(client.recv().await, Some(vec![4]));
    }

    #[tokio::test]
    async fn closed_channel_reports_none() {
        let (client, server) = memory_pair();
        drop(client);
        assert_eq!(server.recv().await, None);
    }
}
