//! The per-session asynchronous pipeline.
//!
//! Two feeder tasks decode peer bytes and post messages into one
//! bounded mailbox; the session task drains it and runs translators to
//! completion, so the two directions are serialized on the session
//! state without a lock. Writer tasks on each peer drain bounded
//! outbound queues, preserving the order translators emitted.

use crate::{
    error::DisconnectReason,
    protocol::{
        bedrock::{codec::BedrockCodec, packets as bedrock, packets::Packet},
        java::{codec::CompressionThreshold, handshake, login, play, state},
        DecodeError, JAVA_PROTOCOL_VERSION,
    },
    session::{AuthState, Session, SessionId},
    translator,
    transport::{JavaConnection, PacketChannel},
    ProxyContext,
};
use anyhow::Context;
use serde::Deserialize;
use std::{
    num::NonZeroUsize,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
    time::Duration,
};
use tokio::time::timeout;

/// Messages delivered to a session task.
pub enum SessionMessage {
    FromBedrock(Packet),
    FromJava(play::Clientbound),
    /// The 50 ms scheduler pulse.
    Tick,
    /// Worker pool completion for the skin blob decode.
    SkinDecoded(Option<Vec<u8>>),
    Disconnect(DisconnectReason),
}

pub const MAILBOX_CAPACITY: usize = 256;
const OUTBOUND_CAPACITY: usize = 256;
const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// The identity payload carried by the Bedrock login. Verification
/// against the auth chain happens outside the core; the token is only
/// forwarded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionRequest {
    identity: IdentityData,
    #[serde(default)]
    client: ClientData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityData {
    display_name: String,
    identity: String,
    #[serde(default)]
    xuid: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientData {
    #[serde(default)]
    skin_data: String,
    #[serde(default)]
    language_code: Option<String>,
}

/// Drives one session from a completed version check to `Dead`.
///
/// `login` is the already-decoded login packet that admission used for
/// the version check; `codec` is the version-selected Bedrock codec.
pub async fn run_session(
    id: SessionId,
    ctx: Arc<ProxyContext>,
    channel: PacketChannel,
    codec: BedrockCodec,
    login: bedrock::Login,
    mailbox_tx: flume::Sender<SessionMessage>,
    mailbox_rx: flume::Receiver<SessionMessage>,
) {
    // Bedrock writer: typed packets out, one batch per packet.
    let (bedrock_tx, bedrock_rx) = flume::bounded::<Packet>(OUTBOUND_CAPACITY);
    let channel_sender = channel.sender();
    let writer_codec = codec.clone();
    let bedrock_writer = tokio::spawn(async move {
        while let Ok(packet) = bedrock_rx.recv_async().await {
            let batch = match writer_codec.encode_batch(&[packet]) {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!("failed to encode batch: {e}");
                    continue;
                }
            };
            if channel_sender.send_async(batch).await.is_err() {
                break;
            }
        }
    });

    let mut session = Session::new(id, bedrock_tx);

    // Identity from the login payload; a malformed payload is a
    // protocol error before any world state exists.
    match parse_connection_request(&login.payload) {
        Ok((identity, skin_data)) => {
            session.identity = identity;
            if !skin_data.is_empty() {
                let reply = mailbox_tx.clone();
                ctx.workers.submit(
                    move || {
                        use base64::Engine;
                        base64::engine::general_purpose::STANDARD
                            .decode(skin_data.as_bytes())
                            .ok()
                    },
                    move |skin| {
                        reply.try_send(SessionMessage::SkinDecoded(skin)).ok();
                    },
                );
            }
        }
        Err(e) => {
            tracing::warn!(session = id, "malformed login payload: {e}");
            session.disconnect(DisconnectReason::ProtocolError("bad login".to_owned()));
            finish_session(session, bedrock_writer, None).await;
            return;
        }
    }

    tracing::info!(
        session = id,
        name = %session.identity.display_name,
        protocol = codec.protocol_version(),
        "Bedrock login accepted"
    );
    session.send_bedrock(Packet::PlayStatus(bedrock::PlayStatus {
        status: bedrock::play_status::LOGIN_SUCCESS,
    }));
    session.send_bedrock(Packet::ResourcePacksInfo(bedrock::ResourcePacksInfo {
        forced: false,
        behavior_pack_count: 0,
        resource_pack_count: 0,
    }));
    session.begin_java_login();

    // Bedrock feeder runs from here on so that pack responses and
    // forms are not stalled behind the Java login.
    let feeder_codec = codec.clone();
    let feeder_mailbox = mailbox_tx.clone();
    let bedrock_feeder = tokio::spawn(async move {
        loop {
            let Some(bytes) = channel.recv().await else {
                feeder_mailbox
                    .send_async(SessionMessage::Disconnect(DisconnectReason::TransportClosed))
                    .await
                    .ok();
                break;
            };
            match feeder_codec.decode_batch(&bytes) {
                Ok(packets) => {
                    for packet in packets {
                        if feeder_mailbox
                            .send_async(SessionMessage::FromBedrock(packet))
                            .await
                            .is_err()
                        {
                            return;
                        }
                    }
                }
                Err(e) => {
                    feeder_mailbox
                        .send_async(SessionMessage::Disconnect(
                            DisconnectReason::ProtocolError(e.to_string()),
                        ))
                        .await
                        .ok();
                    break;
                }
            }
        }
    });

    // Asymmetric handshake: the Bedrock login is already done, now the
    // outbound Java leg performs handshake -> login -> (compression,
    // encryption) -> success.
    let username = session.identity.display_name.clone();
    let mut java_writer_task = None;
    let mut java_feeder = None;
    match timeout(LOGIN_TIMEOUT, java_login(&ctx, &username)).await {
        Ok(Ok(connection)) => {
            let (mut reader, mut writer) = connection.into_split();

            let (java_tx, java_rx) = flume::bounded::<play::Serverbound>(OUTBOUND_CAPACITY);
            session.attach_java(java_tx);
            java_writer_task = Some(tokio::spawn(async move {
                while let Ok(packet) = java_rx.recv_async().await {
                    if let Err(e) = writer.send_packet(&packet).await {
                        tracing::debug!("Java write failed: {e}");
                        break;
                    }
                }
                writer.shutdown().await;
            }));

            let feeder_mailbox = mailbox_tx.clone();
            java_feeder = Some(tokio::spawn(async move {
                loop {
                    match reader.recv_packet().await {
                        Ok(packet) => {
                            if feeder_mailbox
                                .send_async(SessionMessage::FromJava(packet))
                                .await
                                .is_err()
                            {
                                return;
                            }
                        }
                        Err(e) => {
                            let reason = if e.downcast_ref::<DecodeError>().is_some() {
                                DisconnectReason::ProtocolError(e.to_string())
                            } else {
                                DisconnectReason::TransportClosed
                            };
                            feeder_mailbox
                                .send_async(SessionMessage::Disconnect(reason))
                                .await
                                .ok();
                            return;
                        }
                    }
                }
            }));
        }
        Ok(Err(reason)) => session.disconnect(reason),
        Err(_) => session.disconnect(DisconnectReason::AuthFailed(
            "Java login timed out".to_owned(),
        )),
    }

    // The serialized per-session loop: every translator runs here.
    while !matches!(session.state(), AuthState::Disconnecting | AuthState::Dead) {
        let Ok(message) = mailbox_rx.recv_async().await else {
            break;
        };

        match message {
            SessionMessage::FromBedrock(packet) => {
                dispatch(&mut session, &ctx, "Bedrock", |s, c| {
                    translator::translate_bedrock(s, c, packet)
                });
            }
            SessionMessage::FromJava(packet) => {
                dispatch(&mut session, &ctx, "Java", |s, c| {
                    translator::translate_java(s, c, packet)
                });
            }
            SessionMessage::Tick => session.handle_tick(),
            SessionMessage::SkinDecoded(skin) => session.identity.skin = skin,
            SessionMessage::Disconnect(reason) => session.disconnect(reason),
        }
    }
    // Mailbox closed without an explicit reason: a peer vanished.
    session.disconnect(DisconnectReason::TransportClosed);

    bedrock_feeder.abort();
    if let Some(feeder) = java_feeder {
        feeder.abort();
    }
    finish_session(session, bedrock_writer, java_writer_task).await;
}

/// Runs one translator inside the panic boundary. A panic becomes an
/// `internal` disconnect instead of tearing down the process.
fn dispatch<F>(session: &mut Session, ctx: &Arc<ProxyContext>, direction: &'static str, translate: F)
where
    F: FnOnce(&mut Session, &ProxyContext) -> anyhow::Result<()>,
{
    match catch_unwind(AssertUnwindSafe(|| translate(session, ctx))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(session = session.id(), "translator failed: {e:#}");
            session.disconnect(DisconnectReason::ProtocolError(e.to_string()));
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("unknown panic");
            tracing::error!(
                session = session.id(),
                direction,
                panic = message,
                "translator panicked"
            );
            session.disconnect(DisconnectReason::Internal);
        }
    }
}

/// Flushes the outbound queues with a bounded timeout, then the
/// session is `Dead` and both transports are gone.
async fn finish_session(
    mut session: Session,
    bedrock_writer: tokio::task::JoinHandle<()>,
    java_writer: Option<tokio::task::JoinHandle<()>>,
) {
    let id = session.id();
    session.mark_dead();
    drop(session); // releases the outbound senders so writers can finish

    let drain = async {
        bedrock_writer.await.ok();
        if let Some(writer) = java_writer {
            writer.await.ok();
        }
    };
    if timeout(DRAIN_TIMEOUT, drain).await.is_err() {
        tracing::warn!(session = id, "outbound drain timed out");
    }
    tracing::info!(session = id, "session ended");
}

fn parse_connection_request(
    payload: &[u8],
) -> anyhow::Result<(crate::session::PlayerIdentity, String)> {
    let request: ConnectionRequest =
        serde_json::from_slice(payload).context("connection request is not valid JSON")?;
    let uuid = request
        .identity
        .identity
        .parse()
        .context("identity UUID is malformed")?;
    anyhow::ensure!(
        !request.identity.display_name.is_empty(),
        "display name is empty"
    );

    let identity = crate::session::PlayerIdentity {
        display_name: request.identity.display_name,
        uuid,
        xuid: request.identity.xuid,
        skin: None,
        locale: request
            .client
            .language_code
            .unwrap_or_else(|| "en_US".to_owned()),
    };
    Ok((identity, request.client.skin_data))
}

/// Performs the outbound Java handshake and login. Compression is
/// negotiated; encryption cannot be (authenticating against the
/// session service is out of scope), so an `EncryptionRequest` refuses
/// the login.
async fn java_login(
    ctx: &ProxyContext,
    username: &str,
) -> Result<JavaConnection<state::Play>, DisconnectReason> {
    let endpoint = ctx.config.remote_endpoint();
    let mut connection = JavaConnection::connect(&endpoint).await.map_err(|e| {
        tracing::warn!("Java connect failed: {e:#}");
        DisconnectReason::TransportClosed
    })?;

    connection
        .send_packet(&handshake::Packet::Handshake(handshake::Handshake {
            protocol_version: JAVA_PROTOCOL_VERSION,
            server_address: ctx.config.remote_address.clone(),
            server_port: ctx.config.remote_port,
            next_state: handshake::NextState::Login,
        }))
        .await
        .map_err(transport_error)?;

    let mut connection = connection.switch_state::<state::Login>();
    connection
        .send_packet(&login::Serverbound::LoginStart(login::LoginStart {
            username: username.to_owned(),
        }))
        .await
        .map_err(transport_error)?;

    loop {
        match connection.recv_packet().await.map_err(transport_error)? {
            login::Clientbound::SetCompression(packet) => {
                if let Ok(threshold) = usize::try_from(packet.threshold) {
                    if let Some(threshold) = NonZeroUsize::new(threshold.max(1)) {
                        connection.enable_compression(CompressionThreshold::new(threshold));
                    }
                }
            }
            login::Clientbound::EncryptionRequest(_) => {
                // Negotiating a key only makes sense with a session
                // service to authenticate against, which lives outside
                // the core; either way this login cannot proceed.
                let message = if ctx.config.online_mode {
                    "online-mode authentication is not available"
                } else {
                    "server requires online mode"
                };
                return Err(DisconnectReason::AuthFailed(message.to_owned()));
            }
            login::Clientbound::Disconnect(packet) => {
                return Err(DisconnectReason::Kicked(translator::chat_to_plain(
                    &packet.reason,
                )));
            }
            login::Clientbound::LoginPluginRequest(packet) => {
                tracing::debug!(channel = %packet.channel, "ignoring login plugin request");
            }
            login::Clientbound::LoginSuccess(packet) => {
                tracing::debug!(username = %packet.username, "Java login succeeded");
                return Ok(connection.switch_state::<state::Play>());
            }
        }
    }
}

fn transport_error(e: anyhow::Error) -> DisconnectReason {
    if e.downcast_ref::<DecodeError>().is_some() {
        DisconnectReason::ProtocolError(e.to_string())
    } else {
        DisconnectReason::TransportClosed
    }
}
