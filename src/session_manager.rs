//! The registry of live sessions: admission, ticking, teardown.

use crate::{
    error::DisconnectReason,
    pipeline::{self, SessionMessage},
    protocol::bedrock::{
        codec::{check_protocol, BedrockCodec, VersionCheck},
        packets::{self as bedrock, play_status, Packet},
    },
    session::SessionId,
    transport::PacketChannel,
    ProxyContext,
};
use dashmap::DashMap;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::timeout;

/// One game tick.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// How long the first login batch may take before the connection is
/// abandoned.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Bound on the shutdown drain before outstanding sessions are
/// abandoned.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A live session as seen from outside its task.
pub struct SessionHandle {
    pub mailbox: flume::Sender<SessionMessage>,
}

pub struct SessionManager {
    ctx: Arc<ProxyContext>,
    sessions: Arc<DashMap<SessionId, SessionHandle>>,
    next_session_id: AtomicU64,
}

impl SessionManager {
    pub fn new(ctx: Arc<ProxyContext>) -> Self {
        Self {
            ctx,
            sessions: Arc::new(DashMap::new()),
            next_session_id: AtomicU64::new(1),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Performs pre-session admission on a fresh Bedrock connection:
    /// the first batch must be a login, its protocol version must fall
    /// inside the supported range, and there must be a player slot.
    /// Refusals happen before any session state is allocated.
    pub async fn accept_connection(&self, channel: PacketChannel) {
        let first_batch = match timeout(LOGIN_TIMEOUT, channel.recv()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return,
            Err(_) => {
                tracing::debug!("connection sent no login in time");
                return;
            }
        };

        // The login packet layout is version-independent, so the
        // newest codec can decode it before a version is selected.
        let packets = match BedrockCodec::latest().decode_batch(&first_batch) {
            Ok(packets) => packets,
            Err(e) => {
                tracing::debug!("undecodable first batch: {e}");
                return;
            }
        };
        let Some(Packet::Login(login)) = packets.into_iter().next() else {
            tracing::debug!("first packet was not a login");
            return;
        };

        match check_protocol(login.protocol_version) {
            VersionCheck::ClientOutdated => {
                tracing::info!(
                    protocol = login.protocol_version,
                    "refusing outdated client"
                );
                refuse(&channel, play_status::FAILED_CLIENT_OUTDATED).await;
                return;
            }
            VersionCheck::ServerOutdated => {
                tracing::info!(
                    protocol = login.protocol_version,
                    "refusing client newer than the proxy"
                );
                refuse(&channel, play_status::FAILED_SERVER_OUTDATED).await;
                return;
            }
            VersionCheck::Supported => {}
        }

        if self.sessions.len() >= self.ctx.config.max_players {
            tracing::info!("refusing connection: server full");
            refuse(&channel, play_status::FAILED_SERVER_FULL).await;
            return;
        }

        let codec = BedrockCodec::for_protocol(login.protocol_version)
            .expect("version was just checked");
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let (mailbox_tx, mailbox_rx) = flume::bounded(pipeline::MAILBOX_CAPACITY);
        self.sessions.insert(
            id,
            SessionHandle {
                mailbox: mailbox_tx.clone(),
            },
        );

        let ctx = Arc::clone(&self.ctx);
        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            pipeline::run_session(id, ctx, channel, codec, login, mailbox_tx, mailbox_rx).await;
            sessions.remove(&id);
        });
    }

    /// Delivers one tick to every live session. A full mailbox skips
    /// the tick rather than stalling the scheduler.
    pub fn tick_all(&self) {
        for entry in self.sessions.iter() {
            entry.mailbox.try_send(SessionMessage::Tick).ok();
        }
    }

    /// Ordered drain: every session is asked to disconnect, then their
    /// tasks are given a bounded time to finish before being abandoned.
    pub async fn shutdown(&self) {
        tracing::info!(sessions = self.sessions.len(), "shutting down sessions");
        for entry in self.sessions.iter() {
            entry
                .mailbox
                .try_send(SessionMessage::Disconnect(DisconnectReason::Shutdown))
                .ok();
        }

        let drained = timeout(SHUTDOWN_TIMEOUT, async {
            while !self.sessions.is_empty() {
                tokio::time::sleep(TICK_INTERVAL).await;
            }
        })
        .await;
        if drained.is_err() {
            tracing::warn!(
                remaining = self.sessions.len(),
                "shutdown drain timed out, abandoning sessions"
            );
        }
    }
}

async fn refuse(channel: &PacketChannel, status: i32) {
    let batch = BedrockCodec::latest()
        .encode_batch(&[Packet::PlayStatus(bedrock::PlayStatus { status })])
        .expect("static packet encodes");
    channel.send(batch).await.ok();
}

/// The shared 50 ms scheduler. One task serves every session.
pub async fn run_ticker(manager: Arc<SessionManager>) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        manager.tick_all();
    }
}
