//! Proxy allowing Bedrock edition clients to play on Java edition
//! servers.
//!
//! One process listens on a UDP/RakNet endpoint and opens an outbound
//! TCP connection per accepted client. Between the two sits a
//! per-session translation engine: every packet is decoded, run
//! through a translator that reconciles the two editions' state models
//! (identifier namespaces, coordinate frames, login sequencing, chunk
//! and entity encodings), and re-encoded for the other side.
//!
//! # Session anatomy
//! Each session is one logical task fed by a mailbox. Decoded packets
//! from both peers, ticks and worker completions are posted as
//! messages; the session task drains them in order, so all per-session
//! state is mutated single-threaded. Outbound packets are queued onto
//! bounded per-peer buffers drained by writer tasks, which preserves
//! emission order and gives a natural backpressure point.
//!
//! Mapping tables are immutable after startup and shared by every
//! session through [`ProxyContext`].

#![feature(error_generic_member_access)]

pub mod config;
pub mod error;
pub mod forms;
pub mod mappings;
pub mod pipeline;
pub mod position;
pub mod protocol;
pub mod session;
pub mod session_manager;
pub mod translator;
pub mod transport;
pub mod worker;

use config::ProxyConfig;
use mappings::Mappings;
use std::sync::Arc;
use worker::Workers;

/// Process-wide immutable state handed to translators and sessions.
/// There is no global singleton; whoever needs the tables receives
/// this handle explicitly.
pub struct ProxyContext {
    pub config: ProxyConfig,
    pub mappings: Mappings,
    pub workers: Workers,
}

impl ProxyContext {
    pub fn new(config: ProxyConfig) -> anyhow::Result<Self> {
        let workers = Workers::new(config.thread_pool_size.max(2));
        Ok(Self {
            config,
            mappings: Mappings::load()?,
            workers,
        })
    }
}

/// Runs the proxy until the accept loop ends.
pub async fn run(config: ProxyConfig) -> anyhow::Result<()> {
    let bind_address = config.bind_address.clone();
    let bind_port = config.bind_port;
    let ctx = Arc::new(ProxyContext::new(config)?);

    let endpoint = transport::UdpEndpoint::bind(&bind_address, bind_port).await?;
    tracing::info!("Listening on {bind_address}:{bind_port}");

    let manager = Arc::new(session_manager::SessionManager::new(Arc::clone(&ctx)));
    tokio::spawn(session_manager::run_ticker(Arc::clone(&manager)));

    loop {
        tokio::select! {
            accepted = endpoint.accept() => {
                let Some((peer, channel)) = accepted else { break };
                tracing::info!("Accepted connection from {peer}");
                let manager = Arc::clone(&manager);
                tokio::spawn(async move {
                    manager.accept_connection(channel).await;
                });
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, draining sessions");
                break;
            }
        }
    }

    // Ordered drain, then return; the process exits through main.
    manager.shutdown().await;
    Ok(())
}
