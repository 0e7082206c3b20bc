//! The disconnect reason taxonomy.
//!
//! Only conditions that end a session appear here. Non-fatal failures
//! have fixed dispositions elsewhere: a packet without a translator is
//! dropped with a debug log entry, and a mapping table miss substitutes
//! a fallback value.

/// Why a session ended. The display string is what the Bedrock client
/// shows on its disconnect screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisconnectReason {
    /// Either peer closed or reset its transport.
    #[error("connection closed")]
    TransportClosed,
    /// Malformed bytes received from a peer.
    #[error("protocol error: {0}")]
    ProtocolError(String),
    /// A peer's outbound buffer stayed saturated past the bound.
    #[error("connection overloaded")]
    Backpressure,
    /// The Java server rejected the login; carries its reason.
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    /// A translator panicked or hit a bug.
    #[error("internal error")]
    Internal,
    /// The proxy is shutting down.
    #[error("server shutdown")]
    Shutdown,
    /// The Java server kicked the player; carries its reason.
    #[error("{0}")]
    Kicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_are_user_facing() {
        assert_eq!(DisconnectReason::TransportClosed.to_string(), "connection closed");
        assert_eq!(
            DisconnectReason::AuthFailed("bad token".into()).to_string(),
            "authentication failed: bad token"
        );
        assert_eq!(DisconnectReason::Kicked("banned".into()).to_string(), "banned");
    }
}
