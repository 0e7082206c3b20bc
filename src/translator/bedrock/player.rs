//! Translators for Bedrock-origin player packets.

use crate::{
    position::{player_y_to_java, yaw_to_java, EntityPosition},
    protocol::{
        bedrock::packets::{self as bedrock, text_kind, Packet},
        java::play,
    },
    session::{Session, PLAYER_RUNTIME_ID},
    ProxyContext,
};

pub fn move_player(session: &mut Session, packet: bedrock::MovePlayer) -> anyhow::Result<()> {
    if packet.runtime_entity_id != PLAYER_RUNTIME_ID {
        tracing::debug!(
            runtime_id = packet.runtime_entity_id,
            "client tried to move a foreign entity"
        );
        return Ok(());
    }

    let position = EntityPosition {
        x: f64::from(packet.position.x),
        y: player_y_to_java(packet.position.y),
        z: f64::from(packet.position.z),
        yaw: yaw_to_java(packet.yaw),
        pitch: packet.pitch,
    };
    session.player_position = position;
    session.update_entity_position(session.player_java_id, position);

    session.send_java(play::Serverbound::PlayerPositionAndRotation(
        play::PlayerPositionAndRotation {
            x: position.x,
            y: position.y,
            z: position.z,
            yaw: position.yaw,
            pitch: position.pitch,
            on_ground: packet.on_ground,
        },
    ));
    Ok(())
}

pub fn text(session: &mut Session, packet: bedrock::Text) -> anyhow::Result<()> {
    if packet.kind != text_kind::RAW && packet.kind != text_kind::CHAT {
        return Ok(());
    }
    if packet.message.is_empty() {
        return Ok(());
    }
    session.send_java(play::Serverbound::ChatMessageServerbound(
        play::ChatMessageServerbound {
            message: packet.message,
        },
    ));
    Ok(())
}

/// The Bedrock respawn button maps to the Java "perform respawn"
/// client status.
pub fn respawn(session: &mut Session, _packet: bedrock::Respawn) -> anyhow::Result<()> {
    session.send_java(play::Serverbound::ClientStatus(play::ClientStatus {
        action: 0,
    }));
    Ok(())
}

pub fn player_action(session: &mut Session, packet: bedrock::PlayerAction) -> anyhow::Result<()> {
    // Digging, jumping and the like need the inventory transaction
    // bridge; until then the actions are observed but not forwarded.
    tracing::debug!(
        session = session.id(),
        action = packet.action,
        "player action not forwarded"
    );
    Ok(())
}

/// Chunk radius requests are answered on the same leg, clamped to the
/// configured view distance.
pub fn request_chunk_radius(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: bedrock::RequestChunkRadius,
) -> anyhow::Result<()> {
    let radius = packet
        .radius
        .clamp(2, ctx.config.view_distance.max(2) as i32);
    session.view_distance = radius as u32;
    session.send_bedrock(Packet::ChunkRadiusUpdated(bedrock::ChunkRadiusUpdated {
        radius,
    }));
    Ok(())
}

pub fn container_close(session: &mut Session, packet: bedrock::ContainerClose) -> anyhow::Result<()> {
    if session.close_window(packet.window_id).is_some() {
        session.send_java(play::Serverbound::CloseWindowServerbound(
            play::CloseWindowServerbound {
                window_id: packet.window_id,
            },
        ));
    }
    Ok(())
}

pub fn client_cache_status(
    session: &mut Session,
    packet: bedrock::ClientCacheStatus,
) -> anyhow::Result<()> {
    // The blob cache is not implemented; chunks are always sent whole.
    tracing::debug!(
        session = session.id(),
        supported = packet.supported,
        "client cache ignored"
    );
    Ok(())
}

pub fn local_player_initialized(
    session: &mut Session,
    _packet: bedrock::SetLocalPlayerAsInitialized,
) -> anyhow::Result<()> {
    tracing::debug!(session = session.id(), "client finished initializing");
    Ok(())
}

pub fn resource_pack_response(
    session: &mut Session,
    packet: bedrock::ResourcePackClientResponse,
) -> anyhow::Result<()> {
    // No packs are ever offered, so the only meaningful answers are
    // "have all packs" (3) and "completed" (4).
    match packet.status {
        3 => session.send_bedrock(Packet::ResourcePackStack(bedrock::ResourcePackStack {
            forced: false,
            behavior_packs: 0,
            resource_packs: 0,
            game_version: String::new(),
        })),
        4 => {}
        other => tracing::debug!(status = other, "unexpected resource pack response"),
    }
    Ok(())
}
