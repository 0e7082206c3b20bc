//! Translators for packets addressing the player itself.

use crate::{
    error::DisconnectReason,
    mappings,
    position::{yaw_to_bedrock, EntityPosition, Vec3, PLAYER_EYE_HEIGHT},
    protocol::{
        bedrock::packets::{self as bedrock, move_mode, play_status, Packet},
        java::play,
    },
    session::{Session, PLAYER_RUNTIME_ID},
    translator::chat_to_plain,
    ProxyContext,
};

/// Java `JoinGame` completes the cross-edition login: the Bedrock peer
/// gets its `StartGame` with the translated world view and the reserved
/// player runtime id, and the session enters `Spawned`.
pub fn join_game(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: play::JoinGame,
) -> anyhow::Result<()> {
    if !session.mark_spawned() {
        tracing::warn!(session = session.id(), "duplicate JoinGame, ignoring");
        return Ok(());
    }

    session.dimension = packet.dimension;
    session.gamemode = i32::from(packet.gamemode);
    session.register_player(packet.entity_id, EntityPosition::default());

    let spawn = session.spawn;
    let gamemode = mappings::gamemode_to_bedrock(session.gamemode);
    session.send_bedrock(Packet::StartGame(bedrock::StartGame {
        entity_unique_id: PLAYER_RUNTIME_ID as i64,
        runtime_entity_id: PLAYER_RUNTIME_ID,
        player_gamemode: gamemode,
        position: Vec3::new(
            spawn.x as f32,
            spawn.y as f32 + PLAYER_EYE_HEIGHT as f32,
            spawn.z as f32,
        ),
        pitch: 0.0,
        yaw: 0.0,
        seed: 0,
        dimension: mappings::dimension_to_bedrock(packet.dimension),
        generator: 1,
        world_gamemode: gamemode,
        difficulty: 1,
        spawn_x: spawn.x,
        spawn_y: spawn.y.max(0) as u32,
        spawn_z: spawn.z,
        achievements_disabled: true,
        day_cycle_stop_time: -1,
        edu_mode: false,
        rain_level: 0.0,
        lightning_level: 0.0,
        multiplayer: true,
        broadcast_to_lan: false,
        commands_enabled: true,
        texture_packs_required: false,
        level_id: String::new(),
        level_name: packet.level_type,
    }));
    // Without a publisher region the client silently discards chunks.
    session.send_bedrock(Packet::NetworkChunkPublisherUpdate(
        bedrock::NetworkChunkPublisherUpdate {
            x: spawn.x,
            y: spawn.y,
            z: spawn.z,
            radius: session.view_distance * 16,
        },
    ));
    session.send_bedrock(Packet::PlayStatus(bedrock::PlayStatus {
        status: play_status::PLAYER_SPAWN,
    }));

    // Announce our settings to the server the way a Java client would.
    let view_distance = packet
        .view_distance
        .min(ctx.config.view_distance as i32)
        .max(2);
    session.view_distance = view_distance as u32;
    session.send_java(play::Serverbound::ClientSettings(play::ClientSettings {
        locale: session.identity.locale.clone(),
        view_distance: view_distance as i8,
        chat_mode: 0,
        chat_colors: true,
        displayed_skin_parts: 0x7f,
        main_hand: 1,
    }));

    tracing::info!(
        session = session.id(),
        name = %session.identity.display_name,
        "player spawned"
    );
    Ok(())
}

/// Keepalives are answered on the same leg; the Bedrock side has its
/// own liveness handling below the core.
pub fn keep_alive(session: &mut Session, packet: play::KeepAlive) -> anyhow::Result<()> {
    session.send_java(play::Serverbound::KeepAliveServerbound(
        play::KeepAliveServerbound { id: packet.id },
    ));
    Ok(())
}

pub fn chat_message(session: &mut Session, packet: play::ChatMessage) -> anyhow::Result<()> {
    let message = chat_to_plain(&packet.json);
    if message.is_empty() {
        return Ok(());
    }
    let kind = if packet.position == 2 {
        bedrock::text_kind::SYSTEM
    } else {
        bedrock::text_kind::RAW
    };
    session.send_bedrock(Packet::Text(bedrock::Text {
        kind,
        needs_translation: false,
        source_name: String::new(),
        message,
        xuid: String::new(),
        platform_chat_id: String::new(),
    }));
    Ok(())
}

pub fn disconnect(session: &mut Session, packet: play::Disconnect) -> anyhow::Result<()> {
    let reason = chat_to_plain(&packet.reason);
    session.disconnect(DisconnectReason::Kicked(reason));
    Ok(())
}

/// A server teleport. The Bedrock peer is moved and the teleport is
/// confirmed back on the Java leg.
pub fn position_and_look(
    session: &mut Session,
    packet: play::PlayerPositionAndLook,
) -> anyhow::Result<()> {
    // Relative flag bits: x=0x01, y=0x02, z=0x04, yaw=0x08, pitch=0x10.
    let previous = session.player_position;
    let absolute = EntityPosition {
        x: if packet.flags & 0x01 != 0 { previous.x + packet.x } else { packet.x },
        y: if packet.flags & 0x02 != 0 { previous.y + packet.y } else { packet.y },
        z: if packet.flags & 0x04 != 0 { previous.z + packet.z } else { packet.z },
        yaw: if packet.flags & 0x08 != 0 { previous.yaw + packet.yaw } else { packet.yaw },
        pitch: if packet.flags & 0x10 != 0 { previous.pitch + packet.pitch } else { packet.pitch },
    };
    session.player_position = absolute;
    session.update_entity_position(session.player_java_id, absolute);

    session.send_bedrock(Packet::MovePlayer(bedrock::MovePlayer {
        runtime_entity_id: PLAYER_RUNTIME_ID,
        position: absolute.to_bedrock_player(),
        pitch: absolute.pitch,
        yaw: yaw_to_bedrock(absolute.yaw),
        head_yaw: yaw_to_bedrock(absolute.yaw),
        mode: move_mode::TELEPORT,
        on_ground: false,
        riding_runtime_id: 0,
    }));
    session.send_java(play::Serverbound::TeleportConfirm(play::TeleportConfirm {
        teleport_id: packet.teleport_id,
    }));
    Ok(())
}

/// A dimension change. The server will resend every entity and chunk,
/// so the mirrors of both are dropped with the old world.
pub fn respawn(session: &mut Session, packet: play::Respawn) -> anyhow::Result<()> {
    session.dimension = packet.dimension;
    session.gamemode = i32::from(packet.gamemode);

    let removed = session.clear_entities();
    for entity in removed {
        session.send_bedrock(Packet::RemoveEntity(bedrock::RemoveEntity {
            entity_unique_id: entity.runtime_id as i64,
        }));
    }
    session.clear_chunks();

    session.send_bedrock(Packet::ChangeDimension(bedrock::ChangeDimension {
        dimension: mappings::dimension_to_bedrock(packet.dimension),
        position: session.player_position.to_bedrock_player(),
        respawn: true,
    }));
    session.send_bedrock(Packet::SetPlayerGameType(bedrock::SetPlayerGameType {
        gamemode: mappings::gamemode_to_bedrock(session.gamemode),
    }));
    Ok(())
}

pub fn update_view_distance(
    session: &mut Session,
    packet: play::UpdateViewDistance,
) -> anyhow::Result<()> {
    if packet.view_distance > 0 {
        session.view_distance = packet.view_distance as u32;
        session.send_bedrock(Packet::ChunkRadiusUpdated(bedrock::ChunkRadiusUpdated {
            radius: packet.view_distance,
        }));
    }
    Ok(())
}
