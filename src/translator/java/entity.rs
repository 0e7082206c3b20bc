//! Translators for the entity lifecycle: spawn, movement, despawn.
//!
//! Java movement is a mix of absolute teleports and fixed-point
//! deltas; the session keeps the last known position of every entity
//! so that deltas can be re-emitted as the absolute moves the Bedrock
//! protocol prefers.

use crate::{
    position::{yaw_to_bedrock, EntityPosition, EntityPositionDelta, Vec3},
    protocol::{
        bedrock::packets::{self as bedrock, mob_effect_event, move_mode, Packet},
        java::play,
    },
    session::{Entity, Session},
    ProxyContext,
};

/// Java velocity unit: blocks per tick times 8000.
const VELOCITY_SCALE: f32 = 8000.0;

pub fn spawn_object(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: play::SpawnObject,
) -> anyhow::Result<()> {
    let position = EntityPosition {
        x: packet.x,
        y: packet.y,
        z: packet.z,
        yaw: packet.yaw,
        pitch: packet.pitch,
    };
    let runtime_id = session.register_entity(packet.entity_id, packet.kind, position, false);
    send_add_entity(
        session,
        ctx,
        runtime_id,
        packet.kind,
        position,
        Vec3::new(
            f32::from(packet.velocity_x) / VELOCITY_SCALE,
            f32::from(packet.velocity_y) / VELOCITY_SCALE,
            f32::from(packet.velocity_z) / VELOCITY_SCALE,
        ),
    );
    Ok(())
}

pub fn spawn_mob(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: play::SpawnMob,
) -> anyhow::Result<()> {
    let position = EntityPosition {
        x: packet.x,
        y: packet.y,
        z: packet.z,
        yaw: packet.yaw,
        pitch: packet.pitch,
    };
    let runtime_id = session.register_entity(packet.entity_id, packet.kind, position, false);
    send_add_entity(
        session,
        ctx,
        runtime_id,
        packet.kind,
        position,
        Vec3::new(
            f32::from(packet.velocity_x) / VELOCITY_SCALE,
            f32::from(packet.velocity_y) / VELOCITY_SCALE,
            f32::from(packet.velocity_z) / VELOCITY_SCALE,
        ),
    );
    Ok(())
}

fn send_add_entity(
    session: &mut Session,
    ctx: &ProxyContext,
    runtime_id: u64,
    kind: i32,
    position: EntityPosition,
    motion: Vec3,
) {
    let identifier = ctx.mappings.entities.to_bedrock(kind).to_owned();
    session.send_bedrock(Packet::AddEntity(bedrock::AddEntity {
        entity_unique_id: runtime_id as i64,
        runtime_entity_id: runtime_id,
        identifier,
        position: position.to_bedrock(),
        motion,
        pitch: position.pitch,
        yaw: yaw_to_bedrock(position.yaw),
        head_yaw: yaw_to_bedrock(position.yaw),
        attribute_count: 0,
        metadata_count: 0,
    }));
}

pub fn spawn_player(session: &mut Session, packet: play::SpawnPlayer) -> anyhow::Result<()> {
    let position = EntityPosition {
        x: packet.x,
        y: packet.y,
        z: packet.z,
        yaw: packet.yaw,
        pitch: packet.pitch,
    };
    let runtime_id = session.register_entity(packet.entity_id, -1, position, true);
    session.send_bedrock(Packet::AddPlayer(bedrock::AddPlayer {
        uuid: packet.uuid,
        // The tab-list cache that carries usernames is not mirrored;
        // the nametag stays blank.
        username: String::new(),
        entity_unique_id: runtime_id as i64,
        runtime_entity_id: runtime_id,
        platform_chat_id: String::new(),
        position: position.to_bedrock_player(),
        motion: Vec3::ZERO,
        pitch: position.pitch,
        yaw: yaw_to_bedrock(position.yaw),
        head_yaw: yaw_to_bedrock(position.yaw),
        held_item: bedrock::ItemStack::EMPTY,
        metadata_count: 0,
    }));
    Ok(())
}

pub fn destroy_entities(session: &mut Session, packet: play::DestroyEntities) -> anyhow::Result<()> {
    for java_id in packet.entities {
        if let Some(entity) = session.unregister_entity(java_id) {
            session.send_bedrock(Packet::RemoveEntity(bedrock::RemoveEntity {
                entity_unique_id: entity.runtime_id as i64,
            }));
        } else {
            tracing::debug!(java_id, "destroy for unknown entity");
        }
    }
    Ok(())
}

fn moved(session: &mut Session, java_id: i32, position: EntityPosition, teleport: bool, on_ground: bool) {
    session.update_entity_position(java_id, position);
    let Some(entity) = session.get_entity_by_java_id(java_id) else {
        return;
    };
    let entity = entity.clone();
    send_move(session, &entity, teleport, on_ground);
}

fn send_move(session: &mut Session, entity: &Entity, teleport: bool, on_ground: bool) {
    if entity.is_player {
        session.send_bedrock(Packet::MovePlayer(bedrock::MovePlayer {
            runtime_entity_id: entity.runtime_id,
            position: entity.position.to_bedrock_player(),
            pitch: entity.position.pitch,
            yaw: yaw_to_bedrock(entity.position.yaw),
            head_yaw: yaw_to_bedrock(entity.position.yaw),
            mode: if teleport {
                move_mode::TELEPORT
            } else {
                move_mode::NORMAL
            },
            on_ground,
            riding_runtime_id: 0,
        }));
    } else {
        let mut flags = 0u8;
        if on_ground {
            flags |= 0x01;
        }
        if teleport {
            flags |= 0x02;
        }
        session.send_bedrock(Packet::MoveEntityAbsolute(bedrock::MoveEntityAbsolute {
            runtime_entity_id: entity.runtime_id,
            flags,
            position: entity.position.to_bedrock(),
            pitch: entity.position.pitch,
            yaw: yaw_to_bedrock(entity.position.yaw),
            head_yaw: yaw_to_bedrock(entity.position.yaw),
        }));
    }
}

pub fn relative_move(session: &mut Session, packet: play::EntityRelativeMove) -> anyhow::Result<()> {
    let Some(entity) = session.get_entity_by_java_id(packet.entity_id) else {
        tracing::debug!(java_id = packet.entity_id, "move for unknown entity");
        return Ok(());
    };
    let position = entity.position
        + EntityPositionDelta {
            dx: packet.delta_x,
            dy: packet.delta_y,
            dz: packet.delta_z,
        };
    moved(session, packet.entity_id, position, false, packet.on_ground);
    Ok(())
}

pub fn look_and_relative_move(
    session: &mut Session,
    packet: play::EntityLookAndRelativeMove,
) -> anyhow::Result<()> {
    let Some(entity) = session.get_entity_by_java_id(packet.entity_id) else {
        tracing::debug!(java_id = packet.entity_id, "move for unknown entity");
        return Ok(());
    };
    let mut position = entity.position
        + EntityPositionDelta {
            dx: packet.delta_x,
            dy: packet.delta_y,
            dz: packet.delta_z,
        };
    position.yaw = packet.yaw;
    position.pitch = packet.pitch;
    moved(session, packet.entity_id, position, false, packet.on_ground);
    Ok(())
}

pub fn look(session: &mut Session, packet: play::EntityLook) -> anyhow::Result<()> {
    let Some(entity) = session.get_entity_by_java_id(packet.entity_id) else {
        return Ok(());
    };
    let position = EntityPosition {
        yaw: packet.yaw,
        pitch: packet.pitch,
        ..entity.position
    };
    moved(session, packet.entity_id, position, false, packet.on_ground);
    Ok(())
}

pub fn teleport(session: &mut Session, packet: play::EntityTeleport) -> anyhow::Result<()> {
    let position = EntityPosition {
        x: packet.x,
        y: packet.y,
        z: packet.z,
        yaw: packet.yaw,
        pitch: packet.pitch,
    };
    moved(session, packet.entity_id, position, true, packet.on_ground);
    Ok(())
}

pub fn head_look(session: &mut Session, packet: play::EntityHeadLook) -> anyhow::Result<()> {
    let Some(entity) = session.get_entity_by_java_id(packet.entity_id) else {
        return Ok(());
    };
    if entity.is_player {
        // Player head rotation rides on the next MovePlayer.
        return Ok(());
    }
    let entity = entity.clone();
    session.send_bedrock(Packet::MoveEntityAbsolute(bedrock::MoveEntityAbsolute {
        runtime_entity_id: entity.runtime_id,
        flags: 0,
        position: entity.position.to_bedrock(),
        pitch: entity.position.pitch,
        yaw: yaw_to_bedrock(entity.position.yaw),
        head_yaw: yaw_to_bedrock(packet.head_yaw),
    }));
    Ok(())
}

pub fn velocity(session: &mut Session, packet: play::EntityVelocity) -> anyhow::Result<()> {
    let Some(entity) = session.get_entity_by_java_id(packet.entity_id) else {
        return Ok(());
    };
    let runtime_id = entity.runtime_id;
    session.send_bedrock(Packet::SetEntityMotion(bedrock::SetEntityMotion {
        runtime_entity_id: runtime_id,
        motion: Vec3::new(
            f32::from(packet.velocity_x) / VELOCITY_SCALE,
            f32::from(packet.velocity_y) / VELOCITY_SCALE,
            f32::from(packet.velocity_z) / VELOCITY_SCALE,
        ),
    }));
    Ok(())
}

/// Effect ids coincide across the editions for the vanilla set; they
/// pass through unmapped.
pub fn effect(session: &mut Session, packet: play::EntityEffect) -> anyhow::Result<()> {
    let Some(entity) = session.get_entity_by_java_id(packet.entity_id) else {
        return Ok(());
    };
    let runtime_id = entity.runtime_id;
    session.send_bedrock(Packet::MobEffect(bedrock::MobEffect {
        runtime_entity_id: runtime_id,
        event: mob_effect_event::ADD,
        effect_id: i32::from(packet.effect_id),
        amplifier: i32::from(packet.amplifier),
        particles: packet.flags & 0x02 != 0,
        duration: packet.duration,
    }));
    Ok(())
}

pub fn remove_effect(session: &mut Session, packet: play::RemoveEntityEffect) -> anyhow::Result<()> {
    let Some(entity) = session.get_entity_by_java_id(packet.entity_id) else {
        return Ok(());
    };
    let runtime_id = entity.runtime_id;
    session.send_bedrock(Packet::MobEffect(bedrock::MobEffect {
        runtime_entity_id: runtime_id,
        event: mob_effect_event::REMOVE,
        effect_id: i32::from(packet.effect_id),
        amplifier: 0,
        particles: false,
        duration: 0,
    }));
    Ok(())
}
