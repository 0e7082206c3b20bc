//! Translators for world state: chunks, weather, time, sounds.

use crate::{
    mappings,
    position::{ChunkPosition, Vec3},
    protocol::{
        bedrock::chunk::{write_chunk_tail, write_sub_chunk, SUB_CHUNK_VOLUME},
        bedrock::packets::{self as bedrock, level_event, Packet},
        java::chunk::{parse_sections, ChunkSection, SECTIONS_PER_CHUNK, SECTION_VOLUME},
        java::play::{self, game_state},
    },
    session::Session,
    ProxyContext,
};
use ahash::AHashMap;
use rand::Rng;

/// Re-emits a Java chunk column as a Bedrock `LevelChunk`: every block
/// state goes through the block table (unknown states become the info
/// update placeholder), biomes go through the biome table, and block
/// entity payloads are carried opaquely. The chunk set is updated with
/// the send.
pub fn chunk_data(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: play::ChunkData,
) -> anyhow::Result<()> {
    let sections = parse_sections(packet.primary_bitmask, &packet.data)?;

    let air = ctx.mappings.blocks.to_bedrock(0);
    let sub_chunk_count = sections
        .iter()
        .map(|(section_y, _)| section_y + 1)
        .max()
        .unwrap_or(0);

    let mut by_height: [Option<&ChunkSection>; SECTIONS_PER_CHUNK] =
        [None; SECTIONS_PER_CHUNK];
    for (section_y, section) in &sections {
        by_height[*section_y] = Some(section);
    }

    let mut payload = Vec::new();
    let empty_indices = [0u16; SUB_CHUNK_VOLUME];
    for slot in by_height.iter().take(sub_chunk_count) {
        match slot {
            Some(section) => {
                let (palette, indices) = translate_section(ctx, section);
                write_sub_chunk(&mut payload, &palette, &indices);
            }
            // A gap below a populated section still needs a sub-chunk.
            None => write_sub_chunk(&mut payload, &[air], &empty_indices),
        }
    }

    let mut biomes = [ctx.mappings.biomes.to_bedrock(-1); 256];
    if let Some(java_biomes) = &packet.biomes {
        for (slot, &java_id) in biomes.iter_mut().zip(java_biomes.iter()) {
            *slot = ctx.mappings.biomes.to_bedrock(java_id);
        }
    }
    write_chunk_tail(&mut payload, &biomes);

    let position = ChunkPosition {
        x: packet.chunk_x,
        z: packet.chunk_z,
    };
    session.remember_chunk(position);
    session.send_bedrock(Packet::LevelChunk(bedrock::LevelChunk {
        chunk_x: packet.chunk_x,
        chunk_z: packet.chunk_z,
        sub_chunk_count: sub_chunk_count as u32,
        cache_enabled: false,
        payload,
    }));
    Ok(())
}

/// Maps one Java section to a Bedrock palette and index array,
/// reordering from Java's y-major to Bedrock's x-major block order.
fn translate_section(ctx: &ProxyContext, section: &ChunkSection) -> (Vec<i32>, [u16; SUB_CHUNK_VOLUME]) {
    let mut palette = Vec::new();
    let mut palette_index: AHashMap<i32, u16> = AHashMap::new();
    let mut indices = [0u16; SUB_CHUNK_VOLUME];

    for java_index in 0..SECTION_VOLUME {
        let java_state = section.state_at(java_index);
        let runtime_id = ctx.mappings.blocks.to_bedrock(java_state);
        let palette_slot = *palette_index.entry(runtime_id).or_insert_with(|| {
            palette.push(runtime_id);
            (palette.len() - 1) as u16
        });

        let x = java_index & 0xf;
        let z = (java_index >> 4) & 0xf;
        let y = java_index >> 8;
        indices[(x << 8) | (z << 4) | y] = palette_slot;
    }

    (palette, indices)
}

/// A Java `UnloadChunk` becomes an empty `LevelChunk`, which the
/// Bedrock client treats as an unload.
pub fn unload_chunk(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: play::UnloadChunk,
) -> anyhow::Result<()> {
    let position = ChunkPosition {
        x: packet.chunk_x,
        z: packet.chunk_z,
    };
    if !session.forget_chunk(position) {
        tracing::debug!(
            session = session.id(),
            ?position,
            "unload for a chunk the client does not hold"
        );
        return Ok(());
    }

    let mut payload = Vec::new();
    write_chunk_tail(&mut payload, &[ctx.mappings.biomes.to_bedrock(-1); 256]);
    session.send_bedrock(Packet::LevelChunk(bedrock::LevelChunk {
        chunk_x: packet.chunk_x,
        chunk_z: packet.chunk_z,
        sub_chunk_count: 0,
        cache_enabled: false,
        payload,
    }));
    Ok(())
}

/// Game state notifications: gamemode changes and weather. Rain and
/// thunder strengths scale by `round(strength * 65535)`, clamped; the
/// upstream implementation truncated the strength to an integer before
/// scaling, which zeroed every partial strength.
pub fn change_game_state(
    session: &mut Session,
    packet: play::ChangeGameState,
) -> anyhow::Result<()> {
    match packet.reason {
        game_state::CHANGE_GAMEMODE => {
            let gamemode = packet.value as i32;
            session.gamemode = gamemode;
            session.send_bedrock(Packet::SetPlayerGameType(bedrock::SetPlayerGameType {
                gamemode: mappings::gamemode_to_bedrock(gamemode),
            }));
        }
        game_state::START_RAIN => {
            let data = rand::thread_rng().gen_range(10_000..60_000);
            send_level_event(session, level_event::START_RAIN, data);
        }
        game_state::STOP_RAIN => {
            send_level_event(session, level_event::STOP_RAIN, 0);
        }
        game_state::RAIN_STRENGTH => {
            if packet.value > 0.0 {
                send_level_event(session, level_event::START_RAIN, scale_strength(packet.value));
            } else {
                send_level_event(session, level_event::STOP_RAIN, 0);
            }
        }
        game_state::THUNDER_STRENGTH => {
            if packet.value > 0.0 {
                send_level_event(
                    session,
                    level_event::START_THUNDER,
                    scale_strength(packet.value),
                );
            } else {
                send_level_event(session, level_event::STOP_THUNDER, 0);
            }
        }
        game_state::INVALID_BED => {
            tracing::debug!(session = session.id(), "invalid bed notification ignored");
        }
        other => {
            tracing::debug!(session = session.id(), reason = other, "unhandled game state");
        }
    }
    Ok(())
}

fn send_level_event(session: &mut Session, event_id: i32, data: i32) {
    session.send_bedrock(Packet::LevelEvent(bedrock::LevelEvent {
        event_id,
        position: Vec3::ZERO,
        data,
    }));
}

/// Strength in [0.0, 1.0] to a 16-bit intensity.
fn scale_strength(strength: f32) -> i32 {
    (f64::from(strength).clamp(0.0, 1.0) * 65535.0).round() as i32
}

pub fn block_change(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: play::BlockChange,
) -> anyhow::Result<()> {
    session.send_bedrock(Packet::UpdateBlock(bedrock::UpdateBlock {
        x: packet.position.x,
        y: packet.position.y.max(0) as u32,
        z: packet.position.z,
        block_runtime_id: ctx.mappings.blocks.to_bedrock(packet.block_state) as u32,
        flags: 0b11, // neighbors + network
        layer: 0,
    }));
    Ok(())
}

pub fn time_update(session: &mut Session, packet: play::TimeUpdate) -> anyhow::Result<()> {
    session.send_bedrock(Packet::SetTime(bedrock::SetTime {
        time: (packet.time_of_day.rem_euclid(24_000)) as i32,
    }));
    Ok(())
}

pub fn named_sound_effect(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: play::NamedSoundEffect,
) -> anyhow::Result<()> {
    let Some(sound_id) = ctx.mappings.sounds.to_bedrock(&packet.name) else {
        tracing::debug!(sound = %packet.name, "unmapped sound, dropping");
        return Ok(());
    };
    session.send_bedrock(Packet::LevelSoundEvent(bedrock::LevelSoundEvent {
        sound_id,
        position: Vec3::new(
            packet.x as f32 / 8.0,
            packet.y as f32 / 8.0,
            packet.z as f32 / 8.0,
        ),
        extra_data: -1,
        identifier: String::new(),
        is_baby_mob: false,
        is_global: false,
    }));
    Ok(())
}

pub fn spawn_position(session: &mut Session, packet: play::SpawnPosition) -> anyhow::Result<()> {
    session.spawn = packet.position;
    session.send_bedrock(Packet::SetSpawnPosition(bedrock::SetSpawnPosition {
        spawn_type: 1, // world spawn
        x: packet.position.x,
        y: packet.position.y.max(0) as u32,
        z: packet.position.z,
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_scaling_rounds_instead_of_truncating() {
        assert_eq!(scale_strength(0.5), 32768);
        assert_eq!(scale_strength(0.0), 0);
        assert_eq!(scale_strength(1.0), 65535);
        // Out-of-range values clamp before the cast.
        assert_eq!(scale_strength(4.2), 65535);
        assert_eq!(scale_strength(-1.0), 0);
    }
}
