//! Packet translators and their dispatch.
//!
//! Dispatch is a closed match over each direction's packet enum:
//! registration is the match arm, lookup is O(1) on the tag, and a
//! variant without an arm is dropped after a debug log entry. Dropping
//! never errors a session.
//!
//! Every translator runs to completion on the session task, reads only
//! the session and the static tables, emits a bounded number of packets
//! through the session handle, and reports unrecoverable conditions by
//! returning an error (the pipeline turns that into a disconnect).

use crate::{
    protocol::{bedrock::Packet, java::play},
    session::{AuthState, Session},
    ProxyContext,
};

mod bedrock;
mod java;

/// Dispatches one decoded Java packet.
pub fn translate_java(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: play::Clientbound,
) -> anyhow::Result<()> {
    use play::Clientbound::*;

    match packet {
        JoinGame(packet) => java::player::join_game(session, ctx, packet),
        KeepAlive(packet) => java::player::keep_alive(session, packet),
        ChatMessage(packet) => java::player::chat_message(session, packet),
        Disconnect(packet) => java::player::disconnect(session, packet),
        PlayerPositionAndLook(packet) => java::player::position_and_look(session, packet),
        Respawn(packet) => java::player::respawn(session, packet),
        UpdateViewDistance(packet) => java::player::update_view_distance(session, packet),

        ChunkData(packet) => java::world::chunk_data(session, ctx, packet),
        UnloadChunk(packet) => java::world::unload_chunk(session, ctx, packet),
        ChangeGameState(packet) => java::world::change_game_state(session, packet),
        BlockChange(packet) => java::world::block_change(session, ctx, packet),
        TimeUpdate(packet) => java::world::time_update(session, packet),
        NamedSoundEffect(packet) => java::world::named_sound_effect(session, ctx, packet),
        SpawnPosition(packet) => java::world::spawn_position(session, packet),

        SpawnObject(packet) => java::entity::spawn_object(session, ctx, packet),
        SpawnMob(packet) => java::entity::spawn_mob(session, ctx, packet),
        SpawnPlayer(packet) => java::entity::spawn_player(session, packet),
        DestroyEntities(packet) => java::entity::destroy_entities(session, packet),
        EntityRelativeMove(packet) => java::entity::relative_move(session, packet),
        EntityLookAndRelativeMove(packet) => java::entity::look_and_relative_move(session, packet),
        EntityLook(packet) => java::entity::look(session, packet),
        EntityTeleport(packet) => java::entity::teleport(session, packet),
        EntityHeadLook(packet) => java::entity::head_look(session, packet),
        EntityVelocity(packet) => java::entity::velocity(session, packet),
        EntityEffect(packet) => java::entity::effect(session, packet),
        RemoveEntityEffect(packet) => java::entity::remove_effect(session, packet),

        OpenWindow(packet) => java::window::open_window(session, packet),
        WindowItems(packet) => java::window::window_items(session, ctx, packet),
        SetSlot(packet) => java::window::set_slot(session, ctx, packet),
        CloseWindow(packet) => java::window::close_window(session, packet),

        other => {
            tracing::debug!(packet = other.as_ref(), "no Java translator, dropping");
            Ok(())
        }
    }
}

/// Dispatches one decoded Bedrock packet.
///
/// Before `Spawned`, only the handful of packets that are part of the
/// join sequence are accepted; everything else is dropped. Queuing
/// would reorder them against the join flow for no benefit.
pub fn translate_bedrock(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: Packet,
) -> anyhow::Result<()> {
    if session.state() != AuthState::Spawned && !allowed_before_spawn(&packet) {
        tracing::debug!(
            packet = packet.as_ref(),
            state = ?session.state(),
            "dropping Bedrock packet before spawn"
        );
        return Ok(());
    }

    match packet {
        Packet::MovePlayer(packet) => bedrock::player::move_player(session, packet),
        Packet::Text(packet) => bedrock::player::text(session, packet),
        Packet::Respawn(packet) => bedrock::player::respawn(session, packet),
        Packet::PlayerAction(packet) => bedrock::player::player_action(session, packet),
        Packet::RequestChunkRadius(packet) => {
            bedrock::player::request_chunk_radius(session, ctx, packet)
        }
        Packet::ContainerClose(packet) => bedrock::player::container_close(session, packet),
        Packet::ClientCacheStatus(packet) => bedrock::player::client_cache_status(session, packet),
        Packet::SetLocalPlayerAsInitialized(packet) => {
            bedrock::player::local_player_initialized(session, packet)
        }
        Packet::ResourcePackClientResponse(packet) => {
            bedrock::player::resource_pack_response(session, packet)
        }
        Packet::ModalFormResponse(packet) => bedrock::form::modal_form_response(session, packet),

        other => {
            tracing::debug!(packet = other.as_ref(), "no Bedrock translator, dropping");
            Ok(())
        }
    }
}

fn allowed_before_spawn(packet: &Packet) -> bool {
    matches!(
        packet,
        Packet::ModalFormResponse(_)
            | Packet::RequestChunkRadius(_)
            | Packet::ResourcePackClientResponse(_)
            | Packet::ClientCacheStatus(_)
    )
}

/// Extracts a readable string from a chat-JSON payload. Formatting
/// codes and nested components are flattened; invalid JSON is passed
/// through as-is (servers do send bare strings).
pub fn chat_to_plain(json: &str) -> String {
    fn collect(value: &serde_json::Value, out: &mut String) {
        match value {
            serde_json::Value::String(s) => out.push_str(s),
            serde_json::Value::Object(map) => {
                if let Some(serde_json::Value::String(text)) = map.get("text") {
                    out.push_str(text);
                }
                if let Some(serde_json::Value::Array(extra)) = map.get("extra") {
                    for part in extra {
                        collect(part, out);
                    }
                }
            }
            serde_json::Value::Array(parts) => {
                for part in parts {
                    collect(part, out);
                }
            }
            _ => {}
        }
    }

    match serde_json::from_str::<serde_json::Value>(json) {
        Ok(value) => {
            let mut out = String::new();
            collect(&value, &mut out);
            out
        }
        Err(_) => json.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_json_flattens_extra_components() {
        let json = r#"{"text":"Hello, ","extra":[{"text":"world"},{"text":"!"}]}"#;
        assert_eq!(chat_to_plain(json), "Hello, world!");
    }

    #[test]
    fn bare_string_chat_is_passed_through() {
        assert_eq!(chat_to_plain("\"plain\""), "plain");
        assert_eq!(chat_to_plain("not json at all"), "not json at all");
    }
}
