use crate::{
    position::Vec3,
    protocol::{decoder, Decode, Decoder, Encode, Encoder},
};
use minecraft_bedrock_proxy_macros::{Decode, Encode};

/// `PlayStatus` status codes.
pub mod play_status {
    pub const LOGIN_SUCCESS: i32 = 0;
    pub const FAILED_CLIENT_OUTDATED: i32 = 1;
    pub const FAILED_SERVER_OUTDATED: i32 = 2;
    pub const PLAYER_SPAWN: i32 = 3;
    pub const FAILED_SERVER_FULL: i32 = 7;
}

/// `LevelEvent` event codes.
pub mod level_event {
    pub const START_RAIN: i32 = 3001;
    pub const START_THUNDER: i32 = 3002;
    pub const STOP_RAIN: i32 = 3003;
    pub const STOP_THUNDER: i32 = 3004;
}

/// `Text` message kinds.
pub mod text_kind {
    pub const RAW: u8 = 0;
    pub const CHAT: u8 = 1;
    pub const TRANSLATION: u8 = 2;
    pub const SYSTEM: u8 = 6;
}

/// `MovePlayer` movement modes.
pub mod move_mode {
    pub const NORMAL: u8 = 0;
    pub const RESET: u8 = 1;
    pub const TELEPORT: u8 = 2;
}

/// `MobEffect` event codes.
pub mod mob_effect_event {
    pub const ADD: u8 = 1;
    pub const MODIFY: u8 = 2;
    pub const REMOVE: u8 = 3;
}

#[derive(Debug, Clone, Encode, Decode, strum::AsRefStr)]
#[encoding(discriminant = "varuint")]
pub enum Packet {
    #[encoding(id = 0x01)]
    Login(Login),
    #[encoding(id = 0x02)]
    PlayStatus(PlayStatus),
    #[encoding(id = 0x03)]
    ServerToClientHandshake(ServerToClientHandshake),
    #[encoding(id = 0x04)]
    ClientToServerHandshake(ClientToServerHandshake),
    #[encoding(id = 0x05)]
    Disconnect(Disconnect),
    #[encoding(id = 0x06)]
    ResourcePacksInfo(ResourcePacksInfo),
    #[encoding(id = 0x07)]
    ResourcePackStack(ResourcePackStack),
    #[encoding(id = 0x08)]
    ResourcePackClientResponse(ResourcePackClientResponse),
    #[encoding(id = 0x09)]
    Text(Text),
    #[encoding(id = 0x0a)]
    SetTime(SetTime),
    #[encoding(id = 0x0b)]
    StartGame(StartGame),
    #[encoding(id = 0x0c)]
    AddPlayer(AddPlayer),
    #[encoding(id = 0x0d)]
    AddEntity(AddEntity),
    #[encoding(id = 0x0e)]
    RemoveEntity(RemoveEntity),
    #[encoding(id = 0x0f)]
    AddItemEntity(AddItemEntity),
    #[encoding(id = 0x11)]
    TakeItemEntity(TakeItemEntity),
    #[encoding(id = 0x12)]
    MoveEntityAbsolute(MoveEntityAbsolute),
    #[encoding(id = 0x13)]
    MovePlayer(MovePlayer),
    #[encoding(id = 0x15)]
    UpdateBlock(UpdateBlock),
    #[encoding(id = 0x17)]
    TickSync(TickSync),
    #[encoding(id = 0x19)]
    LevelEvent(LevelEvent),
    #[encoding(id = 0x1b)]
    EntityEvent(EntityEvent),
    #[encoding(id = 0x1c)]
    MobEffect(MobEffect),
    #[encoding(id = 0x1e)]
    InventoryTransaction(InventoryTransaction),
    #[encoding(id = 0x1f)]
    MobEquipment(MobEquipment),
    #[encoding(id = 0x21)]
    Interact(Interact),
    #[encoding(id = 0x24)]
    PlayerAction(PlayerAction),
    #[encoding(id = 0x27)]
    SetEntityData(SetEntityData),
    #[encoding(id = 0x28)]
    SetEntityMotion(SetEntityMotion),
    #[encoding(id = 0x2b)]
    SetSpawnPosition(SetSpawnPosition),
    #[encoding(id = 0x2c)]
    Animate(Animate),
    #[encoding(id = 0x2d)]
    Respawn(Respawn),
    #[encoding(id = 0x2e)]
    ContainerOpen(ContainerOpen),
    #[encoding(id = 0x2f)]
    ContainerClose(ContainerClose),
    #[encoding(id = 0x30)]
    PlayerHotbar(PlayerHotbar),
    #[encoding(id = 0x31)]
    InventoryContent(InventoryContent),
    #[encoding(id = 0x32)]
    InventorySlot(InventorySlot),
    #[encoding(id = 0x37)]
    AdventureSettings(AdventureSettings),
    #[encoding(id = 0x39)]
    PlayerInput(PlayerInput),
    #[encoding(id = 0x3a)]
    LevelChunk(LevelChunk),
    #[encoding(id = 0x3d)]
    ChangeDimension(ChangeDimension),
    #[encoding(id = 0x3e)]
    SetPlayerGameType(SetPlayerGameType),
    #[encoding(id = 0x3f)]
    PlayerList(PlayerList),
    #[encoding(id = 0x45)]
    RequestChunkRadius(RequestChunkRadius),
    #[encoding(id = 0x46)]
    ChunkRadiusUpdated(ChunkRadiusUpdated),
    #[encoding(id = 0x64)]
    ModalFormRequest(ModalFormRequest),
    #[encoding(id = 0x65)]
    ModalFormResponse(ModalFormResponse),
    #[encoding(id = 0x71)]
    SetLocalPlayerAsInitialized(SetLocalPlayerAsInitialized),
    #[encoding(id = 0x79)]
    NetworkChunkPublisherUpdate(NetworkChunkPublisherUpdate),
    #[encoding(id = 0x7b)]
    LevelSoundEvent(LevelSoundEvent),
    #[encoding(id = 0x81)]
    ClientCacheStatus(ClientCacheStatus),
}

/// The login body. The protocol version is big-endian, unlike the rest
/// of the Bedrock protocol; it must be readable before a codec version
/// has been negotiated.
#[derive(Debug, Clone, Encode, Decode)]
pub struct Login {
    pub protocol_version: i32,
    /// JSON connection request: identity chain and client data.
    #[encoding(length_prefix = "varuint")]
    pub payload: Vec<u8>,
}

/// Also big-endian, for the same reason as [`Login`].
#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayStatus {
    /// One of the [`play_status`] codes.
    pub status: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ServerToClientHandshake {
    #[encoding(le)]
    pub jwt: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ClientToServerHandshake;

#[derive(Debug, Clone, Encode, Decode)]
pub struct Disconnect {
    pub hide_disconnect_screen: bool,
    #[encoding(le)]
    pub message: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ResourcePacksInfo {
    pub forced: bool,
    #[encoding(le)]
    pub behavior_pack_count: u16,
    #[encoding(le)]
    pub resource_pack_count: u16,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ResourcePackStack {
    pub forced: bool,
    #[encoding(varuint)]
    pub behavior_packs: u32,
    #[encoding(varuint)]
    pub resource_packs: u32,
    #[encoding(le)]
    pub game_version: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ResourcePackClientResponse {
    /// 1 = refused, 2 = send packs, 3 = have all packs, 4 = completed.
    pub status: u8,
    #[encoding(length_prefix = "inferred")]
    pub pack_ids: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Text {
    /// One of the [`text_kind`] codes.
    pub kind: u8,
    pub needs_translation: bool,
    #[encoding(le)]
    pub source_name: String,
    #[encoding(le)]
    pub message: String,
    #[encoding(le)]
    pub xuid: String,
    #[encoding(le)]
    pub platform_chat_id: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SetTime {
    #[encoding(zigzag)]
    pub time: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct StartGame {
    #[encoding(zigzag_long)]
    pub entity_unique_id: i64,
    #[encoding(varuint_long)]
    pub runtime_entity_id: u64,
    #[encoding(zigzag)]
    pub player_gamemode: i32,
    #[encoding(le)]
    pub position: Vec3,
    #[encoding(le)]
    pub pitch: f32,
    #[encoding(le)]
    pub yaw: f32,
    #[encoding(zigzag)]
    pub seed: i32,
    #[encoding(zigzag)]
    pub dimension: i32,
    #[encoding(zigzag)]
    pub generator: i32,
    #[encoding(zigzag)]
    pub world_gamemode: i32,
    #[encoding(zigzag)]
    pub difficulty: i32,
    #[encoding(zigzag)]
    pub spawn_x: i32,
    #[encoding(varuint)]
    pub spawn_y: u32,
    #[encoding(zigzag)]
    pub spawn_z: i32,
    pub achievements_disabled: bool,
    #[encoding(zigzag)]
    pub day_cycle_stop_time: i32,
    pub edu_mode: bool,
    #[encoding(le)]
    pub rain_level: f32,
    #[encoding(le)]
    pub lightning_level: f32,
    pub multiplayer: bool,
    pub broadcast_to_lan: bool,
    pub commands_enabled: bool,
    pub texture_packs_required: bool,
    #[encoding(le)]
    pub level_id: String,
    #[encoding(le)]
    pub level_name: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct AddPlayer {
    #[encoding(le)]
    pub uuid: u128,
    #[encoding(le)]
    pub username: String,
    #[encoding(zigzag_long)]
    pub entity_unique_id: i64,
    #[encoding(varuint_long)]
    pub runtime_entity_id: u64,
    #[encoding(le)]
    pub platform_chat_id: String,
    #[encoding(le)]
    pub position: Vec3,
    #[encoding(le)]
    pub motion: Vec3,
    #[encoding(le)]
    pub pitch: f32,
    #[encoding(le)]
    pub yaw: f32,
    #[encoding(le)]
    pub head_yaw: f32,
    pub held_item: ItemStack,
    #[encoding(varuint)]
    pub metadata_count: u32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct AddEntity {
    #[encoding(zigzag_long)]
    pub entity_unique_id: i64,
    #[encoding(varuint_long)]
    pub runtime_entity_id: u64,
    /// Namespaced entity identifier, e.g. `minecraft:zombie`.
    #[encoding(le)]
    pub identifier: String,
    #[encoding(le)]
    pub position: Vec3,
    #[encoding(le)]
    pub motion: Vec3,
    #[encoding(le)]
    pub pitch: f32,
    #[encoding(le)]
    pub yaw: f32,
    #[encoding(le)]
    pub head_yaw: f32,
    #[encoding(varuint)]
    pub attribute_count: u32,
    #[encoding(varuint)]
    pub metadata_count: u32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct RemoveEntity {
    #[encoding(zigzag_long)]
    pub entity_unique_id: i64,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct AddItemEntity {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct TakeItemEntity {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct MoveEntityAbsolute {
    #[encoding(varuint_long)]
    pub runtime_entity_id: u64,
    /// Bit 0: on ground, bit 1: teleport.
    pub flags: u8,
    #[encoding(le)]
    pub position: Vec3,
    #[encoding(angle)]
    pub pitch: f32,
    #[encoding(angle)]
    pub yaw: f32,
    #[encoding(angle)]
    pub head_yaw: f32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct MovePlayer {
    #[encoding(varuint_long)]
    pub runtime_entity_id: u64,
    #[encoding(le)]
    pub position: Vec3,
    #[encoding(le)]
    pub pitch: f32,
    #[encoding(le)]
    pub yaw: f32,
    #[encoding(le)]
    pub head_yaw: f32,
    /// One of the [`move_mode`] codes.
    pub mode: u8,
    pub on_ground: bool,
    #[encoding(varuint_long)]
    pub riding_runtime_id: u64,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct UpdateBlock {
    #[encoding(zigzag)]
    pub x: i32,
    #[encoding(varuint)]
    pub y: u32,
    #[encoding(zigzag)]
    pub z: i32,
    #[encoding(varuint)]
    pub block_runtime_id: u32,
    /// Bit 0: neighbors, bit 1: network.
    #[encoding(varuint)]
    pub flags: u32,
    #[encoding(varuint)]
    pub layer: u32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct TickSync {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct LevelEvent {
    /// One of the [`level_event`] codes.
    #[encoding(zigzag)]
    pub event_id: i32,
    #[encoding(le)]
    pub position: Vec3,
    #[encoding(zigzag)]
    pub data: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityEvent {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct MobEffect {
    #[encoding(varuint_long)]
    pub runtime_entity_id: u64,
    /// One of the [`mob_effect_event`] codes.
    pub event: u8,
    #[encoding(zigzag)]
    pub effect_id: i32,
    #[encoding(zigzag)]
    pub amplifier: i32,
    pub particles: bool,
    #[encoding(zigzag)]
    pub duration: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct InventoryTransaction {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct MobEquipment {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Interact {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerAction {
    #[encoding(varuint_long)]
    pub runtime_entity_id: u64,
    #[encoding(zigzag)]
    pub action: i32,
    #[encoding(zigzag)]
    pub x: i32,
    #[encoding(varuint)]
    pub y: u32,
    #[encoding(zigzag)]
    pub z: i32,
    #[encoding(zigzag)]
    pub face: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SetEntityData {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SetEntityMotion {
    #[encoding(varuint_long)]
    pub runtime_entity_id: u64,
    #[encoding(le)]
    pub motion: Vec3,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SetSpawnPosition {
    #[encoding(zigzag)]
    pub spawn_type: i32,
    #[encoding(zigzag)]
    pub x: i32,
    #[encoding(varuint)]
    pub y: u32,
    #[encoding(zigzag)]
    pub z: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Animate {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Respawn {
    #[encoding(le)]
    pub position: Vec3,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ContainerOpen {
    pub window_id: u8,
    pub kind: u8,
    #[encoding(zigzag)]
    pub x: i32,
    #[encoding(varuint)]
    pub y: u32,
    #[encoding(zigzag)]
    pub z: i32,
    #[encoding(zigzag_long)]
    pub entity_unique_id: i64,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ContainerClose {
    pub window_id: u8,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerHotbar {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct InventoryContent {
    #[encoding(varuint)]
    pub window_id: u32,
    #[encoding(length_prefix = "varuint")]
    pub items: Vec<ItemStack>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct InventorySlot {
    #[encoding(varuint)]
    pub window_id: u32,
    #[encoding(varuint)]
    pub slot: u32,
    pub item: ItemStack,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct AdventureSettings {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerInput {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct LevelChunk {
    #[encoding(zigzag)]
    pub chunk_x: i32,
    #[encoding(zigzag)]
    pub chunk_z: i32,
    #[encoding(varuint)]
    pub sub_chunk_count: u32,
    pub cache_enabled: bool,
    /// Serialized sub-chunks, biomes and border blocks;
    /// see [`super::chunk`] for the layout.
    #[encoding(length_prefix = "varuint")]
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ChangeDimension {
    #[encoding(zigzag)]
    pub dimension: i32,
    #[encoding(le)]
    pub position: Vec3,
    pub respawn: bool,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SetPlayerGameType {
    #[encoding(zigzag)]
    pub gamemode: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerList {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct RequestChunkRadius {
    #[encoding(zigzag)]
    pub radius: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ChunkRadiusUpdated {
    #[encoding(zigzag)]
    pub radius: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ModalFormRequest {
    #[encoding(varuint)]
    pub form_id: u32,
    /// Serialized form JSON.
    #[encoding(le)]
    pub form_data: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ModalFormResponse {
    #[encoding(varuint)]
    pub form_id: u32,
    /// Response JSON; the literal `null` means the form was cancelled.
    #[encoding(le)]
    pub form_data: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SetLocalPlayerAsInitialized {
    #[encoding(varuint_long)]
    pub runtime_entity_id: u64,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct NetworkChunkPublisherUpdate {
    #[encoding(zigzag)]
    pub x: i32,
    #[encoding(zigzag)]
    pub y: i32,
    #[encoding(zigzag)]
    pub z: i32,
    #[encoding(varuint)]
    pub radius: u32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct LevelSoundEvent {
    #[encoding(varuint)]
    pub sound_id: u32,
    #[encoding(le)]
    pub position: Vec3,
    #[encoding(zigzag)]
    pub extra_data: i32,
    #[encoding(le)]
    pub identifier: String,
    pub is_baby_mob: bool,
    pub is_global: bool,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ClientCacheStatus {
    pub supported: bool,
}

/// A Bedrock network item stack. Runtime id 0 is the empty stack and
/// carries no further fields.
#[derive(Debug, Clone, Default)]
pub struct ItemStack {
    pub runtime_id: i32,
    pub count: u8,
    pub damage: i32,
}

impl ItemStack {
    pub const EMPTY: ItemStack = ItemStack {
        runtime_id: 0,
        count: 0,
        damage: 0,
    };

    pub fn new(runtime_id: i32, count: u8, damage: i32) -> Self {
        Self {
            runtime_id,
            count,
            damage,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runtime_id == 0
    }
}

impl Encode for ItemStack {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_var_i32_zigzag(self.runtime_id);
        if self.runtime_id == 0 {
            return;
        }
        encoder.write_var_i32_zigzag((self.damage << 8) | i32::from(self.count));
        // No NBT, no can-place and no can-destroy entries.
        encoder.write_u16_le(0);
        encoder.write_var_i32_zigzag(0);
        encoder.write_var_i32_zigzag(0);
    }
}

impl Decode for ItemStack {
    fn decode(decoder: &mut Decoder) -> decoder::Result<Self> {
        let runtime_id = decoder.read_var_i32_zigzag()?;
        if runtime_id == 0 {
            return Ok(ItemStack::EMPTY);
        }
        let aux = decoder.read_var_i32_zigzag()?;
        let nbt_length = decoder.read_u16_le()?;
        decoder.consume_slice(usize::from(nbt_length))?;
        let can_place = decoder.read_var_i32_zigzag()?;
        for _ in 0..can_place.max(0) {
            decoder.read_string_varuint()?;
        }
        let can_break = decoder.read_var_i32_zigzag()?;
        for _ in 0..can_break.max(0) {
            decoder.read_string_varuint()?;
        }
        Ok(ItemStack {
            runtime_id,
            count: (aux & 0xff) as u8,
            damage: aux >> 8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Decode, Decoder, Encode, Encoder};

    fn round_trip(packet: &Packet) -> Packet {
        let mut buf = Vec::new();
        packet.encode(&mut Encoder::new(&mut buf));
        Packet::decode(&mut Decoder::new(&buf)).expect("decode failed")
    }

    #[test]
    fn level_event_round_trips() {
        let decoded = round_trip(&Packet::LevelEvent(LevelEvent {
            event_id: level_event::START_RAIN,
            position: Vec3::ZERO,
            data: 32768,
        }));
        match decoded {
            Packet::LevelEvent(event) => {
                assert_eq!(event.event_id, level_event::START_RAIN);
                assert_eq!(event.data, 32768);
            }
            other => panic!("wrong variant: {}", other.as_ref()),
        }
    }

    #[test]
    fn modal_form_round_trips() {
        let decoded = round_trip(&Packet::ModalFormRequest(ModalFormRequest {
            form_id: 3,
            form_data: "{\"type\":\"form\"}".to_owned(),
        }));
        match decoded {
            Packet::ModalFormRequest(form) => {
                assert_eq!(form.form_id, 3);
                assert!(form.form_data.contains("form"));
            }
            other => panic!("wrong variant: {}", other.as_ref()),
        }
    }

    #[test]
    fn item_stack_empty_is_single_byte() {
        let mut buf = Vec::new();
        ItemStack::EMPTY.encode(&mut Encoder::new(&mut buf));
        assert_eq!(buf, vec![0x00]);
    }

    #[test]
    fn item_stack_round_trips_count_and_damage() {
        let mut buf = Vec::new();
        ItemStack::new(5, 64, 3).encode(&mut Encoder::new(&mut buf));
        let decoded = ItemStack::decode(&mut Decoder::new(&buf)).unwrap();
        assert_eq!(decoded.runtime_id, 5);
        assert_eq!(decoded.count, 64);
        assert_eq!(decoded.damage, 3);
    }

    #[test]
    fn login_protocol_version_is_big_endian() {
        let mut buf = Vec::new();
        Packet::Login(Login {
            protocol_version: 390,
            payload: vec![1, 2, 3],
        })
        .encode(&mut Encoder::new(&mut buf));
        // id, then the raw big-endian version.
        let mut decoder = Decoder::new(&buf);
        assert_eq!(decoder.read_var_u32().unwrap(), 0x01);
        assert_eq!(decoder.read_i32().unwrap(), 390);
    }
}
