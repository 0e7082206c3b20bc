use crate::{
    position::BlockPosition,
    protocol::{decoder, nbt, Decode, Decoder, Encode, Encoder},
};
use minecraft_bedrock_proxy_macros::{Decode, Encode};

/// `ChangeGameState` reason codes.
pub mod game_state {
    pub const INVALID_BED: u8 = 0;
    pub const STOP_RAIN: u8 = 1;
    pub const START_RAIN: u8 = 2;
    pub const CHANGE_GAMEMODE: u8 = 3;
    pub const WIN_GAME: u8 = 4;
    pub const DEMO_MESSAGE: u8 = 5;
    pub const ARROW_HIT_PLAYER: u8 = 6;
    pub const RAIN_STRENGTH: u8 = 7;
    pub const THUNDER_STRENGTH: u8 = 8;
    pub const PUFFERFISH_STING: u8 = 9;
}

#[derive(Debug, Clone, Encode, Decode, strum::AsRefStr)]
#[encoding(discriminant = "varint")]
pub enum Clientbound {
    #[encoding(id = 0x00)]
    SpawnObject(SpawnObject),
    #[encoding(id = 0x01)]
    SpawnExperienceOrb(SpawnExperienceOrb),
    #[encoding(id = 0x02)]
    SpawnGlobalEntity(SpawnGlobalEntity),
    #[encoding(id = 0x03)]
    SpawnMob(SpawnMob),
    #[encoding(id = 0x04)]
    SpawnPainting(SpawnPainting),
    #[encoding(id = 0x05)]
    SpawnPlayer(SpawnPlayer),
    #[encoding(id = 0x06)]
    Animation(Animation),
    #[encoding(id = 0x07)]
    Statistics(Statistics),
    #[encoding(id = 0x08)]
    BlockBreakAnimation(BlockBreakAnimation),
    #[encoding(id = 0x09)]
    UpdateBlockEntity(UpdateBlockEntity),
    #[encoding(id = 0x0a)]
    BlockAction(BlockAction),
    #[encoding(id = 0x0b)]
    BlockChange(BlockChange),
    #[encoding(id = 0x0c)]
    BossBar(BossBar),
    #[encoding(id = 0x0d)]
    ServerDifficulty(ServerDifficulty),
    #[encoding(id = 0x0e)]
    ChatMessage(ChatMessage),
    #[encoding(id = 0x0f)]
    MultiBlockChange(MultiBlockChange),
    #[encoding(id = 0x10)]
    TabComplete(TabComplete),
    #[encoding(id = 0x11)]
    DeclareCommands(DeclareCommands),
    #[encoding(id = 0x12)]
    ConfirmTransaction(ConfirmTransaction),
    #[encoding(id = 0x13)]
    CloseWindow(CloseWindow),
    #[encoding(id = 0x14)]
    WindowItems(WindowItems),
    #[encoding(id = 0x15)]
    WindowProperty(WindowProperty),
    #[encoding(id = 0x16)]
    SetSlot(SetSlot),
    #[encoding(id = 0x17)]
    SetCooldown(SetCooldown),
    #[encoding(id = 0x18)]
    PluginMessage(PluginMessage),
    #[encoding(id = 0x19)]
    NamedSoundEffect(NamedSoundEffect),
    #[encoding(id = 0x1a)]
    Disconnect(Disconnect),
    #[encoding(id = 0x1b)]
    EntityStatus(EntityStatus),
    #[encoding(id = 0x1c)]
    Explosion(Explosion),
    #[encoding(id = 0x1d)]
    UnloadChunk(UnloadChunk),
    #[encoding(id = 0x1e)]
    ChangeGameState(ChangeGameState),
    #[encoding(id = 0x1f)]
    OpenHorseWindow(OpenHorseWindow),
    #[encoding(id = 0x20)]
    KeepAlive(KeepAlive),
    #[encoding(id = 0x21)]
    ChunkData(ChunkData),
    #[encoding(id = 0x22)]
    Effect(Effect),
    #[encoding(id = 0x23)]
    Particle(Particle),
    #[encoding(id = 0x24)]
    UpdateLight(UpdateLight),
    #[encoding(id = 0x25)]
    JoinGame(JoinGame),
    #[encoding(id = 0x26)]
    MapData(MapData),
    #[encoding(id = 0x27)]
    TradeList(TradeList),
    #[encoding(id = 0x28)]
    EntityRelativeMove(EntityRelativeMove),
    #[encoding(id = 0x29)]
    EntityLookAndRelativeMove(EntityLookAndRelativeMove),
    #[encoding(id = 0x2a)]
    EntityLook(EntityLook),
    #[encoding(id = 0x2b)]
    Entity(Entity),
    #[encoding(id = 0x2c)]
    VehicleMove(VehicleMove),
    #[encoding(id = 0x2d)]
    OpenBook(OpenBook),
    #[encoding(id = 0x2e)]
    OpenWindow(OpenWindow),
    #[encoding(id = 0x2f)]
    OpenSignEditor(OpenSignEditor),
    #[encoding(id = 0x30)]
    CraftRecipeResponse(CraftRecipeResponse),
    #[encoding(id = 0x31)]
    PlayerAbilities(PlayerAbilities),
    #[encoding(id = 0x32)]
    CombatEvent(CombatEvent),
    #[encoding(id = 0x33)]
    PlayerInfo(PlayerInfo),
    #[encoding(id = 0x34)]
    FacePlayer(FacePlayer),
    #[encoding(id = 0x35)]
    PlayerPositionAndLook(PlayerPositionAndLook),
    #[encoding(id = 0x36)]
    UnlockRecipes(UnlockRecipes),
    #[encoding(id = 0x37)]
    DestroyEntities(DestroyEntities),
    #[encoding(id = 0x38)]
    RemoveEntityEffect(RemoveEntityEffect),
    #[encoding(id = 0x39)]
    ResourcePackSend(ResourcePackSend),
    #[encoding(id = 0x3a)]
    Respawn(Respawn),
    #[encoding(id = 0x3b)]
    EntityHeadLook(EntityHeadLook),
    #[encoding(id = 0x3c)]
    SelectAdvancementTab(SelectAdvancementTab),
    #[encoding(id = 0x3d)]
    WorldBorder(WorldBorder),
    #[encoding(id = 0x3e)]
    Camera(Camera),
    #[encoding(id = 0x3f)]
    HeldItemChange(HeldItemChange),
    #[encoding(id = 0x40)]
    UpdateViewPosition(UpdateViewPosition),
    #[encoding(id = 0x41)]
    UpdateViewDistance(UpdateViewDistance),
    #[encoding(id = 0x42)]
    DisplayScoreboard(DisplayScoreboard),
    #[encoding(id = 0x43)]
    EntityMetadata(EntityMetadata),
    #[encoding(id = 0x44)]
    AttachEntity(AttachEntity),
    #[encoding(id = 0x45)]
    EntityVelocity(EntityVelocity),
    #[encoding(id = 0x46)]
    EntityEquipment(EntityEquipment),
    #[encoding(id = 0x47)]
    SetExperience(SetExperience),
    #[encoding(id = 0x48)]
    UpdateHealth(UpdateHealth),
    #[encoding(id = 0x49)]
    ScoreboardObjective(ScoreboardObjective),
    #[encoding(id = 0x4a)]
    SetPassengers(SetPassengers),
    #[encoding(id = 0x4b)]
    Teams(Teams),
    #[encoding(id = 0x4c)]
    UpdateScore(UpdateScore),
    #[encoding(id = 0x4d)]
    SpawnPosition(SpawnPosition),
    #[encoding(id = 0x4e)]
    TimeUpdate(TimeUpdate),
    #[encoding(id = 0x4f)]
    Title(Title),
    #[encoding(id = 0x50)]
    EntitySoundEffect(EntitySoundEffect),
    #[encoding(id = 0x51)]
    SoundEffect(SoundEffect),
    #[encoding(id = 0x52)]
    StopSound(StopSound),
    #[encoding(id = 0x53)]
    PlayerListHeaderFooter(PlayerListHeaderFooter),
    #[encoding(id = 0x54)]
    NbtQueryResponse(NbtQueryResponse),
    #[encoding(id = 0x55)]
    CollectItem(CollectItem),
    #[encoding(id = 0x56)]
    EntityTeleport(EntityTeleport),
    #[encoding(id = 0x57)]
    Advancements(Advancements),
    #[encoding(id = 0x58)]
    EntityProperties(EntityProperties),
    #[encoding(id = 0x59)]
    EntityEffect(EntityEffect),
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SpawnObject {
    #[encoding(varint)]
    pub entity_id: i32,
    pub uuid: u128,
    #[encoding(varint)]
    pub kind: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[encoding(angle)]
    pub pitch: f32,
    #[encoding(angle)]
    pub yaw: f32,
    pub data: i32,
    pub velocity_x: i16,
    pub velocity_y: i16,
    pub velocity_z: i16,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SpawnExperienceOrb {
    #[encoding(varint)]
    pub entity_id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub amount: i16,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SpawnGlobalEntity {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SpawnMob {
    #[encoding(varint)]
    pub entity_id: i32,
    pub uuid: u128,
    #[encoding(varint)]
    pub kind: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[encoding(angle)]
    pub yaw: f32,
    #[encoding(angle)]
    pub pitch: f32,
    #[encoding(angle)]
    pub head_pitch: f32,
    pub velocity_x: i16,
    pub velocity_y: i16,
    pub velocity_z: i16,
    /// Entity metadata, carried opaquely.
    #[encoding(length_prefix = "inferred")]
    pub metadata: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SpawnPainting {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SpawnPlayer {
    #[encoding(varint)]
    pub entity_id: i32,
    pub uuid: u128,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[encoding(angle)]
    pub yaw: f32,
    #[encoding(angle)]
    pub pitch: f32,
    /// Entity metadata, carried opaquely.
    #[encoding(length_prefix = "inferred")]
    pub metadata: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Animation {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct Statistics {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct BlockBreakAnimation {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct UpdateBlockEntity {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct BlockAction {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct BlockChange {
    pub position: BlockPosition,
    #[encoding(varint)]
    pub block_state: i32,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct BossBar {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct ServerDifficulty {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ChatMessage {
    /// Chat-JSON body.
    pub json: String,
    /// 0 = chat, 1 = system, 2 = game info (action bar).
    pub position: i8,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct MultiBlockChange {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct TabComplete {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct DeclareCommands {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct ConfirmTransaction {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct CloseWindow {
    pub window_id: u8,
}

/// Full window contents. The slot list is prefixed with a short count
/// rather than a varint, so the codec is written out by hand.
#[derive(Debug, Clone)]
pub struct WindowItems {
    pub window_id: u8,
    pub slots: Vec<Slot>,
}

impl Encode for WindowItems {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_u8(self.window_id);
        encoder.write_i16(self.slots.len().try_into().unwrap_or(i16::MAX));
        for slot in &self.slots {
            slot.encode(encoder);
        }
    }
}

impl Decode for WindowItems {
    fn decode(decoder: &mut Decoder) -> decoder::Result<Self> {
        let window_id = decoder.read_u8()?;
        let count = decoder.read_i16()?;
        let mut slots = Vec::new();
        for _ in 0..count.max(0) {
            slots.push(Slot::decode(decoder)?);
        }
        Ok(Self { window_id, slots })
    }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct WindowProperty {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SetSlot {
    pub window_id: i8,
    pub slot: i16,
    pub item: Slot,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SetCooldown {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct PluginMessage {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct NamedSoundEffect {
    pub name: String,
    #[encoding(varint)]
    pub category: i32,
    /// Fixed-point (x8) block coordinates.
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub volume: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Disconnect {
    /// Chat-JSON kick reason.
    pub reason: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityStatus {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct Explosion {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct UnloadChunk {
    pub chunk_x: i32,
    pub chunk_z: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ChangeGameState {
    /// One of the [`game_state`] reason codes.
    pub reason: u8,
    pub value: f32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct OpenHorseWindow {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct KeepAlive {
    pub id: i64,
}

/// Chunk column data. Heightmaps are an unprefixed NBT document, so the
/// codec is written out by hand.
#[derive(Debug, Clone)]
pub struct ChunkData {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub full_chunk: bool,
    pub primary_bitmask: i32,
    /// Raw heightmap NBT; recomputed client-side on the Bedrock end.
    pub heightmaps: Vec<u8>,
    /// 256 biome ids, present on full chunks only.
    pub biomes: Option<Vec<i32>>,
    /// Serialized chunk sections; see [`super::chunk`] for the layout.
    pub data: Vec<u8>,
    /// Trailing block entity NBT documents, carried opaquely.
    pub block_entities: Vec<u8>,
}

impl Encode for ChunkData {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_i32(self.chunk_x);
        encoder.write_i32(self.chunk_z);
        encoder.write_bool(self.full_chunk);
        encoder.write_var_int(self.primary_bitmask);
        encoder.write_slice(&self.heightmaps);
        if let Some(biomes) = &self.biomes {
            for biome in biomes {
                encoder.write_i32(*biome);
            }
        }
        encoder.write_var_int(self.data.len().try_into().unwrap_or(i32::MAX));
        encoder.write_slice(&self.data);
        encoder.write_slice(&self.block_entities);
    }
}

impl Decode for ChunkData {
    fn decode(decoder: &mut Decoder) -> decoder::Result<Self> {
        let chunk_x = decoder.read_i32()?;
        let chunk_z = decoder.read_i32()?;
        let full_chunk = decoder.read_bool()?;
        let primary_bitmask = decoder.read_var_int()?;
        let heightmaps = nbt::consume_document(decoder)?.to_vec();
        let biomes = if full_chunk {
            let mut biomes = Vec::with_capacity(256);
            for _ in 0..256 {
                biomes.push(decoder.read_i32()?);
            }
            Some(biomes)
        } else {
            None
        };
        let size = usize::try_from(decoder.read_var_int()?)?;
        let data = decoder.consume_slice(size)?.to_vec();
        let block_entities = decoder.consume_slice(decoder.buffer().len())?.to_vec();
        Ok(Self {
            chunk_x,
            chunk_z,
            full_chunk,
            primary_bitmask,
            heightmaps,
            biomes,
            data,
            block_entities,
        })
    }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Effect {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct Particle {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct UpdateLight {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct JoinGame {
    pub entity_id: i32,
    pub gamemode: u8,
    pub dimension: i32,
    pub max_players: u8,
    pub level_type: String,
    #[encoding(varint)]
    pub view_distance: i32,
    pub reduced_debug_info: bool,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct MapData {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct TradeList {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityRelativeMove {
    #[encoding(varint)]
    pub entity_id: i32,
    pub delta_x: i16,
    pub delta_y: i16,
    pub delta_z: i16,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityLookAndRelativeMove {
    #[encoding(varint)]
    pub entity_id: i32,
    pub delta_x: i16,
    pub delta_y: i16,
    pub delta_z: i16,
    #[encoding(angle)]
    pub yaw: f32,
    #[encoding(angle)]
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityLook {
    #[encoding(varint)]
    pub entity_id: i32,
    #[encoding(angle)]
    pub yaw: f32,
    #[encoding(angle)]
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Entity {
    #[encoding(varint)]
    pub entity_id: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct VehicleMove {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct OpenBook {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct OpenWindow {
    #[encoding(varint)]
    pub window_id: i32,
    #[encoding(varint)]
    pub kind: i32,
    /// Chat-JSON window title.
    pub title: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct OpenSignEditor {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct CraftRecipeResponse {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerAbilities {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct CombatEvent {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerInfo {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct FacePlayer {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerPositionAndLook {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    /// Relative-coordinate flag bits.
    pub flags: u8,
    #[encoding(varint)]
    pub teleport_id: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct UnlockRecipes {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DestroyEntities {
    pub entities: Vec<i32>,
}

impl Encode for DestroyEntities {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_var_int(self.entities.len().try_into().unwrap_or(i32::MAX));
        for id in &self.entities {
            encoder.write_var_int(*id);
        }
    }
}

impl Decode for DestroyEntities {
    fn decode(decoder: &mut Decoder) -> decoder::Result<Self> {
        let length = decoder.read_var_int()?;
        let mut entities = Vec::new();
        for _ in 0..length {
            entities.push(decoder.read_var_int()?);
        }
        Ok(Self { entities })
    }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct RemoveEntityEffect {
    #[encoding(varint)]
    pub entity_id: i32,
    pub effect_id: i8,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ResourcePackSend {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Respawn {
    pub dimension: i32,
    pub gamemode: u8,
    pub level_type: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityHeadLook {
    #[encoding(varint)]
    pub entity_id: i32,
    #[encoding(angle)]
    pub head_yaw: f32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SelectAdvancementTab {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct WorldBorder {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct Camera {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct HeldItemChange {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct UpdateViewPosition {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct UpdateViewDistance {
    #[encoding(varint)]
    pub view_distance: i32,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct DisplayScoreboard {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityMetadata {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct AttachEntity {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityVelocity {
    #[encoding(varint)]
    pub entity_id: i32,
    pub velocity_x: i16,
    pub velocity_y: i16,
    pub velocity_z: i16,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityEquipment {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct SetExperience {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct UpdateHealth {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct ScoreboardObjective {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct SetPassengers {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct Teams {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct UpdateScore {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SpawnPosition {
    pub position: BlockPosition,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct TimeUpdate {
    pub world_age: i64,
    pub time_of_day: i64,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Title {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct EntitySoundEffect {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SoundEffect {
    #[encoding(varint)]
    pub sound_id: i32,
    #[encoding(varint)]
    pub category: i32,
    /// Fixed-point (x8) block coordinates.
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub volume: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct StopSound {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerListHeaderFooter {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct NbtQueryResponse {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct CollectItem {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityTeleport {
    #[encoding(varint)]
    pub entity_id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[encoding(angle)]
    pub yaw: f32,
    #[encoding(angle)]
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Advancements {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}
#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityProperties {
    #[encoding(length_prefix = "inferred")]
    pub ignored_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct EntityEffect {
    #[encoding(varint)]
    pub entity_id: i32,
    pub effect_id: i8,
    pub amplifier: i8,
    #[encoding(varint)]
    pub duration: i32,
    pub flags: u8,
}

#[derive(Debug, Clone, Encode, Decode, strum::AsRefStr)]
#[encoding(discriminant = "varint")]
pub enum Serverbound {
    #[encoding(id = 0x00)]
    TeleportConfirm(TeleportConfirm),
    #[encoding(id = 0x03)]
    ChatMessageServerbound(ChatMessageServerbound),
    #[encoding(id = 0x04)]
    ClientStatus(ClientStatus),
    #[encoding(id = 0x05)]
    ClientSettings(ClientSettings),
    #[encoding(id = 0x0a)]
    CloseWindowServerbound(CloseWindowServerbound),
    #[encoding(id = 0x0f)]
    KeepAliveServerbound(KeepAliveServerbound),
    #[encoding(id = 0x11)]
    PlayerPosition(PlayerPosition),
    #[encoding(id = 0x12)]
    PlayerPositionAndRotation(PlayerPositionAndRotation),
    #[encoding(id = 0x13)]
    PlayerRotation(PlayerRotation),
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct TeleportConfirm {
    #[encoding(varint)]
    pub teleport_id: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ChatMessageServerbound {
    pub message: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ClientStatus {
    /// 0 = perform respawn, 1 = request stats.
    #[encoding(varint)]
    pub action: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ClientSettings {
    pub locale: String,
    pub view_distance: i8,
    #[encoding(varint)]
    pub chat_mode: i32,
    pub chat_colors: bool,
    pub displayed_skin_parts: u8,
    #[encoding(varint)]
    pub main_hand: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct CloseWindowServerbound {
    pub window_id: u8,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct KeepAliveServerbound {
    pub id: i64,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerPositionAndRotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerRotation {
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

/// An item stack slot. Empty NBT is the single `TAG_End` byte.
#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub item: Option<SlotData>,
}

#[derive(Debug, Clone)]
pub struct SlotData {
    pub item_id: i32,
    pub count: i8,
    /// Raw item NBT document, carried opaquely.
    pub nbt: Vec<u8>,
}

impl SlotData {
    pub fn new(item_id: i32, count: i8) -> Self {
        Self {
            item_id,
            count,
            nbt: vec![0x00],
        }
    }
}

impl Encode for Slot {
    fn encode(&self, encoder: &mut Encoder) {
        match &self.item {
            Some(data) => {
                encoder.write_bool(true);
                encoder.write_var_int(data.item_id);
                encoder.write_i8(data.count);
                encoder.write_slice(&data.nbt);
            }
            None => encoder.write_bool(false),
        }
    }
}

impl Decode for Slot {
    fn decode(decoder: &mut Decoder) -> decoder::Result<Self> {
        let present = decoder.read_bool()?;
        if !present {
            return Ok(Self { item: None });
        }
        let item_id = decoder.read_var_int()?;
        let count = decoder.read_i8()?;
        let nbt = nbt::consume_document(decoder)?.to_vec();
        Ok(Self {
            item: Some(SlotData {
                item_id,
                count,
                nbt,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Decode, Decoder, Encode, Encoder};

    fn round_trip_clientbound(packet: &Clientbound) -> Clientbound {
        let mut buf = Vec::new();
        packet.encode(&mut Encoder::new(&mut buf));
        Clientbound::decode(&mut Decoder::new(&buf)).expect("decode failed")
    }

    #[test]
    fn join_game_round_trips() {
        let decoded = round_trip_clientbound(&Clientbound::JoinGame(JoinGame {
            entity_id: 42,
            gamemode: 1,
            dimension: 0,
            max_players: 20,
            level_type: "default".to_owned(),
            view_distance: 10,
            reduced_debug_info: false,
        }));
        match decoded {
            Clientbound::JoinGame(join) => {
                assert_eq!(join.entity_id, 42);
                assert_eq!(join.gamemode, 1);
                assert_eq!(join.dimension, 0);
            }
            other => panic!("wrong variant: {}", other.as_ref()),
        }
    }

    #[test]
    fn slot_with_nbt_round_trips() {
        let mut buf = Vec::new();
        let slot = Slot {
            item: Some(SlotData::new(276, 1)),
        };
        slot.encode(&mut Encoder::new(&mut buf));
        let decoded = Slot::decode(&mut Decoder::new(&buf)).unwrap();
        let data = decoded.item.unwrap();
        assert_eq!(data.item_id, 276);
        assert_eq!(data.count, 1);
        assert_eq!(data.nbt, vec![0x00]);
    }

    #[test]
    fn empty_slot_is_one_byte() {
        let mut buf = Vec::new();
        Slot::default().encode(&mut Encoder::new(&mut buf));
        assert_eq!(buf, vec![0x00]);
    }

    #[test]
    fn chunk_data_round_trips_without_biomes() {
        let packet = ChunkData {
            chunk_x: 3,
            chunk_z: -2,
            full_chunk: false,
            primary_bitmask: 0b1,
            heightmaps: vec![0x00],
            biomes: None,
            data: vec![1, 2, 3, 4],
            block_entities: Vec::new(),
        };
        let decoded = round_trip_clientbound(&Clientbound::ChunkData(packet));
        match decoded {
            Clientbound::ChunkData(chunk) => {
                assert_eq!(chunk.chunk_x, 3);
                assert_eq!(chunk.chunk_z, -2);
                assert_eq!(chunk.data, vec![1, 2, 3, 4]);
                assert!(chunk.biomes.is_none());
            }
            other => panic!("wrong variant: {}", other.as_ref()),
        }
    }
}
